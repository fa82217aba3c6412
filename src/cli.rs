use crate::export::{EmitterKind, OutputProfile};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "psd-web")]
#[command(about = "PSDからWeb制作用のレイヤー素材とメタデータを書き出すツール", long_about = None)]
pub struct Cli {
    /// サブコマンド（省略時は対話モード）
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// レイヤー画像とメタデータを書き出す
    Extract {
        /// PSDファイル、またはPSDを含むフォルダ
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ディレクトリ（デフォルト: web_<ファイル名>）
        output: Option<PathBuf>,

        /// 非表示レイヤーも書き出す
        #[arg(long)]
        invisible: bool,

        /// スマートオブジェクトを展開する（未対応のためスキップされる）
        #[arg(long)]
        expand_smart: bool,

        /// テキスト描画に使うフォントファイル
        #[arg(long)]
        font: Option<PathBuf>,

        /// 出力プロファイル (basic/ai)
        #[arg(short, long)]
        profile: Option<OutputProfile>,

        /// 出力形式を個別に指定 (json,csv,summary,html,layout,ai)
        #[arg(short, long, value_delimiter = ',')]
        emit: Vec<EmitterKind>,

        /// 進捗バーを表示しない
        #[arg(long)]
        no_progress: bool,
    },

    /// PSDの情報とレイヤー構成を表示
    Info {
        /// PSDファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// フォント候補の先頭に追加
        #[arg(long)]
        add_font: Option<PathBuf>,

        /// フォント候補を既定に戻す
        #[arg(long)]
        reset_fonts: bool,
    },
}
