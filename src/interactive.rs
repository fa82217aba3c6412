//! 対話モード
//!
//! サブコマンドなしで起動したときに、PSDパス・出力先・非表示レイヤー・
//! フォントを順に尋ねる。

use crate::config::Config;
use crate::error::Result;
use crate::runner::default_output_dir;
use crate::scanner::is_psd;
use dialoguer::{Confirm, Input};
use std::path::PathBuf;

/// 対話で決まった設定
#[derive(Debug, Clone)]
pub struct InteractiveChoices {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub include_invisible: bool,
    pub font: Option<PathBuf>,
}

/// 入力されたPSDパスの検証。問題があればメッセージを返す
pub fn validate_psd_path(input: &str) -> std::result::Result<(), String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("パスを入力してください".to_string());
    }
    let path = PathBuf::from(trimmed);
    if !path.exists() {
        return Err(format!("ファイルが存在しません: {}", trimmed));
    }
    if !is_psd(&path) {
        return Err(format!("PSDファイルを指定してください: {}", trimmed));
    }
    Ok(())
}

/// 設定を尋ねる。キャンセルされたら None
pub fn prompt(config: &Config) -> Result<Option<InteractiveChoices>> {
    println!("\n{}", "=".repeat(60));
    println!("      🎨 psd-web - PSD素材書き出し");
    println!("{}", "=".repeat(60));

    println!("\n📁 PSDファイル");
    let input: String = Input::new()
        .with_prompt("PSDファイルのパス")
        .validate_with(|s: &String| validate_psd_path(s))
        .interact_text()?;
    let input = PathBuf::from(input.trim());

    println!("\n📂 出力先");
    let default_dir = default_output_dir(&input);
    let output: String = Input::new()
        .with_prompt("出力ディレクトリ")
        .default(default_dir.display().to_string())
        .interact_text()?;

    println!("\n⚙️  書き出し設定");
    println!("非表示レイヤーを含めると素材の数が増えます");
    let include_invisible = Confirm::new()
        .with_prompt("非表示レイヤーも書き出しますか?")
        .default(config.include_invisible)
        .interact()?;

    println!("\n🔤 フォント");
    println!("プレビューのないテキストレイヤーはフォントで描画します");
    let mut font = None;
    let use_custom = Confirm::new()
        .with_prompt("フォントファイルを指定しますか?")
        .default(false)
        .interact()?;
    if use_custom {
        let path: String = Input::new()
            .with_prompt("フォントファイルのパス")
            .allow_empty(true)
            .interact_text()?;
        let path = PathBuf::from(path.trim());
        if path.is_file() {
            font = Some(path);
        } else {
            println!("⚠ フォントが見つからないため、既定のフォントを使います");
        }
    }

    let choices = InteractiveChoices {
        input,
        output_dir: PathBuf::from(output.trim()),
        include_invisible,
        font,
    };

    println!("\n{}", "=".repeat(60));
    println!("PSDファイル: {}", choices.input.display());
    println!("出力先: {}", choices.output_dir.display());
    println!("非表示レイヤー: {}", if choices.include_invisible { "書き出す" } else { "書き出さない" });
    println!(
        "フォント: {}",
        choices
            .font
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "既定".to_string())
    );
    println!("{}", "=".repeat(60));

    let start = Confirm::new()
        .with_prompt("書き出しを開始しますか?")
        .default(true)
        .interact()?;

    if !start {
        println!("キャンセルしました");
        return Ok(None);
    }

    Ok(Some(choices))
}
