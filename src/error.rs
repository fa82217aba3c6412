use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsdWebError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("PSDのデコードに失敗: {0}")]
    Decode(String),

    #[error("画像保存エラー: {0}")]
    ImageSave(String),

    #[error("フォント読み込みエラー: {0}")]
    Font(String),

    #[error("メタデータ出力エラー: {0}")]
    Emit(String),

    #[error("入力がキャンセルされました: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PsdWebError>;
