//! 設定ファイル
//!
//! `~/.config/psd-web/config.json` に保存する。
//! フォントは候補リストの先頭から順に探し、起動時に一度だけ決定する。

use crate::error::{PsdWebError, Result};
use crate::export::OutputProfile;
use crate::pipeline::ExportOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// テキスト描画用フォントの候補（先頭優先）
    pub font_fallbacks: Vec<PathBuf>,
    /// 既定の出力プロファイル
    pub default_profile: OutputProfile,
    /// 非表示レイヤーも書き出す
    pub include_invisible: bool,
    /// スマートオブジェクトを展開する
    pub expand_smart_objects: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_fallbacks: default_font_fallbacks(),
            default_profile: OutputProfile::Basic,
            include_invisible: false,
            expand_smart_objects: false,
        }
    }
}

/// OS標準のCJKフォント
pub fn default_font_fallbacks() -> Vec<PathBuf> {
    [
        "C:/Windows/Fonts/simhei.ttf",
        "C:/Windows/Fonts/msyh.ttc",
        "C:/Windows/Fonts/meiryo.ttc",
        "/System/Library/Fonts/PingFang.ttc",
        "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/droid/DroidSansFallback.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// 指定パスから読み込み（存在しなければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PsdWebError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("psd-web").join("config.json"))
    }

    /// 使用するフォントを決定する
    ///
    /// 指定フォントが存在すればそれを、なければ候補リストの先頭から
    /// 最初に存在するものを返す。
    pub fn resolve_font(&self, custom: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = custom {
            if path.is_file() {
                return Some(path.to_path_buf());
            }
            tracing::warn!("指定フォントが見つかりません: {}", path.display());
        }

        self.font_fallbacks.iter().find(|p| p.is_file()).cloned()
    }

    /// コマンドラインの指定と設定ファイルの既定値を合わせる（どちらかが有効なら有効）
    pub fn export_options(&self, include_invisible: bool, expand_smart_objects: bool) -> ExportOptions {
        ExportOptions {
            include_invisible: include_invisible || self.include_invisible,
            expand_smart_objects: expand_smart_objects || self.expand_smart_objects,
        }
    }

    /// 候補の先頭にフォントを追加（重複は移動）
    pub fn add_font(&mut self, path: PathBuf) -> Result<()> {
        if !path.is_file() {
            return Err(PsdWebError::FileNotFound(path.display().to_string()));
        }
        self.font_fallbacks.retain(|p| p != &path);
        self.font_fallbacks.insert(0, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_returns_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert!(!config.include_invisible);
        assert!(!config.font_fallbacks.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            include_invisible: true,
            default_profile: OutputProfile::Ai,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.include_invisible);
        assert_eq!(loaded.default_profile, OutputProfile::Ai);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"include_invisible": true}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.include_invisible);
        assert!(!loaded.expand_smart_objects);
        assert_eq!(loaded.font_fallbacks, default_font_fallbacks());
    }

    #[test]
    fn test_resolve_font_order() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.ttf");
        let second = dir.path().join("b.ttf");
        std::fs::write(&second, b"font").unwrap();

        let config = Config {
            font_fallbacks: vec![first.clone(), second.clone()],
            ..Default::default()
        };
        assert_eq!(config.resolve_font(None), Some(second.clone()));

        std::fs::write(&first, b"font").unwrap();
        assert_eq!(config.resolve_font(None), Some(first.clone()));

        let custom = dir.path().join("custom.ttf");
        std::fs::write(&custom, b"font").unwrap();
        assert_eq!(config.resolve_font(Some(&custom)), Some(custom));
    }

    #[test]
    fn test_resolve_font_missing_custom_falls_back() {
        let dir = tempdir().unwrap();
        let fallback = dir.path().join("fallback.ttf");
        std::fs::write(&fallback, b"font").unwrap();

        let config = Config {
            font_fallbacks: vec![fallback.clone()],
            ..Default::default()
        };
        let missing = dir.path().join("missing.ttf");
        assert_eq!(config.resolve_font(Some(&missing)), Some(fallback));
    }

    #[test]
    fn test_export_options_honour_config() {
        let config = Config {
            expand_smart_objects: true,
            ..Default::default()
        };
        let options = config.export_options(false, false);
        assert!(options.expand_smart_objects);
        assert!(!options.include_invisible);

        let options = Config::default().export_options(true, false);
        assert!(options.include_invisible);
        assert!(!options.expand_smart_objects);
    }

    #[test]
    fn test_add_font_moves_to_front() {
        let dir = tempdir().unwrap();
        let font = dir.path().join("f.ttf");
        std::fs::write(&font, b"font").unwrap();

        let mut config = Config {
            font_fallbacks: vec![PathBuf::from("/x.ttf"), font.clone()],
            ..Default::default()
        };
        config.add_font(font.clone()).unwrap();
        assert_eq!(config.font_fallbacks, vec![font, PathBuf::from("/x.ttf")]);

        assert!(config.add_font(dir.path().join("none.ttf")).is_err());
    }
}
