//! 画像の保存先

use crate::error::{PsdWebError, Result};
use image::{ImageFormat, RgbaImage};
use psd_web_common::naming::IMAGES_DIR;
use std::path::{Path, PathBuf};

/// 書き出した画像の保存先
pub trait AssetSink {
    /// `relative_path` は出力ルートからの相対パス（`images/000_name.png`）
    fn persist(&mut self, relative_path: &str, image: &RgbaImage) -> Result<()>;
}

/// 出力ディレクトリにPNGとして保存する
#[derive(Debug, Clone)]
pub struct PngDirectorySink {
    root: PathBuf,
}

impl PngDirectorySink {
    /// 出力ルートと `images/` を作成する
    pub fn new(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root.join(IMAGES_DIR))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSink for PngDirectorySink {
    fn persist(&mut self, relative_path: &str, image: &RgbaImage) -> Result<()> {
        let path = self.root.join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| PsdWebError::ImageSave(format!("{}: {}", path.display(), e)))
    }
}
