use crate::error::{PsdWebError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const PSD_EXTENSION: &str = "psd";

/// フォルダ直下のPSDファイルをファイル名順に返す
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(PsdWebError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file() && is_psd(path))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// 拡張子が `.psd`（大文字小文字を区別しない）
pub fn is_psd(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(PSD_EXTENSION))
        .unwrap_or(false)
}
