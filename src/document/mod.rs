//! PSD文書の読み込み
//!
//! 文書を開き、サイズ情報とレイヤー一覧（グループを展開したもの）を提供する。
//! 元ファイルは読み取るだけで変更しない。

pub mod records;
pub mod text;

use crate::error::{PsdWebError, Result};
use image::RgbaImage;
use psd_web_common::{DocumentInfo, DocumentSummary, KindHints, LayerBounds, TextAttributes};
use records::{ScannedDocument, ScannedLayer};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// パイプラインが扱うレイヤー
///
/// PSD以外の入力やテスト用の偽レイヤーもこのトレイトを実装すれば処理できる。
pub trait LayerHandle {
    fn name(&self) -> &str;

    /// レイヤー自身の表示フラグ（親グループの状態は見ない）
    fn visible(&self) -> bool;

    fn bounds(&self) -> LayerBounds;

    /// 0-100。取得できなければ None
    fn opacity(&self) -> Option<u8>;

    fn blend_mode(&self) -> Option<&str>;

    fn text(&self) -> Option<&TextAttributes>;

    fn hints(&self) -> KindHints;

    fn group_path(&self) -> &[String] {
        &[]
    }

    /// レイヤーのピクセルを画像にする。描画するものがなければ None
    fn rasterize(&self) -> Result<Option<RgbaImage>>;
}

/// 開いたPSD文書
pub struct Document {
    path: PathBuf,
    scanned: ScannedDocument,
    psd: psd::Psd,
    /// scanned.layers[i] に対応する psd.layers() の添字
    pixel_sources: Vec<Option<usize>>,
}

impl Document {
    /// ファイルを開く
    ///
    /// - パスが存在しない: `FileNotFound`
    /// - PSDとして読めない: `Decode`
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PsdWebError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        Self::from_bytes(path, &bytes)
    }

    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self> {
        let scanned = records::scan(bytes)?;
        // デコーダは壊れた入力で panic することがある
        let psd = panic::catch_unwind(AssertUnwindSafe(|| psd::Psd::from_bytes(bytes)))
            .map_err(|_| PsdWebError::Decode("ピクセルデータを読み取れません".into()))?
            .map_err(|e| PsdWebError::Decode(e.to_string()))?;

        let decoded_names: Vec<&str> = psd.layers().iter().map(|l| l.name()).collect();
        let pixel_sources = match_pixel_sources(&scanned.layers, &decoded_names);

        let unmatched = pixel_sources.iter().filter(|s| s.is_none()).count();
        if unmatched > 0 {
            tracing::warn!("{}個のレイヤーでピクセルデータを特定できませんでした", unmatched);
        }

        Ok(Self {
            path: path.to_path_buf(),
            scanned,
            psd,
            pixel_sources,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn info(&self) -> DocumentInfo {
        let header = &self.scanned.header;
        DocumentInfo {
            width: header.width,
            height: header.height,
            color_mode: header.color_mode_name().to_string(),
            bit_depth: header.depth,
        }
    }

    /// 書き出し前のレイヤー構成
    pub fn summary(&self) -> DocumentSummary {
        summarize(&self.scanned)
    }

    /// ファイル順（一番下が先頭）のレイヤー一覧。グループ自体は含まない
    pub fn layers(&self) -> Vec<PsdLayerHandle<'_>> {
        let decoded = self.psd.layers();
        self.scanned
            .layers
            .iter()
            .zip(&self.pixel_sources)
            .map(|(layer, source)| PsdLayerHandle {
                layer,
                pixels: source.and_then(|i| decoded.get(i)),
                blend_mode: layer.blend_mode(),
                canvas_width: self.scanned.header.width,
                canvas_height: self.scanned.header.height,
            })
            .collect()
    }
}

fn summarize(scanned: &ScannedDocument) -> DocumentSummary {
    let mut summary = DocumentSummary {
        total_layers: scanned.layers.len(),
        layer_groups: scanned.group_count,
        ..Default::default()
    };

    for layer in &scanned.layers {
        let hints = layer.hints();
        if layer.visible {
            summary.visible_layers += 1;
        }
        if hints.text {
            summary.text_layers += 1;
        }
        if hints.smart_object {
            summary.smart_objects += 1;
        }
        if hints.adjustment {
            summary.adjustment_layers += 1;
        }
        if hints.raster {
            summary.pixel_layers += 1;
        }
        if layer.is_vector() {
            summary.shape_layers += 1;
        }
    }

    summary
}

/// 読み取ったレイヤーとデコーダのレイヤーを対応付ける
///
/// デコーダは一番上のレイヤーから並べるので、ファイル順に直してから比べる。
/// 件数が一致すれば順番どおり。一致しなければ名前で前から順に探す。
fn match_pixel_sources(scanned: &[ScannedLayer], decoded_names: &[&str]) -> Vec<Option<usize>> {
    let bottom_up: Vec<(usize, &str)> = decoded_names
        .iter()
        .enumerate()
        .rev()
        .map(|(i, name)| (i, name.trim_end_matches('\0')))
        .collect();

    if scanned.len() == bottom_up.len() {
        return bottom_up.iter().map(|(i, _)| Some(*i)).collect();
    }

    tracing::debug!(
        "レイヤー数が一致しません (読み取り {} / デコーダ {})",
        scanned.len(),
        decoded_names.len()
    );

    let mut cursor = 0;
    scanned
        .iter()
        .map(|layer| {
            let offset = bottom_up[cursor..]
                .iter()
                .position(|(_, name)| *name == layer.legacy_name || *name == layer.name)?;
            let (decoded_index, _) = bottom_up[cursor + offset];
            cursor += offset + 1;
            Some(decoded_index)
        })
        .collect()
}

/// PSDの1レイヤー
pub struct PsdLayerHandle<'a> {
    layer: &'a ScannedLayer,
    pixels: Option<&'a psd::PsdLayer>,
    blend_mode: Option<String>,
    canvas_width: u32,
    canvas_height: u32,
}

impl LayerHandle for PsdLayerHandle<'_> {
    fn name(&self) -> &str {
        &self.layer.name
    }

    fn visible(&self) -> bool {
        self.layer.visible
    }

    fn bounds(&self) -> LayerBounds {
        self.layer.bounds
    }

    fn opacity(&self) -> Option<u8> {
        Some(self.layer.opacity_percent())
    }

    fn blend_mode(&self) -> Option<&str> {
        self.blend_mode.as_deref()
    }

    fn text(&self) -> Option<&TextAttributes> {
        self.layer.text.as_ref()
    }

    fn hints(&self) -> KindHints {
        self.layer.hints()
    }

    fn group_path(&self) -> &[String] {
        &self.layer.group_path
    }

    fn rasterize(&self) -> Result<Option<RgbaImage>> {
        let Some(source) = self.pixels else {
            return Ok(None);
        };
        let Some((x, y, width, height)) =
            visible_region(&self.layer.bounds, self.canvas_width, self.canvas_height)
        else {
            return Ok(None);
        };

        // デコーダはキャンバス全体の大きさで RGBA を返す。
        // キャンバス外にはみ出した無圧縮データでは panic するので、ここで止める
        let (canvas_width, canvas_height) = (self.canvas_width, self.canvas_height);
        let cropped = panic::catch_unwind(AssertUnwindSafe(|| {
            RgbaImage::from_raw(canvas_width, canvas_height, source.rgba())
                .map(|canvas| image::imageops::crop_imm(&canvas, x, y, width, height).to_image())
        }))
        .map_err(|_| PsdWebError::Decode(format!("ピクセルデータを展開できません: {}", self.layer.name)))?;

        cropped
            .map(Some)
            .ok_or_else(|| PsdWebError::Decode(format!("ピクセルバッファの大きさが不正です: {}", self.layer.name)))
    }
}

/// レイヤー矩形とキャンバスの重なり（x, y, width, height）
fn visible_region(bounds: &LayerBounds, canvas_width: u32, canvas_height: u32) -> Option<(u32, u32, u32, u32)> {
    let left = bounds.left.max(0) as i64;
    let top = bounds.top.max(0) as i64;
    let right = i64::from(bounds.right).min(i64::from(canvas_width));
    let bottom = i64::from(bounds.bottom).min(i64::from(canvas_height));

    if right <= left || bottom <= top {
        return None;
    }

    Some((left as u32, top as u32, (right - left) as u32, (bottom - top) as u32))
}
