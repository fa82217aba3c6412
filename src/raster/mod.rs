//! テキストレイヤーのラスタライズ
//!
//! 1. レイヤー自身のプレビューピクセルを使う
//! 2. 空なら、本文とフォントがあれば描画する
//! 3. どちらもなければ None（エラーではない）

pub mod font;

pub use font::FontStore;

use crate::document::LayerHandle;
use crate::error::Result;
use image::RgbaImage;
use psd_web_common::BoundingBox;

pub struct TextRasterizer {
    fonts: FontStore,
}

impl TextRasterizer {
    pub fn new(fonts: FontStore) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontStore {
        &self.fonts
    }

    pub fn rasterize<L: LayerHandle + ?Sized>(&self, layer: &L) -> Result<Option<RgbaImage>> {
        if let Some(preview) = layer.rasterize()? {
            return Ok(Some(preview));
        }

        let Some(attrs) = layer.text().filter(|t| t.has_content()) else {
            return Ok(None);
        };
        let Some(font) = self.fonts.font() else {
            tracing::debug!("フォントがないため描画できません: {}", layer.name());
            return Ok(None);
        };

        let bounds = layer.bounds();
        let canvas = if bounds.is_empty() {
            None
        } else {
            let bbox = BoundingBox::from_bounds(&bounds);
            Some((bbox.width, bbox.height))
        };

        Ok(font::render_text(font, attrs, canvas))
    }
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::new(FontStore::none())
    }
}
