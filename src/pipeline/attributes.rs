//! 配置・属性の取り出し
//!
//! 属性が欠けていてもレイヤー全体を失敗にはせず、既定値で埋める。

use crate::document::LayerHandle;
use psd_web_common::{BoundingBox, LayerBounds, TextAttributes};

pub const DEFAULT_OPACITY: u8 = 100;
pub const DEFAULT_BLEND_MODE: &str = "normal";

#[derive(Debug, Clone, PartialEq)]
pub struct LayerAttributes {
    pub bounding_box: BoundingBox,
    pub bounds: LayerBounds,
    pub opacity: u8,
    pub blend_mode: String,
    /// レイヤー自身のフラグのみ（親グループは見ない）
    pub visible: bool,
    pub text: Option<TextAttributes>,
}

pub fn extract<L: LayerHandle + ?Sized>(layer: &L) -> LayerAttributes {
    let bounds = layer.bounds();

    LayerAttributes {
        bounding_box: BoundingBox::from_bounds(&bounds),
        bounds,
        opacity: layer.opacity().map(|o| o.min(100)).unwrap_or(DEFAULT_OPACITY),
        blend_mode: layer
            .blend_mode()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_BLEND_MODE)
            .to_string(),
        visible: layer.visible(),
        text: layer.text().cloned(),
    }
}
