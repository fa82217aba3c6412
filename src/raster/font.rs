//! フォント読み込みとテキスト描画
//!
//! フォントは起動時に一度だけ決めて読み込む。見つからなくても処理は続け、
//! プレビュー画像を持たないテキストレイヤーが書き出せなくなるだけ。

use crate::error::{PsdWebError, Result};
use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use psd_web_common::TextAttributes;
use std::path::{Path, PathBuf};

pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// 描画キャンバスの上限（一辺）
const MAX_CANVAS_SIDE: u32 = 16_384;

const DEFAULT_COLOR: [u8; 3] = [0, 0, 0];

#[derive(Clone, Default)]
pub struct FontStore {
    path: Option<PathBuf>,
    font: Option<FontArc>,
}

impl FontStore {
    /// フォントなし
    pub fn none() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| PsdWebError::Font(format!("{}: {}", path.display(), e)))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| PsdWebError::Font(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            font: Some(font),
        })
    }

    /// 決定済みのフォントパスから読み込む。失敗してもフォントなしで続行
    pub fn from_resolved(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                Self::none()
            }),
            None => {
                tracing::warn!("テキスト描画用のフォントが見つかりません");
                Self::none()
            }
        }
    }

    pub fn font(&self) -> Option<&FontArc> {
        self.font.as_ref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// `#rrggbb` を解析
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// 行ごとのグリフ配置を計算する（行番号, グリフ）
fn layout_glyphs(font: &FontArc, text: &str, scale: PxScale) -> (Vec<ab_glyph::Glyph>, f32, f32) {
    let scaled = font.as_scaled(scale);
    let line_height = scaled.height() + scaled.line_gap();
    let mut glyphs = Vec::new();
    let mut max_width: f32 = 0.0;
    let mut line_count = 0;

    for (line_no, line) in text.lines().enumerate() {
        line_count = line_no + 1;
        let baseline = scaled.ascent() + line_no as f32 * line_height;
        let mut caret = 0.0;
        let mut prev: Option<GlyphId> = None;

        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, baseline)));
            caret += scaled.h_advance(id);
            prev = Some(id);
        }
        max_width = max_width.max(caret);
    }

    (glyphs, max_width, line_count as f32 * line_height)
}

/// テキストを透明なキャンバスに描画する
///
/// `canvas` が None のときは文字列の大きさに合わせる。
/// 1ピクセルも描かれなければ None。
pub fn render_text(font: &FontArc, attrs: &TextAttributes, canvas: Option<(u32, u32)>) -> Option<RgbaImage> {
    let size = attrs.font_size.filter(|s| *s > 0.0).unwrap_or(DEFAULT_FONT_SIZE);
    let scale = PxScale::from(size);
    let [r, g, b] = attrs
        .color
        .as_deref()
        .and_then(parse_hex_color)
        .unwrap_or(DEFAULT_COLOR);

    let (glyphs, text_width, text_height) = layout_glyphs(font, &attrs.content, scale);
    let (width, height) = canvas.unwrap_or((text_width.ceil() as u32, text_height.ceil() as u32));
    let width = width.clamp(1, MAX_CANVAS_SIDE);
    let height = height.clamp(1, MAX_CANVAS_SIDE);

    let mut image = RgbaImage::new(width, height);
    let mut drawn = false;

    for glyph in glyphs {
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = bounds.min.x as i64 + i64::from(gx);
            let y = bounds.min.y as i64 + i64::from(gy);
            if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                return;
            }
            let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            if alpha == 0 {
                return;
            }
            let pixel = image.get_pixel_mut(x as u32, y as u32);
            if alpha > pixel[3] {
                *pixel = Rgba([r, g, b, alpha]);
            }
            drawn = true;
        });
    }

    drawn.then_some(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff8000"), Some([255, 128, 0]));
        assert_eq!(parse_hex_color("ff8000"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn test_load_missing_font() {
        let err = FontStore::load(Path::new("/nonexistent/font.ttf")).err().unwrap();
        assert!(matches!(err, PsdWebError::Font(_)));
    }

    #[test]
    fn test_load_invalid_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(FontStore::load(&path).is_err());
    }

    #[test]
    fn test_from_resolved_none() {
        let store = FontStore::from_resolved(None);
        assert!(store.font().is_none());
        assert!(store.path().is_none());
    }

    const FIXTURE_FONT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSansMono.ttf");

    fn fixture_font() -> FontArc {
        FontStore::load(Path::new(FIXTURE_FONT)).unwrap().font().unwrap().clone()
    }

    fn text(content: &str, size: f32, color: &str) -> TextAttributes {
        TextAttributes {
            content: content.to_string(),
            font_size: Some(size),
            color: Some(color.to_string()),
            alignment: None,
        }
    }

    #[test]
    fn test_render_uses_requested_color() {
        let image = render_text(&fixture_font(), &text("Hi", 24.0, "#ff0000"), None).unwrap();

        let drawn: Vec<_> = image.pixels().filter(|p| p[3] > 0).collect();
        assert!(!drawn.is_empty());
        assert!(drawn.iter().all(|p| p[0] == 255 && p[1] == 0 && p[2] == 0));
    }

    #[test]
    fn test_render_default_color_is_black() {
        let attrs = TextAttributes::new("A");
        let image = render_text(&fixture_font(), &attrs, None).unwrap();
        assert!(image.pixels().filter(|p| p[3] > 0).all(|p| p[0] == 0 && p[1] == 0 && p[2] == 0));
    }

    #[test]
    fn test_render_multiline_is_taller() {
        let font = fixture_font();
        let one = render_text(&font, &text("A", 20.0, "#000000"), None).unwrap();
        let two = render_text(&font, &text("A\nB", 20.0, "#000000"), None).unwrap();
        assert!(two.height() > one.height());
    }

    #[test]
    fn test_render_into_fixed_canvas() {
        let image = render_text(&fixture_font(), &text("Title", 10.0, "#0000ff"), Some((40, 12))).unwrap();
        assert_eq!(image.dimensions(), (40, 12));
    }
}
