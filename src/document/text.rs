//! テキストレイヤー (`TySh`) の読み取り
//!
//! 記述子を完全には解析せず、必要な項目だけを拾う:
//! - `Txt ` 項目の Unicode 文字列（本文）
//! - EngineData の `/FontSize`、`/FillColor`、`/Justification`

use byteorder::{BigEndian, ReadBytesExt};
use lazy_static::lazy_static;
use psd_web_common::{TextAlignment, TextAttributes};
use regex::bytes::Regex;
use std::io::Cursor;

const TEXT_ITEM_MARKER: &[u8] = b"Txt TEXT";

lazy_static! {
    static ref FONT_SIZE_RE: Regex = Regex::new(r"/FontSize\s+([0-9]+(?:\.[0-9]+)?)").unwrap();
    static ref FILL_COLOR_RE: Regex = Regex::new(
        r"/FillColor\s*<<\s*/Type\s+1\s*/Values\s*\[\s*([0-9.]+)\s+([0-9.]+)\s+([0-9.]+)\s+([0-9.]+)\s*\]"
    )
    .unwrap();
    static ref JUSTIFICATION_RE: Regex = Regex::new(r"/Justification\s+([0-9])").unwrap();
}

/// `u32 文字数 + UTF-16BE` 形式の文字列を読む（末尾のNULは除く）
pub fn read_unicode_string(data: &[u8]) -> Option<String> {
    let mut cursor = Cursor::new(data);
    let count = cursor.read_u32::<BigEndian>().ok()? as usize;
    if data.len().saturating_sub(4) < count.checked_mul(2)? {
        return None;
    }

    let units = (0..count)
        .map(|_| cursor.read_u16::<BigEndian>())
        .collect::<std::io::Result<Vec<u16>>>()
        .ok()?;
    Some(String::from_utf16_lossy(&units).trim_end_matches('\0').to_string())
}

/// `TySh` ブロックからテキスト属性を取り出す
///
/// 本文が見つからなくてもテキストレイヤーであることに変わりはないので、
/// 空の本文で返す。
pub fn parse_type_tool(data: &[u8]) -> TextAttributes {
    let content = find_text_item(data)
        .map(|s| s.replace("\r\n", "\n").replace('\r', "\n"))
        .unwrap_or_default();

    TextAttributes {
        content: content.trim_end_matches('\n').to_string(),
        font_size: font_size(data),
        color: fill_color(data),
        alignment: justification(data),
    }
}

fn find_text_item(data: &[u8]) -> Option<String> {
    let start = data
        .windows(TEXT_ITEM_MARKER.len())
        .position(|w| w == TEXT_ITEM_MARKER)?;
    read_unicode_string(&data[start + TEXT_ITEM_MARKER.len()..])
}

fn capture_f32(caps: &regex::bytes::Captures<'_>, i: usize) -> Option<f32> {
    std::str::from_utf8(caps.get(i)?.as_bytes()).ok()?.parse().ok()
}

fn font_size(data: &[u8]) -> Option<f32> {
    let caps = FONT_SIZE_RE.captures(data)?;
    capture_f32(&caps, 1).filter(|size| *size > 0.0)
}

/// `[A R G B]`（0.0-1.0）を `#rrggbb` に変換
fn fill_color(data: &[u8]) -> Option<String> {
    let caps = FILL_COLOR_RE.captures(data)?;
    let channel = |i| capture_f32(&caps, i).map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
    Some(format!("#{:02x}{:02x}{:02x}", channel(2)?, channel(3)?, channel(4)?))
}

fn justification(data: &[u8]) -> Option<TextAlignment> {
    let caps = JUSTIFICATION_RE.captures(data)?;
    let value = std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?.parse().ok()?;
    TextAlignment::from_justification(value)
}

#[cfg(test)]
pub(crate) fn type_tool_block(content: &str, engine_data: &str) -> Vec<u8> {
    // バージョン・変換行列などの前置部分はダミー
    let mut data = vec![0u8; 2 + 48 + 2 + 4];
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(TEXT_ITEM_MARKER);
    let with_nul = format!("{}\0", content);
    data.extend_from_slice(&super::records::test_support::unicode_block(&with_nul));
    data.extend_from_slice(b"EngineDatatdta");
    data.extend_from_slice(engine_data.as_bytes());
    data
}
