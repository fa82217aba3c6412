//! レイヤーレコード部の読み取り
//!
//! ピクセルのデコードは `psd` クレートに任せ、ここではデコーダが公開しない
//! 情報だけを読む:
//! - Unicode レイヤー名 (`luni`)
//! - グループ区切り (`lsct` / `lsdk`)
//! - テキスト (`TySh`)、スマートオブジェクト、調整レイヤー、シェイプ/塗りつぶしの目印

use super::text;
use crate::error::{PsdWebError, Result};
use byteorder::{BigEndian, ReadBytesExt};
use psd_web_common::{KindHints, LayerBounds, TextAttributes};
use std::io::{self, Cursor, Read};

const SIGNATURE: &[u8; 4] = b"8BPS";

const SMART_OBJECT_KEYS: &[&[u8; 4]] = &[b"SoLd", b"SoLE", b"PlLd", b"plLd"];

const ADJUSTMENT_KEYS: &[&[u8; 4]] = &[
    b"levl", b"curv", b"brit", b"blnc", b"blwh", b"hue ", b"hue2", b"selc", b"mixr", b"grdm",
    b"phfl", b"expA", b"vibA", b"clrL", b"nvrt", b"post", b"thrs",
];

/// シェイプ（ベクトル）と塗りつぶしレイヤー
const VECTOR_KEYS: &[&[u8; 4]] = &[b"vmsk", b"vsms", b"vscg", b"SoCo", b"GdFl", b"PtFl"];

/// ファイルヘッダ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsdHeader {
    pub version: u16,
    pub channels: u16,
    pub height: u32,
    pub width: u32,
    pub depth: u16,
    pub color_mode: u16,
}

impl PsdHeader {
    pub fn color_mode_name(&self) -> &'static str {
        match self.color_mode {
            0 => "Bitmap",
            1 => "Grayscale",
            2 => "Indexed",
            3 => "RGB",
            4 => "CMYK",
            7 => "Multichannel",
            8 => "Duotone",
            9 => "Lab",
            _ => "Unknown",
        }
    }
}

/// グループを除いたレイヤー1件分
#[derive(Debug, Clone, Default)]
pub struct ScannedLayer {
    /// `luni` があればそれ、なければパスカル文字列の名前
    pub name: String,
    /// レコード本体のパスカル文字列名（デコーダ側との突き合わせ用）
    pub legacy_name: String,
    pub bounds: LayerBounds,
    pub visible: bool,
    /// 0-255
    pub opacity: u8,
    pub blend_key: [u8; 4],
    pub has_pixel_data: bool,
    pub keys: Vec<[u8; 4]>,
    pub text: Option<TextAttributes>,
    pub group_path: Vec<String>,
}

impl ScannedLayer {
    pub fn has_key(&self, key: &[u8; 4]) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    fn has_any(&self, keys: &[&[u8; 4]]) -> bool {
        keys.iter().any(|k| self.has_key(k))
    }

    pub fn is_smart_object(&self) -> bool {
        self.has_any(SMART_OBJECT_KEYS)
    }

    pub fn is_adjustment(&self) -> bool {
        self.has_any(ADJUSTMENT_KEYS)
    }

    pub fn is_vector(&self) -> bool {
        self.has_any(VECTOR_KEYS)
    }

    pub fn hints(&self) -> KindHints {
        KindHints {
            text: self.text.is_some(),
            smart_object: self.is_smart_object(),
            adjustment: self.is_adjustment(),
            raster: self.has_pixel_data && !self.bounds.is_empty() && !self.is_vector(),
        }
    }

    /// 0-100 に換算した不透明度
    pub fn opacity_percent(&self) -> u8 {
        ((u32::from(self.opacity) * 100 + 127) / 255) as u8
    }

    pub fn blend_mode(&self) -> Option<String> {
        if let Some(name) = blend_mode_name(&self.blend_key) {
            return Some(name.to_string());
        }
        let raw = String::from_utf8_lossy(&self.blend_key).trim_matches(|c: char| c == ' ' || c == '\0').to_string();
        if raw.is_empty() {
            None
        } else {
            Some(raw)
        }
    }
}

/// 読み取り結果
#[derive(Debug, Clone)]
pub struct ScannedDocument {
    pub header: PsdHeader,
    /// ファイル順（一番下のレイヤーが先頭）
    pub layers: Vec<ScannedLayer>,
    pub group_count: usize,
}

/// ブレンドモードのキーを名前に変換
pub fn blend_mode_name(key: &[u8; 4]) -> Option<&'static str> {
    let name = match key {
        b"norm" => "normal",
        b"pass" => "pass_through",
        b"diss" => "dissolve",
        b"dark" => "darken",
        b"mul " => "multiply",
        b"idiv" => "color_burn",
        b"lbrn" => "linear_burn",
        b"dkCl" => "darker_color",
        b"lite" => "lighten",
        b"scrn" => "screen",
        b"div " => "color_dodge",
        b"lddg" => "linear_dodge",
        b"lgCl" => "lighter_color",
        b"over" => "overlay",
        b"sLit" => "soft_light",
        b"hLit" => "hard_light",
        b"vLit" => "vivid_light",
        b"lLit" => "linear_light",
        b"pLit" => "pin_light",
        b"hMix" => "hard_mix",
        b"diff" => "difference",
        b"smud" => "exclusion",
        b"fsub" => "subtract",
        b"fdiv" => "divide",
        b"hue " => "hue",
        b"sat " => "saturation",
        b"colr" => "color",
        b"lum " => "luminosity",
        _ => return None,
    };
    Some(name)
}

/// ビッグエンディアンの読み取り位置
struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

fn truncated(e: io::Error) -> PsdWebError {
    PsdWebError::Decode(format!("データが途中で終わっています: {}", e))
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    fn data(&self) -> &'a [u8] {
        *self.cursor.get_ref()
    }

    fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let data = self.data();
        let pos = self.position();
        let end = pos.checked_add(n).filter(|&end| end <= data.len()).ok_or_else(|| {
            PsdWebError::Decode(format!("データが途中で終わっています (offset {})", pos))
        })?;
        self.cursor.set_position(end as u64);
        Ok(&data[pos..end])
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn peek(&self, n: usize) -> Option<&'a [u8]> {
        let pos = self.position();
        self.data().get(pos..pos.checked_add(n)?)
    }

    fn u8(&mut self) -> Result<u8> {
        self.cursor.read_u8().map_err(truncated)
    }

    fn u16(&mut self) -> Result<u16> {
        self.cursor.read_u16::<BigEndian>().map_err(truncated)
    }

    fn i16(&mut self) -> Result<i16> {
        self.cursor.read_i16::<BigEndian>().map_err(truncated)
    }

    fn u32(&mut self) -> Result<u32> {
        self.cursor.read_u32::<BigEndian>().map_err(truncated)
    }

    fn i32(&mut self) -> Result<i32> {
        self.cursor.read_i32::<BigEndian>().map_err(truncated)
    }

    fn key(&mut self) -> Result<[u8; 4]> {
        let mut key = [0u8; 4];
        self.cursor.read_exact(&mut key).map_err(truncated)?;
        Ok(key)
    }

    fn length_block(&mut self) -> Result<&'a [u8]> {
        let len = self.u32()? as usize;
        self.take(len)
    }
}

/// ヘッダを読む
pub fn parse_header(bytes: &[u8]) -> Result<PsdHeader> {
    let mut r = Reader::new(bytes);
    parse_header_from(&mut r)
}

fn parse_header_from(r: &mut Reader<'_>) -> Result<PsdHeader> {
    let signature = r.take(4).map_err(|_| PsdWebError::Decode("PSDヘッダが短すぎます".into()))?;
    if signature != SIGNATURE {
        return Err(PsdWebError::Decode("PSDファイルではありません（シグネチャ不一致）".into()));
    }

    let version = r.u16()?;
    if version != 1 {
        return Err(PsdWebError::Decode(format!("未対応のバージョンです: {} (PSBは未対応)", version)));
    }

    r.skip(6)?;
    Ok(PsdHeader {
        version,
        channels: r.u16()?,
        height: r.u32()?,
        width: r.u32()?,
        depth: r.u16()?,
        color_mode: r.u16()?,
    })
}

/// 区切りレコードの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Divider {
    /// グループの開始（open / closed folder）
    GroupStart,
    /// グループの終端（"</Layer group>"）
    GroupEnd,
}

struct RawRecord {
    layer: ScannedLayer,
    divider: Option<Divider>,
}

/// ファイル全体を読み、レイヤー一覧を返す
pub fn scan(bytes: &[u8]) -> Result<ScannedDocument> {
    let mut r = Reader::new(bytes);
    let header = parse_header_from(&mut r)?;

    // カラーモードデータ、画像リソース
    r.length_block()?;
    r.length_block()?;

    let records = read_layer_records(&mut r)?;
    let (layers, group_count) = flatten_groups(records);

    Ok(ScannedDocument {
        header,
        layers,
        group_count,
    })
}

fn read_layer_records(r: &mut Reader<'_>) -> Result<Vec<RawRecord>> {
    let section_len = r.u32()? as usize;
    if section_len == 0 {
        return Ok(Vec::new());
    }

    let info_len = r.u32()? as usize;
    if info_len == 0 {
        return Ok(Vec::new());
    }

    // 負の値は先頭のアルファが合成画像の透明度であることを示すだけ
    let count = r.i16()?.unsigned_abs() as usize;
    let mut records = Vec::with_capacity(count);
    for index in 0..count {
        let record = read_record(r).map_err(|e| match e {
            PsdWebError::Decode(msg) => PsdWebError::Decode(format!("レイヤーレコード {}: {}", index, msg)),
            other => other,
        })?;
        records.push(record);
    }

    Ok(records)
}

fn read_record(r: &mut Reader<'_>) -> Result<RawRecord> {
    let top = r.i32()?;
    let left = r.i32()?;
    let bottom = r.i32()?;
    let right = r.i32()?;

    let channels = r.u16()? as usize;
    let mut channel_bytes: u64 = 0;
    for _ in 0..channels {
        let _id = r.i16()?;
        channel_bytes += u64::from(r.u32()?);
    }

    let blend_sig = r.take(4)?;
    if blend_sig != b"8BIM" {
        return Err(PsdWebError::Decode("ブレンドモードのシグネチャが不正です".into()));
    }
    let blend_key = r.key()?;
    let opacity = r.u8()?;
    let _clipping = r.u8()?;
    let flags = r.u8()?;
    let _filler = r.u8()?;

    let extra = r.length_block()?;
    let mut extra_reader = Reader::new(extra);
    extra_reader.length_block()?; // レイヤーマスク
    extra_reader.length_block()?; // ブレンド範囲

    let name_len = extra_reader.u8()? as usize;
    let legacy_name = String::from_utf8_lossy(extra_reader.take(name_len)?).to_string();
    let padded = (name_len + 1 + 3) / 4 * 4;
    extra_reader.skip(padded - (name_len + 1))?;

    let mut layer = ScannedLayer {
        name: legacy_name.clone(),
        legacy_name,
        bounds: LayerBounds::new(left, top, right, bottom),
        // bit 1 が立っていれば非表示
        visible: flags & 0x02 == 0,
        opacity,
        blend_key,
        // 各チャンネルは2バイトの圧縮方式を必ず持つ
        has_pixel_data: channel_bytes > 2 * channels as u64,
        ..Default::default()
    };
    let mut divider = None;

    read_tagged_blocks(&mut extra_reader, |key, data| {
        match &key {
            b"luni" => {
                if let Some(name) = text::read_unicode_string(data) {
                    if !name.is_empty() {
                        layer.name = name;
                    }
                }
            }
            b"lsct" | b"lsdk" => {
                if let Ok(kind) = Cursor::new(data).read_u32::<BigEndian>() {
                    divider = match kind {
                        1 | 2 => Some(Divider::GroupStart),
                        3 => Some(Divider::GroupEnd),
                        _ => divider,
                    };
                }
            }
            b"TySh" => {
                layer.text = Some(text::parse_type_tool(data));
            }
            _ => {}
        }
        layer.keys.push(key);
    })?;

    Ok(RawRecord { layer, divider })
}

/// 追加レイヤー情報（タグ付きブロック）を順に読む
fn read_tagged_blocks<F>(r: &mut Reader<'_>, mut visit: F) -> Result<()>
where
    F: FnMut([u8; 4], &[u8]),
{
    while let Some(sig) = r.peek(4) {
        if sig != b"8BIM" && sig != b"8B64" {
            break;
        }
        r.skip(4)?;
        let key = r.key()?;
        let data = r.length_block()?;
        visit(key, data);

        // 長さが奇数・4の倍数に揃えられたブロックの詰め物を飛ばす
        let mut padding = 0;
        while padding < 3 {
            match r.peek(4) {
                Some(next) if next == b"8BIM" || next == b"8B64" => break,
                Some(_) => {
                    r.skip(1)?;
                    padding += 1;
                }
                None => break,
            }
        }
    }
    Ok(())
}

/// グループ区切りを取り除き、各レイヤーに所属グループのパスを付ける
///
/// ファイル順では終端 → 子 → 開始 の順に並ぶため、逆順に走査する。
fn flatten_groups(records: Vec<RawRecord>) -> (Vec<ScannedLayer>, usize) {
    let mut stack: Vec<String> = Vec::new();
    let mut layers = Vec::new();
    let mut group_count = 0;

    for record in records.into_iter().rev() {
        match record.divider {
            Some(Divider::GroupStart) => {
                group_count += 1;
                stack.push(record.layer.name);
            }
            Some(Divider::GroupEnd) => {
                stack.pop();
            }
            None => {
                let mut layer = record.layer;
                layer.group_path = stack.clone();
                layers.push(layer);
            }
        }
    }

    layers.reverse();
    (layers, group_count)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! テスト用のPSDバイト列ビルダー
    //!
    //! 各レイヤーは無圧縮（raw）の単色チャンネルデータを持ち、
    //! 末尾に無圧縮の合成画像セクションを付ける。

    /// チャンネルID（透明度, R, G, B）と `fill` の添字
    const CHANNELS: [(i16, usize); 4] = [(-1, 3), (0, 0), (1, 1), (2, 2)];

    pub struct RecordSpec {
        pub name: &'static str,
        pub unicode_name: Option<&'static str>,
        pub rect: (i32, i32, i32, i32), // top, left, bottom, right
        pub hidden: bool,
        pub opacity: u8,
        pub blend: &'static [u8; 4],
        /// RGBA の塗り色
        pub fill: [u8; 4],
        /// false ならチャンネルは圧縮方式の2バイトだけ
        pub has_pixels: bool,
        pub blocks: Vec<([u8; 4], Vec<u8>)>,
    }

    impl RecordSpec {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                unicode_name: None,
                rect: (0, 0, 10, 10),
                hidden: false,
                opacity: 255,
                blend: b"norm",
                fill: [128, 128, 128, 255],
                has_pixels: true,
                blocks: Vec::new(),
            }
        }

        pub fn block(mut self, key: &[u8; 4], data: Vec<u8>) -> Self {
            self.blocks.push((*key, data));
            self
        }

        /// 1/2: グループ開始、3: グループ終端
        pub fn divider(mut self, kind: u32) -> Self {
            self.rect = (0, 0, 0, 0);
            self.has_pixels = false;
            self.block(b"lsct", kind.to_be_bytes().to_vec())
        }

        pub fn at(mut self, top: i32, left: i32, bottom: i32, right: i32) -> Self {
            self.rect = (top, left, bottom, right);
            self
        }

        pub fn filled(mut self, rgba: [u8; 4]) -> Self {
            self.fill = rgba;
            self
        }

        fn pixel_count(&self) -> usize {
            let (top, left, bottom, right) = self.rect;
            if !self.has_pixels || bottom <= top || right <= left {
                return 0;
            }
            ((bottom - top) * (right - left)) as usize
        }
    }

    pub fn unicode_block(s: &str) -> Vec<u8> {
        let units: Vec<u16> = s.encode_utf16().collect();
        let mut out = (units.len() as u32).to_be_bytes().to_vec();
        for u in units {
            out.extend_from_slice(&u.to_be_bytes());
        }
        out
    }

    fn record_bytes(spec: &RecordSpec) -> Vec<u8> {
        let mut out = Vec::new();
        let (top, left, bottom, right) = spec.rect;
        for v in [top, left, bottom, right] {
            out.extend_from_slice(&v.to_be_bytes());
        }
        out.extend_from_slice(&(CHANNELS.len() as u16).to_be_bytes());
        let channel_len = 2 + spec.pixel_count() as u32;
        for (id, _) in CHANNELS {
            out.extend_from_slice(&id.to_be_bytes());
            out.extend_from_slice(&channel_len.to_be_bytes());
        }
        out.extend_from_slice(b"8BIM");
        out.extend_from_slice(spec.blend);
        out.push(spec.opacity);
        out.push(0);
        out.push(if spec.hidden { 0x02 } else { 0x00 });
        out.push(0);

        let mut extra = Vec::new();
        extra.extend_from_slice(&0u32.to_be_bytes());
        extra.extend_from_slice(&0u32.to_be_bytes());
        let name = spec.name.as_bytes();
        extra.push(name.len() as u8);
        extra.extend_from_slice(name);
        while extra.len() % 4 != 0 {
            extra.push(0);
        }

        let mut blocks = spec.blocks.clone();
        if let Some(u) = spec.unicode_name {
            blocks.insert(0, (*b"luni", unicode_block(u)));
        }
        for (key, mut data) in blocks {
            // 長さは偶数に揃え、詰め物も長さに含める
            if data.len() % 2 == 1 {
                data.push(0);
            }
            extra.extend_from_slice(b"8BIM");
            extra.extend_from_slice(&key);
            extra.extend_from_slice(&(data.len() as u32).to_be_bytes());
            extra.extend_from_slice(&data);
        }

        out.extend_from_slice(&(extra.len() as u32).to_be_bytes());
        out.extend_from_slice(&extra);
        out
    }

    fn channel_bytes(spec: &RecordSpec) -> Vec<u8> {
        let count = spec.pixel_count();
        let mut out = Vec::new();
        for (_, component) in CHANNELS {
            out.extend_from_slice(&0u16.to_be_bytes());
            out.extend(std::iter::repeat(spec.fill[component]).take(count));
        }
        out
    }

    /// ヘッダ + 空のカラーモード/リソース + レイヤー情報 + 合成画像（RGBA 8bit）
    pub fn build(width: u32, height: u32, records: &[RecordSpec]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"8BPS");
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&[0u8; 6]);
        out.extend_from_slice(&4u16.to_be_bytes());
        out.extend_from_slice(&height.to_be_bytes());
        out.extend_from_slice(&width.to_be_bytes());
        out.extend_from_slice(&8u16.to_be_bytes());
        out.extend_from_slice(&3u16.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());

        if records.is_empty() {
            out.extend_from_slice(&0u32.to_be_bytes());
        } else {
            let mut info = Vec::new();
            info.extend_from_slice(&(records.len() as i16).to_be_bytes());
            for spec in records {
                info.extend_from_slice(&record_bytes(spec));
            }
            for spec in records {
                info.extend_from_slice(&channel_bytes(spec));
            }
            if info.len() % 2 == 1 {
                info.push(0);
            }

            let mut section = Vec::new();
            section.extend_from_slice(&(info.len() as u32).to_be_bytes());
            section.extend_from_slice(&info);
            // グローバルレイヤーマスク（なし）
            section.extend_from_slice(&0u32.to_be_bytes());

            out.extend_from_slice(&(section.len() as u32).to_be_bytes());
            out.extend_from_slice(&section);
        }

        // 合成画像: 無圧縮、全チャンネル0
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend(std::iter::repeat(0u8).take((width * height * 4) as usize));
        out
    }
}
