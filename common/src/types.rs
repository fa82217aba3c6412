//! レイヤー抽出結果の型定義
//!
//! CLIと出力モジュールで共有される型:
//! - LayerRecord: 書き出したレイヤー1件分の正規化済みレコード
//! - PipelineStatistics: 1回の実行で集計される件数
//! - DocumentInfo / DocumentSummary: PSD文書そのものの情報

use serde::{Deserialize, Serialize};

/// レイヤーの意味的な種別（閉じた集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Text,
    SmartObject,
    Adjustment,
    Pixel,
    Other,
}

impl LayerKind {
    /// 出力ファイル・ログで使う識別子
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Text => "text",
            LayerKind::SmartObject => "smart_object",
            LayerKind::Adjustment => "adjustment",
            LayerKind::Pixel => "pixel",
            LayerKind::Other => "other",
        }
    }

    /// 表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::Text => "テキスト",
            LayerKind::SmartObject => "スマートオブジェクト",
            LayerKind::Adjustment => "調整レイヤー",
            LayerKind::Pixel => "画像",
            LayerKind::Other => "その他",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PSD内部の矩形（left, top, right, bottom）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl LayerBounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// 幅・高さのどちらかが0以下
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

/// 文書座標系（左上原点）での配置
///
/// `width` と `height` は常に1以上。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// 元の矩形から生成（幅・高さは最小1に丸める）
    pub fn from_bounds(bounds: &LayerBounds) -> Self {
        let width = (i64::from(bounds.right) - i64::from(bounds.left)).max(1);
        let height = (i64::from(bounds.bottom) - i64::from(bounds.top)).max(1);
        Self {
            x: bounds.left,
            y: bounds.top,
            width: u32::try_from(width).unwrap_or(u32::MAX),
            height: u32::try_from(height).unwrap_or(u32::MAX),
        }
    }

    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }
}

/// テキストの揃え
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Left,
    Right,
    Center,
    Justify,
}

impl TextAlignment {
    /// EngineDataの Justification 値から変換
    pub fn from_justification(value: u8) -> Option<Self> {
        match value {
            0 => Some(TextAlignment::Left),
            1 => Some(TextAlignment::Right),
            2 => Some(TextAlignment::Center),
            3..=6 => Some(TextAlignment::Justify),
            _ => None,
        }
    }

    pub fn as_css(&self) -> &'static str {
        match self {
            TextAlignment::Left => "left",
            TextAlignment::Right => "right",
            TextAlignment::Center => "center",
            TextAlignment::Justify => "justify",
        }
    }
}

/// テキストレイヤー専用の属性
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextAttributes {
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,

    /// `#rrggbb`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,
}

impl TextAttributes {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// 描画できる文字があるか
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// 書き出したレイヤー1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    /// 書き出し済みレイヤーだけに振る0始まりの連番（重なり順）
    pub export_index: usize,

    /// 走査順での位置（スキップしたレイヤーも数える）
    pub traversal_index: usize,

    pub source_name: String,

    pub kind: LayerKind,

    pub bounding_box: BoundingBox,

    /// PSD上の元の矩形
    pub bounds: LayerBounds,

    /// 0-100
    pub opacity: u8,

    pub blend_mode: String,

    pub visible: bool,

    /// 外側から順に並べたグループ名
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_path: Vec<String>,

    /// kind == text のときだけ存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextAttributes>,

    pub asset_filename: String,

    pub asset_relative_path: String,
}

impl LayerRecord {
    /// テキスト内容（テキストレイヤー以外は空）
    pub fn text_content(&self) -> &str {
        self.text.as_ref().map(|t| t.content.as_str()).unwrap_or("")
    }

    /// CSSの opacity 値（0.00-1.00）
    pub fn css_opacity(&self) -> f32 {
        f32::from(self.opacity) / 100.0
    }
}

/// スキップ理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 非表示レイヤー（書き出し対象外の設定）
    Hidden,
    /// 調整レイヤーは書き出さない
    Adjustment,
    /// スマートオブジェクトの展開は未対応
    SmartObjectExpansionUnsupported,
    /// ラスタライズ結果が空
    EmptyRaster,
    /// レイヤー単位のエラー
    Failed,
}

impl SkipReason {
    /// 設定・仕様によるスキップか（エラーではない）
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            SkipReason::Hidden | SkipReason::Adjustment | SkipReason::SmartObjectExpansionUnsupported
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::Hidden => "非表示",
            SkipReason::Adjustment => "調整レイヤー",
            SkipReason::SmartObjectExpansionUnsupported => "スマートオブジェクト展開は未対応",
            SkipReason::EmptyRaster => "画像が空",
            SkipReason::Failed => "エラー",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// スキップしたレイヤーの診断情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDiagnostic {
    pub traversal_index: usize,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<LayerKind>,
    pub reason: SkipReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// 1回の実行の集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStatistics {
    /// 走査したレイヤー数
    pub total: usize,
    pub exported: usize,
    pub text_exported: usize,
    pub pixel_exported: usize,
    pub smart_object_exported: usize,
    pub other_exported: usize,
    pub skipped: usize,
    pub skipped_hidden: usize,
    pub skipped_adjustment: usize,
    pub skipped_smart_object_expansion: usize,
    pub skipped_empty: usize,
    pub skipped_failed: usize,
}

impl PipelineStatistics {
    pub fn record_export(&mut self, kind: LayerKind) {
        self.total += 1;
        self.exported += 1;
        match kind {
            LayerKind::Text => self.text_exported += 1,
            LayerKind::Pixel => self.pixel_exported += 1,
            LayerKind::SmartObject => self.smart_object_exported += 1,
            LayerKind::Other | LayerKind::Adjustment => self.other_exported += 1,
        }
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        self.total += 1;
        self.skipped += 1;
        match reason {
            SkipReason::Hidden => self.skipped_hidden += 1,
            SkipReason::Adjustment => self.skipped_adjustment += 1,
            SkipReason::SmartObjectExpansionUnsupported => self.skipped_smart_object_expansion += 1,
            SkipReason::EmptyRaster => self.skipped_empty += 1,
            SkipReason::Failed => self.skipped_failed += 1,
        }
    }

    /// 種別ごとの書き出し件数
    pub fn exported_of(&self, kind: LayerKind) -> usize {
        match kind {
            LayerKind::Text => self.text_exported,
            LayerKind::Pixel => self.pixel_exported,
            LayerKind::SmartObject => self.smart_object_exported,
            LayerKind::Other => self.other_exported,
            LayerKind::Adjustment => 0,
        }
    }

    /// 理由ごとのスキップ件数
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        match reason {
            SkipReason::Hidden => self.skipped_hidden,
            SkipReason::Adjustment => self.skipped_adjustment,
            SkipReason::SmartObjectExpansionUnsupported => self.skipped_smart_object_expansion,
            SkipReason::EmptyRaster => self.skipped_empty,
            SkipReason::Failed => self.skipped_failed,
        }
    }
}

/// PSD文書の基本情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub width: u32,
    pub height: u32,
    pub color_mode: String,
    pub bit_depth: u16,
}

impl DocumentInfo {
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }
}

/// 書き出し前のレイヤー構成の集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub total_layers: usize,
    pub visible_layers: usize,
    pub text_layers: usize,
    pub smart_objects: usize,
    pub adjustment_layers: usize,
    pub pixel_layers: usize,
    pub shape_layers: usize,
    pub layer_groups: usize,
}

/// メタデータに残す実行設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub include_invisible: bool,
    pub expand_smart_objects: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_clamps_zero_size() {
        let bbox = BoundingBox::from_bounds(&LayerBounds::new(10, 20, 10, 20));
        assert_eq!(bbox.x, 10);
        assert_eq!(bbox.y, 20);
        assert_eq!(bbox.width, 1);
        assert_eq!(bbox.height, 1);
    }

    #[test]
    fn test_bounding_box_inverted_rect() {
        let bbox = BoundingBox::from_bounds(&LayerBounds::new(50, 50, 40, 30));
        assert_eq!(bbox.width, 1);
        assert_eq!(bbox.height, 1);
    }

    #[test]
    fn test_bounding_box_negative_origin() {
        let bbox = BoundingBox::from_bounds(&LayerBounds::new(-5, -10, 15, 30));
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (-5, -10, 20, 40));
        assert_eq!(bbox.right(), 15);
        assert_eq!(bbox.bottom(), 30);
    }

    #[test]
    fn test_layer_kind_serialize() {
        let json = serde_json::to_string(&LayerKind::SmartObject).unwrap();
        assert_eq!(json, "\"smart_object\"");
        assert_eq!(LayerKind::Text.to_string(), "text");
    }

    #[test]
    fn test_statistics_totals() {
        let mut stats = PipelineStatistics::default();
        stats.record_export(LayerKind::Text);
        stats.record_export(LayerKind::Pixel);
        stats.record_skip(SkipReason::Hidden);
        stats.record_skip(SkipReason::Failed);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.exported, 2);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.exported_of(LayerKind::Text), 1);
        assert_eq!(stats.skipped_for(SkipReason::Failed), 1);
        assert_eq!(stats.total, stats.exported + stats.skipped);
    }

    #[test]
    fn test_skip_reason_policy() {
        assert!(SkipReason::Hidden.is_policy());
        assert!(SkipReason::SmartObjectExpansionUnsupported.is_policy());
        assert!(!SkipReason::EmptyRaster.is_policy());
        assert!(!SkipReason::Failed.is_policy());
    }

    #[test]
    fn test_record_without_text_omits_field() {
        let record = LayerRecord {
            export_index: 0,
            traversal_index: 2,
            source_name: "bg".to_string(),
            kind: LayerKind::Pixel,
            bounding_box: BoundingBox::from_bounds(&LayerBounds::new(0, 0, 100, 50)),
            bounds: LayerBounds::new(0, 0, 100, 50),
            opacity: 100,
            blend_mode: "normal".to_string(),
            visible: true,
            group_path: Vec::new(),
            text: None,
            asset_filename: "000_bg.png".to_string(),
            asset_relative_path: "images/000_bg.png".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"text\""));
        assert!(!json.contains("group_path"));
        assert_eq!(record.text_content(), "");
        assert!((record.css_opacity() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_alignment_from_justification() {
        assert_eq!(TextAlignment::from_justification(2), Some(TextAlignment::Center));
        assert_eq!(TextAlignment::from_justification(9), None);
    }
}
