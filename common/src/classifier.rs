//! レイヤー種別の判定
//!
//! 判定は固定の優先順位で行う（最初に一致したものを採用）:
//! 1. text         テキスト内容を持つ
//! 2. smart_object 埋め込み/リンクされた文書を持つ
//! 3. adjustment   ラスタ内容を持たない調整レイヤー
//! 4. pixel        ラスタ化されたピクセルを直接持つ
//! 5. other        シェイプ・未対応形式・壊れたレイヤー

use crate::types::LayerKind;

/// デコーダから得た判定材料
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindHints {
    pub text: bool,
    pub smart_object: bool,
    pub adjustment: bool,
    pub raster: bool,
}

/// レイヤー種別を判定する
///
/// 同じ入力には常に同じ結果を返す。どの条件にも当てはまらなければ `Other`。
pub fn classify(hints: &KindHints) -> LayerKind {
    if hints.text {
        LayerKind::Text
    } else if hints.smart_object {
        LayerKind::SmartObject
    } else if hints.adjustment {
        LayerKind::Adjustment
    } else if hints.raster {
        LayerKind::Pixel
    } else {
        LayerKind::Other
    }
}
