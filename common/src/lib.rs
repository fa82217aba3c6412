//! PSD Web Extract Common Library
//!
//! 抽出パイプラインと出力モジュールで共有される型と判定ロジック

pub mod types;
pub mod classifier;
pub mod naming;

pub use types::{
    BoundingBox, DocumentInfo, DocumentSummary, ExportConfig, LayerBounds, LayerDiagnostic,
    LayerKind, LayerRecord, PipelineStatistics, SkipReason, TextAlignment, TextAttributes,
};
pub use classifier::{classify, KindHints};
