//! 書き出しパイプライン
//!
//! レイヤーを走査順に1件ずつ処理する:
//!
//! 1. 表示判定（非表示かつ対象外ならスキップ）
//! 2. 種別判定
//! 3. 種別ごとの処理（テキスト描画 / スマートオブジェクト / 調整レイヤーはスキップ / ラスタライズ）
//! 4. 画像を保存できたら書き出し番号を確定してレコードを追加
//!
//! 1レイヤーの失敗はスキップとして記録し、残りの処理は続ける。

pub mod attributes;
pub mod sink;

pub use attributes::{extract, LayerAttributes};
pub use sink::{AssetSink, PngDirectorySink};

use crate::document::LayerHandle;
use crate::error::Result;
use crate::raster::TextRasterizer;
use indicatif::{ProgressBar, ProgressStyle};
use psd_web_common::{
    classify, naming, LayerDiagnostic, LayerKind, LayerRecord, PipelineStatistics, SkipReason,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// 非表示レイヤーも書き出す
    pub include_invisible: bool,
    /// スマートオブジェクトを展開する（未対応のためスキップになる）
    pub expand_smart_objects: bool,
}

/// 1回の実行結果
#[derive(Debug, Clone, Default)]
pub struct ExportOutcome {
    pub records: Vec<LayerRecord>,
    pub statistics: PipelineStatistics,
    pub diagnostics: Vec<LayerDiagnostic>,
}

enum Step {
    Exported(Box<LayerRecord>),
    Skipped {
        kind: Option<LayerKind>,
        reason: SkipReason,
        detail: Option<String>,
    },
}

impl Step {
    fn skipped(kind: Option<LayerKind>, reason: SkipReason) -> Self {
        Step::Skipped {
            kind,
            reason,
            detail: None,
        }
    }
}

pub struct Pipeline {
    options: ExportOptions,
    text: TextRasterizer,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(options: ExportOptions, text: TextRasterizer) -> Self {
        Self {
            options,
            text,
            show_progress: false,
        }
    }

    /// 端末に進捗バーを出す
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn options(&self) -> ExportOptions {
        self.options
    }

    /// 全レイヤーを走査順に処理する
    pub fn run<L: LayerHandle>(&self, layers: &[L], sink: &mut dyn AssetSink) -> ExportOutcome {
        let progress = self.progress_bar(layers.len());
        let mut outcome = ExportOutcome::default();

        for (traversal_index, layer) in layers.iter().enumerate() {
            if let Some(pb) = &progress {
                pb.set_message(layer.name().to_string());
            }

            let export_index = outcome.records.len();
            let step = self
                .process(layer, traversal_index, export_index, sink)
                .unwrap_or_else(|e| {
                    tracing::warn!("レイヤー #{} '{}' の処理に失敗: {}", traversal_index, layer.name(), e);
                    Step::Skipped {
                        kind: Some(classify(&layer.hints())),
                        reason: SkipReason::Failed,
                        detail: Some(e.to_string()),
                    }
                });

            match step {
                Step::Exported(record) => {
                    tracing::debug!(
                        "書き出し #{} {} ({}) -> {}",
                        record.export_index,
                        record.source_name,
                        record.kind,
                        record.asset_relative_path
                    );
                    outcome.statistics.record_export(record.kind);
                    outcome.records.push(*record);
                }
                Step::Skipped { kind, reason, detail } => {
                    if reason.is_policy() {
                        tracing::info!("スキップ #{} '{}': {}", traversal_index, layer.name(), reason);
                    } else {
                        tracing::debug!("スキップ #{} '{}': {}", traversal_index, layer.name(), reason);
                    }
                    outcome.statistics.record_skip(reason);
                    outcome.diagnostics.push(LayerDiagnostic {
                        traversal_index,
                        name: layer.name().to_string(),
                        kind,
                        reason,
                        detail,
                    });
                }
            }

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        outcome
    }

    fn process<L: LayerHandle + ?Sized>(
        &self,
        layer: &L,
        traversal_index: usize,
        export_index: usize,
        sink: &mut dyn AssetSink,
    ) -> Result<Step> {
        let attrs = extract(layer);

        if !attrs.visible && !self.options.include_invisible {
            return Ok(Step::skipped(None, SkipReason::Hidden));
        }

        let kind = classify(&layer.hints());

        let image = match kind {
            LayerKind::Text => self.text.rasterize(layer)?,
            LayerKind::SmartObject if self.options.expand_smart_objects => {
                return Ok(Step::Skipped {
                    kind: Some(kind),
                    reason: SkipReason::SmartObjectExpansionUnsupported,
                    detail: Some("スマートオブジェクトの展開は未対応です".to_string()),
                });
            }
            LayerKind::Adjustment => return Ok(Step::skipped(Some(kind), SkipReason::Adjustment)),
            LayerKind::SmartObject | LayerKind::Pixel | LayerKind::Other => layer.rasterize()?,
        };

        let Some(image) = image.filter(|img| img.width() > 0 && img.height() > 0) else {
            return Ok(Step::skipped(Some(kind), SkipReason::EmptyRaster));
        };

        let asset_filename = naming::resolve(layer.name(), export_index);
        let asset_relative_path = naming::relative_path(&asset_filename);

        // 保存に成功してから番号を確定させる
        sink.persist(&asset_relative_path, &image)?;

        let text = match kind {
            LayerKind::Text => Some(attrs.text.unwrap_or_default()),
            _ => None,
        };

        Ok(Step::Exported(Box::new(LayerRecord {
            export_index,
            traversal_index,
            source_name: layer.name().to_string(),
            kind,
            bounding_box: attrs.bounding_box,
            bounds: attrs.bounds,
            opacity: attrs.opacity,
            blend_mode: attrs.blend_mode,
            visible: attrs.visible,
            group_path: layer.group_path().to_vec(),
            text,
            asset_filename,
            asset_relative_path,
        })))
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.show_progress || len == 0 {
            return None;
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template("{spinner} レイヤー {pos}/{len} [{bar:30}] {msg}") {
            pb.set_style(style.progress_chars("=> "));
        }
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PsdWebError;
    use image::{Rgba, RgbaImage};
    use psd_web_common::{KindHints, LayerBounds, TextAttributes};

    #[derive(Default)]
    struct Stub {
        name: String,
        hidden: bool,
        hints: KindHints,
        text: Option<TextAttributes>,
        broken: bool,
    }

    impl LayerHandle for Stub {
        fn name(&self) -> &str {
            &self.name
        }
        fn visible(&self) -> bool {
            !self.hidden
        }
        fn bounds(&self) -> LayerBounds {
            LayerBounds::new(0, 0, 4, 4)
        }
        fn opacity(&self) -> Option<u8> {
            None
        }
        fn blend_mode(&self) -> Option<&str> {
            None
        }
        fn text(&self) -> Option<&TextAttributes> {
            self.text.as_ref()
        }
        fn hints(&self) -> KindHints {
            self.hints
        }
        fn rasterize(&self) -> Result<Option<RgbaImage>> {
            if self.broken {
                return Err(PsdWebError::Decode("broken channel".to_string()));
            }
            Ok(self.hints.raster.then(|| RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]))))
        }
    }

    #[derive(Default)]
    struct Collect(Vec<String>);

    impl AssetSink for Collect {
        fn persist(&mut self, relative_path: &str, _image: &RgbaImage) -> Result<()> {
            self.0.push(relative_path.to_string());
            Ok(())
        }
    }

    fn pixel(name: &str) -> Stub {
        Stub {
            name: name.to_string(),
            hints: KindHints {
                raster: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_smart_object_expansion_skipped() {
        let smart = Stub {
            name: "logo".to_string(),
            hints: KindHints {
                smart_object: true,
                raster: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let layers = vec![smart];

        let expand = Pipeline::new(
            ExportOptions {
                expand_smart_objects: true,
                ..Default::default()
            },
            TextRasterizer::default(),
        );
        let outcome = expand.run(&layers, &mut Collect::default());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.diagnostics[0].reason, SkipReason::SmartObjectExpansionUnsupported);
        assert_eq!(outcome.diagnostics[0].kind, Some(LayerKind::SmartObject));

        let flatten = Pipeline::new(ExportOptions::default(), TextRasterizer::default());
        let outcome = flatten.run(&layers, &mut Collect::default());
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].kind, LayerKind::SmartObject);
        assert_eq!(outcome.statistics.smart_object_exported, 1);
    }

    #[test]
    fn test_decode_error_becomes_failed_skip() {
        let mut broken = pixel("broken");
        broken.broken = true;
        let layers = vec![broken, pixel("ok")];

        let pipeline = Pipeline::new(ExportOptions::default(), TextRasterizer::default());
        let mut sink = Collect::default();
        let outcome = pipeline.run(&layers, &mut sink);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].export_index, 0);
        assert_eq!(outcome.records[0].traversal_index, 1);
        assert_eq!(outcome.statistics.skipped_failed, 1);
        assert_eq!(outcome.diagnostics[0].kind, Some(LayerKind::Pixel));
        assert!(outcome.diagnostics[0].detail.as_deref().unwrap_or("").contains("broken channel"));
        assert_eq!(sink.0, vec!["images/000_ok.png".to_string()]);
    }

    #[test]
    fn test_text_without_preview_or_font_is_empty() {
        let text = Stub {
            name: "title".to_string(),
            hints: KindHints {
                text: true,
                ..Default::default()
            },
            text: Some(TextAttributes::new("Hello")),
            ..Default::default()
        };

        let pipeline = Pipeline::new(ExportOptions::default(), TextRasterizer::default());
        let outcome = pipeline.run(&[text], &mut Collect::default());

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.statistics.skipped_empty, 1);
    }

    #[test]
    fn test_hidden_skip_has_no_kind() {
        let mut hidden = pixel("hidden");
        hidden.hidden = true;

        let pipeline = Pipeline::new(ExportOptions::default(), TextRasterizer::default());
        let outcome = pipeline.run(&[hidden], &mut Collect::default());

        assert_eq!(outcome.diagnostics[0].reason, SkipReason::Hidden);
        assert_eq!(outcome.diagnostics[0].kind, None);
    }
}
