//! 1ファイル分の書き出し処理
//!
//! 文書を開く → パイプライン → メタデータ出力 の順に進める。
//! 文書を開けなければその時点でエラーを返す。それ以外の失敗は
//! スキップや警告として結果に含める。

use crate::document::Document;
use crate::error::Result;
use crate::export::{self, EmitterKind, ExportReport};
use crate::pipeline::{ExportOptions, Pipeline, PngDirectorySink};
use crate::raster::{FontStore, TextRasterizer};
use chrono::Local;
use psd_web_common::{naming::IMAGES_DIR, ExportConfig, LayerKind, LayerRecord, PipelineStatistics, SkipReason};
use std::path::{Path, PathBuf};

/// 書き出し1件分の指定
#[derive(Debug, Clone)]
pub struct ExtractJob {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub options: ExportOptions,
    pub emitters: Vec<EmitterKind>,
    pub show_progress: bool,
}

#[derive(Debug, Clone)]
pub struct JobResult {
    pub output_dir: PathBuf,
    pub records: Vec<LayerRecord>,
    pub statistics: PipelineStatistics,
    pub written: Vec<PathBuf>,
}

/// `design.psd` -> `web_design`
pub fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "psd".to_string());
    PathBuf::from(format!("web_{}", stem))
}

pub fn run_job(job: &ExtractJob, fonts: &FontStore) -> Result<JobResult> {
    println!("[1/3] PSDを読み込み中... {}", job.input.display());
    let document = Document::open(&job.input)?;
    let info = document.info();
    let summary = document.summary();
    println!(
        "✔ {}×{}px ({}, {}bit) / レイヤー {}個\n",
        info.width, info.height, info.color_mode, info.bit_depth, summary.total_layers
    );

    println!("[2/3] レイヤーを書き出し中...");
    let layers = document.layers();
    let mut sink = PngDirectorySink::new(&job.output_dir)?;
    let pipeline = Pipeline::new(job.options, TextRasterizer::new(fonts.clone())).with_progress(job.show_progress);
    let outcome = pipeline.run(&layers, &mut sink);
    println!(
        "✔ {}個を書き出し（スキップ {}個）\n",
        outcome.statistics.exported, outcome.statistics.skipped
    );

    println!("[3/3] メタデータを出力中...");
    let source_sha256 = match export::sha256_file(&job.input) {
        Ok(sha) => Some(sha),
        Err(e) => {
            tracing::warn!("チェックサムを計算できません: {}", e);
            None
        }
    };
    let output_dir = job
        .output_dir
        .canonicalize()
        .unwrap_or_else(|_| job.output_dir.clone());

    let report = ExportReport {
        source_name: document.file_name(),
        source_path: job.input.canonicalize().unwrap_or_else(|_| job.input.clone()),
        source_sha256,
        output_dir: output_dir.clone(),
        document: info,
        summary,
        config: ExportConfig {
            include_invisible: job.options.include_invisible,
            expand_smart_objects: job.options.expand_smart_objects,
            font: fonts.path().map(|p| p.display().to_string()),
        },
        outcome: &outcome,
        exported_at: Local::now(),
    };
    let written = export::write_all(&report, &export::dedup_kinds(&job.emitters), &job.output_dir);

    Ok(JobResult {
        output_dir,
        records: outcome.records,
        statistics: outcome.statistics,
        written,
    })
}

/// 書き出し件数とスキップ理由の内訳を表示
pub fn print_statistics(stats: &PipelineStatistics) {
    println!("📊 総レイヤー {} / 書き出し {} / スキップ {}", stats.total, stats.exported, stats.skipped);

    for kind in [LayerKind::Text, LayerKind::Pixel, LayerKind::SmartObject, LayerKind::Other] {
        let count = stats.exported_of(kind);
        if count > 0 {
            println!("   ✔ {}: {}", kind.label(), count);
        }
    }
    for reason in [
        SkipReason::Hidden,
        SkipReason::Adjustment,
        SkipReason::SmartObjectExpansionUnsupported,
        SkipReason::EmptyRaster,
        SkipReason::Failed,
    ] {
        let count = stats.skipped_for(reason);
        if count > 0 {
            let mark = if reason.is_policy() { "-" } else { "⚠" };
            println!("   {} {}: {}", mark, reason.label(), count);
        }
    }
}

pub fn print_result(result: &JobResult) {
    println!("\n📁 出力先: {}", result.output_dir.display());
    println!("🖼️  画像フォルダ: {}/", IMAGES_DIR);
    print_statistics(&result.statistics);
}
