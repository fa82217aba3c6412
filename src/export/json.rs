//! metadata.json

use super::ExportReport;
use crate::error::Result;
use psd_web_common::{naming::IMAGES_DIR, DocumentSummary, ExportConfig, LayerDiagnostic, LayerRecord, PipelineStatistics};
use serde::Serialize;

#[derive(Serialize)]
struct Metadata<'a> {
    document: DocumentSection<'a>,
    layers: &'a [LayerRecord],
    skipped: &'a [LayerDiagnostic],
}

#[derive(Serialize)]
struct DocumentSection<'a> {
    file_info: FileInfo<'a>,
    layer_statistics: &'a DocumentSummary,
    export_statistics: &'a PipelineStatistics,
    export_config: ConfigSection<'a>,
    output_structure: OutputStructure,
}

#[derive(Serialize)]
struct FileInfo<'a> {
    name: &'a str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<&'a str>,
    width: u32,
    height: u32,
    aspect_ratio: f64,
    color_mode: &'a str,
    bit_depth: u16,
}

#[derive(Serialize)]
struct ConfigSection<'a> {
    #[serde(flatten)]
    config: &'a ExportConfig,
    export_time: String,
}

#[derive(Serialize)]
struct OutputStructure {
    root_directory: String,
    images_directory: String,
    relative_paths_used: bool,
    file_naming_convention: &'static str,
}

pub fn render(report: &ExportReport<'_>) -> Result<String> {
    let metadata = Metadata {
        document: DocumentSection {
            file_info: FileInfo {
                name: &report.source_name,
                path: report.source_path.display().to_string(),
                sha256: report.source_sha256.as_deref(),
                width: report.document.width,
                height: report.document.height,
                aspect_ratio: report.document.aspect_ratio(),
                color_mode: &report.document.color_mode,
                bit_depth: report.document.bit_depth,
            },
            layer_statistics: &report.summary,
            export_statistics: report.statistics(),
            export_config: ConfigSection {
                config: &report.config,
                export_time: report.exported_at.to_rfc3339(),
            },
            output_structure: OutputStructure {
                root_directory: report.output_dir.display().to_string(),
                images_directory: format!("{}/", IMAGES_DIR),
                relative_paths_used: true,
                file_naming_convention: "###_layer_name.png",
            },
        },
        layers: report.records(),
        skipped: report.diagnostics(),
    };

    Ok(serde_json::to_string_pretty(&metadata)?)
}
