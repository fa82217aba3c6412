//! メタデータ出力
//!
//! 書き出し結果（レコード・集計・診断）を読み取り専用で受け取り、
//! 形式ごとに1ファイルずつ出力する。どの形式を出すかは `OutputProfile`
//! または明示指定で決まる。

pub mod ai_prompt;
pub mod csv;
pub mod html;
pub mod json;
pub mod layout_guide;
pub mod summary;

use crate::error::{PsdWebError, Result};
use crate::pipeline::ExportOutcome;
use chrono::{DateTime, Local};
use psd_web_common::{DocumentInfo, DocumentSummary, ExportConfig, LayerDiagnostic, LayerRecord, PipelineStatistics};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// 出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitterKind {
    Json,
    Csv,
    TextSummary,
    HtmlPreview,
    LayoutGuide,
    AiPromptDoc,
}

impl EmitterKind {
    pub const ALL: [EmitterKind; 6] = [
        EmitterKind::Json,
        EmitterKind::Csv,
        EmitterKind::TextSummary,
        EmitterKind::HtmlPreview,
        EmitterKind::LayoutGuide,
        EmitterKind::AiPromptDoc,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            EmitterKind::Json => "metadata.json",
            EmitterKind::Csv => "metadata.csv",
            EmitterKind::TextSummary => "summary.txt",
            EmitterKind::HtmlPreview => "preview.html",
            EmitterKind::LayoutGuide => "web_layout_guide.html",
            EmitterKind::AiPromptDoc => "ai_summary.md",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmitterKind::Json => "JSONメタデータ",
            EmitterKind::Csv => "CSVメタデータ",
            EmitterKind::TextSummary => "テキスト報告",
            EmitterKind::HtmlPreview => "HTMLプレビュー",
            EmitterKind::LayoutGuide => "レイアウトガイド",
            EmitterKind::AiPromptDoc => "AI向け説明書",
        }
    }

    pub fn render(&self, report: &ExportReport<'_>) -> Result<String> {
        match self {
            EmitterKind::Json => json::render(report),
            EmitterKind::Csv => Ok(csv::render(report)),
            EmitterKind::TextSummary => Ok(summary::render(report)),
            EmitterKind::HtmlPreview => Ok(html::render(report)),
            EmitterKind::LayoutGuide => Ok(layout_guide::render(report)),
            EmitterKind::AiPromptDoc => Ok(ai_prompt::render(report)),
        }
    }
}

impl std::str::FromStr for EmitterKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(EmitterKind::Json),
            "csv" => Ok(EmitterKind::Csv),
            "summary" | "text" | "txt" => Ok(EmitterKind::TextSummary),
            "html" | "preview" => Ok(EmitterKind::HtmlPreview),
            "layout" | "guide" => Ok(EmitterKind::LayoutGuide),
            "ai" | "prompt" => Ok(EmitterKind::AiPromptDoc),
            _ => Err(format!(
                "Unknown emitter: {}. Use json, csv, summary, html, layout, or ai",
                s
            )),
        }
    }
}

impl std::fmt::Display for EmitterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmitterKind::Json => write!(f, "json"),
            EmitterKind::Csv => write!(f, "csv"),
            EmitterKind::TextSummary => write!(f, "summary"),
            EmitterKind::HtmlPreview => write!(f, "html"),
            EmitterKind::LayoutGuide => write!(f, "layout"),
            EmitterKind::AiPromptDoc => write!(f, "ai"),
        }
    }
}

/// 出力プロファイル
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputProfile {
    /// 素材確認用: JSON / テキスト報告 / CSV / プレビュー
    #[default]
    Basic,
    /// AIでページを組む用: JSON / AI向け説明書 / CSV / プレビュー / レイアウトガイド
    Ai,
}

impl OutputProfile {
    pub fn emitters(&self) -> Vec<EmitterKind> {
        match self {
            OutputProfile::Basic => vec![
                EmitterKind::Json,
                EmitterKind::TextSummary,
                EmitterKind::Csv,
                EmitterKind::HtmlPreview,
            ],
            OutputProfile::Ai => vec![
                EmitterKind::Json,
                EmitterKind::AiPromptDoc,
                EmitterKind::Csv,
                EmitterKind::HtmlPreview,
                EmitterKind::LayoutGuide,
            ],
        }
    }
}

impl std::str::FromStr for OutputProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" | "b" => Ok(OutputProfile::Basic),
            "ai" => Ok(OutputProfile::Ai),
            _ => Err(format!("Unknown profile: {}. Use basic or ai", s)),
        }
    }
}

impl std::fmt::Display for OutputProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputProfile::Basic => write!(f, "basic"),
            OutputProfile::Ai => write!(f, "ai"),
        }
    }
}

/// 出力モジュールに渡す読み取り専用の結果一式
pub struct ExportReport<'a> {
    pub source_name: String,
    pub source_path: PathBuf,
    /// 元PSDの SHA-256（16進）
    pub source_sha256: Option<String>,
    pub output_dir: PathBuf,
    pub document: DocumentInfo,
    pub summary: DocumentSummary,
    pub config: ExportConfig,
    pub outcome: &'a ExportOutcome,
    pub exported_at: DateTime<Local>,
}

impl<'a> ExportReport<'a> {
    pub fn records(&self) -> &'a [LayerRecord] {
        &self.outcome.records
    }

    pub fn statistics(&self) -> &'a PipelineStatistics {
        &self.outcome.statistics
    }

    pub fn diagnostics(&self) -> &'a [LayerDiagnostic] {
        &self.outcome.diagnostics
    }

    /// `design.psd` -> `design`
    pub fn source_stem(&self) -> &str {
        self.source_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| !stem.is_empty())
            .unwrap_or(&self.source_name)
    }

    pub fn timestamp(&self) -> String {
        self.exported_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// ファイルの SHA-256
pub fn sha256_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// 指定の形式をすべて出力し、書き出したファイルのパスを返す
///
/// 1件も書き出していなければ何も出力しない。
/// ある形式の失敗は記録して残りを続ける。
pub fn write_all(report: &ExportReport<'_>, kinds: &[EmitterKind], output_dir: &Path) -> Vec<PathBuf> {
    if report.records().is_empty() {
        println!("⚠ 書き出したレイヤーがないため、メタデータは出力しません");
        return Vec::new();
    }

    let mut written = Vec::new();
    for kind in kinds {
        match write_one(report, *kind, output_dir) {
            Ok(path) => {
                println!("  ✔ {}: {}", kind.label(), path.display());
                written.push(path);
            }
            Err(e) => {
                tracing::error!("{}の出力に失敗: {}", kind.label(), e);
                println!("  ⚠ {}の出力に失敗: {}", kind.label(), e);
            }
        }
    }
    written
}

fn write_one(report: &ExportReport<'_>, kind: EmitterKind, output_dir: &Path) -> Result<PathBuf> {
    let content = kind.render(report)?;
    let path = output_dir.join(kind.file_name());
    std::fs::write(&path, content).map_err(|e| PsdWebError::Emit(format!("{}: {}", path.display(), e)))?;
    Ok(path)
}

/// 重複を除いて順序を保つ
pub fn dedup_kinds(kinds: &[EmitterKind]) -> Vec<EmitterKind> {
    let mut unique: Vec<EmitterKind> = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !unique.contains(kind) {
            unique.push(*kind);
        }
    }
    unique
}
