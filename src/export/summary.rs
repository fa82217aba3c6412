//! summary.txt（テキスト報告）

use super::ExportReport;
use psd_web_common::{naming::IMAGES_DIR, LayerKind, SkipReason};
use std::fmt::Write;

const RULE: &str = "================================================================================";
const THIN_RULE: &str = "----------------------------------------";

fn yes_no(value: bool) -> &'static str {
    if value {
        "はい"
    } else {
        "いいえ"
    }
}

pub fn render(report: &ExportReport<'_>) -> String {
    let mut out = String::new();
    let stats = report.statistics();

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "PSD Web素材 抽出レポート");
    let _ = writeln!(out, "{}\n", RULE);

    let _ = writeln!(out, "📁 ファイル情報:");
    let _ = writeln!(out, "{}", THIN_RULE);
    let _ = writeln!(out, "PSDファイル: {}", report.source_name);
    let _ = writeln!(out, "フルパス: {}", report.source_path.display());
    if let Some(sha) = &report.source_sha256 {
        let _ = writeln!(out, "SHA-256: {}", sha);
    }
    let _ = writeln!(
        out,
        "ドキュメントサイズ: {} x {} ピクセル ({}, {}bit)",
        report.document.width, report.document.height, report.document.color_mode, report.document.bit_depth
    );
    let _ = writeln!(out, "出力日時: {}", report.timestamp());
    let _ = writeln!(out, "出力先: {}", report.output_dir.display());
    let _ = writeln!(out, "画像フォルダ: {}/\n", IMAGES_DIR);

    let _ = writeln!(out, "⚙️ 出力設定:");
    let _ = writeln!(out, "{}", THIN_RULE);
    let _ = writeln!(out, "非表示レイヤーを出力: {}", yes_no(report.config.include_invisible));
    let _ = writeln!(out, "スマートオブジェクトを展開: {}", yes_no(report.config.expand_smart_objects));
    if let Some(font) = &report.config.font {
        let _ = writeln!(out, "フォント: {}", font);
    }
    out.push('\n');

    let _ = writeln!(out, "📊 集計:");
    let _ = writeln!(out, "{}", THIN_RULE);
    let _ = writeln!(out, "総レイヤー数: {}", stats.total);
    let _ = writeln!(out, "書き出し: {}", stats.exported);
    for kind in [LayerKind::Text, LayerKind::Pixel, LayerKind::SmartObject, LayerKind::Other] {
        let count = stats.exported_of(kind);
        if count > 0 {
            let _ = writeln!(out, "  {}: {}", kind.label(), count);
        }
    }
    let _ = writeln!(out, "スキップ: {}", stats.skipped);
    for reason in [
        SkipReason::Hidden,
        SkipReason::Adjustment,
        SkipReason::SmartObjectExpansionUnsupported,
        SkipReason::EmptyRaster,
        SkipReason::Failed,
    ] {
        let count = stats.skipped_for(reason);
        if count > 0 {
            let _ = writeln!(out, "  {}: {}", reason.label(), count);
        }
    }
    out.push('\n');

    let _ = writeln!(out, "📋 レイヤー詳細:");
    let _ = writeln!(out, "{}", RULE);

    for record in report.records() {
        let bbox = &record.bounding_box;
        let hidden_mark = if record.visible { "" } else { "👁️ " };
        let _ = writeln!(out, "\nレイヤー #{}: {}{}", record.export_index, hidden_mark, record.source_name);
        let _ = writeln!(out, "  種別: {}", record.kind);
        if !record.text_content().is_empty() {
            let _ = writeln!(out, "  テキスト: {}", record.text_content().replace('\n', " / "));
        }
        if !record.group_path.is_empty() {
            let _ = writeln!(out, "  グループ: {}", record.group_path.join(" > "));
        }
        let _ = writeln!(out, "  画像ファイル: {}", record.asset_relative_path);
        let _ = writeln!(out, "  位置: X={}, Y={}", bbox.x, bbox.y);
        let _ = writeln!(out, "  サイズ: {} x {} ピクセル", bbox.width, bbox.height);
        let _ = writeln!(out, "  不透明度: {}%", record.opacity);
        let _ = writeln!(out, "  表示: {}", if record.visible { "表示" } else { "非表示" });
        let _ = writeln!(out, "  合成モード: {}", record.blend_mode);
        let _ = writeln!(
            out,
            "  フルパス: {}",
            report.output_dir.join(&record.asset_relative_path).display()
        );
    }

    if !report.diagnostics().is_empty() {
        let _ = writeln!(out, "\n⚠ スキップしたレイヤー:");
        let _ = writeln!(out, "{}", THIN_RULE);
        for diag in report.diagnostics() {
            let _ = write!(out, "#{} {} - {}", diag.traversal_index, diag.name, diag.reason);
            if let Some(detail) = &diag.detail {
                let _ = write!(out, " ({})", detail);
            }
            out.push('\n');
        }
    }

    out
}
