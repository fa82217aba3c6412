//! preview.html（素材プレビュー）

use super::{EmitterKind, ExportReport};
use psd_web_common::{naming::IMAGES_DIR, LayerKind};
use std::fmt::Write;

/// HTML特殊文字のエスケープ
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn badge_class(kind: LayerKind) -> &'static str {
    match kind {
        LayerKind::Text => "type-text",
        LayerKind::Pixel => "type-pixel",
        LayerKind::SmartObject => "type-smart",
        LayerKind::Adjustment | LayerKind::Other => "type-other",
    }
}

const STYLE: &str = r#"
    body { font-family: "Hiragino Sans", "Meiryo", Arial, sans-serif; margin: 20px; background: #f5f5f5; }
    .container { max-width: 1200px; margin: 0 auto; background: white; padding: 20px; border-radius: 10px; }
    .header { text-align: center; padding: 20px; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; border-radius: 10px; margin-bottom: 20px; }
    .stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 15px; margin-bottom: 20px; }
    .stat-card { background: #f8f9fa; padding: 15px; border-radius: 5px; text-align: center; border-left: 4px solid #667eea; }
    .stat-value { font-size: 1.5em; font-weight: bold; color: #333; }
    .layers-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(250px, 1fr)); gap: 20px; }
    .layer-card { border: 1px solid #ddd; border-radius: 5px; padding: 15px; background: white; }
    .layer-image { width: 100%; height: 150px; object-fit: contain; background: #f0f0f0; border-radius: 3px; margin-bottom: 10px; }
    .layer-name { font-weight: bold; margin-bottom: 5px; word-break: break-all; }
    .layer-position { font-size: 12px; color: #666; }
    .type-badge { display: inline-block; padding: 3px 8px; border-radius: 3px; font-size: 11px; margin-right: 5px; }
    .type-text { background: #d4edda; color: #155724; }
    .type-pixel { background: #d1ecf1; color: #0c5460; }
    .type-smart { background: #fff3cd; color: #856404; }
    .type-other { background: #e2e3e5; color: #383d41; }
    .hidden-badge { background: #f8d7da; color: #721c24; }
    .footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #ddd; font-size: 12px; color: #666; }
"#;

pub fn render(report: &ExportReport<'_>) -> String {
    let mut out = String::new();
    let name = escape_html(&report.source_name);
    let (width, height) = (report.document.width, report.document.height);

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"ja\">");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "<meta charset=\"UTF-8\">");
    let _ = writeln!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    let _ = writeln!(out, "<title>PSD素材プレビュー - {}</title>", name);
    let _ = writeln!(out, "<style>{}</style>", STYLE);
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<div class=\"container\">");

    let _ = writeln!(out, "<div class=\"header\">");
    let _ = writeln!(out, "<h1>🎨 PSD素材プレビュー</h1>");
    let _ = writeln!(out, "<p>{} - {}×{}px</p>", name, width, height);
    let _ = writeln!(out, "</div>");

    let _ = writeln!(out, "<div class=\"stats\">");
    for (value, label) in [
        (report.statistics().exported.to_string(), "書き出しレイヤー"),
        (format!("{}×{}", width, height), "デザインサイズ"),
        (report.summary.total_layers.to_string(), "総レイヤー数"),
        (report.statistics().skipped.to_string(), "スキップ"),
    ] {
        let _ = writeln!(
            out,
            "<div class=\"stat-card\"><div class=\"stat-value\">{}</div><div>{}</div></div>",
            value, label
        );
    }
    let _ = writeln!(out, "</div>");

    let _ = writeln!(out, "<h2>📁 書き出し素材</h2>");
    let _ = writeln!(out, "<div class=\"layers-grid\">");
    for record in report.records() {
        let layer_name = escape_html(&record.source_name);
        let bbox = &record.bounding_box;
        let _ = writeln!(out, "<div class=\"layer-card\">");
        let _ = writeln!(
            out,
            "<img src=\"{}\" alt=\"{}\" class=\"layer-image\">",
            escape_html(&record.asset_relative_path),
            layer_name
        );
        let _ = writeln!(out, "<div class=\"layer-name\">#{} {}</div>", record.export_index, layer_name);
        let _ = write!(
            out,
            "<span class=\"type-badge {}\">{}</span>",
            badge_class(record.kind),
            record.kind.label()
        );
        if !record.visible {
            let _ = write!(out, "<span class=\"type-badge hidden-badge\">非表示</span>");
        }
        out.push('\n');
        if !record.text_content().is_empty() {
            let _ = writeln!(
                out,
                "<div class=\"layer-position\">テキスト: {}</div>",
                escape_html(record.text_content())
            );
        }
        let _ = writeln!(
            out,
            "<div class=\"layer-position\">位置: ({}, {})<br>サイズ: {}×{}px<br>不透明度: {}%</div>",
            bbox.x, bbox.y, bbox.width, bbox.height, record.opacity
        );
        let _ = writeln!(out, "</div>");
    }
    let _ = writeln!(out, "</div>");

    let _ = writeln!(out, "<div class=\"footer\">");
    let _ = writeln!(out, "生成日時: {}<br>", report.timestamp());
    let _ = writeln!(out, "画像フォルダ: <code>{}/</code><br>", IMAGES_DIR);
    let _ = writeln!(
        out,
        "データ: <a href=\"{0}\">{0}</a>, <a href=\"{1}\">{1}</a>",
        EmitterKind::Json.file_name(),
        EmitterKind::Csv.file_name()
    );
    let _ = writeln!(out, "</div>");

    let _ = writeln!(out, "</div>");
    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");

    out
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use psd_web_common::LayerBounds;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_preview_escapes_layer_names() {
        let outcome = outcome(vec![record(0, "<script>", LayerKind::Pixel, LayerBounds::new(0, 0, 50, 50))]);
        let html = render(&report(&outcome));

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("images/000__script_.png"));
    }

    #[test]
    fn test_preview_cards() {
        let mut hidden = record(1, "title", LayerKind::Text, LayerBounds::new(10, 20, 110, 60));
        hidden.visible = false;
        let outcome = outcome(vec![record(0, "bg", LayerKind::Pixel, LayerBounds::new(0, 0, 800, 600)), hidden]);
        let html = render(&report(&outcome));

        assert_eq!(html.matches("class=\"layer-card\"").count(), 2);
        assert!(html.contains("type-badge type-text"));
        assert!(html.contains("hidden-badge"));
        assert!(html.contains("位置: (10, 20)<br>サイズ: 100×40px"));
    }
}
