//! web_layout_guide.html（レイアウト実装ガイド）
//!
//! デザインの枠に各レイヤーの矩形を重ねて表示し、絶対配置のHTML/CSS例を添える。

use super::html::escape_html;
use super::{EmitterKind, ExportReport};
use psd_web_common::{naming::IMAGES_DIR, LayerRecord};
use std::fmt::Write;

/// 枠を描く対象（先頭から）
pub const MAX_PREVIEW_BOXES: usize = 10;

/// これより小さいレイヤーは枠を描かない
pub const MIN_BOX_SIDE: u32 = 10;

/// コード例に載せるレイヤー数
pub const CODE_SAMPLE_LAYERS: usize = 5;

const LABEL_CHARS: usize = 15;

const STYLE: &str = r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body { font-family: "Hiragino Sans", "Meiryo", Arial, sans-serif; line-height: 1.6; color: #333; background: #f8f9fa; padding: 20px; }
    .container { max-width: 1200px; margin: 0 auto; background: white; padding: 40px; border-radius: 15px; box-shadow: 0 10px 30px rgba(0,0,0,0.1); }
    .header { text-align: center; margin-bottom: 40px; padding-bottom: 20px; border-bottom: 2px solid #eee; }
    .header h1 { color: #2c3e50; font-size: 2.2em; margin-bottom: 10px; }
    .subtitle { color: #7f8c8d; font-size: 1.1em; }
    .design-frame { overflow: auto; margin: 0 auto 40px; }
    .design-preview { position: relative; margin: 0 auto; border: 2px dashed #ddd; background: #f9f9f9; overflow: hidden; }
    .layer-box { position: absolute; border: 1px solid rgba(102, 126, 234, 0.5); background: rgba(102, 126, 234, 0.1); }
    .layer-box:hover { background: rgba(102, 126, 234, 0.3); border-color: #667eea; }
    .layer-label { position: absolute; top: 0; left: 0; background: #667eea; color: white; padding: 2px 8px; font-size: 12px; white-space: nowrap; }
    .code-section { background: #2d3a4b; border-radius: 8px; padding: 20px; margin: 20px 0; overflow-x: auto; }
    .code-section h3 { color: #42b983; margin-bottom: 15px; }
    pre { color: #abb2bf; font-family: Consolas, monospace; font-size: 14px; line-height: 1.5; }
    .info-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 20px; margin: 30px 0; }
    .info-card { background: #f8f9fa; padding: 20px; border-radius: 8px; border-left: 4px solid #667eea; }
    .info-card h3 { color: #2c3e50; margin-bottom: 10px; }
    .footer { text-align: center; margin-top: 40px; padding-top: 20px; border-top: 1px solid #eee; color: #7f8c8d; font-size: 14px; }
"#;

/// 枠を描くレコード
pub fn preview_boxes(records: &[LayerRecord]) -> Vec<&LayerRecord> {
    records
        .iter()
        .take(MAX_PREVIEW_BOXES)
        .filter(|r| r.bounding_box.width > MIN_BOX_SIDE && r.bounding_box.height > MIN_BOX_SIDE)
        .collect()
}

fn short_label(name: &str) -> String {
    if name.chars().count() > LABEL_CHARS {
        format!("{}...", name.chars().take(LABEL_CHARS).collect::<String>())
    } else {
        name.to_string()
    }
}

/// 1レイヤー分のCSSルール
pub fn css_rule(record: &LayerRecord) -> String {
    let bbox = &record.bounding_box;
    let mut rule = format!(
        ".layer-{} {{\n    position: absolute;\n    left: {}px;\n    top: {}px;\n    width: {}px;\n    height: {}px;\n    z-index: {};\n    opacity: {:.2};\n",
        record.export_index,
        bbox.x,
        bbox.y,
        bbox.width,
        bbox.height,
        record.export_index,
        record.css_opacity()
    );
    if record.blend_mode != "normal" {
        let _ = writeln!(rule, "    mix-blend-mode: {};", record.blend_mode.replace('_', "-"));
    }
    if !record.visible {
        rule.push_str("    display: none;\n");
    }
    rule.push('}');
    rule
}

fn img_tag(record: &LayerRecord) -> String {
    let alt = if record.text_content().is_empty() {
        record.source_name.as_str()
    } else {
        record.text_content()
    };
    format!(
        "<img src=\"{}\" alt=\"{}\" class=\"layer-{}\">",
        record.asset_relative_path,
        alt.replace('\n', " "),
        record.export_index
    )
}

fn sample_document(report: &ExportReport<'_>) -> String {
    let mut code = String::new();
    let samples: Vec<&LayerRecord> = report.records().iter().take(CODE_SAMPLE_LAYERS).collect();

    let _ = writeln!(code, "<!-- {} をもとにしたHTML -->", report.source_name);
    let _ = writeln!(code, "<!DOCTYPE html>");
    let _ = writeln!(code, "<html lang=\"ja\">");
    let _ = writeln!(code, "<head>");
    let _ = writeln!(code, "<meta charset=\"UTF-8\">");
    let _ = writeln!(code, "<title>{}</title>", report.source_stem());
    let _ = writeln!(code, "<style>");
    let _ = writeln!(
        code,
        ".design-container {{\n    position: relative;\n    width: {}px;\n    height: {}px;\n    margin: 0 auto;\n    overflow: hidden;\n}}",
        report.document.width, report.document.height
    );
    for record in &samples {
        let _ = writeln!(code, "/* #{} {} */", record.export_index, record.source_name);
        let _ = writeln!(code, "{}", css_rule(record));
    }
    let _ = writeln!(code, "</style>");
    let _ = writeln!(code, "</head>");
    let _ = writeln!(code, "<body>");
    let _ = writeln!(code, "<div class=\"design-container\">");
    for record in &samples {
        let _ = writeln!(code, "    {}", img_tag(record));
    }
    let _ = writeln!(code, "</div>");
    let _ = writeln!(code, "</body>");
    let _ = writeln!(code, "</html>");

    code
}

pub fn render(report: &ExportReport<'_>) -> String {
    let mut out = String::new();
    let name = escape_html(&report.source_name);
    let (width, height) = (report.document.width, report.document.height);
    let count = report.records().len();

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"ja\">");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "<meta charset=\"UTF-8\">");
    let _ = writeln!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    let _ = writeln!(out, "<title>レイアウトガイド - {}</title>", name);
    let _ = writeln!(out, "<style>{}</style>", STYLE);
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<div class=\"container\">");

    let _ = writeln!(out, "<div class=\"header\">");
    let _ = writeln!(out, "<h1>🌐 Webレイアウト実装ガイド</h1>");
    let _ = writeln!(out, "<div class=\"subtitle\">{} のデザインをもとに作成</div>", name);
    let _ = writeln!(out, "</div>");

    let _ = writeln!(out, "<div class=\"info-grid\">");
    let _ = writeln!(
        out,
        "<div class=\"info-card\"><h3>📏 デザイン仕様</h3><p>• 幅: {}px</p><p>• 高さ: {}px</p><p>• レイヤー数: {}</p><p>• 配置: 絶対配置</p></div>",
        width, height, count
    );
    let _ = writeln!(
        out,
        "<div class=\"info-card\"><h3>📁 ファイル構成</h3><p>• 画像フォルダ: <code>{}/</code></p><p>• 画像数: {}</p><p>• 命名規則: 番号_レイヤー名.png</p><p>• データ: <code>{}</code></p></div>",
        IMAGES_DIR,
        count,
        EmitterKind::Json.file_name()
    );
    let _ = writeln!(
        out,
        "<div class=\"info-card\"><h3>⚙️ 実装方針</h3><p>• position: absolute</p><p>• 重なり順: z-index（番号が大きいほど上）</p><p>• 単位: px</p></div>"
    );
    let _ = writeln!(out, "</div>");

    let _ = writeln!(out, "<h2>🎨 レイアウトプレビュー</h2>");
    let _ = writeln!(out, "<div class=\"design-frame\">");
    let _ = writeln!(
        out,
        "<div class=\"design-preview\" style=\"width: {}px; height: {}px;\">",
        width, height
    );
    for record in preview_boxes(report.records()) {
        let bbox = &record.bounding_box;
        let _ = writeln!(
            out,
            "<div class=\"layer-box\" style=\"left: {}px; top: {}px; width: {}px; height: {}px; z-index: {};\"><div class=\"layer-label\">#{} {}</div></div>",
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height,
            record.export_index,
            record.export_index,
            escape_html(&short_label(&record.source_name))
        );
    }
    let _ = writeln!(out, "</div>");
    let _ = writeln!(out, "</div>");

    let _ = writeln!(out, "<h2>💻 HTML実装例</h2>");
    let _ = writeln!(out, "<div class=\"code-section\">");
    let _ = writeln!(out, "<h3>基本構造（先頭{}レイヤー）</h3>", CODE_SAMPLE_LAYERS.min(count));
    let _ = writeln!(out, "<pre><code>{}</code></pre>", escape_html(&sample_document(report)));
    let _ = writeln!(out, "</div>");

    let _ = writeln!(out, "<div class=\"info-card\">");
    let _ = writeln!(out, "<h3>📋 実装手順</h3>");
    let _ = writeln!(out, "<p>1. <code>{}/</code> をプロジェクトにコピー</p>", IMAGES_DIR);
    let _ = writeln!(
        out,
        "<p>2. <code>{}</code> の位置情報からCSSを設定</p>",
        EmitterKind::Json.file_name()
    );
    let _ = writeln!(out, "<p>3. すべての要素を position: absolute で配置</p>");
    let _ = writeln!(out, "<p>4. z-index の順に重ねる（番号が大きいほど上）</p>");
    let _ = writeln!(out, "<p>5. レスポンシブにする場合はメディアクエリでコンテナを調整</p>");
    let _ = writeln!(out, "</div>");

    let _ = writeln!(out, "<div class=\"footer\">");
    let _ = writeln!(out, "<p>🛠️ 生成日時: {}</p>", report.timestamp());
    let _ = writeln!(
        out,
        "<p>📄 詳細: <a href=\"{0}\">{0}</a> | データ: <a href=\"{1}\">{1}</a></p>",
        EmitterKind::AiPromptDoc.file_name(),
        EmitterKind::Json.file_name()
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
    use psd_web_common::{LayerBounds, LayerKind};

    #[test]
    fn test_preview_boxes_limit_and_size() {
        let mut records: Vec<LayerRecord> = (0..12)
            .map(|i| record(i, &format!("layer{}", i), LayerKind::Pixel, LayerBounds::new(0, 0, 50, 50)))
            .collect();
        // 小さすぎるレイヤー
        records[1] = record(1, "dot", LayerKind::Pixel, LayerBounds::new(0, 0, 10, 40));

        let boxes = preview_boxes(&records);
        assert_eq!(boxes.len(), 9);
        assert!(boxes.iter().all(|r| r.export_index < MAX_PREVIEW_BOXES));
        assert!(boxes.iter().all(|r| r.source_name != "dot"));
    }

    #[test]
    fn test_css_rule() {
        let mut r = record(3, "shadow", LayerKind::Pixel, LayerBounds::new(5, 6, 25, 16));
        r.opacity = 45;
        r.blend_mode = "linear_burn".to_string();
        r.visible = false;
        let css = css_rule(&r);

        assert!(css.starts_with(".layer-3 {"));
        assert!(css.contains("left: 5px;"));
        assert!(css.contains("width: 20px;"));
        assert!(css.contains("opacity: 0.45;"));
        assert!(css.contains("mix-blend-mode: linear-burn;"));
        assert!(css.contains("display: none;"));
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("short"), "short");
        assert_eq!(short_label("abcdefghijklmnopq"), "abcdefghijklmno...");
    }

    #[test]
    fn test_render_guide() {
        let outcome = outcome(vec![
            record(0, "bg", LayerKind::Pixel, LayerBounds::new(0, 0, 800, 600)),
            record(1, "title", LayerKind::Text, LayerBounds::new(10, 10, 200, 40)),
        ]);
        let html = render(&report(&outcome));

        assert_eq!(html.matches("class=\"layer-box\"").count(), 2);
        assert!(html.contains("width: 800px; height: 600px;"));
        // コード例はエスケープされる
        assert!(html.contains("&lt;img src=&quot;images/001_title.png&quot; alt=&quot;Hello&quot;"));
    }
}
