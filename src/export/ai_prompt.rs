//! ai_summary.md（AIにページを組ませるための説明書）
//!
//! 前半が作業指示、後半がデザインのデータ。ファイルの中身をそのまま
//! AIに渡して使う。

use super::layout_guide::css_rule;
use super::{EmitterKind, ExportReport};
use psd_web_common::{naming::IMAGES_DIR, LayerKind};
use std::fmt::Write;

const INSTRUCTIONS: &str = r#"# 🎯 AI向けWebページ生成タスク

## 目的
以下のPSDデザインの説明をもとに、**元のデザインと同じ見た目**のHTMLページを1つ作成してください。

## 要件

### 1. 正確な再現
- **サイズ**: コンテナの幅と高さは「デザインサイズ」に合わせる
- **位置**: 各レイヤーは「位置」の座標で絶対配置する
- **大きさ**: 各レイヤーの幅と高さを説明どおりにする
- **重なり順**: 「重なり順(z-index)」に従う（数値が大きいほど上）

### 2. 画像素材
- すべての画像は `images/` フォルダにある
- 相対パスで参照する（例: `<img src="images/001_logo.png">`）
- 画像はすべて透過付きPNG

### 3. レイアウト
- コンテナは `position: relative`、各レイヤーは `position: absolute`
- 番号が最も小さいレイヤーが背景になることが多い

### 4. 特別な要素
- テキストレイヤーは画像化済み。`<img>` を使い、本文を `alt` に入れる
- 「非表示」のレイヤーは `display: none` のままにする

## 出力
1. **index.html**（HTML・CSS・必要ならJavaScriptを1ファイルにまとめる）

## 確認項目
- [ ] コンテナのサイズがデザインと一致している
- [ ] 画像パスがすべて `images/` を指している
- [ ] 各レイヤーの座標と大きさが正しい
- [ ] 重なり順と不透明度が正しい
- [ ] 非表示レイヤーが隠れている

デザインにない要素は追加しないでください。情報に矛盾がある場合はレイヤー詳細の座標を優先してください。

---
"#;

pub fn render(report: &ExportReport<'_>) -> String {
    let mut out = String::from(INSTRUCTIONS);
    let doc = &report.document;
    let summary = &report.summary;
    let stats = report.statistics();

    let _ = writeln!(out, "\n# PSDデザイン詳細\n");

    let _ = writeln!(out, "## 1. ファイル情報");
    let _ = writeln!(out, "- **ファイル名**: {}", report.source_name);
    let _ = writeln!(out, "- **デザインサイズ**: {} × {} px", doc.width, doc.height);
    let _ = writeln!(out, "- **縦横比**: {:.2}", doc.aspect_ratio());
    let _ = writeln!(out, "- **カラーモード**: {}", doc.color_mode);
    let _ = writeln!(out, "- **ビット深度**: {}bit\n", doc.bit_depth);

    let _ = writeln!(out, "## 2. レイヤー構成");
    let _ = writeln!(out, "- **総レイヤー数**: {}", summary.total_layers);
    let _ = writeln!(out, "- **表示レイヤー**: {}", summary.visible_layers);
    let _ = writeln!(out, "- **テキストレイヤー**: {}", summary.text_layers);
    let _ = writeln!(out, "- **スマートオブジェクト**: {}", summary.smart_objects);
    let _ = writeln!(out, "- **調整レイヤー**: {}", summary.adjustment_layers);
    let _ = writeln!(out, "- **シェイプレイヤー**: {}", summary.shape_layers);
    let _ = writeln!(out, "- **グループ**: {}\n", summary.layer_groups);

    let _ = writeln!(out, "## 3. 書き出し結果");
    let _ = writeln!(out, "- **書き出し**: {} レイヤー", stats.exported);
    for kind in [LayerKind::Text, LayerKind::Pixel, LayerKind::SmartObject, LayerKind::Other] {
        let _ = writeln!(out, "- **{}**: {}", kind.label(), stats.exported_of(kind));
    }
    let _ = writeln!(out, "- **スキップ**: {}\n", stats.skipped);

    let _ = writeln!(out, "## 4. 出力フォルダ構成");
    let _ = writeln!(out, "```");
    let _ = writeln!(
        out,
        "{}/",
        report
            .output_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    );
    let _ = writeln!(out, "├── {}/", IMAGES_DIR);
    let _ = writeln!(out, "│   ├── 000_layer_name.png    # 番号_レイヤー名.png");
    let _ = writeln!(out, "│   └── ...");
    let _ = writeln!(out, "├── {}", EmitterKind::Json.file_name());
    let _ = writeln!(out, "├── {}  # この文書", EmitterKind::AiPromptDoc.file_name());
    let _ = writeln!(out, "├── {}", EmitterKind::Csv.file_name());
    let _ = writeln!(out, "├── {}", EmitterKind::LayoutGuide.file_name());
    let _ = writeln!(out, "└── {}", EmitterKind::HtmlPreview.file_name());
    let _ = writeln!(out, "```\n");

    let _ = writeln!(out, "## 5. レイアウト");
    let _ = writeln!(out, "```html");
    let _ = writeln!(
        out,
        "<div class=\"design-container\" style=\"position: relative; width: {}px; height: {}px;\">",
        doc.width, doc.height
    );
    let _ = writeln!(out, "    <!-- レイヤーを z-index 順に並べる -->");
    let _ = writeln!(out, "</div>");
    let _ = writeln!(out, "```\n");

    let _ = writeln!(out, "## 6. レイヤー詳細\n");
    for record in report.records() {
        let bbox = &record.bounding_box;
        let hidden_mark = if record.visible { "" } else { "👁️ " };
        let _ = writeln!(out, "### レイヤー #{}: {}{}", record.export_index, hidden_mark, record.source_name);
        let _ = writeln!(out, "- **種別**: {}", record.kind);
        if let Some(text) = record.text.as_ref().filter(|t| !t.content.is_empty()) {
            let _ = writeln!(out, "- **テキスト**: \"{}\"", text.content.replace('\n', "\\n"));
            if let Some(size) = text.font_size {
                let _ = writeln!(out, "- **フォントサイズ**: {}", size);
            }
            if let Some(color) = &text.color {
                let _ = writeln!(out, "- **文字色**: {}", color);
            }
            if let Some(alignment) = text.alignment {
                let _ = writeln!(out, "- **揃え**: {}", alignment.as_css());
            }
        }
        let _ = writeln!(out, "- **画像**: `{}`", record.asset_relative_path);
        let _ = writeln!(out, "- **位置**: ({}px, {}px)", bbox.x, bbox.y);
        let _ = writeln!(out, "- **サイズ**: {}px × {}px", bbox.width, bbox.height);
        let _ = writeln!(out, "- **不透明度**: {}%", record.opacity);
        let _ = writeln!(out, "- **表示**: {}", if record.visible { "表示" } else { "非表示" });
        let _ = writeln!(out, "- **合成モード**: {}", record.blend_mode);
        let _ = writeln!(out, "- **重なり順(z-index)**: {}\n", record.export_index);
        let _ = writeln!(out, "```css\n{}\n```\n", css_rule(record));
        let _ = writeln!(out, "---\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use psd_web_common::{LayerBounds, TextAlignment};

    #[test]
    fn test_ai_summary_contents() {
        let mut title = record(1, "title", LayerKind::Text, LayerBounds::new(10, 10, 200, 40));
        if let Some(text) = title.text.as_mut() {
            text.font_size = Some(24.0);
            text.color = Some("#ff0000".to_string());
            text.alignment = Some(TextAlignment::Center);
        }
        let outcome = outcome(vec![record(0, "bg", LayerKind::Pixel, LayerBounds::new(0, 0, 800, 600)), title]);
        let md = render(&report(&outcome));

        assert!(md.starts_with("# 🎯 AI向けWebページ生成タスク"));
        assert!(md.contains("- **デザインサイズ**: 800 × 600 px"));
        assert!(md.contains("- **縦横比**: 1.33"));
        assert!(md.contains("### レイヤー #1: title"));
        assert!(md.contains("- **テキスト**: \"Hello\""));
        assert!(md.contains("- **文字色**: #ff0000"));
        assert!(md.contains("- **揃え**: center"));
        assert!(md.contains("web_design/"));
        assert!(md.contains(".layer-1 {"));
    }
}
