//! metadata.csv

use super::ExportReport;

const HEADER: [&str; 14] = [
    "番号",
    "レイヤー名",
    "種別",
    "テキスト内容",
    "画像ファイル",
    "相対パス",
    "X",
    "Y",
    "幅",
    "高さ",
    "不透明度",
    "表示",
    "合成モード",
    "重なり順",
];

/// 区切り文字・引用符・改行を含む値を引用符で囲む
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_row(out: &mut String, fields: &[String]) {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

pub fn render(report: &ExportReport<'_>) -> String {
    let mut out = String::new();
    write_row(&mut out, &HEADER.map(String::from));

    for record in report.records() {
        let bbox = &record.bounding_box;
        write_row(
            &mut out,
            &[
                record.export_index.to_string(),
                record.source_name.clone(),
                record.kind.to_string(),
                record.text_content().to_string(),
                record.asset_filename.clone(),
                record.asset_relative_path.clone(),
                bbox.x.to_string(),
                bbox.y.to_string(),
                bbox.width.to_string(),
                bbox.height.to_string(),
                record.opacity.to_string(),
                if record.visible { "表示" } else { "非表示" }.to_string(),
                record.blend_mode.clone(),
                record.export_index.to_string(),
            ],
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use psd_web_common::{LayerBounds, LayerKind};

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_render_rows() {
        let mut text = record(1, "見出し, 大", LayerKind::Text, LayerBounds::new(5, 6, 105, 46));
        text.visible = false;
        let outcome = outcome(vec![record(0, "bg", LayerKind::Pixel, LayerBounds::new(0, 0, 800, 600)), text]);
        let csv = render(&report(&outcome));
        let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("番号,レイヤー名,種別"));
        assert_eq!(lines[1], "0,bg,pixel,,000_bg.png,images/000_bg.png,0,0,800,600,100,表示,normal,0");
        assert!(lines[2].starts_with("1,\"見出し, 大\",text,Hello,"));
        assert!(lines[2].contains(",5,6,100,40,100,非表示,normal,1"));
    }
}
