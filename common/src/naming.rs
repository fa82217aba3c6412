//! 書き出しファイル名の生成
//!
//! レイヤー名は空・重複・ファイル名に使えない文字を含むことがあるため、
//! 安全な名前に整えたうえで書き出し番号を前置する。
//! 番号が一意なので、名前が重複してもファイル名は重複しない。

/// 画像を置くサブディレクトリ
pub const IMAGES_DIR: &str = "images";

/// 整えた名前の最大文字数
pub const MAX_NAME_CHARS: usize = 50;

/// 整えた結果が空になったときの名前
pub const PLACEHOLDER_NAME: &str = "layer";

const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// ファイル名に使えない文字を `_` に置換し、前後の空白とドットを除去、50文字に切り詰める
pub fn sanitize_name(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if ILLEGAL_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim().trim_matches('.').trim();
    trimmed
        .chars()
        .take(MAX_NAME_CHARS)
        .collect::<String>()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

/// `007_name.png` 形式のファイル名を返す
pub fn resolve(raw_name: &str, export_index: usize) -> String {
    let clean = sanitize_name(raw_name);
    let stem = if clean.is_empty() { PLACEHOLDER_NAME } else { clean.as_str() };
    format!("{:03}_{}.png", export_index, stem)
}

/// 出力ルートからの相対パス（区切りは常に `/`）
pub fn relative_path(filename: &str) -> String {
    format!("{}/{}", IMAGES_DIR, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_basic() {
        assert_eq!(resolve("cleaned name", 7), "007_cleaned name.png");
    }

    #[test]
    fn test_illegal_characters_removed() {
        let name = resolve("a/b:c*.png", 3);
        assert!(name.starts_with("003_"));
        let stem = name.trim_start_matches("003_");
        assert!(!stem.trim_end_matches(".png").contains(['/', ':', '*']));
        assert_eq!(name, "003_a_b_c_.png.png");
    }

    #[test]
    fn test_trim_whitespace_and_dots() {
        assert_eq!(sanitize_name("  ..logo..  "), "logo");
        assert_eq!(sanitize_name("title. "), "title");
    }

    #[test]
    fn test_truncate_to_50_chars() {
        let long = "あ".repeat(80);
        let clean = sanitize_name(&long);
        assert_eq!(clean.chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn test_truncation_drops_trailing_space() {
        // 50文字目が空白になる名前
        let name = format!("{} {}", "a".repeat(49), "b".repeat(10));
        let clean = sanitize_name(&name);
        assert_eq!(clean, "a".repeat(49));

        let name = format!("{}. .{}", "c".repeat(47), "d".repeat(10));
        assert_eq!(sanitize_name(&name), "c".repeat(47));
    }

    #[test]
    fn test_empty_name_uses_placeholder() {
        assert_eq!(resolve("", 0), "000_layer.png");
        assert_eq!(resolve(" ... ", 12), "012_layer.png");
    }

    #[test]
    fn test_control_characters_replaced() {
        assert_eq!(sanitize_name("a\tb\nc"), "a_b_c");
    }

    #[test]
    fn test_same_name_different_index() {
        assert_ne!(resolve("ボタン", 1), resolve("ボタン", 2));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("000_bg.png"), "images/000_bg.png");
    }

    #[test]
    fn test_index_wider_than_three_digits() {
        assert_eq!(resolve("x", 1234), "1234_x.png");
    }
}
