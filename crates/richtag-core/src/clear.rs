//! Clear engine: strip every recognized markup token from a region.

use std::sync::OnceLock;

use regex::Regex;

use crate::text::{char_len, split_selection, splice};
use crate::types::{Edit, Selection};

/// Any open/close token of a known tag name, whatever its argument.
///
/// The name is matched as a prefix, so `<br>` and `<img ...>` go too.
fn markup_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?(color|b|i|size|link|strong|em|span)[^>]*>").unwrap())
}

/// A line holding only an image sentinel.
fn image_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*\$img:[^\n]+\s*$").unwrap())
}

/// Remove markup tokens and image lines from `region`, then turn the
/// `&nbsp;`, `&lt;` and `&gt;` entities back into literal characters.
pub fn strip_markup(region: &str) -> String {
    let stripped = markup_token_re().replace_all(region, "");
    let stripped = image_line_re().replace_all(&stripped, "");
    stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Clear all formatting from the selected region, or from the whole text when
/// the selection is collapsed.
///
/// For a region the cleaned text is spliced back in place and the selection
/// becomes `start..start + len(cleaned)`. For the whole text the selection is
/// not recomputed; the caret is only clamped to the cleaned length.
pub fn clear(text: &str, selection: Selection) -> Edit {
    if selection.is_collapsed() {
        let cleaned = strip_markup(text);
        let selection = selection.clamp_to(char_len(&cleaned));
        tracing::debug!(
            target: "richtag::clear",
            removed = char_len(text).saturating_sub(char_len(&cleaned)),
            "cleared whole text"
        );
        return Edit::new(cleaned, selection);
    }

    let selection = selection.clamp_to(char_len(text));
    let (before, selected, after) = split_selection(text, selection);
    let cleaned = strip_markup(selected);
    let end = selection.start + char_len(&cleaned);
    tracing::debug!(
        target: "richtag::clear",
        removed = selection.len().saturating_sub(char_len(&cleaned)),
        "cleared selection"
    );
    Edit::new(
        splice(before, &cleaned, after),
        Selection::new(selection.start, end),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_inline_tokens() {
        let text = "<b>bold</b> <i>it</i> <color=#FF0000>red</color> <size=50%>x</size>";
        assert_eq!(strip_markup(text), "bold it red x");
    }

    #[test]
    fn test_strip_legacy_html_aliases() {
        let text = r#"<strong>a</strong><em>b</em><span style="color:red">c</span>"#;
        assert_eq!(strip_markup(text), "abc");
    }

    #[test]
    fn test_strip_link_with_url_argument() {
        assert_eq!(strip_markup("<link=http://x.com>site</link>"), "site");
    }

    #[test]
    fn test_prefix_match_removes_br_and_img_elements() {
        assert_eq!(strip_markup("a<br>b<img src=\"x\">c"), "abc");
    }

    #[test]
    fn test_unrelated_angle_brackets_survive() {
        assert_eq!(strip_markup("1 < 2 > 0 <u>x</u>"), "1 < 2 > 0 <u>x</u>");
    }

    #[test]
    fn test_image_line_removed_keeps_newline() {
        assert_eq!(strip_markup("$img:http://x.com/a.png\npic"), "\npic");
        assert_eq!(strip_markup("top\n  $img:http://x.com/a.png  \nend"), "top\n\nend");
    }

    #[test]
    fn test_sentinel_mid_line_is_kept() {
        assert_eq!(strip_markup("see $img:http://x.com"), "see $img:http://x.com");
    }

    #[test]
    fn test_entities_are_unescaped() {
        assert_eq!(strip_markup("a&nbsp;&nbsp;b &lt;tag&gt;"), "a  b <tag>");
    }

    #[test]
    fn test_unescaped_tags_are_not_stripped_again() {
        // Entities are decoded after token stripping.
        assert_eq!(strip_markup("&lt;b&gt;"), "<b>");
    }

    #[test]
    fn test_clear_whole_text_when_collapsed() {
        let edit = clear("<size=50%>x</size>", Selection::caret(3));
        assert_eq!(edit.text, "x");
        assert_eq!(edit.selection, Selection::caret(1));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let once = clear("<size=50%>x</size>", Selection::caret(0));
        let twice = clear(&once.text, Selection::caret(0));
        assert_eq!(once.text, "x");
        assert_eq!(twice.text, "x");
    }

    #[test]
    fn test_clear_selection_splices_and_reselects() {
        let text = "<b>keep</b> <i>drop</i> tail";
        let edit = clear(text, Selection::new(12, 23));
        assert_eq!(edit.text, "<b>keep</b> drop tail");
        assert_eq!(edit.selection, Selection::new(12, 16));
    }
}
