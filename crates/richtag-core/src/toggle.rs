//! Toggle engine: apply a tag to a selection, or strip one layer of it.

use crate::error::MarkupError;
use crate::registry::TagRegistry;
use crate::text::{char_len, split_selection, splice};
use crate::types::{Edit, Selection};

/// Toggle `tag` on the selected region of `text`.
///
/// A collapsed selection is moved to the end of the text before anything
/// else, so toggling with no selection appends an empty tag. On success the
/// returned selection keeps its start and its end moves by the length delta
/// of the edited region, re-selecting the (un)wrapped content.
///
/// Validation failures are returned before any text is produced; the caller
/// keeps its text and selection as they were.
pub fn toggle(
    registry: &TagRegistry,
    text: &str,
    selection: Selection,
    tag: &str,
    argument: Option<&str>,
) -> Result<Edit, MarkupError> {
    let len = char_len(text);
    let selection = if selection.is_collapsed() {
        Selection::caret(len)
    } else {
        selection.clamp_to(len)
    };

    let (before, selected, after) = split_selection(text, selection);
    let resolved = registry.resolve(tag, argument)?;
    let processed = resolved.toggle(selected);

    let new_text = splice(before, &processed, after);
    // end + (processed - selected), with selected spanning start..end.
    let new_selection = Selection::new(selection.start, selection.start + char_len(&processed));

    tracing::debug!(
        target: "richtag::toggle",
        tag,
        block = resolved.is_block,
        old_len = selection.len(),
        new_len = new_selection.len(),
        "toggled tag"
    );

    Ok(Edit::new(new_text, new_selection))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TagRegistry {
        TagRegistry::new()
    }

    #[test]
    fn test_wrap_selection_with_bold() {
        let edit = toggle(&registry(), "say hello now", Selection::new(4, 9), "bold", None).unwrap();
        assert_eq!(edit.text, "say <b>hello</b> now");
        assert_eq!(edit.selection, Selection::new(4, 16));
    }

    #[test]
    fn test_unwrap_selection_with_bold() {
        let edit =
            toggle(&registry(), "say <b>hello</b> now", Selection::new(4, 16), "bold", None).unwrap();
        assert_eq!(edit.text, "say hello now");
        assert_eq!(edit.selection, Selection::new(4, 9));
    }

    #[test]
    fn test_collapsed_selection_appends_at_end() {
        let edit = toggle(&registry(), "hello", Selection::caret(2), "bold", None).unwrap();
        assert_eq!(edit.text, "hello<b></b>");
        assert_eq!(edit.selection, Selection::new(5, 12));
    }

    #[test]
    fn test_collapsed_selection_on_empty_text() {
        let edit = toggle(&registry(), "", Selection::caret(0), "italic", None).unwrap();
        assert_eq!(edit.text, "<i></i>");
        assert_eq!(edit.selection, Selection::new(0, 7));
    }

    #[test]
    fn test_strips_exactly_one_layer() {
        let edit = toggle(&registry(), "<b><b>x</b></b>", Selection::new(0, 15), "bold", None).unwrap();
        assert_eq!(edit.text, "<b>x</b>");
        assert_eq!(edit.selection, Selection::new(0, 8));
    }

    #[test]
    fn test_match_inside_selection_is_unwrapped() {
        let edit = toggle(&registry(), "a <i>b</i> c", Selection::new(0, 12), "italic", None).unwrap();
        assert_eq!(edit.text, "a b c");
        assert_eq!(edit.selection, Selection::new(0, 5));
    }

    #[test]
    fn test_partial_match_at_boundary_is_wrapped() {
        // Only the open token is inside the selection.
        let edit = toggle(&registry(), "<b>ab</b>", Selection::new(0, 4), "bold", None).unwrap();
        assert_eq!(edit.text, "<b><b>a</b>b</b>");
    }

    #[test]
    fn test_inline_match_spans_lines() {
        let edit = toggle(
            &registry(),
            "<color=red>one\ntwo</color>",
            Selection::new(0, 26),
            "color",
            Some("red"),
        )
        .unwrap();
        assert_eq!(edit.text, "one\ntwo");
    }

    #[test]
    fn test_argument_must_match_to_unwrap() {
        let text = "<color=red>x</color>";
        let edit = toggle(&registry(), text, Selection::new(0, 20), "color", Some("blue")).unwrap();
        assert_eq!(edit.text, "<color=blue><color=red>x</color></color>");
    }

    #[test]
    fn test_percent_size_round_trip() {
        let applied = toggle(&registry(), "x", Selection::new(0, 1), "size", Some("50%")).unwrap();
        assert_eq!(applied.text, "<size=50%>x</size>");
        let removed = toggle(&registry(), &applied.text, applied.selection, "size", Some("50%")).unwrap();
        assert_eq!(removed.text, "x");
        assert_eq!(removed.selection, Selection::new(0, 1));
    }

    #[test]
    fn test_invalid_argument_aborts() {
        let err = toggle(&registry(), "abc", Selection::new(0, 3), "color", Some("#12")).unwrap_err();
        assert!(matches!(err, MarkupError::InvalidArgument { .. }));
    }

    #[test]
    fn test_unknown_tag_aborts() {
        let err = toggle(&registry(), "abc", Selection::new(0, 3), "blink", None).unwrap_err();
        assert!(matches!(err, MarkupError::UnknownTag { .. }));
    }

    #[test]
    fn test_block_tag_prefixes_without_close() {
        let edit = toggle(
            &registry(),
            "pic",
            Selection::new(0, 3),
            "img",
            Some("http://x.com/a.png"),
        )
        .unwrap();
        assert_eq!(edit.text, "$img:http://x.com/a.png\npic");
        assert_eq!(edit.selection, Selection::new(0, 27));
    }

    #[test]
    fn test_block_tag_removes_every_occurrence() {
        let text = "$img:http://x.com/a.png\none\n$img:http://x.com/a.png\ntwo";
        let sel = Selection::new(0, char_len(text));
        let edit = toggle(&registry(), text, sel, "img", Some("http://x.com/a.png")).unwrap();
        assert_eq!(edit.text, "one\ntwo");
        assert_eq!(edit.selection, Selection::new(0, 7));
    }

    #[test]
    fn test_character_offsets_with_multibyte_text() {
        let edit = toggle(&registry(), "héllo wörld", Selection::new(6, 11), "bold", None).unwrap();
        assert_eq!(edit.text, "héllo <b>wörld</b>");
        assert_eq!(edit.selection, Selection::new(6, 18));
    }

    #[test]
    fn test_reversed_selection_is_normalized() {
        let edit = toggle(&registry(), "abcdef", Selection::new(4, 1), "bold", None).unwrap();
        assert_eq!(edit.text, "a<b>bcd</b>ef");
        assert_eq!(edit.selection, Selection::new(1, 11));
    }
}
