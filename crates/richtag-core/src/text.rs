//! Character-offset helpers over plain `&str`.
//!
//! Selections are expressed in characters while Rust strings are indexed by
//! byte, so every splice goes through these conversions.

use crate::types::Selection;

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Convert a character offset to a byte offset, clamping to the end of `text`.
pub fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Split `text` around `selection` into `(before, selected, after)`.
///
/// The selection is normalized and clamped first.
pub fn split_selection(text: &str, selection: Selection) -> (&str, &str, &str) {
    let sel = selection.clamp_to(char_len(text));
    let start = char_to_byte(text, sel.start);
    let end = start + char_to_byte(&text[start..], sel.end - sel.start);
    (&text[..start], &text[start..end], &text[end..])
}

/// Join the three parts of a split back into one string.
pub fn splice(before: &str, middle: &str, after: &str) -> String {
    let mut out = String::with_capacity(before.len() + middle.len() + after.len());
    out.push_str(before);
    out.push_str(middle);
    out.push_str(after);
    out
}
