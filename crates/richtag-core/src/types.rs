//! Selection and edit result types.
//!
//! Offsets are measured in characters (Unicode scalar values), never bytes.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A selection in the host text, measured in character offsets.
///
/// `start == end` is a collapsed selection (a caret), which the toggle engine
/// treats as "no selection".
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a collapsed selection at the given offset.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize so that start <= end.
    pub fn normalize(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }

    /// Normalize and clamp both bounds to `len` characters.
    pub fn clamp_to(self, len: usize) -> Self {
        let sel = self.normalize();
        Self {
            start: sel.start.min(len),
            end: sel.end.min(len),
        }
    }
}

impl From<Range<usize>> for Selection {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<Selection> for Range<usize> {
    fn from(sel: Selection) -> Self {
        sel.start..sel.end
    }
}

/// Result of a toggle or clear: the new full text and the selection to apply.
///
/// `selection` always refers to valid character offsets into `text`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub text: String,
    pub selection: Selection,
}

impl Edit {
    pub fn new(text: impl Into<String>, selection: Selection) -> Self {
        Self {
            text: text.into(),
            selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_swaps_reversed() {
        assert_eq!(Selection::new(7, 2).normalize(), Selection::new(2, 7));
        assert_eq!(Selection::new(2, 7).normalize(), Selection::new(2, 7));
    }

    #[test]
    fn test_clamp_to_text_length() {
        assert_eq!(Selection::new(3, 40).clamp_to(10), Selection::new(3, 10));
        assert_eq!(Selection::new(40, 3).clamp_to(10), Selection::new(3, 10));
        assert_eq!(Selection::caret(12).clamp_to(5), Selection::caret(5));
    }

    #[test]
    fn test_collapsed() {
        assert!(Selection::caret(4).is_collapsed());
        assert!(!Selection::new(0, 1).is_collapsed());
        assert_eq!(Selection::new(2, 6).len(), 4);
    }

    #[test]
    fn test_range_conversions() {
        let sel: Selection = (1..4).into();
        assert_eq!(sel, Selection::new(1, 4));
        let range: Range<usize> = sel.into();
        assert_eq!(range, 1..4);
    }
}
