//! Carving candidate text out of an article
//!
//! [`sections`] finds the heading-delimited regions that may describe the
//! participants, [`snippets`] cuts a section into short windows ending on a
//! participants name. Both report byte offsets into the article text.
//!
//! Window limits are counted in characters; the helpers below convert such a
//! count into a byte offset on a char boundary.

pub mod sections;
pub mod snippets;

pub use sections::{get_participants_sections, Section, SectionLocator};
pub use snippets::{split_participants_section, Snippet, SnippetSplitter};

/// A `( ... )` group holding at most one level of nested groups,
/// e.g. `(mean age 40 (median 38), 5 females)`.
pub(crate) const PARENTHETICAL_PATTERN: &str = r"\((?:[^()]|\([^()]*\))*\)";

/// Byte length of the balanced group opening `text`, if it closes.
pub(crate) fn group_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(offset + 1);
                }
            }
            _ if depth == 0 => return None,
            _ => {}
        }
    }
    None
}

/// Byte offset `chars` characters after `from`, clamped to the end of `text`.
pub(crate) fn forward_chars(text: &str, from: usize, chars: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(chars)
        .map(|(offset, _)| from + offset)
        .unwrap_or(text.len())
}

/// Byte offset `chars` characters before `to`, clamped to the start of `text`.
pub(crate) fn backward_chars(text: &str, to: usize, chars: usize) -> usize {
    if chars == 0 {
        return to;
    }
    text[..to]
        .char_indices()
        .rev()
        .nth(chars - 1)
        .map(|(offset, _)| offset)
        .unwrap_or(0)
}
