//! Snippet splitter
//!
//! Cuts a section into windows that each end on a participants name, plus the
//! parenthetical right after it if there is one. The scan is anchored: each
//! match starts exactly where the previous one ended, so text already consumed
//! is never re-examined.
//!
//! A match may start far before its name. The window keeps at most
//! `max_len` characters before the end of the name, moving its start forward
//! one character at a time but jumping over whole `( ... )` groups, so a
//! parenthetical is never cut in half. Failing that, the window is the last
//! `max_len` characters of the match.

use regex::Regex;

use super::{backward_chars, group_len, PARENTHETICAL_PATTERN};
use crate::demographics::lexing::vocabulary::participants_name_pattern;

/// Default window length before the end of the participants name, in characters
pub const DEFAULT_MAX_SNIPPET_LEN: usize = 100;

/// A window of a section, handed to the mention grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snippet<'a> {
    pub text: &'a str,
    /// Byte offset of `text` in the article
    pub start: usize,
    /// Byte offset where `text` ends in the article
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct SnippetSplitter {
    pattern: Regex,
    max_len: usize,
}

impl SnippetSplitter {
    pub fn new(max_len: usize) -> Self {
        // Lazily skip plain characters and whole parentheticals up to a name,
        // then take one optional parenthetical after it.
        let pattern = Regex::new(&format!(
            r"(?is)\A(?:[^(]|{paren})*?({names})(?:\s{paren})?",
            paren = PARENTHETICAL_PATTERN,
            names = participants_name_pattern()
        ))
        .expect("participants snippet pattern is valid");
        Self { pattern, max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Start of the window inside `found`, which ends on the participants name.
    fn window_start(&self, found: &str) -> Option<usize> {
        let mut position = 0;
        loop {
            let rest = &found[position..];
            if rest.chars().count() <= self.max_len {
                return Some(position);
            }
            let next = rest.chars().next()?;
            if next == '(' {
                // Step over the whole group or give up on a clean boundary
                position += group_len(rest)?;
            } else {
                position += next.len_utf8();
            }
        }
    }

    /// Split `section`, located at `section_start` in the article.
    pub fn split<'a>(&self, section: &'a str, section_start: usize) -> Vec<Snippet<'a>> {
        let mut snippets = Vec::new();
        let mut position = 0;
        while position < section.len() {
            let Some(captures) = self.pattern.captures(&section[position..]) else {
                break;
            };
            let (Some(matched), Some(name)) = (captures.get(0), captures.get(1)) else {
                break;
            };
            let match_start = position + matched.start();
            let match_end = position + matched.end();
            let name_end = position + name.end();

            let start = match self.window_start(&section[match_start..name_end]) {
                Some(offset) => match_start + offset,
                None => backward_chars(section, match_end, self.max_len).max(match_start),
            };
            snippets.push(Snippet {
                text: &section[start..match_end],
                start: section_start + start,
                end: section_start + match_end,
            });
            position = match_end;
        }
        snippets
    }
}

impl Default for SnippetSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SNIPPET_LEN)
    }
}

/// Split a section with a fresh [`SnippetSplitter`] and the default window.
pub fn split_participants_section(section: &str, section_start: usize) -> Vec<Snippet<'_>> {
    SnippetSplitter::default().split(section, section_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(snippets: &[Snippet<'a>]) -> Vec<&'a str> {
        snippets.iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_snippets_end_on_names() {
        let section = "We recruited 20 patients and 15 healthy controls.";
        let snippets = split_participants_section(section, 0);
        assert_eq!(
            texts(&snippets),
            vec!["We recruited 20 patients", " and 15 healthy controls"]
        );
    }

    #[test]
    fn test_trailing_parenthetical_is_attached() {
        let section = "\n34 patients (5 females, 29 males) were scanned.";
        let snippets = split_participants_section(section, 500);
        assert_eq!(texts(&snippets), vec!["\n34 patients (5 females, 29 males)"]);
        assert_eq!(snippets[0].start, 500);
        assert_eq!(snippets[0].end, 500 + 34);
    }

    #[test]
    fn test_scanning_does_not_overlap() {
        // "males" inside the parenthetical was consumed with "patients"
        let section = "34 patients (29 males) and 12 females";
        let snippets = split_participants_section(section, 0);
        assert_eq!(
            texts(&snippets),
            vec!["34 patients (29 males)", " and 12 females"]
        );
    }

    #[test]
    fn test_names_are_whole_words() {
        let snippets = split_participants_section("the mentally ill womenfolk", 0);
        assert!(snippets.is_empty());
        let snippets = split_participants_section("12 Women", 0);
        assert_eq!(texts(&snippets), vec!["12 Women"]);
    }

    #[test]
    fn test_window_is_limited_to_max_len() {
        let lead = "x".repeat(150);
        let section = format!("{} 20 participants", lead);
        let snippets = SnippetSplitter::new(30).split(&section, 0);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text.chars().count(), 30);
        assert!(snippets[0].text.ends_with("20 participants"));
        assert_eq!(snippets[0].end, section.len());
    }

    #[test]
    fn test_window_never_cuts_a_parenthetical() {
        let section = "aaaa (a long aside about something) 20 participants";
        let snippets = SnippetSplitter::new(30).split(section, 0);
        // Starting inside the aside would fit; the window jumps past it instead
        assert_eq!(snippets[0].text, " 20 participants");
    }

    #[test]
    fn test_unclosed_parenthesis_stops_the_scan() {
        let section = "12 adults. (an unclosed aside about 20 participants";
        let snippets = split_participants_section(section, 0);
        assert_eq!(texts(&snippets), vec!["12 adults"]);
    }

    #[test]
    fn test_nested_parenthetical_is_attached_whole() {
        let section = "34 patients (aged 20 (SD 3), 5 females) were scanned.";
        let snippets = split_participants_section(section, 0);
        assert_eq!(
            texts(&snippets),
            vec!["34 patients (aged 20 (SD 3), 5 females)"]
        );
    }

    #[test]
    fn test_nested_parenthetical_is_skipped_whole() {
        let section = "a scan (with 3 (sic) males) of 20 adults";
        let snippets = split_participants_section(section, 0);
        assert_eq!(texts(&snippets), vec!["a scan (with 3 (sic) males) of 20 adults"]);
    }

    #[test]
    fn test_window_counts_characters() {
        let section = "±±±±±±±±±± 20 adults";
        let snippets = SnippetSplitter::new(12).split(section, 0);
        assert_eq!(snippets[0].text, "±± 20 adults");
    }
}
