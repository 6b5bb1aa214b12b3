//! Section locator
//!
//! A section starts after a heading line (`#`, `##`, ...) whose title mentions
//! participants, subjects, patients, the population or the abstract. It ends at
//! the next heading of the same or a shallower level, or at the end of the
//! text, so nested subsections belong to their parent. The search for the next
//! section resumes where the previous one ended.

use regex::Regex;

use crate::demographics::lexing::vocabulary::PARTICIPANTS_SECTIONS;

/// A region of the article worth examining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    /// Heading text without the `#` markers, trimmed
    pub title: &'a str,
    /// Content between the heading line and the end of the section
    pub text: &'a str,
    /// Byte offset of `text` in the article
    pub start: usize,
    /// Byte offset where `text` ends in the article
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct SectionLocator {
    participants_heading: Regex,
    any_heading: Regex,
}

impl SectionLocator {
    pub fn new() -> Self {
        let participants_heading = Regex::new(&format!(
            r"(?im)^(#+) (.*{}.*)$",
            PARTICIPANTS_SECTIONS
        ))
        .expect("participants heading pattern is valid");
        let any_heading = Regex::new(r"(?m)^(#+) ").expect("heading pattern is valid");
        Self {
            participants_heading,
            any_heading,
        }
    }

    /// Start of the first heading at `level` or shallower, from `from` on.
    fn next_heading(&self, text: &str, from: usize, level: usize) -> Option<usize> {
        let mut position = from;
        while let Some(captures) = self.any_heading.captures_at(text, position) {
            let heading = captures.get(0)?;
            if captures.get(1)?.len() <= level {
                return Some(heading.start());
            }
            position = heading.end();
        }
        None
    }

    /// Every participants section of `text`, in document order.
    pub fn locate<'a>(&self, text: &'a str) -> Vec<Section<'a>> {
        let mut sections = Vec::new();
        let mut position = 0;
        while position < text.len() {
            let Some(captures) = self.participants_heading.captures_at(text, position) else {
                break;
            };
            let (Some(heading), Some(markers), Some(title)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                break;
            };
            let start = heading.end();
            let end = self
                .next_heading(text, start, markers.len())
                .unwrap_or(text.len());
            sections.push(Section {
                title: title.as_str().trim(),
                text: &text[start..end],
                start,
                end,
            });
            // An empty section at the end of the text would not advance
            position = end.max(start + 1);
        }
        sections
    }
}

impl Default for SectionLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Locate participants sections with a fresh [`SectionLocator`].
pub fn get_participants_sections(text: &str) -> Vec<Section<'_>> {
    SectionLocator::new().locate(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "# A study of pain\n\
        Intro text.\n\
        ## Abstract\n\
        We scanned 20 patients.\n\
        ## Methods\n\
        ### Participants\n\
        Twenty patients took part.\n\
        #### Exclusion criteria\n\
        Five were excluded.\n\
        ### Imaging\n\
        Scanner details.\n\
        ## Results\n";

    #[test]
    fn test_sections_in_document_order() {
        let sections = get_participants_sections(ARTICLE);
        let titles: Vec<&str> = sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Abstract", "Participants"]);
        assert_eq!(sections[0].text, "\nWe scanned 20 patients.\n");
    }

    #[test]
    fn test_nested_subsections_belong_to_parent() {
        let sections = get_participants_sections(ARTICLE);
        let participants = &sections[1];
        assert_eq!(
            participants.text,
            "\nTwenty patients took part.\n#### Exclusion criteria\nFive were excluded.\n"
        );
        assert_eq!(&ARTICLE[participants.start..participants.end], participants.text);
    }

    #[test]
    fn test_last_section_runs_to_end_of_text() {
        let text = "# Intro\nfoo\n## Study population and design\n30 adults";
        let sections = get_participants_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Study population and design");
        assert_eq!(sections[0].text, "\n30 adults");
        assert_eq!(sections[0].end, text.len());
    }

    #[test]
    fn test_heading_match_is_case_insensitive() {
        let sections = get_participants_sections("## SUBJECTS\n12 men\n## Other\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "SUBJECTS");
    }

    #[test]
    fn test_no_headings_means_no_sections() {
        assert!(get_participants_sections("20 participants took part").is_empty());
        assert!(get_participants_sections("").is_empty());
        // The marker must be followed by a space
        assert!(get_participants_sections("#Participants\n20 adults").is_empty());
    }

    #[test]
    fn test_empty_trailing_section() {
        let sections = get_participants_sections("# Abstract");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].text, "");
    }
}
