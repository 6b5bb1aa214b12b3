//! Per-document extraction
//!
//! The [`Reader`] walks an article section by section. Each section is cut
//! into snippets, each snippet is parsed into a forest and resolved into one
//! mention. Details are then read from the parentheticals between a mention's
//! start and the end of the next mention of the same section (or the section
//! end for the last one), bounded by `max_details_len` characters.
//!
//! Grammar failures are local: a snippet or parenthetical that does not parse
//! is logged at debug level and contributes nothing.

use regex::Regex;
use tracing::debug;

use super::ast::{DetailedParticipantsGroup, Node, ParticipantsDetailsEntry, ParticipantsGroup};
use super::config::ReaderConfig;
use super::locating::{
    forward_chars, Section, SectionLocator, SnippetSplitter, PARENTHETICAL_PATTERN,
};
use super::parsing::{parse_details, parse_mentions, resolve};

/// Compiled locators and window settings, built once and reused for every document.
#[derive(Debug, Clone)]
pub struct Reader {
    config: ReaderConfig,
    sections: SectionLocator,
    snippets: SnippetSplitter,
    parenthetical: Regex,
}

impl Reader {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            sections: SectionLocator::new(),
            snippets: SnippetSplitter::new(config.max_snippet_len),
            parenthetical: Regex::new(PARENTHETICAL_PATTERN)
                .expect("parenthetical pattern is valid"),
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Detail entries of every parenthetical in `text[start_pos..end_pos]`.
    ///
    /// The window is cut to `max_details_len` characters after `start_pos`.
    pub fn extract_details(
        &self,
        text: &str,
        start_pos: usize,
        end_pos: usize,
    ) -> Vec<ParticipantsDetailsEntry> {
        let end_pos = end_pos
            .min(forward_chars(text, start_pos, self.config.max_details_len))
            .min(text.len());
        if end_pos <= start_pos {
            return Vec::new();
        }

        let mut details = Vec::new();
        for found in self.parenthetical.find_iter(&text[start_pos..end_pos]) {
            match parse_details(found.as_str(), start_pos + found.start()) {
                Ok(entries) => details.extend(entries),
                Err(error) => debug!(%error, "skipping parenthetical"),
            }
        }
        details
    }

    fn extract_mentions(&self, section: &Section<'_>) -> Vec<ParticipantsGroup> {
        let mut mentions = Vec::new();
        for snippet in self.snippets.split(section.text, section.start) {
            match parse_mentions(snippet.text, snippet.start).and_then(|forest| resolve(&forest)) {
                Ok(mention) => mentions.push(mention),
                Err(error) => debug!(%error, start = snippet.start, "skipping snippet"),
            }
        }
        mentions
    }

    /// Every mention of every participants section, with its details.
    pub fn extract_from_text(&self, text: &str) -> Vec<DetailedParticipantsGroup> {
        let mut result = Vec::new();
        for section in self.sections.locate(text) {
            let mentions = self.extract_mentions(&section);
            debug!(
                section = section.title,
                mentions = mentions.len(),
                "read section"
            );

            let ends: Vec<usize> = mentions
                .iter()
                .skip(1)
                .map(Node::abs_end_pos)
                .chain(std::iter::once(section.end))
                .collect();
            for (mention, end_pos) in mentions.into_iter().zip(ends) {
                let details = self.extract_details(text, mention.abs_start_pos(), end_pos);
                result.push(DetailedParticipantsGroup::new(
                    mention,
                    details,
                    section.title,
                ));
            }
        }
        result
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}
