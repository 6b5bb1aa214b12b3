//! Participant demographics extraction
//!
//! The pipeline, leaves first:
//!
//! - [`lexing`]: logos tokens and the number-word lexicon
//! - [`parsing`]: mention forest and resolver, parenthetical details
//! - [`locating`]: participants sections and snippets of an article
//! - [`reading`]: the per-document loop producing detailed mentions
//! - [`summarizing`]: reconciliation into one [`ParticipantsInfo`]
//! - [`annotation`]: label projection for labelling tools
//!
//! [`Extractor`] ties reading and summarizing together. It owns every compiled
//! pattern, so one instance serves any number of documents, from any number of
//! threads.

pub mod annotation;
pub mod ast;
pub mod config;
pub mod error;
pub mod lexing;
pub mod locating;
pub mod parsing;
pub mod reading;
pub mod summarizing;

pub use self::config::{DemographicsConfig, Loader, ReaderConfig};
pub use ast::{DetailedParticipantsGroup, ParticipantsDetailsEntry, ParticipantsGroup};
pub use error::{DemographicsError, GrammarError, GrammarResult};
pub use reading::Reader;
pub use summarizing::{summarize, ParticipantType, ParticipantsGroupInfo, ParticipantsInfo};

/// Reads and summarizes documents.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    reader: Reader,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            reader: Reader::new(config),
        }
    }

    pub fn reader(&self) -> &Reader {
        &self.reader
    }

    /// Demographics of one article.
    pub fn extract(&self, text: &str) -> ParticipantsInfo {
        summarize(&self.reader.extract_from_text(text))
    }
}

/// Document participant count of each text, `None` where nothing was found.
pub fn n_participants_from_texts<I, S>(texts: I) -> Vec<Option<u64>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let extractor = Extractor::new();
    texts
        .into_iter()
        .map(|text| extractor.extract(text.as_ref()).count)
        .collect()
}
