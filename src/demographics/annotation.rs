//! Label projection for labelling tools
//!
//! Flattens a [`ParticipantsInfo`] into an ordered list of [`Label`]s:
//!
//! 1. the whole-document summary at `(0, 1)`, when a count was found;
//! 2. for each kept group, its anchor mention, the anchor's details, then the
//!    corroborating mentions and their details tagged `_Mention`;
//! 3. every discarded mention and its details, tagged `_Discarded`.
//!
//! Labelling tools address characters, so the byte offsets used everywhere
//! else are converted through [`CharOffsets`].

use serde::{Deserialize, Serialize};

use super::ast::{DetailedParticipantsGroup, Node};
use super::summarizing::{ParticipantsGroupInfo, ParticipantsInfo};
use super::Extractor;

/// Converts byte offsets of one text into character offsets.
#[derive(Debug, Clone)]
pub struct CharOffsets {
    /// Byte offset where each character starts
    char_starts: Vec<usize>,
}

impl CharOffsets {
    pub fn new(text: &str) -> Self {
        Self {
            char_starts: text.char_indices().map(|(offset, _)| offset).collect(),
        }
    }

    /// Number of characters starting before `byte_offset`.
    pub fn char_offset(&self, byte_offset: usize) -> usize {
        self.char_starts.partition_point(|&start| start < byte_offset)
    }
}

/// One labelled span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub start_char: usize,
    pub end_char: usize,
    pub label_name: String,
    pub extra_data: String,
}

struct LabelWriter<'a> {
    offsets: &'a CharOffsets,
    labels: Vec<Label>,
}

impl LabelWriter<'_> {
    fn push_chars(&mut self, start_char: usize, end_char: usize, label_name: &str, extra: String) {
        self.labels.push(Label {
            start_char,
            end_char,
            label_name: label_name.to_string(),
            extra_data: extra,
        });
    }

    fn push<N: Node + ToString>(&mut self, node: &N, label_name: &str) {
        let start = self.offsets.char_offset(node.abs_start_pos());
        let end = self.offsets.char_offset(node.abs_end_pos());
        self.push_chars(start, end, label_name, node.to_string());
    }

    /// A mention under `tag`, followed by its details under the same tag.
    fn push_tagged(&mut self, mention: &DetailedParticipantsGroup, tag: &str) {
        self.push(mention, tag);
        for detail in &mention.details {
            self.push(detail, tag);
        }
    }

    fn push_group(&mut self, group: &ParticipantsGroupInfo) {
        let Some((anchor, duplicates)) = group.mentions.split_first() else {
            return;
        };
        let start = self.offsets.char_offset(anchor.abs_start_pos());
        let end = self.offsets.char_offset(anchor.abs_end_pos());
        self.push_chars(start, end, "ParticipantsGroupInfo", group.to_string());
        for detail in &anchor.details {
            self.push(detail, detail.kind());
        }
        for duplicate in duplicates {
            self.push_tagged(duplicate, "_Mention");
        }
    }
}

/// Labels of `info`, extracted from `text`.
pub fn participants_to_labels(info: &ParticipantsInfo, text: &str) -> Vec<Label> {
    let offsets = CharOffsets::new(text);
    let mut writer = LabelWriter {
        offsets: &offsets,
        labels: Vec::new(),
    };
    if info.count.is_some() {
        writer.push_chars(0, 1, "ParticipantsInfo", info.to_string());
    }
    for group in &info.groups {
        writer.push_group(group);
    }
    for mention in &info.discarded_group_mentions {
        writer.push_tagged(mention, "_Discarded");
    }
    writer.labels
}

/// An input record: article text plus opaque metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A labelling-tool document: the text checksum, metadata and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub utf8_text_md5_checksum: Option<String>,
    pub metadata: serde_json::Value,
    pub annotations: Vec<Label>,
}

impl AnnotatedDocument {
    pub fn new(document: &Document, info: &ParticipantsInfo) -> Self {
        let utf8_text_md5_checksum = document
            .metadata
            .get("text_md5")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        Self {
            utf8_text_md5_checksum,
            metadata: document.metadata.clone(),
            annotations: participants_to_labels(info, &document.text),
        }
    }
}

impl Extractor {
    /// Labelling-tool document for one record.
    pub fn annotate(&self, document: &Document) -> AnnotatedDocument {
        AnnotatedDocument::new(document, &self.extract(&document.text))
    }
}

/// Annotate every document with one shared extractor.
pub fn annotate_documents<'a, I>(extractor: &Extractor, documents: I) -> Vec<AnnotatedDocument>
where
    I: IntoIterator<Item = &'a Document>,
{
    documents
        .into_iter()
        .map(|document| extractor.annotate(document))
        .collect()
}

/// Document count of each record, `None` where nothing was extracted.
pub fn n_participants_from_documents<'a, I>(extractor: &Extractor, documents: I) -> Vec<Option<u64>>
where
    I: IntoIterator<Item = &'a Document>,
{
    documents
        .into_iter()
        .map(|document| extractor.extract(&document.text).count)
        .collect()
}
