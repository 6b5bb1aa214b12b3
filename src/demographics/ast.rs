//! Span-tracked nodes produced by the grammars
//!
//! Every node is parsed out of a small piece of text (a snippet or a
//! parenthetical) and records its offsets relative to that piece together with
//! the piece's own offset in the document. The absolute offsets are derived,
//! never stored, so `abs_start_pos == pos_offset + start_pos` holds for every
//! node by construction.
//!
//! ## Types
//!
//! - [`NodeSpan`] - relative span plus the offset of the parsed piece
//! - [`Number`] - a count, tagged [`NumberKind::NValue`] for `(n = 34)` forms
//! - [`Word`] - a lowercased adjective or participants name
//! - [`ParticipantsGroup`] - one mention: count, adjectives, name
//! - [`ParticipantsDetailsEntry`] - sex sub-counts and age statistics
//! - [`DetailedParticipantsGroup`] - a mention with its details and section
//!
//! All offsets are byte offsets into UTF-8 text.

use std::fmt;

/// Location of a node: offsets relative to the parsed piece plus the piece's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeSpan {
    pos_offset: usize,
    start_pos: usize,
    end_pos: usize,
}

impl NodeSpan {
    pub fn new(pos_offset: usize, start_pos: usize, end_pos: usize) -> Self {
        debug_assert!(start_pos <= end_pos, "span {}..{} is reversed", start_pos, end_pos);
        Self {
            pos_offset,
            start_pos,
            end_pos,
        }
    }

    pub fn pos_offset(&self) -> usize {
        self.pos_offset
    }

    pub fn start_pos(&self) -> usize {
        self.start_pos
    }

    pub fn end_pos(&self) -> usize {
        self.end_pos
    }

    pub fn abs_start_pos(&self) -> usize {
        self.pos_offset + self.start_pos
    }

    pub fn abs_end_pos(&self) -> usize {
        self.pos_offset + self.end_pos
    }

    /// Smallest span covering both, in the coordinates of `self`.
    pub fn cover(&self, other: &NodeSpan) -> NodeSpan {
        debug_assert_eq!(self.pos_offset, other.pos_offset);
        NodeSpan::new(
            self.pos_offset,
            self.start_pos.min(other.start_pos),
            self.end_pos.max(other.end_pos),
        )
    }
}

/// Behaviour shared by every node.
pub trait Node {
    fn span(&self) -> NodeSpan;

    /// Name of the node kind, used in display strings and annotation labels.
    fn kind(&self) -> &'static str;

    fn description(&self) -> String {
        let span = self.span();
        format!("({}, {})", span.abs_start_pos(), span.abs_end_pos())
    }

    fn abs_start_pos(&self) -> usize {
        self.span().abs_start_pos()
    }

    fn abs_end_pos(&self) -> usize {
        self.span().abs_end_pos()
    }
}

/// Implements `Display` as `<Kind: description>`.
macro_rules! display_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "<{}: {}>", self.kind(), self.description())
                }
            }
        )*
    };
}

/// Formats floats the way the labelling tool expects (`12.0`, not `12`).
pub(crate) fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    /// Digits or number words
    Plain,
    /// Parenthetical `(n = 34)` form
    NValue,
}

/// An integer count with its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    pub span: NodeSpan,
    pub value: u64,
    pub kind: NumberKind,
}

impl Number {
    pub fn new(span: NodeSpan, value: u64) -> Self {
        Self {
            span,
            value,
            kind: NumberKind::Plain,
        }
    }

    pub fn n_value(span: NodeSpan, value: u64) -> Self {
        Self {
            span,
            value,
            kind: NumberKind::NValue,
        }
    }

    pub fn is_n_value(&self) -> bool {
        self.kind == NumberKind::NValue
    }
}

impl Node for Number {
    fn span(&self) -> NodeSpan {
        self.span
    }

    fn kind(&self) -> &'static str {
        match self.kind {
            NumberKind::Plain => "Number",
            NumberKind::NValue => "NValue",
        }
    }

    fn description(&self) -> String {
        self.value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordKind {
    Adjective,
    ParticipantsName,
}

/// A lowercased literal: an adjective or the participants name of a mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub span: NodeSpan,
    pub value: String,
    pub kind: WordKind,
}

impl Word {
    pub fn new(span: NodeSpan, raw_value: &str, kind: WordKind) -> Self {
        Self {
            span,
            value: raw_value.to_lowercase(),
            kind,
        }
    }
}

impl Node for Word {
    fn span(&self) -> NodeSpan {
        self.span
    }

    fn kind(&self) -> &'static str {
        match self.kind {
            WordKind::Adjective => "Adjective",
            WordKind::ParticipantsName => "ParticipantsName",
        }
    }

    fn description(&self) -> String {
        self.value.clone()
    }
}

/// One mention of a participants group, e.g. "20 healthy patients".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantsGroup {
    pub span: NodeSpan,
    pub count: Number,
    pub adjectives: Vec<Word>,
    pub name: Word,
}

impl Node for ParticipantsGroup {
    fn span(&self) -> NodeSpan {
        self.span
    }

    fn kind(&self) -> &'static str {
        "ParticipantsGroup"
    }

    fn description(&self) -> String {
        let adjectives: Vec<&str> = self.adjectives.iter().map(|a| a.value.as_str()).collect();
        format!(
            "{} {} {}",
            self.count.value,
            adjectives.join(" "),
            self.name.value
        )
    }
}

/// `N NAME` sub-count inside a parenthetical, e.g. "8 males".
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantsSubGroup {
    pub span: NodeSpan,
    pub count: u64,
    pub name: String,
}

/// Mean age with an optional standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeMoments {
    pub span: NodeSpan,
    pub mean: f64,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgeMedian {
    pub span: NodeSpan,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgeRange {
    pub span: NodeSpan,
    pub low: f64,
    pub high: f64,
}

/// A recognized qualifier from a parenthetical following a mention.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticipantsDetailsEntry {
    SubGroup(ParticipantsSubGroup),
    AgeMoments(AgeMoments),
    AgeMedian(AgeMedian),
    AgeRange(AgeRange),
}

impl Node for ParticipantsDetailsEntry {
    fn span(&self) -> NodeSpan {
        match self {
            ParticipantsDetailsEntry::SubGroup(entry) => entry.span,
            ParticipantsDetailsEntry::AgeMoments(entry) => entry.span,
            ParticipantsDetailsEntry::AgeMedian(entry) => entry.span,
            ParticipantsDetailsEntry::AgeRange(entry) => entry.span,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ParticipantsDetailsEntry::SubGroup(_) => "ParticipantsSubGroup",
            ParticipantsDetailsEntry::AgeMoments(_) => "AgeMoments",
            ParticipantsDetailsEntry::AgeMedian(_) => "AgeMedian",
            ParticipantsDetailsEntry::AgeRange(_) => "AgeRange",
        }
    }

    fn description(&self) -> String {
        match self {
            ParticipantsDetailsEntry::SubGroup(entry) => format!("{} {}", entry.count, entry.name),
            ParticipantsDetailsEntry::AgeMoments(entry) => match entry.std {
                Some(std) => format!("{} ± {}", format_float(entry.mean), format_float(std)),
                None => format_float(entry.mean),
            },
            ParticipantsDetailsEntry::AgeMedian(entry) => format_float(entry.median),
            ParticipantsDetailsEntry::AgeRange(entry) => {
                format!("{} – {}", format_float(entry.low), format_float(entry.high))
            }
        }
    }
}

/// A resolved mention together with the details found after it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedParticipantsGroup {
    pub group: ParticipantsGroup,
    pub details: Vec<ParticipantsDetailsEntry>,
    pub section_name: String,
}

impl DetailedParticipantsGroup {
    pub fn new(
        group: ParticipantsGroup,
        details: Vec<ParticipantsDetailsEntry>,
        section_name: impl Into<String>,
    ) -> Self {
        Self {
            group,
            details,
            section_name: section_name.into(),
        }
    }

    pub fn count(&self) -> u64 {
        self.group.count.value
    }

    pub fn name(&self) -> &str {
        &self.group.name.value
    }

    pub fn adjectives(&self) -> &[Word] {
        &self.group.adjectives
    }
}

impl Node for DetailedParticipantsGroup {
    fn span(&self) -> NodeSpan {
        self.group.span
    }

    fn kind(&self) -> &'static str {
        "DetailedParticipantsGroup"
    }

    fn description(&self) -> String {
        let details: Vec<String> = self.details.iter().map(ToString::to_string).collect();
        format!("{} [{}]", self.group.description(), details.join(", "))
    }
}

display_node!(
    Number,
    Word,
    ParticipantsGroup,
    ParticipantsDetailsEntry,
    DetailedParticipantsGroup,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn patients_group() -> ParticipantsGroup {
        // "20 healthy patients" parsed from a snippet starting at byte 100
        let count = Number::new(NodeSpan::new(100, 0, 2), 20);
        let adjective = Word::new(NodeSpan::new(100, 3, 10), "Healthy", WordKind::Adjective);
        let name = Word::new(
            NodeSpan::new(100, 11, 19),
            "patients",
            WordKind::ParticipantsName,
        );
        ParticipantsGroup {
            span: count.span.cover(&name.span),
            count,
            adjectives: vec![adjective],
            name,
        }
    }

    #[test]
    fn test_absolute_positions_are_derived() {
        let span = NodeSpan::new(40, 3, 9);
        assert_eq!(span.abs_start_pos(), 43);
        assert_eq!(span.abs_end_pos(), 49);
        assert_eq!(span.start_pos(), 3);
        assert_eq!(span.pos_offset(), 40);
    }

    #[test]
    fn test_cover_spans_both_nodes() {
        let group = patients_group();
        assert_eq!(group.span.start_pos(), 0);
        assert_eq!(group.span.end_pos(), 19);
        assert_eq!(group.abs_start_pos(), 100);
        assert_eq!(group.abs_end_pos(), 119);
    }

    #[test]
    fn test_words_are_lowercased() {
        let group = patients_group();
        assert_eq!(group.adjectives[0].value, "healthy");
        assert_eq!(group.adjectives[0].to_string(), "<Adjective: healthy>");
    }

    #[test]
    fn test_display_forms() {
        let group = patients_group();
        assert_eq!(
            group.to_string(),
            "<ParticipantsGroup: 20 healthy patients>"
        );

        let details = vec![
            ParticipantsDetailsEntry::SubGroup(ParticipantsSubGroup {
                span: NodeSpan::new(120, 1, 8),
                count: 8,
                name: "males".into(),
            }),
            ParticipantsDetailsEntry::AgeRange(AgeRange {
                span: NodeSpan::new(120, 10, 17),
                low: 12.0,
                high: 89.0,
            }),
        ];
        let detailed = DetailedParticipantsGroup::new(group, details, "Participants");
        assert_eq!(
            detailed.to_string(),
            "<DetailedParticipantsGroup: 20 healthy patients \
             [<ParticipantsSubGroup: 8 males>, <AgeRange: 12.0 – 89.0>]>"
        );
    }

    #[test]
    fn test_n_value_kind() {
        let number = Number::n_value(NodeSpan::new(0, 9, 17), 34);
        assert!(number.is_n_value());
        assert_eq!(number.to_string(), "<NValue: 34>");
    }

    #[test]
    fn test_age_moments_description() {
        let entry = ParticipantsDetailsEntry::AgeMoments(AgeMoments {
            span: NodeSpan::new(0, 0, 11),
            mean: 34.2,
            std: Some(6.1),
        });
        assert_eq!(entry.description(), "34.2 ± 6.1");
    }
}
