//! Ambiguous parse forests and their resolution
//!
//! The mention grammar keeps every valid reading of a snippet. [`resolve`]
//! collapses the forest bottom-up: among the resolved children of an
//! ambiguity node it keeps the mention whose count ends last, and among those
//! the one whose count starts first. Remaining ties go to the earliest child,
//! which the grammar orders by mention start.

use std::cmp::Reverse;

use crate::demographics::ast::ParticipantsGroup;
use crate::demographics::error::{GrammarError, GrammarResult};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseForest {
    /// A complete reading
    Mention(ParticipantsGroup),
    /// Competing readings of the same text
    Ambiguous(Vec<ParseForest>),
}

impl ParseForest {
    /// Wrap alternatives, collapsing a single alternative into itself.
    pub fn ambiguous(mut children: Vec<ParseForest>) -> ParseForest {
        if children.len() == 1 {
            children.remove(0)
        } else {
            ParseForest::Ambiguous(children)
        }
    }

    /// Number of complete readings in the forest.
    pub fn readings(&self) -> usize {
        match self {
            ParseForest::Mention(_) => 1,
            ParseForest::Ambiguous(children) => children.iter().map(ParseForest::readings).sum(),
        }
    }

    /// Every complete reading, in forest order.
    pub fn mentions(&self) -> Vec<&ParticipantsGroup> {
        match self {
            ParseForest::Mention(group) => vec![group],
            ParseForest::Ambiguous(children) => {
                children.iter().flat_map(ParseForest::mentions).collect()
            }
        }
    }
}

/// Collapse a forest into one concrete mention.
pub fn resolve(forest: &ParseForest) -> GrammarResult<ParticipantsGroup> {
    match forest {
        ParseForest::Mention(group) => Ok(group.clone()),
        ParseForest::Ambiguous(children) => {
            let resolved = children
                .iter()
                .map(resolve)
                .collect::<GrammarResult<Vec<_>>>()?;
            // min_by_key keeps the first of equal keys
            resolved
                .into_iter()
                .min_by_key(|group| {
                    (
                        Reverse(group.count.span.end_pos()),
                        group.count.span.start_pos(),
                    )
                })
                .ok_or(GrammarError::EmptyForest)
        }
    }
}
