//! Mention grammar
//!
//! Parses a snippet (a short window ending on a participants name) into a
//! [`ParseForest`] holding every valid reading of the two phrasings:
//!
//! ```text
//! participants_inline = number adjective* name [trailing_parenthetical]
//! participants_n      = adjective* name [","] n_value
//! adjective           = WORD ("-" WORD)*
//! ```
//!
//! Text before a mention is skipped, so a reading may start at any token. The
//! mention must end on the snippet's keyword: after the name only the trailing
//! parenthetical attached by the snippet splitter may follow (its content is
//! not examined), or the n value itself. Adjectives exclude number words and function words.
//!
//! Readings are collected per starting token, earliest first; the resolver in
//! [`forest`](super::forest) relies on that order for its last tie-break.

use tracing::trace;

use super::forest::ParseForest;
use crate::demographics::ast::{NodeSpan, Number, ParticipantsGroup, Word, WordKind};
use crate::demographics::error::{GrammarError, GrammarResult};
use crate::demographics::lexing::numbers::n_value_at;
use crate::demographics::lexing::vocabulary::{
    is_function_word, is_number_word, is_participants_name,
};
use crate::demographics::lexing::{number_readings, tokenize, Reading, Token, TokenLocation};

struct MentionGrammar<'a> {
    source: &'a str,
    tokens: Vec<TokenLocation>,
    /// Index of the `(` opening the group that ends the snippet, or the token count
    trailer_start: usize,
    pos_offset: usize,
}

/// Index of the `(` matching a closing `)` in last position.
fn trailer_start(tokens: &[TokenLocation]) -> usize {
    if !matches!(tokens.last(), Some((Token::CloseParen, _))) {
        return tokens.len();
    }
    let mut depth = 0usize;
    for (index, (token, _)) in tokens.iter().enumerate().rev() {
        match token {
            Token::CloseParen => depth += 1,
            Token::OpenParen => {
                depth -= 1;
                if depth == 0 {
                    return index;
                }
            }
            _ => {}
        }
    }
    tokens.len()
}

impl<'a> MentionGrammar<'a> {
    fn new(source: &'a str, pos_offset: usize) -> Self {
        let tokens = tokenize(source);
        Self {
            source,
            trailer_start: trailer_start(&tokens),
            tokens,
            pos_offset,
        }
    }

    fn word(&self, start: usize, end: usize, kind: WordKind) -> Word {
        Word::new(
            NodeSpan::new(self.pos_offset, start, end),
            &self.source[start..end],
            kind,
        )
    }

    fn name_at(&self, index: usize) -> Option<Reading<Word>> {
        match self.tokens.get(index) {
            Some((Token::Word(word), range)) if is_participants_name(word) => Some(Reading {
                node: self.word(range.start, range.end, WordKind::ParticipantsName),
                next: index + 1,
            }),
            _ => None,
        }
    }

    fn qualifying_word_at(&self, index: usize) -> bool {
        matches!(
            self.tokens.get(index),
            Some((Token::Word(word), _)) if !is_function_word(word) && !is_number_word(word)
        )
    }

    fn adjective_at(&self, index: usize) -> Option<Reading<Word>> {
        if !self.qualifying_word_at(index) {
            return None;
        }
        let start = self.tokens[index].1.start;
        let mut end = self.tokens[index].1.end;
        let mut next = index + 1;
        // right-handed, non-smoking, ...
        while matches!(self.tokens.get(next), Some((Token::Hyphen, _)))
            && self.qualifying_word_at(next + 1)
        {
            end = self.tokens[next + 1].1.end;
            next += 2;
        }
        Some(Reading {
            node: self.word(start, end, WordKind::Adjective),
            next,
        })
    }

    /// True when the tokens from `index` on are nothing or the parenthetical
    /// attached by the snippet splitter, whatever it holds.
    fn ends_with_trailer(&self, index: usize) -> bool {
        index == self.trailer_start
    }

    fn inline_mentions(&self, start: usize, out: &mut Vec<ParseForest>) -> GrammarResult<()> {
        for count in number_readings(&self.tokens, start, self.pos_offset)? {
            let mut adjectives: Vec<Word> = Vec::new();
            let mut cursor = count.next;
            loop {
                if let Some(name) = self.name_at(cursor) {
                    if self.ends_with_trailer(name.next) {
                        out.push(ParseForest::Mention(inline_group(
                            count.node.clone(),
                            adjectives.clone(),
                            name.node,
                        )));
                    }
                }
                match self.adjective_at(cursor) {
                    Some(adjective) => {
                        cursor = adjective.next;
                        adjectives.push(adjective.node);
                    }
                    None => break,
                }
            }
        }
        Ok(())
    }

    fn n_value_mentions(&self, start: usize, out: &mut Vec<ParseForest>) -> GrammarResult<()> {
        let mut adjectives: Vec<Word> = Vec::new();
        let mut cursor = start;
        loop {
            if let Some(name) = self.name_at(cursor) {
                let mut value_index = name.next;
                if matches!(self.tokens.get(value_index), Some((Token::Comma, _))) {
                    value_index += 1;
                }
                if let Some(count) = n_value_at(&self.tokens, value_index, self.pos_offset)? {
                    if count.next == self.tokens.len() {
                        out.push(ParseForest::Mention(n_value_group(
                            adjectives.clone(),
                            name.node,
                            count.node,
                        )));
                    }
                }
            }
            match self.adjective_at(cursor) {
                Some(adjective) => {
                    cursor = adjective.next;
                    adjectives.push(adjective.node);
                }
                None => break,
            }
        }
        Ok(())
    }

    fn forest(&self) -> GrammarResult<ParseForest> {
        let mut candidates = Vec::new();
        for start in 0..self.tokens.len() {
            let mut at_start = Vec::new();
            self.inline_mentions(start, &mut at_start)?;
            self.n_value_mentions(start, &mut at_start)?;
            if !at_start.is_empty() {
                candidates.push(ParseForest::ambiguous(at_start));
            }
        }
        if candidates.is_empty() {
            return Err(GrammarError::NoParse(self.source.to_string()));
        }
        Ok(ParseForest::ambiguous(candidates))
    }
}

fn inline_group(count: Number, adjectives: Vec<Word>, name: Word) -> ParticipantsGroup {
    ParticipantsGroup {
        span: count.span.cover(&name.span),
        count,
        adjectives,
        name,
    }
}

fn n_value_group(adjectives: Vec<Word>, name: Word, count: Number) -> ParticipantsGroup {
    let first = adjectives.first().map(|a| a.span).unwrap_or(name.span);
    ParticipantsGroup {
        span: first.cover(&count.span),
        count,
        adjectives,
        name,
    }
}

/// Parse a snippet into all of its mention readings.
///
/// `pos_offset` is the position of the snippet in the document; node spans
/// are relative to the snippet.
pub fn parse_mentions(snippet: &str, pos_offset: usize) -> GrammarResult<ParseForest> {
    let grammar = MentionGrammar::new(snippet, pos_offset);
    let forest = grammar.forest()?;
    trace!(readings = forest.readings(), snippet, "parsed snippet");
    Ok(forest)
}
