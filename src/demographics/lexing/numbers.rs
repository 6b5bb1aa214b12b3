//! Number lexicon
//!
//! Turns digit runs and English number phrases into [`Number`] nodes. The
//! productions, all case-insensitive, are:
//!
//! ```text
//! number         = INT | hundred_number | dozen_number | UNIT
//! dozen_number   = TEEN | DOZEN ["-"] [UNIT]
//! hundred_number = (UNIT | TEEN) "hundred" [["and"] (dozen_number | UNIT)]
//! n_value        = ["("] "n" ("=" | ":") INT [")"]
//! ```
//!
//! Word values come from their position in the closed lists of
//! [`vocabulary`](super::vocabulary). A phrase may be read in several ways
//! ("twenty-six" is also "twenty" followed by "-six"), so the lexicon returns
//! every reading that starts at a token and leaves the choice to the resolver.

use super::tokens::Token;
use super::vocabulary::{DOZEN_NAMES, TEEN_NAMES, UNIT_NAMES};
use super::{tokenize, TokenLocation};
use crate::demographics::ast::{NodeSpan, Number};
use crate::demographics::error::{GrammarError, GrammarResult};

/// A node parsed from a token slice, with the index of the first token after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading<T> {
    pub node: T,
    pub next: usize,
}

fn word_at(tokens: &[TokenLocation], index: usize) -> Option<&str> {
    match tokens.get(index) {
        Some((Token::Word(word), _)) => Some(word.as_str()),
        _ => None,
    }
}

fn is_word_at(tokens: &[TokenLocation], index: usize, expected: &str) -> bool {
    word_at(tokens, index) == Some(expected)
}

/// Single-word number from one of the closed lists: `value = scale * index + base`.
fn listed_at(
    tokens: &[TokenLocation],
    index: usize,
    pos_offset: usize,
    list: &[&str],
    scale: u64,
    base: u64,
) -> Option<Reading<Number>> {
    let word = word_at(tokens, index)?;
    let position = list.iter().position(|candidate| *candidate == word)?;
    let range = &tokens[index].1;
    Some(Reading {
        node: Number::new(
            NodeSpan::new(pos_offset, range.start, range.end),
            scale * position as u64 + base,
        ),
        next: index + 1,
    })
}

fn unit_at(tokens: &[TokenLocation], index: usize, pos_offset: usize) -> Option<Reading<Number>> {
    listed_at(tokens, index, pos_offset, &UNIT_NAMES, 1, 0)
}

fn teen_at(tokens: &[TokenLocation], index: usize, pos_offset: usize) -> Option<Reading<Number>> {
    listed_at(tokens, index, pos_offset, &TEEN_NAMES, 1, 10)
}

fn dozen_at(tokens: &[TokenLocation], index: usize, pos_offset: usize) -> Option<Reading<Number>> {
    // "zero" and "ten" head the list only to keep indices aligned with values
    listed_at(tokens, index, pos_offset, &DOZEN_NAMES, 10, 0).filter(|r| r.node.value >= 20)
}

/// Adds `rest` to `head`, spanning from the start of `head` to the end of `rest`.
fn compose(head: &Number, head_value: u64, rest: &Reading<Number>) -> Reading<Number> {
    let span = head.span.cover(&rest.node.span);
    Reading {
        node: Number::new(span, head_value + rest.node.value),
        next: rest.next,
    }
}

fn dozen_numbers(tokens: &[TokenLocation], index: usize, pos_offset: usize) -> Vec<Reading<Number>> {
    if let Some(teen) = teen_at(tokens, index, pos_offset) {
        return vec![teen];
    }
    let Some(dozen) = dozen_at(tokens, index, pos_offset) else {
        return Vec::new();
    };
    let mut unit_index = dozen.next;
    if matches!(tokens.get(unit_index), Some((Token::Hyphen, _))) {
        unit_index += 1;
    }
    let composed = unit_at(tokens, unit_index, pos_offset)
        .map(|unit| compose(&dozen.node, dozen.node.value, &unit));

    let mut readings = vec![dozen];
    readings.extend(composed);
    readings
}

fn hundred_numbers(
    tokens: &[TokenLocation],
    index: usize,
    pos_offset: usize,
) -> Vec<Reading<Number>> {
    let Some(head) = unit_at(tokens, index, pos_offset).or_else(|| teen_at(tokens, index, pos_offset))
    else {
        return Vec::new();
    };
    if !is_word_at(tokens, head.next, "hundred") {
        return Vec::new();
    }

    let hundred_range = &tokens[head.next].1;
    let value = 100 * head.node.value;
    let hundreds = Number::new(
        NodeSpan::new(pos_offset, head.node.span.start_pos(), hundred_range.end),
        value,
    );

    let mut rest_index = head.next + 1;
    if is_word_at(tokens, rest_index, "and") {
        rest_index += 1;
    }
    let mut rests = dozen_numbers(tokens, rest_index, pos_offset);
    rests.extend(unit_at(tokens, rest_index, pos_offset));

    let mut readings: Vec<Reading<Number>> = rests
        .iter()
        .map(|rest| compose(&hundreds, value, rest))
        .collect();
    readings.push(Reading {
        node: hundreds,
        next: head.next + 1,
    });
    readings
}

/// Every number reading that starts at `tokens[index]`.
///
/// A digit run too large for a count is an error for the whole snippet, not
/// just for this reading.
pub fn number_readings(
    tokens: &[TokenLocation],
    index: usize,
    pos_offset: usize,
) -> GrammarResult<Vec<Reading<Number>>> {
    match tokens.get(index) {
        Some((Token::Integer(digits), range)) => {
            let value = digits
                .parse::<u64>()
                .map_err(|_| GrammarError::NumberOverflow(digits.clone()))?;
            Ok(vec![Reading {
                node: Number::new(NodeSpan::new(pos_offset, range.start, range.end), value),
                next: index + 1,
            }])
        }
        Some((Token::Word(_), _)) => {
            let mut readings = hundred_numbers(tokens, index, pos_offset);
            readings.extend(dozen_numbers(tokens, index, pos_offset));
            readings.extend(unit_at(tokens, index, pos_offset));
            Ok(readings)
        }
        _ => Ok(Vec::new()),
    }
}

/// `(n = 34)` or `n = 34`, read as an [`NValue`](crate::demographics::ast::NumberKind::NValue).
pub fn n_value_at(
    tokens: &[TokenLocation],
    index: usize,
    pos_offset: usize,
) -> GrammarResult<Option<Reading<Number>>> {
    let Some((_, first)) = tokens.get(index) else {
        return Ok(None);
    };
    let parenthesized = matches!(tokens[index].0, Token::OpenParen);
    let mut cursor = if parenthesized { index + 1 } else { index };

    if !is_word_at(tokens, cursor, "n") {
        return Ok(None);
    }
    cursor += 1;
    if !matches!(tokens.get(cursor), Some((Token::Equals | Token::Colon, _))) {
        return Ok(None);
    }
    cursor += 1;
    let Some((Token::Integer(digits), digits_range)) = tokens.get(cursor) else {
        return Ok(None);
    };
    let mut end = digits_range.end;
    cursor += 1;
    if parenthesized {
        match tokens.get(cursor) {
            Some((Token::CloseParen, close)) => {
                end = close.end;
                cursor += 1;
            }
            _ => return Ok(None),
        }
    }

    let value = digits
        .parse::<u64>()
        .map_err(|_| GrammarError::NumberOverflow(digits.clone()))?;
    Ok(Some(Reading {
        node: Number::n_value(NodeSpan::new(pos_offset, first.start, end), value),
        next: cursor,
    }))
}

/// Parse text that is exactly one number, e.g. "one hundred and twelve".
pub fn parse_number(text: &str) -> GrammarResult<Number> {
    let tokens = tokenize(text);
    number_readings(&tokens, 0, 0)?
        .into_iter()
        .find(|reading| reading.next == tokens.len() && !tokens.is_empty())
        .map(|reading| reading.node)
        .ok_or_else(|| GrammarError::NoParse(text.to_string()))
}
