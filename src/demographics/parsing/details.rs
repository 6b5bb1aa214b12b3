//! Parenthetical details
//!
//! A parenthetical following a mention is split into items on `,`, `;` and
//! the word "and"; every item is parsed on its own against, in order:
//!
//! ```text
//! age_range   = filler* NUM ("-" | "–" | "—" | "to") NUM trailer*
//! age_moments = filler* NUM "±" NUM trailer*
//! age_median  = filler* NUM trailer*          (filler contains "median")
//! sub_group   = INT WORD (WORD | "-")*        (no age keyword)
//! age_mean    = filler* NUM trailer*          (an age keyword, no "median")
//! ```
//!
//! where `filler` is a word, `=` or `:`, and `trailer` is a filler or any
//! other punctuation. Items matching none of these are dropped. The grammar is
//! not ambiguous: the first alternative that consumes the whole item wins.

use chumsky::{prelude::*, Stream};
use std::ops::Range;
use tracing::trace;

use crate::demographics::ast::{
    AgeMedian, AgeMoments, AgeRange, NodeSpan, ParticipantsDetailsEntry, ParticipantsSubGroup,
};
use crate::demographics::error::{GrammarError, GrammarResult};
use crate::demographics::lexing::vocabulary::AGE_KEYWORDS;
use crate::demographics::lexing::{tokenize, Token, TokenLocation};

type ParserError = Simple<TokenLocation>;

/// A value paired with the byte range it was read from
type Located<T> = (T, Range<usize>);

fn is_filler(token: &Token) -> bool {
    matches!(token, Token::Word(_) | Token::Equals | Token::Colon)
}

fn leading_filler() -> impl Parser<TokenLocation, Vec<TokenLocation>, Error = ParserError> + Clone {
    filter::<TokenLocation, _, ParserError>(|(token, _): &TokenLocation| is_filler(token))
        .repeated()
}

fn trailing_filler() -> impl Parser<TokenLocation, Vec<TokenLocation>, Error = ParserError> + Clone
{
    filter::<TokenLocation, _, ParserError>(|(token, _): &TokenLocation| {
        is_filler(token) || matches!(token, Token::Punctuation)
    })
    .repeated()
}

fn number() -> impl Parser<TokenLocation, Located<f64>, Error = ParserError> + Clone {
    filter_map::<TokenLocation, Located<f64>, _, ParserError>(
        |span, (token, range): TokenLocation| match token {
            Token::Integer(ref digits) | Token::Decimal(ref digits) => digits
                .parse::<f64>()
                .map(|value| (value, range.clone()))
                .map_err(|_| Simple::custom(span, format!("not a number: {}", digits))),
            other => Err(Simple::expected_input_found(
                span,
                Vec::new(),
                Some((other, range)),
            )),
        },
    )
}

fn integer() -> impl Parser<TokenLocation, Located<u64>, Error = ParserError> + Clone {
    filter_map::<TokenLocation, Located<u64>, _, ParserError>(
        |span, (token, range): TokenLocation| match token {
            Token::Integer(ref digits) => digits
                .parse::<u64>()
                .map(|value| (value, range.clone()))
                .map_err(|_| Simple::custom(span, format!("number too large: {}", digits))),
            other => Err(Simple::expected_input_found(
                span,
                Vec::new(),
                Some((other, range)),
            )),
        },
    )
}

fn word() -> impl Parser<TokenLocation, Located<String>, Error = ParserError> + Clone {
    filter_map::<TokenLocation, Located<String>, _, ParserError>(
        |span, (token, range): TokenLocation| match token {
            Token::Word(value) => Ok((value, range)),
            other => Err(Simple::expected_input_found(
                span,
                Vec::new(),
                Some((other, range)),
            )),
        },
    )
}

fn range_separator() -> impl Parser<TokenLocation, (), Error = ParserError> + Clone {
    filter::<TokenLocation, _, ParserError>(|(token, _): &TokenLocation| {
        matches!(token, Token::Hyphen | Token::Dash) || token.is_word("to")
    })
    .ignored()
}

fn plus_minus() -> impl Parser<TokenLocation, (), Error = ParserError> + Clone {
    filter::<TokenLocation, _, ParserError>(|(token, _): &TokenLocation| {
        matches!(token, Token::PlusMinus)
    })
    .ignored()
}

fn words(tokens: &[TokenLocation]) -> impl Iterator<Item = &str> {
    tokens.iter().filter_map(|(token, _)| match token {
        Token::Word(value) => Some(value.as_str()),
        _ => None,
    })
}

fn age_range(
    pos_offset: usize,
) -> impl Parser<TokenLocation, ParticipantsDetailsEntry, Error = ParserError> + Clone {
    leading_filler()
        .ignore_then(number())
        .then_ignore(range_separator())
        .then(number())
        .then_ignore(trailing_filler())
        .then_ignore(end())
        .map(move |((low, low_range), (high, high_range))| {
            ParticipantsDetailsEntry::AgeRange(AgeRange {
                span: NodeSpan::new(pos_offset, low_range.start, high_range.end),
                low,
                high,
            })
        })
}

fn age_moments(
    pos_offset: usize,
) -> impl Parser<TokenLocation, ParticipantsDetailsEntry, Error = ParserError> + Clone {
    leading_filler()
        .ignore_then(number())
        .then_ignore(plus_minus())
        .then(number())
        .then_ignore(trailing_filler())
        .then_ignore(end())
        .map(move |((mean, mean_range), (std, std_range))| {
            ParticipantsDetailsEntry::AgeMoments(AgeMoments {
                span: NodeSpan::new(pos_offset, mean_range.start, std_range.end),
                mean,
                std: Some(std),
            })
        })
}

fn age_median(
    pos_offset: usize,
) -> impl Parser<TokenLocation, ParticipantsDetailsEntry, Error = ParserError> + Clone {
    leading_filler()
        .then(number())
        .then_ignore(trailing_filler())
        .then_ignore(end())
        .try_map(move |(leading, (median, range)), span| {
            if !words(&leading).any(|word| word == "median") {
                return Err(Simple::custom(span, "no median keyword"));
            }
            Ok(ParticipantsDetailsEntry::AgeMedian(AgeMedian {
                span: NodeSpan::new(pos_offset, range.start, range.end),
                median,
            }))
        })
}

fn sub_group(
    pos_offset: usize,
) -> impl Parser<TokenLocation, ParticipantsDetailsEntry, Error = ParserError> + Clone {
    let name_part = filter::<TokenLocation, _, ParserError>(|(token, _): &TokenLocation| {
        matches!(token, Token::Word(_) | Token::Hyphen)
    });
    integer()
        .then(word())
        .then(name_part.repeated())
        .then_ignore(end())
        .try_map(move |(((count, count_range), first), rest), span| {
            if std::iter::once(first.0.as_str())
                .chain(words(&rest))
                .any(|word| AGE_KEYWORDS.contains(&word))
            {
                return Err(Simple::custom(span, "age statement"));
            }
            // "10 healthy females" is named by its head noun
            let (name, name_range) = rest
                .iter()
                .rev()
                .find_map(|(token, range)| match token {
                    Token::Word(value) => Some((value.clone(), range.clone())),
                    _ => None,
                })
                .unwrap_or(first);
            Ok(ParticipantsDetailsEntry::SubGroup(ParticipantsSubGroup {
                span: NodeSpan::new(pos_offset, count_range.start, name_range.end),
                count,
                name,
            }))
        })
}

fn age_mean(
    pos_offset: usize,
) -> impl Parser<TokenLocation, ParticipantsDetailsEntry, Error = ParserError> + Clone {
    leading_filler()
        .then(number())
        .then(trailing_filler())
        .then_ignore(end())
        .try_map(move |((leading, (mean, range)), trailing), span| {
            let item_words: Vec<&str> = words(&leading).chain(words(&trailing)).collect();
            if item_words.contains(&"median") {
                return Err(Simple::custom(span, "median statement"));
            }
            if !item_words.iter().any(|word| AGE_KEYWORDS.contains(word)) {
                return Err(Simple::custom(span, "no age keyword"));
            }
            Ok(ParticipantsDetailsEntry::AgeMoments(AgeMoments {
                span: NodeSpan::new(pos_offset, range.start, range.end),
                mean,
                std: None,
            }))
        })
}

fn detail_item(
    pos_offset: usize,
) -> impl Parser<TokenLocation, ParticipantsDetailsEntry, Error = ParserError> + Clone {
    choice((
        age_range(pos_offset),
        age_moments(pos_offset),
        age_median(pos_offset),
        sub_group(pos_offset),
        age_mean(pos_offset),
    ))
}

fn parse_item<P>(grammar: &P, item: &[TokenLocation]) -> Option<ParticipantsDetailsEntry>
where
    P: Parser<TokenLocation, ParticipantsDetailsEntry, Error = ParserError>,
{
    let end = item.last().map(|(_, range)| range.end).unwrap_or(0);
    let stream = Stream::from_iter(
        end..end,
        item.iter()
            .cloned()
            .map(|(token, span)| ((token, span.clone()), span)),
    );
    match grammar.parse(stream) {
        Ok(entry) => Some(entry),
        Err(errors) => {
            trace!(errors = errors.len(), "detail item discarded");
            None
        }
    }
}

/// Tokens inside the outer group, when `tokens` is exactly one balanced `( ... )`.
fn group_contents(tokens: &[TokenLocation]) -> Option<&[TokenLocation]> {
    let [(Token::OpenParen, _), inner @ .., (Token::CloseParen, _)] = tokens else {
        return None;
    };
    let mut depth = 0usize;
    for (token, _) in inner {
        match token {
            Token::OpenParen => depth += 1,
            Token::CloseParen => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

/// Parse one `( ... )` group into its recognized detail entries.
///
/// Node spans are relative to `parenthetical`, placed in the document by
/// `pos_offset`. Nested groups are items of their own, so
/// `(mean age 40 (median 38))` gives a mean and a median. Unrecognized items
/// are dropped; only a parenthetical that is not one balanced group is an
/// error.
pub fn parse_details(
    parenthetical: &str,
    pos_offset: usize,
) -> GrammarResult<Vec<ParticipantsDetailsEntry>> {
    let tokens = tokenize(parenthetical);
    let inner = group_contents(&tokens)
        .ok_or_else(|| GrammarError::MalformedDetails(parenthetical.to_string()))?;

    let grammar = detail_item(pos_offset);
    Ok(inner
        .split(|(token, _)| token.is_item_separator())
        .filter(|item| !item.is_empty())
        .filter_map(|item| parse_item(&grammar, item))
        .collect())
}
