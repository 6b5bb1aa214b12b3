//! Lexer for snippets and parentheticals
//!
//! Tokenization is handled entirely by logos. Unlike a document lexer, there is
//! no transformation pipeline: the grammars work directly on the
//! `(Token, Range<usize>)` pairs, whose ranges are byte offsets relative to the
//! snippet or parenthetical being parsed.

pub mod numbers;
pub mod tokens;
pub mod vocabulary;

pub use numbers::{number_readings, parse_number, Reading};
pub use tokens::Token;

use logos::Logos;
use std::ops::Range;

/// Token paired with its byte range in the lexed text
pub type TokenLocation = (Token, Range<usize>);

/// Tokenize text with location information
///
/// Characters logos cannot classify are dropped; with the catch-all
/// punctuation token this only happens for malformed input.
pub fn tokenize(source: &str) -> Vec<TokenLocation> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        if let Ok(token) = result {
            tokens.push((token, lexer.span()));
        }
    }

    tokens
}
