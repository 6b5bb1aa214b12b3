//! Token definitions for snippets and parentheticals
//!
//! Whitespace is skipped; every other character ends up in some token so that
//! spans cover the input without gaps in meaningful text.
use logos::Logos;

/// All possible tokens of the mention and detail grammars
#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"\s+")]
pub enum Token {
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Integer(String),

    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().to_string())]
    Decimal(String),

    // Lowercased; the source slice keeps the original casing
    #[regex(r"\p{L}+", |lex| lex.slice().to_lowercase())]
    Word(String),

    #[token("-")]
    Hyphen,

    // En and em dashes
    #[token("–")]
    #[token("—")]
    Dash,

    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("=")]
    Equals,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,

    #[token("±")]
    #[token("+/-")]
    #[token("+-")]
    PlusMinus,

    // Any other single character
    #[regex(r"[^\s\p{L}0-9\-–—()=,;:±]")]
    Punctuation,
}

impl Token {
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Word(value) if value == word)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Token::Integer(_) | Token::Decimal(_))
    }

    /// Tokens separating detail items inside a parenthetical, nested group
    /// boundaries included
    pub fn is_item_separator(&self) -> bool {
        matches!(
            self,
            Token::Comma | Token::Semicolon | Token::OpenParen | Token::CloseParen
        ) || self.is_word("and")
    }
}
