//! Grammars over snippet and parenthetical tokens
//!
//! - [`mentions`] builds the forest of every mention reading of a snippet
//! - [`forest`] resolves a forest into one mention
//! - [`details`] reads the sex counts and age statistics of a parenthetical
//!
//! All three return [`GrammarResult`](crate::demographics::error::GrammarResult);
//! failures are local to the snippet or parenthetical being parsed.

pub mod details;
pub mod forest;
pub mod mentions;

pub use details::parse_details;
pub use forest::{resolve, ParseForest};
pub use mentions::parse_mentions;
