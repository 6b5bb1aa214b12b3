//! Error types for extraction
//!
//! Two families live here. [`GrammarError`] covers the local failures of the
//! grammars (one snippet, one parenthetical); the reader swallows them after
//! logging. [`DemographicsError`] is what callers of the document driver see.

use thiserror::Error;

/// Failure to parse one snippet or one parenthetical.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// No production of the mention grammar matches the snippet
    #[error("no participants mention in {0:?}")]
    NoParse(String),

    /// A digit run does not fit in a count
    #[error("number too large: {0}")]
    NumberOverflow(String),

    /// The parenthetical is not a single balanced `( ... )` group
    #[error("malformed parenthetical: {0:?}")]
    MalformedDetails(String),

    /// An ambiguity node without any candidate
    #[error("empty parse forest")]
    EmptyForest,
}

/// Errors surfaced to callers of the document-level API.
#[derive(Error, Debug)]
pub enum DemographicsError {
    /// Configuration could not be loaded or deserialized
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON-lines record could not be decoded or encoded
    #[error("JSON error on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded as YAML
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type GrammarResult<T> = Result<T, GrammarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_error_messages() {
        assert_eq!(
            GrammarError::NumberOverflow("99999999999999999999999".into()).to_string(),
            "number too large: 99999999999999999999999"
        );
        assert_eq!(
            GrammarError::NoParse("we scanned".into()).to_string(),
            "no participants mention in \"we scanned\""
        );
    }
}
