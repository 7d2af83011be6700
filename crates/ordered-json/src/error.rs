//! Error type shared by the ordered map, the encoder and the decoder.

use serde_json::error::Category;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A structural token did not match the expected context, e.g. an array
    /// where an object was required.
    #[error("type mismatch at line {line}, column {column}: {message}")]
    TypeMismatch {
        line: usize,
        column: usize,
        message: String,
    },
    /// Lexical or syntactic violation: truncated structure, missing colon,
    /// invalid escape, trailing characters.
    #[error("malformed input at line {line}, column {column}: {message}")]
    MalformedInput {
        line: usize,
        column: usize,
        message: String,
    },
    /// A scalar that the document format cannot represent (non-finite float).
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
    /// `set_keys` / `sort_keys` received something other than a permutation
    /// of the current keys.
    #[error("invalid key permutation: {reason}")]
    KeyPermutationInvalid { reason: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Classifies a tokenizer error raised while decoding.
    pub(crate) fn from_decode(err: serde_json::Error) -> Self {
        let line = err.line();
        let column = err.column();
        match err.classify() {
            Category::Data => Error::TypeMismatch {
                line,
                column,
                message: strip_position(&err),
            },
            Category::Syntax | Category::Eof => Error::MalformedInput {
                line,
                column,
                message: strip_position(&err),
            },
            Category::Io => Error::Io(err.into()),
        }
    }

    /// Classifies a serializer error raised while encoding. Everything that is
    /// not a writer failure comes from a scalar the format cannot hold.
    pub(crate) fn from_encode(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::UnsupportedValue(err.to_string())
        }
    }

    pub(crate) fn permutation(reason: impl Into<String>) -> Self {
        Error::KeyPermutationInvalid {
            reason: reason.into(),
        }
    }
}

// serde_json appends " at line L column C" to its messages; the position is
// already carried in dedicated fields.
fn strip_position(err: &serde_json::Error) -> String {
    let text = err.to_string();
    let suffix = format!(" at line {} column {}", err.line(), err.column());
    match text.strip_suffix(&suffix) {
        Some(message) => message.to_owned(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_are_malformed_input() {
        let err = serde_json::from_str::<serde_json::Value>("{\"a\" 1}").unwrap_err();
        match Error::from_decode(err) {
            Error::MalformedInput { line, column, message } => {
                assert_eq!(line, 1);
                assert!(column > 0);
                assert!(!message.contains(" at line "), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn eof_errors_are_malformed_input() {
        let err = serde_json::from_str::<serde_json::Value>("{\"a\": [1, 2").unwrap_err();
        assert!(matches!(
            Error::from_decode(err),
            Error::MalformedInput { .. }
        ));
    }

    #[test]
    fn data_errors_are_type_mismatch() {
        let err = serde_json::from_str::<Vec<u8>>("{}").unwrap_err();
        assert!(matches!(Error::from_decode(err), Error::TypeMismatch { .. }));
    }

    #[test]
    fn permutation_error_message() {
        let err = Error::permutation("missing key `a`");
        assert_eq!(err.to_string(), "invalid key permutation: missing key `a`");
    }
}
