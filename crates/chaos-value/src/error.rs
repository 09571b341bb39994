//! Error types for Value construction, conversion and JSON codec operations.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while building, encoding or decoding Values.
#[derive(Error, Debug)]
pub enum Error {
    /// A string or object key was not valid UTF-8.
    #[error("invalid UTF-8 in {context}")]
    InvalidUtf8 { context: String },

    /// The native input has no defined conversion into a Value.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A numeric literal could not be read as the requested numeric kind.
    #[error("malformed number: {0}")]
    MalformedNumber(String),

    /// The JSON node kind does not match what the decode target requires.
    #[error("unexpected shape: expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: String,
    },

    /// A flattened key/value list had an odd length or a non-string key.
    #[error("key/value arity mismatch: {0}")]
    KeyValueArityMismatch(String),

    /// A `b64.`-prefixed string carried invalid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),

    /// serde_json failed to parse the input or to build a JSON node.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A decoded node did not fit the target type.
    #[error("decode error: {0}")]
    Decode(String),

    /// A custom message raised from inside a serde implementation.
    #[error("{0}")]
    Message(String),
}

/// Coarse classification of [`Error`] that callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUtf8,
    UnsupportedType,
    MalformedNumber,
    UnexpectedShape,
    KeyValueArityMismatch,
    InvalidBase64,
    Json,
    Decode,
    Message,
}

/// Numeric code of `INVALID_ARGUMENT` in the shared error-code table.
pub const INVALID_ARGUMENT: i32 = 3;

/// Numeric code of `MALFORMED_SYNTAX` in the shared error-code table.
pub const MALFORMED_SYNTAX: i32 = 5;

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUtf8 { .. } => ErrorKind::InvalidUtf8,
            Error::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Error::MalformedNumber(_) => ErrorKind::MalformedNumber,
            Error::UnexpectedShape { .. } => ErrorKind::UnexpectedShape,
            Error::KeyValueArityMismatch(_) => ErrorKind::KeyValueArityMismatch,
            Error::InvalidBase64(_) => ErrorKind::InvalidBase64,
            Error::Json(_) => ErrorKind::Json,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Message(_) => ErrorKind::Message,
        }
    }

    /// The numeric error code a transport layer should report for this error.
    ///
    /// Construction and conversion failures map to `INVALID_ARGUMENT`; failures
    /// reading wire data map to `MALFORMED_SYNTAX`.
    pub fn code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidUtf8
            | ErrorKind::UnsupportedType
            | ErrorKind::KeyValueArityMismatch
            | ErrorKind::Message => INVALID_ARGUMENT,
            ErrorKind::MalformedNumber
            | ErrorKind::UnexpectedShape
            | ErrorKind::InvalidBase64
            | ErrorKind::Json
            | ErrorKind::Decode => MALFORMED_SYNTAX,
        }
    }

    pub(crate) fn invalid_utf8(context: impl Into<String>) -> Self {
        Error::InvalidUtf8 {
            context: context.into(),
        }
    }

    pub(crate) fn unexpected(expected: &'static str, found: impl fmt::Display) -> Self {
        Error::UnexpectedShape {
            expected,
            found: found.to_string(),
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Decode(msg.to_string())
    }
}

/// Convenience alias used throughout chaos-value.
pub type Result<T> = std::result::Result<T, Error>;
