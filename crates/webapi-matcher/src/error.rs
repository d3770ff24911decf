//! Error types for pattern parsing, matching and assertions.

use thiserror::Error;

/// Errors raised while parsing a type token such as `@string@.length(3)`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    #[error("pattern '{0}' is not a type token")]
    Syntax(String),
    #[error("unknown expander '{name}' in pattern '{pattern}'")]
    UnknownExpander { name: String, pattern: String },
    #[error("pattern '{0}' carries more than one expander")]
    MultipleExpanders(String),
    #[error("invalid argument for expander '{expander}': {reason}")]
    InvalidArgument { expander: String, reason: String },
}

/// Outcome of a failed dispatch through the matcher chain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// No matcher in the chain claimed the pattern.
    #[error("unsupported pattern: {pattern}")]
    UnsupportedPattern { pattern: String },
    /// A matcher claimed the pattern but the actual value did not satisfy it.
    #[error("{0}")]
    Mismatch(String),
}

/// Errors produced by the response assertion helpers.
#[derive(Debug, Error)]
pub enum AssertionError {
    #[error("Can not convert etalon to json:\n{raw}")]
    MalformedExpectedJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("response body is not valid JSON: {source}")]
    MalformedActualJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("expected at least {expected} entries, actual has {actual}")]
    TooFewEntries { expected: usize, actual: usize },
    #[error("key '{key}' is missing from actual value")]
    MissingKey { key: String },
    #[error("value of '{key}' differs: expected {expected}, got {actual}")]
    ValueMismatch {
        key: String,
        expected: String,
        actual: String,
    },
    #[error("expected a JSON object, got {actual}")]
    NotAnObject { actual: String },
    #[error("value at {path} does not match pattern {pattern}: {reason} (actual: {actual})")]
    PatternMismatch {
        path: String,
        pattern: String,
        actual: String,
        reason: String,
    },
    #[error("unsupported pattern at {path}: {pattern}")]
    UnsupportedPattern { path: String, pattern: String },
    #[error("response does not contain \"{text}\"")]
    TextNotFound { text: String },
    #[error("response contains \"{text}\"")]
    TextFound { text: String },
}
