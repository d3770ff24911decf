//! Value matchers and the chain dispatcher.
//!
//! Each matcher claims a family of patterns through [`ValueMatcher::can_match`]
//! and verifies actual values through [`ValueMatcher::matches`]. Matchers hold
//! no mutable state: the diagnostic for a failed match is the returned error,
//! so a built chain can be shared freely between threads.
//!
//! # Module Structure
//!
//! - `scalar` - type-token matchers (null, boolean, integer, double, number,
//!   string, array) plus the literal scalar and wildcard fallbacks
//! - `uuid` - the `@uuid@` token
//! - `callback` - named callback tokens and `expr(...)` expressions
//! - `chain` - ordered first-claim-wins dispatcher

mod callback;
mod chain;
mod scalar;
mod uuid;

use serde_json::Value;
use std::fmt;

pub use callback::{CallbackMatcher, ExpressionMatcher};
pub use chain::{ChainMatcher, ChainMatcherBuilder};
pub use scalar::{
    ArrayTokenMatcher, BooleanMatcher, DoubleMatcher, IntegerMatcher, NullMatcher, NumberMatcher,
    ScalarMatcher, StringMatcher, WildcardMatcher,
};
pub use uuid::UuidMatcher;

/// Diagnostic for a value that did not satisfy a claimed pattern.
pub type Mismatch = String;

/// A unit in the matcher chain.
pub trait ValueMatcher: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this matcher is responsible for `pattern`.
    fn can_match(&self, pattern: &Value) -> bool;

    /// Verify `actual` against a pattern previously claimed by `can_match`.
    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch>;
}

/// Render a value for diagnostics. Strings are shown without quotes.
pub fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Standard "value does not match pattern" diagnostic.
pub(crate) fn mismatch(actual: &Value, pattern: &Value) -> Mismatch {
    format!(
        "\"{}\" does not match \"{}\".",
        describe(actual),
        describe(pattern)
    )
}
