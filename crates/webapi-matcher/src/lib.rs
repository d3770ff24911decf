//! Pattern matching engine for asserting Web API responses.
//!
//! Expected documents are ordinary JSON in which string values may be type
//! tokens: `@string@`, `@integer@`, `@uuid@`, `@*@` and friends, optionally
//! refined with one expander such as `@string@.maxLength(10)`. A
//! [`ChainMatcher`] dispatches each pattern to the first matcher that claims
//! it; the functions in [`assert`] walk whole documents.
//!
//! # Example
//!
//! ```
//! use webapi_matcher::{assert_matches_pattern, ChainMatcher};
//! use serde_json::json;
//!
//! let chain = ChainMatcher::standard();
//! let pattern = json!({"id": "@uuid@", "name": "@string@.maxLength(5)"});
//! let actual = json!({"id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "name": "bob"});
//!
//! assert!(assert_matches_pattern(&chain, &pattern, &actual).is_ok());
//! ```
//!
//! Custom tokens are registered on the builder:
//!
//! ```
//! use webapi_matcher::ChainMatcher;
//! use serde_json::json;
//!
//! let chain = ChainMatcher::builder()
//!     .callback("@even@", |v| v.as_i64().is_some_and(|n| n % 2 == 0))
//!     .build();
//!
//! assert!(chain.matches(&json!(4), &json!("@even@")).is_ok());
//! ```

pub mod assert;
pub mod check;
pub mod error;
pub mod matcher;
pub mod pattern;

pub use assert::{
    assert_contains_subset, assert_key_matches_pattern, assert_matches_pattern,
    assert_text_contains, assert_text_not_contains, parse_actual_json, parse_expected_json,
};
pub use check::{check_files, check_json, CheckMode, CheckOptions, CheckReport, CheckStatus};
pub use error::{AssertionError, MatchError, PatternError};
pub use matcher::{ChainMatcher, ChainMatcherBuilder, ValueMatcher};
pub use pattern::{ExpanderRegistry, PatternExpander, PatternParser};
