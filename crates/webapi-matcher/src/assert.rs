//! Response assertions built on top of the matcher chain.
//!
//! These are the checks behind the "response should contain ..." steps:
//! a loose subset comparison, recursive pattern matching with JSON paths in
//! the diagnostics, and plain text containment.

use crate::error::{AssertionError, MatchError};
use crate::matcher::{describe, ChainMatcher};
use serde_json::Value;
use tracing::debug;

/// Trailing array element that allows any number of further elements.
pub const REST_TOKEN: &str = "@...@";

/// Parse an expected JSON document, keeping the raw text for diagnostics.
pub fn parse_expected_json(raw: &str) -> Result<Value, AssertionError> {
    serde_json::from_str(raw).map_err(|source| AssertionError::MalformedExpectedJson {
        raw: raw.to_string(),
        source,
    })
}

/// Parse a response body as JSON.
pub fn parse_actual_json(body: &str) -> Result<Value, AssertionError> {
    serde_json::from_str(body).map_err(|source| AssertionError::MalformedActualJson { source })
}

// ===== Subset comparison =====

fn entry_count(value: &Value) -> Option<usize> {
    match value {
        Value::Object(map) => Some(map.len()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Entries of a container keyed by name (objects) or index (arrays).
fn entries(value: &Value) -> Vec<(String, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

fn lookup<'a>(container: &'a Value, key: &str) -> Option<&'a Value> {
    match container {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn as_integer(number: &serde_json::Number) -> Option<i128> {
    number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from))
}

/// Equality with numbers compared by value, so `1` equals `1.0`.
///
/// Two integers compare exactly; `f64` is only used once a float is involved.
pub fn loose_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => match (as_integer(a), as_integer(b)) {
            (Some(x), Some(y)) => x == y,
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| loose_equal(v, other)))
        }
        _ => expected == actual,
    }
}

/// Every top-level entry of `expected` must be present in `actual` with an
/// equal value. `actual` may carry extra entries.
pub fn assert_contains_subset(expected: &Value, actual: &Value) -> Result<(), AssertionError> {
    let Some(expected_count) = entry_count(expected) else {
        return if loose_equal(expected, actual) {
            Ok(())
        } else {
            Err(AssertionError::ValueMismatch {
                key: "$".to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        };
    };

    let actual_count = entry_count(actual).ok_or_else(|| AssertionError::NotAnObject {
        actual: actual.to_string(),
    })?;
    if actual_count < expected_count {
        return Err(AssertionError::TooFewEntries {
            expected: expected_count,
            actual: actual_count,
        });
    }

    for (key, needle) in entries(expected) {
        let found = lookup(actual, &key).ok_or_else(|| AssertionError::MissingKey {
            key: key.clone(),
        })?;
        if !loose_equal(needle, found) {
            return Err(AssertionError::ValueMismatch {
                key,
                expected: needle.to_string(),
                actual: found.to_string(),
            });
        }
    }

    Ok(())
}

// ===== Pattern matching =====

fn mismatch_at(
    path: &str,
    pattern: &Value,
    actual: &Value,
    reason: impl Into<String>,
) -> AssertionError {
    AssertionError::PatternMismatch {
        path: path.to_string(),
        pattern: pattern.to_string(),
        actual: actual.to_string(),
        reason: reason.into(),
    }
}

/// Match `actual` against `pattern` recursively.
///
/// Object patterns require their keys to be present; extra actual keys are
/// fine. Array patterns match element by element and require equal lengths,
/// unless the last pattern element is `@...@`. Everything else goes through
/// the chain.
pub fn assert_matches_pattern(
    chain: &ChainMatcher,
    pattern: &Value,
    actual: &Value,
) -> Result<(), AssertionError> {
    match_at(chain, "$", pattern, actual)
}

fn match_at(
    chain: &ChainMatcher,
    path: &str,
    pattern: &Value,
    actual: &Value,
) -> Result<(), AssertionError> {
    match pattern {
        Value::Object(expected) => {
            let Value::Object(found) = actual else {
                return Err(mismatch_at(path, pattern, actual, "expected an object"));
            };
            for (key, sub_pattern) in expected {
                let child = format!("{path}.{key}");
                let sub_actual = found
                    .get(key)
                    .ok_or_else(|| AssertionError::MissingKey { key: child.clone() })?;
                match_at(chain, &child, sub_pattern, sub_actual)?;
            }
            Ok(())
        }
        Value::Array(expected) => {
            let Value::Array(found) = actual else {
                return Err(mismatch_at(path, pattern, actual, "expected an array"));
            };

            let (head, open_ended) = match expected.split_last() {
                Some((last, head)) if last.as_str() == Some(REST_TOKEN) => (head, true),
                _ => (expected.as_slice(), false),
            };

            let length_ok = if open_ended {
                found.len() >= head.len()
            } else {
                found.len() == head.len()
            };
            if !length_ok {
                let bound = if open_ended { "at least " } else { "" };
                return Err(mismatch_at(
                    path,
                    pattern,
                    actual,
                    format!("expected {bound}{} elements, got {}", head.len(), found.len()),
                ));
            }

            for (i, (sub_pattern, sub_actual)) in head.iter().zip(found).enumerate() {
                match_at(chain, &format!("{path}[{i}]"), sub_pattern, sub_actual)?;
            }
            Ok(())
        }
        _ => chain.matches(actual, pattern).map_err(|e| match e {
            MatchError::UnsupportedPattern { .. } => AssertionError::UnsupportedPattern {
                path: path.to_string(),
                pattern: describe(pattern),
            },
            MatchError::Mismatch(reason) => mismatch_at(path, pattern, actual, reason),
        }),
    }
}

/// `actual` must be an object holding `key`, whose value matches the
/// pattern text. The text is read as JSON when it parses, otherwise it is a
/// single string pattern such as `@uuid@`.
pub fn assert_key_matches_pattern(
    chain: &ChainMatcher,
    key: &str,
    pattern_text: &str,
    actual: &Value,
) -> Result<(), AssertionError> {
    let Value::Object(map) = actual else {
        return Err(AssertionError::NotAnObject {
            actual: actual.to_string(),
        });
    };
    let value = map.get(key).ok_or_else(|| AssertionError::MissingKey {
        key: key.to_string(),
    })?;

    let pattern = serde_json::from_str::<Value>(pattern_text)
        .unwrap_or_else(|_| Value::String(pattern_text.trim().to_string()));
    debug!("Matching key '{}' against pattern {}", key, pattern);

    match_at(chain, &format!("$.{key}"), &pattern, value)
}

// ===== Text =====

/// Case-insensitive containment of the literal `text`.
///
/// Only ASCII letters fold; `É` and `é` are different characters here.
pub fn assert_text_contains(text: &str, body: &str) -> Result<(), AssertionError> {
    if body
        .to_ascii_lowercase()
        .contains(&text.to_ascii_lowercase())
    {
        Ok(())
    } else {
        Err(AssertionError::TextNotFound {
            text: text.to_string(),
        })
    }
}

/// Case-sensitive absence of the literal `text`.
pub fn assert_text_not_contains(text: &str, body: &str) -> Result<(), AssertionError> {
    if body.contains(text) {
        Err(AssertionError::TextFound {
            text: text.to_string(),
        })
    } else {
        Ok(())
    }
}
