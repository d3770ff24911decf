//! `@uuid@` token matcher.

use super::{describe, Mismatch, ValueMatcher};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// The only pattern the UUID matcher claims.
pub const UUID_TOKEN: &str = "@uuid@";

/// Canonical 8-4-4-4-12 form, lowercase hex only.
pub const UUID_REGEX: &str = "^[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$";

static UUID: Lazy<Regex> = Lazy::new(|| Regex::new(UUID_REGEX).expect("uuid regex is valid"));

/// Matches canonical lowercase UUID strings.
///
/// Must be registered ahead of the string matcher in a chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidMatcher;

impl ValueMatcher for UuidMatcher {
    fn name(&self) -> &'static str {
        "uuid"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        pattern.as_str() == Some(UUID_TOKEN)
    }

    fn matches(&self, actual: &Value, _pattern: &Value) -> Result<(), Mismatch> {
        match actual.as_str() {
            Some(s) if UUID.is_match(s) => Ok(()),
            _ => Err(format!(
                "\"{}\" does not match \"{}\".",
                describe(actual),
                UUID_REGEX
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn token() -> Value {
        json!(UUID_TOKEN)
    }

    #[test]
    fn test_can_match_only_exact_token() {
        let m = UuidMatcher;
        assert!(m.can_match(&json!("@uuid@")));
        assert!(!m.can_match(&json!("@uuid@ ")));
        assert!(!m.can_match(&json!("@UUID@")));
        assert!(!m.can_match(&json!("@uuid@.length(36)")));
        assert!(!m.can_match(&json!("@string@")));
        assert!(!m.can_match(&json!(1)));
        assert!(!m.can_match(&Value::Null));
        assert!(!m.can_match(&json!(["@uuid@"])));
    }

    #[test]
    fn test_accepts_canonical_uuid() {
        let m = UuidMatcher;
        assert!(m
            .matches(&json!("3fa85f64-5717-4562-b3fc-2c963f66afa6"), &token())
            .is_ok());
        assert!(m
            .matches(&json!("00000000-0000-0000-0000-000000000000"), &token())
            .is_ok());
    }

    #[test]
    fn test_rejects_uppercase() {
        let m = UuidMatcher;
        assert!(m
            .matches(&json!("3FA85F64-5717-4562-B3FC-2C963F66AFA6"), &token())
            .is_err());
        assert!(m
            .matches(&json!("3fa85f64-5717-4562-b3fc-2c963f66afA6"), &token())
            .is_err());
    }

    #[test]
    fn test_rejects_malformed() {
        let m = UuidMatcher;
        for candidate in [
            "not-a-uuid",
            "",
            "3fa85f6457174562b3fc2c963f66afa6",
            "3fa85f64-5717-4562-b3fc-2c963f66afa",
            "3fa85f64-5717-4562-b3fc-2c963f66afa6a",
            "3fa85f6-45717-4562-b3fc-2c963f66afa6",
            "{3fa85f64-5717-4562-b3fc-2c963f66afa6}",
            "3fa85f64-5717-4562-b3fc-2c963f66afg6",
        ] {
            assert!(m.matches(&json!(candidate), &token()).is_err(), "{candidate}");
        }
    }

    #[test]
    fn test_rejects_non_string() {
        let m = UuidMatcher;
        assert!(m.matches(&json!(42), &token()).is_err());
        assert!(m.matches(&Value::Null, &token()).is_err());
    }

    #[test]
    fn test_error_names_actual_and_expected() {
        let err = UuidMatcher.matches(&json!("not-a-uuid"), &token()).unwrap_err();
        assert!(err.contains("not-a-uuid"));
        assert!(err.contains(UUID_REGEX));
    }

    proptest! {
        #[test]
        fn prop_lowercase_uuids_match(s in "[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}") {
            prop_assert!(UuidMatcher.matches(&json!(s), &token()).is_ok());
        }

        #[test]
        fn prop_uppercase_uuids_rejected(s in "[A-F]{8}-[A-F0-9]{4}-[A-F0-9]{4}-[A-F0-9]{4}-[A-F0-9]{12}") {
            prop_assert!(UuidMatcher.matches(&json!(s), &token()).is_err());
        }

        #[test]
        fn prop_wrong_segment_lengths_rejected(a in "[a-f0-9]{1,7}", b in "[a-f0-9]{4}") {
            let candidate = format!("{a}-{b}-{b}-{b}-{b}{b}{b}");
            prop_assert!(UuidMatcher.matches(&json!(candidate), &token()).is_err());
        }
    }
}
