//! Type-token and scalar matchers.

use super::{mismatch, Mismatch, ValueMatcher};
use crate::pattern::{is_type_token, token_kind, PatternParser};
use serde_json::Value;
use std::sync::Arc;

/// True if `pattern` parses as a token of `kind` (expanders allowed).
/// Tokens of another kind are rejected from their head alone.
fn claims_token(parser: &PatternParser, pattern: &Value, kind: &str) -> bool {
    pattern
        .as_str()
        .filter(|p| token_kind(p) == Some(kind))
        .is_some_and(|p| parser.is_valid(p))
}

/// Type check first, then the token's expander.
fn check_token(
    parser: &PatternParser,
    actual: &Value,
    pattern: &Value,
    type_ok: bool,
) -> Result<(), Mismatch> {
    if !type_ok {
        return Err(mismatch(actual, pattern));
    }
    let source = pattern.as_str().unwrap_or_default();
    let token = parser.parse(source).map_err(|e| e.to_string())?;
    token.check_expander(actual)
}

fn is_exact(pattern: &Value, token: &str) -> bool {
    pattern.as_str() == Some(token)
}

/// `null` or `@null@`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMatcher;

impl ValueMatcher for NullMatcher {
    fn name(&self) -> &'static str {
        "null"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        pattern.is_null() || is_exact(pattern, "@null@")
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch> {
        if actual.is_null() {
            Ok(())
        } else {
            Err(mismatch(actual, pattern))
        }
    }
}

/// `@boolean@`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanMatcher;

impl ValueMatcher for BooleanMatcher {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        is_exact(pattern, "@boolean@")
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch> {
        if actual.is_boolean() {
            Ok(())
        } else {
            Err(mismatch(actual, pattern))
        }
    }
}

/// `@string@` with an optional expander.
#[derive(Debug, Clone)]
pub struct StringMatcher {
    parser: Arc<PatternParser>,
}

impl StringMatcher {
    pub fn new(parser: Arc<PatternParser>) -> Self {
        Self { parser }
    }
}

impl ValueMatcher for StringMatcher {
    fn name(&self) -> &'static str {
        "string"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        claims_token(&self.parser, pattern, "string")
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch> {
        check_token(&self.parser, actual, pattern, actual.is_string())
    }
}

/// `@integer@` with an optional expander.
#[derive(Debug, Clone)]
pub struct IntegerMatcher {
    parser: Arc<PatternParser>,
}

impl IntegerMatcher {
    pub fn new(parser: Arc<PatternParser>) -> Self {
        Self { parser }
    }
}

impl ValueMatcher for IntegerMatcher {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        claims_token(&self.parser, pattern, "integer")
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch> {
        let is_integer = actual.is_i64() || actual.is_u64();
        check_token(&self.parser, actual, pattern, is_integer)
    }
}

/// `@double@` with an optional expander. Only floating point numbers match;
/// integral JSON numbers do not.
#[derive(Debug, Clone)]
pub struct DoubleMatcher {
    parser: Arc<PatternParser>,
}

impl DoubleMatcher {
    pub fn new(parser: Arc<PatternParser>) -> Self {
        Self { parser }
    }
}

impl ValueMatcher for DoubleMatcher {
    fn name(&self) -> &'static str {
        "double"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        claims_token(&self.parser, pattern, "double")
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch> {
        check_token(&self.parser, actual, pattern, actual.is_f64())
    }
}

/// `@number@` with an optional expander. Accepts any JSON number and numeric
/// strings.
#[derive(Debug, Clone)]
pub struct NumberMatcher {
    parser: Arc<PatternParser>,
}

impl NumberMatcher {
    pub fn new(parser: Arc<PatternParser>) -> Self {
        Self { parser }
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(f64::is_finite)
            .unwrap_or(false),
        _ => false,
    }
}

impl ValueMatcher for NumberMatcher {
    fn name(&self) -> &'static str {
        "number"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        claims_token(&self.parser, pattern, "number")
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch> {
        check_token(&self.parser, actual, pattern, is_numeric(actual))
    }
}

/// `@array@` with an optional expander, e.g. `@array@.minLength(1)`.
#[derive(Debug, Clone)]
pub struct ArrayTokenMatcher {
    parser: Arc<PatternParser>,
}

impl ArrayTokenMatcher {
    pub fn new(parser: Arc<PatternParser>) -> Self {
        Self { parser }
    }
}

impl ValueMatcher for ArrayTokenMatcher {
    fn name(&self) -> &'static str {
        "array"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        claims_token(&self.parser, pattern, "array")
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch> {
        check_token(&self.parser, actual, pattern, actual.is_array())
    }
}

/// Literal scalar patterns compared with strict equality.
///
/// Token-shaped strings are left unclaimed so that a typo such as
/// `@strng@` is reported as unsupported rather than compared literally.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarMatcher;

impl ValueMatcher for ScalarMatcher {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        match pattern {
            Value::Bool(_) | Value::Number(_) => true,
            Value::String(s) => !is_type_token(s),
            _ => false,
        }
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch> {
        if actual == pattern {
            Ok(())
        } else {
            Err(mismatch(actual, pattern))
        }
    }
}

/// `@*@` or `@wildcard@`: anything goes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WildcardMatcher;

impl ValueMatcher for WildcardMatcher {
    fn name(&self) -> &'static str {
        "wildcard"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        is_exact(pattern, "@*@") || is_exact(pattern, "@wildcard@")
    }

    fn matches(&self, _actual: &Value, _pattern: &Value) -> Result<(), Mismatch> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser() -> Arc<PatternParser> {
        Arc::new(PatternParser::standard())
    }

    #[test]
    fn test_null_matcher() {
        let m = NullMatcher;
        assert!(m.can_match(&Value::Null));
        assert!(m.can_match(&json!("@null@")));
        assert!(!m.can_match(&json!("null")));
        assert!(m.matches(&Value::Null, &json!("@null@")).is_ok());
        assert!(m.matches(&json!(0), &json!("@null@")).is_err());
    }

    #[test]
    fn test_boolean_matcher() {
        let m = BooleanMatcher;
        assert!(m.can_match(&json!("@boolean@")));
        assert!(!m.can_match(&json!(true)));
        assert!(m.matches(&json!(false), &json!("@boolean@")).is_ok());
        assert!(m.matches(&json!("true"), &json!("@boolean@")).is_err());
    }

    #[test]
    fn test_string_matcher() {
        let m = StringMatcher::new(parser());
        assert!(m.can_match(&json!("@string@")));
        assert!(m.can_match(&json!("@string@.maxLength(10)")));
        assert!(!m.can_match(&json!("@string@.unknown(10)")));
        assert!(!m.can_match(&json!("@integer@")));
        assert!(!m.can_match(&json!(5)));

        assert!(m.matches(&json!("x"), &json!("@string@")).is_ok());
        let err = m.matches(&json!(5), &json!("@string@")).unwrap_err();
        assert_eq!(err, "\"5\" does not match \"@string@\".");
    }

    #[test]
    fn test_string_matcher_with_expander() {
        let m = StringMatcher::new(parser());
        let pattern = json!("@string@.length(3)");
        assert!(m.matches(&json!("bob"), &pattern).is_ok());
        assert!(m.matches(&json!("alice"), &pattern).is_err());
    }

    #[test]
    fn test_integer_matcher() {
        let m = IntegerMatcher::new(parser());
        assert!(m.can_match(&json!("@integer@")));
        assert!(m.matches(&json!(42), &json!("@integer@")).is_ok());
        assert!(m.matches(&json!(-1), &json!("@integer@")).is_ok());
        assert!(m.matches(&json!(4.2), &json!("@integer@")).is_err());
        assert!(m.matches(&json!("42"), &json!("@integer@")).is_err());

        let bounded = json!("@integer@.greaterThan(10)");
        assert!(m.matches(&json!(11), &bounded).is_ok());
        assert!(m.matches(&json!(10), &bounded).is_err());
    }

    #[test]
    fn test_double_matcher() {
        let m = DoubleMatcher::new(parser());
        assert!(m.matches(&json!(1.5), &json!("@double@")).is_ok());
        assert!(m.matches(&json!(1), &json!("@double@")).is_err());
    }

    #[test]
    fn test_number_matcher() {
        let m = NumberMatcher::new(parser());
        assert!(m.matches(&json!(1), &json!("@number@")).is_ok());
        assert!(m.matches(&json!(1.5), &json!("@number@")).is_ok());
        assert!(m.matches(&json!("2.5"), &json!("@number@")).is_ok());
        assert!(m.matches(&json!("abc"), &json!("@number@")).is_err());
        assert!(m.matches(&json!("inf"), &json!("@number@")).is_err());
        assert!(m.matches(&json!(true), &json!("@number@")).is_err());
    }

    #[test]
    fn test_array_token_matcher() {
        let m = ArrayTokenMatcher::new(parser());
        assert!(m.can_match(&json!("@array@.length(2)")));
        assert!(m.matches(&json!([1, 2]), &json!("@array@.length(2)")).is_ok());
        assert!(m.matches(&json!([1]), &json!("@array@.length(2)")).is_err());
        assert!(m.matches(&json!("ab"), &json!("@array@")).is_err());
    }

    #[test]
    fn test_scalar_matcher() {
        let m = ScalarMatcher;
        assert!(m.can_match(&json!("plain")));
        assert!(m.can_match(&json!(1)));
        assert!(m.can_match(&json!(false)));
        assert!(!m.can_match(&Value::Null));
        assert!(!m.can_match(&json!("@strng@")));
        assert!(!m.can_match(&json!("@string@.shout(1)")));
        assert!(m.can_match(&json!("@bob@home")));
        assert!(!m.can_match(&json!([1])));

        assert!(m.matches(&json!("plain"), &json!("plain")).is_ok());
        assert!(m.matches(&json!(1), &json!(1)).is_ok());
        assert!(m.matches(&json!("1"), &json!(1)).is_err());
        assert!(m.matches(&json!(1.0), &json!(1)).is_err());
    }

    #[test]
    fn test_wildcard_matcher() {
        let m = WildcardMatcher;
        assert!(m.can_match(&json!("@*@")));
        assert!(m.can_match(&json!("@wildcard@")));
        assert!(!m.can_match(&json!("*")));
        assert!(m.matches(&json!({"any": "thing"}), &json!("@*@")).is_ok());
    }
}
