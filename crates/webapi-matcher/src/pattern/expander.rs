//! Pattern expanders.
//!
//! An expander refines a type token with an additional constraint on the
//! actual value, e.g. `@string@.minLength(3)`. Expanders are created by name
//! through an [`ExpanderRegistry`] so new ones can be plugged in without
//! touching the matchers that use them.

use crate::error::PatternError;
use crate::matcher::describe;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A constraint attached to a type token.
pub trait PatternExpander: Send + Sync + fmt::Debug {
    /// Name used in token syntax (`length`, `minLength`, ...).
    fn name(&self) -> &'static str;

    /// Check the actual value, returning a diagnostic on violation.
    fn check(&self, actual: &Value) -> Result<(), String>;
}

/// Constructor for an expander from its parsed arguments.
pub type ExpanderFactory = fn(&[Value]) -> Result<Box<dyn PatternExpander>, PatternError>;

/// Registry of expander constructors keyed by name.
#[derive(Clone, Default)]
pub struct ExpanderRegistry {
    factories: HashMap<String, ExpanderFactory>,
}

impl fmt::Debug for ExpanderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ExpanderRegistry")
            .field("expanders", &names)
            .finish()
    }
}

impl ExpanderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in expander.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register("length", Length::from_args)
            .register("minLength", MinLength::from_args)
            .register("maxLength", MaxLength::from_args)
            .register("contains", Contains::from_args)
            .register("startsWith", StartsWith::from_args)
            .register("endsWith", EndsWith::from_args)
            .register("notEmpty", NotEmpty::from_args)
            .register("isEmpty", IsEmpty::from_args)
            .register("lowerThan", LowerThan::from_args)
            .register("greaterThan", GreaterThan::from_args)
            .register("matchRegex", MatchRegex::from_args)
            .register("inArray", InArray::from_args);
        registry
    }

    /// Register (or replace) an expander definition.
    pub fn register(&mut self, name: impl Into<String>, factory: ExpanderFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate the expander `name` with `args`.
    pub fn build(
        &self,
        name: &str,
        args: &[Value],
        pattern: &str,
    ) -> Result<Box<dyn PatternExpander>, PatternError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| PatternError::UnknownExpander {
                name: name.to_string(),
                pattern: pattern.to_string(),
            })?;
        factory(args)
    }
}

/// Length of a value: characters for strings, elements for arrays and objects.
pub fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(a) => Some(a.len()),
        Value::Object(o) => Some(o.len()),
        _ => None,
    }
}

fn invalid(expander: &str, reason: impl Into<String>) -> PatternError {
    PatternError::InvalidArgument {
        expander: expander.to_string(),
        reason: reason.into(),
    }
}

fn single_arg<'a>(expander: &str, args: &'a [Value]) -> Result<&'a Value, PatternError> {
    match args {
        [value] => Ok(value),
        _ => Err(invalid(
            expander,
            format!("expected 1 argument, got {}", args.len()),
        )),
    }
}

fn no_args(expander: &str, args: &[Value]) -> Result<(), PatternError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(invalid(
            expander,
            format!("expected no arguments, got {}", args.len()),
        ))
    }
}

fn usize_arg(expander: &str, args: &[Value]) -> Result<usize, PatternError> {
    single_arg(expander, args)?
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| invalid(expander, "expected a non-negative integer"))
}

fn f64_arg(expander: &str, args: &[Value]) -> Result<f64, PatternError> {
    single_arg(expander, args)?
        .as_f64()
        .ok_or_else(|| invalid(expander, "expected a number"))
}

fn string_arg(expander: &str, args: &[Value]) -> Result<String, PatternError> {
    single_arg(expander, args)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(expander, "expected a string"))
}

fn measured(actual: &Value) -> Result<usize, String> {
    length_of(actual).ok_or_else(|| format!("cannot compute length of \"{}\"", describe(actual)))
}

fn violation(actual: &Value, len: usize, expander: &str, bound: usize) -> String {
    format!(
        "\"{}\" has length {len} which violates {expander}({bound})",
        describe(actual)
    )
}

// ===== Length bounds =====

/// `length(N)`: exact length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    pub expected: usize,
}

impl Length {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        Ok(Box::new(Self {
            expected: usize_arg("length", args)?,
        }))
    }
}

impl PatternExpander for Length {
    fn name(&self) -> &'static str {
        "length"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        let len = measured(actual)?;
        if len == self.expected {
            Ok(())
        } else {
            Err(violation(actual, len, "length", self.expected))
        }
    }
}

/// `minLength(N)`: length ≥ N.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinLength {
    pub min: usize,
}

impl MinLength {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        Ok(Box::new(Self {
            min: usize_arg("minLength", args)?,
        }))
    }
}

impl PatternExpander for MinLength {
    fn name(&self) -> &'static str {
        "minLength"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        let len = measured(actual)?;
        if len >= self.min {
            Ok(())
        } else {
            Err(violation(actual, len, "minLength", self.min))
        }
    }
}

/// `maxLength(N)`: length ≤ N.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxLength {
    pub max: usize,
}

impl MaxLength {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        Ok(Box::new(Self {
            max: usize_arg("maxLength", args)?,
        }))
    }
}

impl PatternExpander for MaxLength {
    fn name(&self) -> &'static str {
        "maxLength"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        let len = measured(actual)?;
        if len <= self.max {
            Ok(())
        } else {
            Err(violation(actual, len, "maxLength", self.max))
        }
    }
}

// ===== String content =====

#[derive(Debug, Clone, PartialEq)]
pub struct Contains {
    pub needle: String,
}

impl Contains {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        Ok(Box::new(Self {
            needle: string_arg("contains", args)?,
        }))
    }
}

impl PatternExpander for Contains {
    fn name(&self) -> &'static str {
        "contains"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        match actual.as_str() {
            Some(s) if s.contains(&self.needle) => Ok(()),
            _ => Err(format!(
                "\"{}\" does not contain \"{}\"",
                describe(actual),
                self.needle
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartsWith {
    pub prefix: String,
}

impl StartsWith {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        Ok(Box::new(Self {
            prefix: string_arg("startsWith", args)?,
        }))
    }
}

impl PatternExpander for StartsWith {
    fn name(&self) -> &'static str {
        "startsWith"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        match actual.as_str() {
            Some(s) if s.starts_with(&self.prefix) => Ok(()),
            _ => Err(format!(
                "\"{}\" does not start with \"{}\"",
                describe(actual),
                self.prefix
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndsWith {
    pub suffix: String,
}

impl EndsWith {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        Ok(Box::new(Self {
            suffix: string_arg("endsWith", args)?,
        }))
    }
}

impl PatternExpander for EndsWith {
    fn name(&self) -> &'static str {
        "endsWith"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        match actual.as_str() {
            Some(s) if s.ends_with(&self.suffix) => Ok(()),
            _ => Err(format!(
                "\"{}\" does not end with \"{}\"",
                describe(actual),
                self.suffix
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchRegex {
    pub regex: Regex,
}

impl MatchRegex {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        let source = string_arg("matchRegex", args)?;
        let regex = Regex::new(&source).map_err(|e| invalid("matchRegex", e.to_string()))?;
        Ok(Box::new(Self { regex }))
    }
}

impl PatternExpander for MatchRegex {
    fn name(&self) -> &'static str {
        "matchRegex"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        match actual.as_str() {
            Some(s) if self.regex.is_match(s) => Ok(()),
            _ => Err(format!(
                "\"{}\" does not match \"{}\"",
                describe(actual),
                self.regex.as_str()
            )),
        }
    }
}

// ===== Emptiness =====

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotEmpty;

impl NotEmpty {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        no_args("notEmpty", args)?;
        Ok(Box::new(Self))
    }
}

impl PatternExpander for NotEmpty {
    fn name(&self) -> &'static str {
        "notEmpty"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        if is_empty_value(actual) {
            Err(format!("\"{}\" is empty", describe(actual)))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsEmpty;

impl IsEmpty {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        no_args("isEmpty", args)?;
        Ok(Box::new(Self))
    }
}

impl PatternExpander for IsEmpty {
    fn name(&self) -> &'static str {
        "isEmpty"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        if is_empty_value(actual) {
            Ok(())
        } else {
            Err(format!("\"{}\" is not empty", describe(actual)))
        }
    }
}

// ===== Numeric bounds =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowerThan {
    pub bound: f64,
}

impl LowerThan {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        Ok(Box::new(Self {
            bound: f64_arg("lowerThan", args)?,
        }))
    }
}

impl PatternExpander for LowerThan {
    fn name(&self) -> &'static str {
        "lowerThan"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        match actual.as_f64() {
            Some(n) if n < self.bound => Ok(()),
            _ => Err(format!(
                "\"{}\" is not lower than {}",
                describe(actual),
                self.bound
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreaterThan {
    pub bound: f64,
}

impl GreaterThan {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        Ok(Box::new(Self {
            bound: f64_arg("greaterThan", args)?,
        }))
    }
}

impl PatternExpander for GreaterThan {
    fn name(&self) -> &'static str {
        "greaterThan"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        match actual.as_f64() {
            Some(n) if n > self.bound => Ok(()),
            _ => Err(format!(
                "\"{}\" is not greater than {}",
                describe(actual),
                self.bound
            )),
        }
    }
}

// ===== Collections =====

#[derive(Debug, Clone, PartialEq)]
pub struct InArray {
    pub needle: Value,
}

impl InArray {
    pub fn from_args(args: &[Value]) -> Result<Box<dyn PatternExpander>, PatternError> {
        Ok(Box::new(Self {
            needle: single_arg("inArray", args)?.clone(),
        }))
    }
}

impl PatternExpander for InArray {
    fn name(&self) -> &'static str {
        "inArray"
    }

    fn check(&self, actual: &Value) -> Result<(), String> {
        match actual.as_array() {
            Some(items) if items.contains(&self.needle) => Ok(()),
            _ => Err(format!(
                "{} does not contain {}",
                describe(actual),
                self.needle
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn build(name: &str, args: &[Value]) -> Box<dyn PatternExpander> {
        ExpanderRegistry::standard()
            .build(name, args, "@string@")
            .unwrap()
    }

    #[test]
    fn test_length_boundaries() {
        let exact = build("length", &[json!(3)]);
        assert!(exact.check(&json!("bob")).is_ok());
        assert!(exact.check(&json!("bo")).is_err());
        assert!(exact.check(&json!("bobby")).is_err());

        let err = exact.check(&json!("alice")).unwrap_err();
        assert!(err.contains("length 5"));
        assert!(err.contains("length(3)"));
    }

    #[test]
    fn test_min_length_boundaries() {
        let min = build("minLength", &[json!(3)]);
        assert!(min.check(&json!("abc")).is_ok());
        assert!(min.check(&json!("abcd")).is_ok());
        let err = min.check(&json!("ab")).unwrap_err();
        assert!(err.contains("minLength(3)"));
    }

    #[test]
    fn test_max_length_boundaries() {
        let max = build("maxLength", &[json!(3)]);
        assert!(max.check(&json!("abc")).is_ok());
        assert!(max.check(&json!("ab")).is_ok());
        let err = max.check(&json!("abcd")).unwrap_err();
        assert!(err.contains("maxLength(3)"));
        assert!(err.contains("length 4"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let exact = build("length", &[json!(4)]);
        assert!(exact.check(&json!("żółw")).is_ok());
    }

    #[test]
    fn test_length_of_collections() {
        let exact = build("length", &[json!(2)]);
        assert!(exact.check(&json!([1, 2])).is_ok());
        assert!(exact.check(&json!({"a": 1, "b": 2})).is_ok());
        assert!(exact.check(&json!([1])).is_err());
    }

    #[test]
    fn test_length_of_scalar_fails() {
        let exact = build("length", &[json!(1)]);
        let err = exact.check(&json!(7)).unwrap_err();
        assert!(err.contains("cannot compute length"));
    }

    #[test]
    fn test_length_argument_validation() {
        let registry = ExpanderRegistry::standard();
        assert!(registry.build("length", &[], "p").is_err());
        assert!(registry.build("length", &[json!("3")], "p").is_err());
        assert!(registry.build("length", &[json!(1), json!(2)], "p").is_err());
        assert!(registry.build("notEmpty", &[json!(1)], "p").is_err());
        assert!(registry.build("matchRegex", &[json!("(")], "p").is_err());
    }

    #[test]
    fn test_unknown_expander() {
        let registry = ExpanderRegistry::standard();
        let err = registry.build("frobnicate", &[], "@string@.frobnicate()").unwrap_err();
        assert!(matches!(err, PatternError::UnknownExpander { .. }));
    }

    #[test]
    fn test_string_content_expanders() {
        assert!(build("contains", &[json!("ell")]).check(&json!("hello")).is_ok());
        assert!(build("contains", &[json!("xyz")]).check(&json!("hello")).is_err());
        assert!(build("startsWith", &[json!("he")]).check(&json!("hello")).is_ok());
        assert!(build("startsWith", &[json!("lo")]).check(&json!("hello")).is_err());
        assert!(build("endsWith", &[json!("lo")]).check(&json!("hello")).is_ok());
        assert!(build("endsWith", &[json!("lo")]).check(&json!(10)).is_err());
    }

    #[test]
    fn test_emptiness_expanders() {
        let not_empty = build("notEmpty", &[]);
        assert!(not_empty.check(&json!("x")).is_ok());
        assert!(not_empty.check(&json!("")).is_err());
        assert!(not_empty.check(&json!([])).is_err());

        let empty = build("isEmpty", &[]);
        assert!(empty.check(&json!({})).is_ok());
        assert!(empty.check(&Value::Null).is_ok());
        assert!(empty.check(&json!([0])).is_err());
    }

    #[test]
    fn test_numeric_bounds() {
        assert!(build("lowerThan", &[json!(10)]).check(&json!(9.5)).is_ok());
        assert!(build("lowerThan", &[json!(10)]).check(&json!(10)).is_err());
        assert!(build("greaterThan", &[json!(0)]).check(&json!(1)).is_ok());
        assert!(build("greaterThan", &[json!(0)]).check(&json!("1")).is_err());
    }

    #[test]
    fn test_in_array() {
        let expander = build("inArray", &[json!("admin")]);
        assert!(expander.check(&json!(["user", "admin"])).is_ok());
        assert!(expander.check(&json!(["user"])).is_err());
    }

    #[test]
    fn test_custom_expander_registration() {
        #[derive(Debug)]
        struct Even;
        impl PatternExpander for Even {
            fn name(&self) -> &'static str {
                "even"
            }
            fn check(&self, actual: &Value) -> Result<(), String> {
                match actual.as_i64() {
                    Some(n) if n % 2 == 0 => Ok(()),
                    _ => Err("odd".to_string()),
                }
            }
        }

        let mut registry = ExpanderRegistry::new();
        registry.register("even", |_| Ok(Box::new(Even)));
        assert!(registry.contains("even"));
        assert!(!registry.contains("length"));
        let even = registry.build("even", &[], "@integer@.even()").unwrap();
        assert!(even.check(&json!(4)).is_ok());
        assert!(even.check(&json!(5)).is_err());
    }

    proptest! {
        #[test]
        fn prop_length_bounds(s in "[a-z]{1,20}") {
            let n = s.chars().count();
            prop_assert!(build("length", &[json!(n)]).check(&json!(s)).is_ok());
            prop_assert!(build("length", &[json!(n + 1)]).check(&json!(s)).is_err());
            prop_assert!(build("length", &[json!(n - 1)]).check(&json!(s)).is_err());

            prop_assert!(build("minLength", &[json!(n)]).check(&json!(s)).is_ok());
            prop_assert!(build("minLength", &[json!(n - 1)]).check(&json!(s)).is_ok());
            prop_assert!(build("minLength", &[json!(n + 1)]).check(&json!(s)).is_err());

            prop_assert!(build("maxLength", &[json!(n)]).check(&json!(s)).is_ok());
            prop_assert!(build("maxLength", &[json!(n + 1)]).check(&json!(s)).is_ok());
            prop_assert!(build("maxLength", &[json!(n - 1)]).check(&json!(s)).is_err());
        }
    }
}
