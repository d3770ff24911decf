//! Type-token parsing.
//!
//! A type token is a string such as `@string@` optionally followed by a single
//! expander call, e.g. `@string@.maxLength(10)` or `@integer@.greaterThan(0)`.
//! The parser splits the token into its kind and an instantiated expander
//! looked up in an [`ExpanderRegistry`].

mod expander;

use crate::error::PatternError;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use expander::{
    length_of, Contains, EndsWith, ExpanderFactory, ExpanderRegistry, GreaterThan, InArray,
    IsEmpty, Length, LowerThan, MatchRegex, MaxLength, MinLength, NotEmpty, PatternExpander,
    StartsWith,
};

/// Matches the `@kind@` head of a token; the remainder holds expander calls.
static TOKEN_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@([A-Za-z_]+|\*|\.\.\.)@").expect("token regex is valid"));

/// Returns true if `pattern` is shaped like a type token: an `@name@` head
/// that is either the whole string or followed by a `.call(...)` suffix.
///
/// Token-shaped strings are never compared literally, so a malformed token
/// surfaces as an unsupported pattern instead of a silent equality check.
/// Strings such as `@bob@home` are plain text.
pub fn is_type_token(pattern: &str) -> bool {
    TOKEN_HEAD
        .find(pattern)
        .is_some_and(|head| matches!(pattern[head.end()..].chars().next(), None | Some('.')))
}

/// The `name` of a token-shaped `@name@...` string, without parsing its
/// expander.
pub fn token_kind(pattern: &str) -> Option<&str> {
    if !is_type_token(pattern) {
        return None;
    }
    TOKEN_HEAD
        .captures(pattern)
        .and_then(|caps| caps.get(1))
        .map(|kind| kind.as_str())
}

/// A parsed type token.
pub struct TypePattern {
    kind: String,
    expander: Option<Box<dyn PatternExpander>>,
}

impl TypePattern {
    /// The token kind without the surrounding `@` (e.g. `string`).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Check whether this token is of the given kind.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// The attached expander, if any.
    pub fn expander(&self) -> Option<&dyn PatternExpander> {
        self.expander.as_deref()
    }

    /// Apply the attached expander to `actual`. Tokens without an expander
    /// always pass.
    pub fn check_expander(&self, actual: &Value) -> Result<(), String> {
        match &self.expander {
            Some(expander) => expander.check(actual),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypePattern")
            .field("kind", &self.kind)
            .field("expander", &self.expander.as_ref().map(|e| e.name()))
            .finish()
    }
}

/// Parser turning token strings into [`TypePattern`]s.
///
/// Successfully parsed tokens are cached by their source text, so a token
/// and its expander (a compiled regex, for instance) are built once per
/// parser.
#[derive(Debug, Default)]
pub struct PatternParser {
    expanders: ExpanderRegistry,
    cache: RwLock<HashMap<String, Arc<TypePattern>>>,
}

impl PatternParser {
    pub fn new(expanders: ExpanderRegistry) -> Self {
        Self {
            expanders,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Parser with every built-in expander registered.
    pub fn standard() -> Self {
        Self::new(ExpanderRegistry::standard())
    }

    pub fn expanders(&self) -> &ExpanderRegistry {
        &self.expanders
    }

    /// Syntax check used by `can_match` implementations.
    pub fn is_valid(&self, pattern: &str) -> bool {
        self.parse(pattern).is_ok()
    }

    /// Number of cached tokens.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    /// Parse a token string, reusing an earlier parse of the same text.
    pub fn parse(&self, pattern: &str) -> Result<Arc<TypePattern>, PatternError> {
        if let Some(token) = self.cache.read().get(pattern) {
            return Ok(token.clone());
        }

        let token = Arc::new(self.parse_uncached(pattern)?);
        self.cache
            .write()
            .entry(pattern.to_string())
            .or_insert_with(|| token.clone());
        Ok(token)
    }

    fn parse_uncached(&self, pattern: &str) -> Result<TypePattern, PatternError> {
        let caps = TOKEN_HEAD
            .captures(pattern)
            .ok_or_else(|| PatternError::Syntax(pattern.to_string()))?;
        let head = caps.get(0).map_or(0, |m| m.end());
        let kind = caps[1].to_string();

        let mut calls = split_calls(pattern, &pattern[head..])?;
        if calls.len() > 1 {
            return Err(PatternError::MultipleExpanders(pattern.to_string()));
        }

        let expander = match calls.pop() {
            Some((name, args)) => Some(self.expanders.build(&name, &args, pattern)?),
            None => None,
        };

        Ok(TypePattern { kind, expander })
    }
}

/// Split `.name(args).name(args)` into calls with parsed arguments.
fn split_calls(pattern: &str, rest: &str) -> Result<Vec<(String, Vec<Value>)>, PatternError> {
    let syntax = || PatternError::Syntax(pattern.to_string());
    let chars: Vec<char> = rest.chars().collect();
    let mut calls = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '.' {
            return Err(syntax());
        }
        i += 1;

        let start = i;
        while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
            i += 1;
        }
        if start == i || i >= chars.len() || chars[i] != '(' {
            return Err(syntax());
        }
        let name: String = chars[start..i].iter().collect();
        i += 1;

        // Scan to the closing parenthesis, skipping quoted sections.
        let args_start = i;
        let mut quote: Option<char> = None;
        while i < chars.len() {
            let c = chars[i];
            match quote {
                Some(_) if c == '\\' => i += 1,
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some(c),
                None if c == ')' => break,
                None => {}
            }
            i += 1;
        }
        if i >= chars.len() {
            return Err(syntax());
        }
        let raw: String = chars[args_start..i].iter().collect();
        i += 1;

        let args = parse_arguments(&name, &raw)?;
        calls.push((name, args));
    }

    Ok(calls)
}

/// Parse a comma separated argument list into JSON values.
fn parse_arguments(expander: &str, raw: &str) -> Result<Vec<Value>, PatternError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in raw.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match quote {
            Some(_) if c == '\\' => {
                current.push(c);
                escaped = true;
            }
            Some(q) if c == q => {
                current.push(c);
                quote = None;
            }
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                current.push(c);
                quote = Some(c);
            }
            None if c == ',' => {
                args.push(parse_argument(expander, current.trim())?);
                current.clear();
            }
            None => current.push(c),
        }
    }

    if !current.trim().is_empty() || !args.is_empty() {
        args.push(parse_argument(expander, current.trim())?);
    }

    Ok(args)
}

fn parse_argument(expander: &str, raw: &str) -> Result<Value, PatternError> {
    let invalid = |reason: String| PatternError::InvalidArgument {
        expander: expander.to_string(),
        reason,
    };

    if raw.is_empty() {
        return Err(invalid("empty argument".to_string()));
    }

    let first = raw.chars().next().unwrap_or_default();
    if (first == '"' || first == '\'') && raw.len() >= 2 && raw.ends_with(first) {
        return Ok(Value::String(unescape(&raw[1..raw.len() - 1], first)));
    }

    match raw {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "null" => return Ok(Value::Null),
        _ => {}
    }

    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Value::from(i));
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Ok(Value::Number(n));
        }
    }

    Err(invalid(format!("cannot parse '{raw}'")))
}

/// Only the quote character and backslash are unescaped; other escapes are
/// kept verbatim so regular expressions survive.
fn unescape(raw: &str, quote: char) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next) if next == quote || next == '\\' => {
                    out.push(next);
                    chars.next();
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_token() {
        let parser = PatternParser::standard();
        let token = parser.parse("@string@").unwrap();
        assert!(token.is("string"));
        assert!(token.expander().is_none());
    }

    #[test]
    fn test_parse_token_with_expander() {
        let parser = PatternParser::standard();
        let token = parser.parse("@string@.length(3)").unwrap();
        assert_eq!(token.kind(), "string");
        assert_eq!(token.expander().map(|e| e.name()), Some("length"));
        assert!(token.check_expander(&json!("bob")).is_ok());
        assert!(token.check_expander(&json!("alice")).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_expander() {
        let parser = PatternParser::standard();
        let err = parser.parse("@string@.shout(1)").unwrap_err();
        assert!(matches!(err, PatternError::UnknownExpander { ref name, .. } if name == "shout"));
    }

    #[test]
    fn test_parse_rejects_multiple_expanders() {
        let parser = PatternParser::standard();
        let err = parser.parse("@string@.minLength(1).maxLength(3)").unwrap_err();
        assert!(matches!(err, PatternError::MultipleExpanders(_)));
    }

    #[test]
    fn test_parse_rejects_garbage_suffix() {
        let parser = PatternParser::standard();
        assert!(matches!(
            parser.parse("@string@foo"),
            Err(PatternError::Syntax(_))
        ));
        assert!(matches!(
            parser.parse("@string@.length(3"),
            Err(PatternError::Syntax(_))
        ));
        assert!(matches!(
            parser.parse("plain text"),
            Err(PatternError::Syntax(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_argument() {
        let parser = PatternParser::standard();
        assert!(matches!(
            parser.parse("@string@.length(abc)"),
            Err(PatternError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parser.parse("@string@.length(-1)"),
            Err(PatternError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_quoted_arguments_keep_parentheses_and_commas() {
        let args = parse_arguments("contains", r#""a,b)", 'it\'s'"#).unwrap();
        assert_eq!(args, vec![json!("a,b)"), json!("it's")]);

        let parser = PatternParser::standard();
        let token = parser.parse(r#"@string@.contains("(x)")"#).unwrap();
        assert!(token.check_expander(&json!("f(x)")).is_ok());
    }

    #[test]
    fn test_regex_argument_escapes_survive() {
        let parser = PatternParser::standard();
        let token = parser.parse(r#"@string@.matchRegex("^\d+\.\d$")"#).unwrap();
        assert!(token.check_expander(&json!("12.5")).is_ok());
        assert!(token.check_expander(&json!("12x5")).is_err());
    }

    #[test]
    fn test_scalar_arguments() {
        assert_eq!(
            parse_arguments("x", "1, 2.5, true, null").unwrap(),
            vec![json!(1), json!(2.5), json!(true), Value::Null]
        );
        assert!(parse_arguments("x", "").unwrap().is_empty());
        assert!(parse_arguments("x", "1,").is_err());
    }

    #[test]
    fn test_parse_reuses_cached_token() {
        let parser = PatternParser::standard();
        let first = parser.parse(r#"@string@.matchRegex("^[a-z]+$")"#).unwrap();
        let second = parser.parse(r#"@string@.matchRegex("^[a-z]+$")"#).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(parser.cached(), 1);

        assert!(parser.parse("@string@.shout(1)").is_err());
        assert_eq!(parser.cached(), 1);
    }

    #[test]
    fn test_token_kind() {
        assert_eq!(token_kind("@string@.length(3)"), Some("string"));
        assert_eq!(token_kind("@uuid@"), Some("uuid"));
        assert_eq!(token_kind("@bob@home"), None);
        assert_eq!(token_kind("plain"), None);
    }

    #[test]
    fn test_is_type_token() {
        assert!(is_type_token("@string@"));
        assert!(is_type_token("@*@"));
        assert!(is_type_token("@...@"));
        assert!(is_type_token("@string@.nope(1)"));
        assert!(!is_type_token("user@example.com"));
        assert!(!is_type_token("@ not a token"));
        assert!(!is_type_token("@bob@home"));
        assert!(!is_type_token("@string@ "));
        assert!(is_type_token("@strng@"));
    }
}
