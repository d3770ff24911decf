//! Callback tokens and `expr(...)` expressions.

use super::{describe, Mismatch, ValueMatcher};
use once_cell::sync::Lazy;
use regex::Regex;
use rhai::{Dynamic, Engine, Scope};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type Callback = dyn Fn(&Value) -> bool + Send + Sync;

/// A user supplied predicate bound to a custom token, e.g. `@even@`.
#[derive(Clone)]
pub struct CallbackMatcher {
    token: String,
    callback: Arc<Callback>,
}

impl CallbackMatcher {
    pub fn new(
        token: impl Into<String>,
        callback: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            token: token.into(),
            callback: Arc::new(callback),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for CallbackMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackMatcher")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl ValueMatcher for CallbackMatcher {
    fn name(&self) -> &'static str {
        "callback"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        pattern.as_str() == Some(self.token.as_str())
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch> {
        if (self.callback)(actual) {
            Ok(())
        } else {
            Err(format!(
                "\"{}\" does not match \"{}\" callback.",
                describe(actual),
                describe(pattern)
            ))
        }
    }
}

static EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^expr\((.*)\)$").expect("expression regex is valid"));

/// Upper bound on rhai operations per evaluation.
const MAX_OPERATIONS: u64 = 10_000;

/// `expr(<rhai expression>)` evaluated with `value` bound to the actual value.
pub struct ExpressionMatcher {
    engine: Engine,
}

impl ExpressionMatcher {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(MAX_OPERATIONS);
        Self { engine }
    }

    fn expression(pattern: &Value) -> Option<&str> {
        let source = pattern.as_str()?;
        EXPRESSION
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

impl Default for ExpressionMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExpressionMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionMatcher").finish_non_exhaustive()
    }
}

impl ValueMatcher for ExpressionMatcher {
    fn name(&self) -> &'static str {
        "expression"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        Self::expression(pattern).is_some()
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), Mismatch> {
        let expression = Self::expression(pattern)
            .ok_or_else(|| format!("\"{}\" is not an expression", describe(pattern)))?;

        let value = rhai::serde::to_dynamic(actual)
            .map_err(|e| format!("cannot expose \"{}\" to expression: {e}", describe(actual)))?;
        let mut scope = Scope::new();
        scope.push_dynamic("value", value);

        let result: Dynamic = self
            .engine
            .eval_expression_with_scope(&mut scope, expression)
            .map_err(|e| format!("expression \"{expression}\" failed: {e}"))?;

        match result.as_bool() {
            Ok(true) => Ok(()),
            Ok(false) => Err(format!(
                "\"{}\" does not match \"{}\".",
                describe(actual),
                describe(pattern)
            )),
            Err(kind) => Err(format!(
                "expression \"{expression}\" returned {kind}, expected bool"
            )),
        }
    }
}
