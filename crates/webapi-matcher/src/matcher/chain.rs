//! Ordered first-claim-wins matcher dispatch.

use super::{
    ArrayTokenMatcher, BooleanMatcher, CallbackMatcher, DoubleMatcher, ExpressionMatcher,
    IntegerMatcher, NullMatcher, NumberMatcher, ScalarMatcher, StringMatcher, UuidMatcher,
    ValueMatcher, WildcardMatcher,
};
use crate::error::MatchError;
use crate::pattern::{ExpanderRegistry, PatternParser};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

/// Dispatches a pattern to the first matcher that claims it.
///
/// Registration order is significant: the UUID matcher sits before the
/// string matcher so `@uuid@` is never treated as a generic string token.
#[derive(Debug)]
pub struct ChainMatcher {
    matchers: Vec<Box<dyn ValueMatcher>>,
}

impl ChainMatcher {
    /// Chain over an explicit matcher list, in order.
    pub fn new(matchers: Vec<Box<dyn ValueMatcher>>) -> Self {
        Self { matchers }
    }

    /// The default chain with every built-in matcher and expander.
    pub fn standard() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ChainMatcherBuilder {
        ChainMatcherBuilder::default()
    }

    /// Names of the registered matchers in dispatch order.
    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Whether any matcher claims `pattern`.
    pub fn can_match(&self, pattern: &Value) -> bool {
        self.select(pattern).is_some()
    }

    /// Match `actual` against `pattern` using the first claiming matcher.
    pub fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), MatchError> {
        let Some(matcher) = self.select(pattern) else {
            debug!("No matcher claims pattern {}", pattern);
            return Err(MatchError::UnsupportedPattern {
                pattern: pattern.to_string(),
            });
        };

        trace!("Pattern {} dispatched to {} matcher", pattern, matcher.name());
        matcher.matches(actual, pattern).map_err(MatchError::Mismatch)
    }

    fn select(&self, pattern: &Value) -> Option<&dyn ValueMatcher> {
        self.matchers
            .iter()
            .find(|m| m.can_match(pattern))
            .map(|m| m.as_ref())
    }
}

impl Default for ChainMatcher {
    fn default() -> Self {
        Self::standard()
    }
}

impl ValueMatcher for ChainMatcher {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn can_match(&self, pattern: &Value) -> bool {
        ChainMatcher::can_match(self, pattern)
    }

    fn matches(&self, actual: &Value, pattern: &Value) -> Result<(), String> {
        ChainMatcher::matches(self, actual, pattern).map_err(|e| e.to_string())
    }
}

/// Builder for [`ChainMatcher`] adding callbacks, custom matchers and
/// expanders on top of the standard set.
#[derive(Debug, Default)]
pub struct ChainMatcherBuilder {
    expanders: Option<ExpanderRegistry>,
    callbacks: Vec<CallbackMatcher>,
    custom: Vec<Box<dyn ValueMatcher>>,
}

impl ChainMatcherBuilder {
    /// Replace the expander registry used by the type-token matchers.
    pub fn expanders(mut self, expanders: ExpanderRegistry) -> Self {
        self.expanders = Some(expanders);
        self
    }

    /// Register a callback token, checked right after `@uuid@`.
    pub fn callback(
        mut self,
        token: impl Into<String>,
        callback: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.push(CallbackMatcher::new(token, callback));
        self
    }

    /// Register a custom matcher, checked before every built-in one.
    pub fn matcher(mut self, matcher: impl ValueMatcher + 'static) -> Self {
        self.custom.push(Box::new(matcher));
        self
    }

    pub fn build(self) -> ChainMatcher {
        let parser = Arc::new(PatternParser::new(
            self.expanders.unwrap_or_else(ExpanderRegistry::standard),
        ));

        let mut matchers = self.custom;
        matchers.push(Box::new(UuidMatcher));
        matchers.extend(
            self.callbacks
                .into_iter()
                .map(|c| Box::new(c) as Box<dyn ValueMatcher>),
        );
        matchers.push(Box::new(ExpressionMatcher::new()));
        matchers.push(Box::new(NullMatcher));
        matchers.push(Box::new(StringMatcher::new(parser.clone())));
        matchers.push(Box::new(IntegerMatcher::new(parser.clone())));
        matchers.push(Box::new(BooleanMatcher));
        matchers.push(Box::new(DoubleMatcher::new(parser.clone())));
        matchers.push(Box::new(NumberMatcher::new(parser.clone())));
        matchers.push(Box::new(ArrayTokenMatcher::new(parser)));
        matchers.push(Box::new(ScalarMatcher));
        matchers.push(Box::new(WildcardMatcher));

        ChainMatcher::new(matchers)
    }
}
