//! Request header bookkeeping.
//!
//! Setting a header that already exists keeps the old value and appends the
//! new one, so a name can carry a list of values.

use serde::Serialize;

/// Value(s) stored under one header name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

impl HeaderValues {
    fn push(&mut self, value: String) {
        match self {
            HeaderValues::One(first) => {
                *self = HeaderValues::Many(vec![std::mem::take(first), value]);
            }
            HeaderValues::Many(values) => values.push(value),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            HeaderValues::One(v) => std::slice::from_ref(v),
            HeaderValues::Many(vs) => vs,
        };
        values.iter().map(String::as_str)
    }
}

/// Headers to attach to the next request, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestHeaders {
    entries: Vec<(String, HeaderValues)>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, accumulating into a list when `name` is already set.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, HeaderValues::One(value))),
        }
    }

    /// Remove every value stored under `name`. Unknown names are ignored.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValues> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten into `(name, value)` pairs, one per value.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.clone(), v.to_string())))
            .collect()
    }
}
