//! Literal placeholder substitution for URLs and bodies.

/// Ordered set of `token -> value` replacements.
///
/// Replacements run in insertion order, so a value written by an earlier
/// placeholder can itself be replaced by a later one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    entries: Vec<(String, String)>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or update a placeholder. Updating keeps the original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn replace(&self, text: &str) -> String {
        self.entries
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .fold(text.to_string(), |acc, (key, value)| acc.replace(key, value))
    }
}
