//! Placeholder pairs and literal substitution

use std::fmt::Display;

use super::types::{MessageError, MessageResult};

/// Characters stripped from a supplied placeholder key
const DELIMITERS: [char; 3] = ['%', '{', '}'];

/// Remove placeholder delimiters, so `{name}`, `%name%` and `name` all
/// refer to the same placeholder
pub fn strip_delimiters(key: &str) -> String {
    key.chars().filter(|c| !DELIMITERS.contains(c)).collect()
}

/// Ordered placeholder name/value pairs for one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    pairs: Vec<(String, String)>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl AsRef<str>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Display) {
        self.pairs
            .push((strip_delimiters(key.as_ref()), value.to_string()));
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        let mut placeholders = Self::new();
        for (key, value) in pairs {
            placeholders.insert(key, value);
        }
        placeholders
    }

    /// Build from an alternating `key, value, key, value` list.
    ///
    /// An odd number of items is a caller error and nothing is built.
    pub fn from_flat<I, T>(items: I) -> MessageResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let items: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
        if items.len() % 2 != 0 {
            return Err(MessageError::OddPlaceholderCount { count: items.len() });
        }

        let mut placeholders = Self::new();
        let mut iter = items.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            placeholders.insert(key, value);
        }
        Ok(placeholders)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Normalized names with their values, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace `{name}` and `%name%` tokens in `template`. Markup tags such
    /// as `<gold>` are never touched.
    ///
    /// Pairs are applied one after another on the running result, so a value
    /// inserted by an earlier pair can be matched by a later one.
    pub fn apply(&self, template: &str) -> String {
        let mut result = template.to_string();

        for (name, value) in self.iter() {
            if name.is_empty() {
                continue;
            }
            for token in [format!("{{{}}}", name), format!("%{}%", name)] {
                if result.contains(&token) {
                    result = result.replace(&token, value);
                }
            }
        }

        result
    }
}
