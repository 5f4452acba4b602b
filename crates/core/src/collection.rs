//! Ordered key-value collections.
//!
//! A [`Collection`] is an insertion-ordered map from [`Key`] to [`Value`],
//! the same shape for lists (keys `0..n`) and maps (arbitrary keys). Keys are
//! unique; inserting an existing key replaces the value in place.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FluentError;
use crate::value::Value;

/// Collection key: an integer offset or a text key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl Key {
    /// Normalizes text the way array offsets do: canonical integer text
    /// ("12", "-3", but not "012" or "+3") becomes an integer key.
    pub fn from_text(text: &str) -> Key {
        if is_canonical_int(text) {
            if let Ok(i) = text.parse::<i64>() {
                return Key::Int(i);
            }
        }
        Key::Text(text.to_string())
    }

    pub fn to_value(&self) -> Value {
        match self {
            Key::Int(i) => Value::Int(*i),
            Key::Text(s) => Value::Text(s.clone()),
        }
    }
}

fn is_canonical_int(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits == "0" {
        return !text.starts_with('-');
    }
    !digits.starts_with('0')
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i64)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Int(i as i64)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::from_text(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::from_text(&s)
    }
}

impl TryFrom<&Value> for Key {
    type Error = FluentError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(i) => Ok(Key::Int(*i)),
            Value::Text(s) => Ok(Key::from_text(s)),
            Value::Bool(b) => Ok(Key::Int(*b as i64)),
            Value::Null => Ok(Key::Text(String::new())),
            Value::Decimal(d) => {
                let truncated = d.trunc();
                i64::try_from(truncated)
                    .map(Key::Int)
                    .map_err(|_| FluentError::invalid_argument(format!("offset {} out of range", d)))
            }
            other => Err(FluentError::invalid_argument(format!(
                "illegal offset type {}",
                other.type_name()
            ))),
        }
    }
}

// ──────────────────────────────────────────────
// Collection
// ──────────────────────────────────────────────

/// Insertion-ordered key-value container.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    entries: Vec<(Key, Value)>,
    positions: HashMap<Key, usize>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list-shaped collection with keys `0..n`.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut collection = Collection::new();
        for value in values {
            collection.push(value);
        }
        collection
    }

    /// Builds a collection from key-value pairs; a repeated key keeps its
    /// first position and takes the last value.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<Key>,
    {
        let mut collection = Collection::new();
        for (key, value) in entries {
            collection.insert(key.into(), value);
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.positions.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Value> {
        match self.positions.get(key) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.positions.contains_key(key)
    }

    /// Inserts or replaces the value stored under `key`.
    pub fn insert(&mut self, key: Key, value: Value) {
        match self.positions.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Appends under the next integer key (greatest int key + 1, or 0).
    pub fn push(&mut self, value: Value) {
        let key = Key::Int(self.next_index());
        self.insert(key, value);
    }

    pub fn next_index(&self) -> i64 {
        self.entries
            .iter()
            .filter_map(|(k, _)| match k {
                Key::Int(i) => Some(*i),
                Key::Text(_) => None,
            })
            .max()
            .map(|max| max.saturating_add(1).max(0))
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<&Value> {
        self.entries.first().map(|(_, v)| v)
    }

    pub fn last(&self) -> Option<&Value> {
        self.entries.last().map(|(_, v)| v)
    }

    /// Drops the keys, renumbering values `0..n`.
    pub fn reindexed(&self) -> Collection {
        Collection::from_values(self.values().cloned())
    }

    /// True when the keys are exactly `0..n` in order.
    pub fn is_list(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| *k == Key::Int(i as i64))
    }

    pub fn into_values(self) -> Vec<Value> {
        self.entries.into_iter().map(|(_, v)| v).collect()
    }

    /// Array-slice semantics: a negative `offset` counts from the end, a
    /// negative `length` stops that many elements before the end, and
    /// out-of-range bounds clamp. Integer keys are renumbered, text keys kept.
    pub fn slice(&self, offset: i64, length: Option<i64>) -> Collection {
        let len = self.entries.len() as i64;
        let start = if offset < 0 {
            (len + offset).max(0)
        } else {
            offset.min(len)
        };
        let end = match length {
            None => len,
            Some(l) if l < 0 => (len + l).max(start),
            Some(l) => start.saturating_add(l).min(len),
        };

        let mut sliced = Collection::new();
        for (key, value) in &self.entries[start as usize..end.max(start) as usize] {
            match key {
                Key::Int(_) => sliced.push(value.clone()),
                Key::Text(_) => sliced.insert(key.clone(), value.clone()),
            }
        }
        sliced
    }
}

impl IntoIterator for Collection {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<Value> for Collection {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Collection::from_values(iter)
    }
}

impl FromIterator<(Key, Value)> for Collection {
    fn from_iter<T: IntoIterator<Item = (Key, Value)>>(iter: T) -> Self {
        Collection::from_entries(iter)
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
