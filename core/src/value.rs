//! Bound values and the result mapping.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A value bound to one grammar element after matching.
///
/// The grammar fully determines which shape each element takes, so this is a
/// closed variant rather than an open dynamic type: switches for plain
/// commands and flags, counts for repeated no-argument elements, strings for
/// single-valued ones, lists for repeated valued ones.
///
/// Serializes untagged: `Switch` → bool, `Counted` → number,
/// `Plain` → string or null, `List` → array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Present / absent.
    Switch(bool),
    /// Number of occurrences of a repeating no-argument element.
    Counted(u64),
    /// A single string value; `None` when unmatched and no default exists.
    Plain(Option<String>),
    /// Accumulated string values of a repeating valued element, in match
    /// order.
    List(Vec<String>),
}

/// The final mapping from element spelling to bound value.
///
/// Keys are the elements' literal source spellings (`<name>`, `--speed`,
/// `ship`). Iteration and serialization order is the keys' sort order, so a
/// given grammar and argument vector always render identically.
///
/// The typed accessors are lenient: a missing key or a value of another
/// shape yields a zero value rather than a panic, so hosts can read the map
/// without matching on [`Value`].
///
/// # Examples
///
/// ```
/// use argot_core::{ArgMap, Value};
///
/// let mut map = ArgMap::new();
/// map.insert("<name>", Value::List(vec!["Titanic".into(), "Bismarck".into()]));
/// map.insert("--speed", Value::Plain(Some("10".into())));
///
/// assert_eq!(map.get_vec("<name>"), ["Titanic", "Bismarck"]);
/// assert_eq!(map.get_str("--speed"), "10");
/// assert_eq!(map.get_count("--speed"), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArgMap {
    entries: BTreeMap<String, Value>,
}

impl ArgMap {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the value for `spelling`.
    pub fn insert(&mut self, spelling: impl Into<String>, value: Value) {
        self.entries.insert(spelling.into(), value);
    }

    /// The raw value for `spelling`, if present.
    pub fn get(&self, spelling: &str) -> Option<&Value> {
        self.entries.get(spelling)
    }

    /// True when the map has an entry for `spelling`.
    pub fn contains(&self, spelling: &str) -> bool {
        self.entries.contains_key(spelling)
    }

    /// Switch value; `false` for missing keys and non-switch values, `true`
    /// also for non-zero counts.
    pub fn get_bool(&self, spelling: &str) -> bool {
        match self.entries.get(spelling) {
            Some(Value::Switch(b)) => *b,
            Some(Value::Counted(n)) => *n > 0,
            _ => false,
        }
    }

    /// Occurrence count; `0` for missing keys, `1` for a set switch.
    pub fn get_count(&self, spelling: &str) -> u64 {
        match self.entries.get(spelling) {
            Some(Value::Counted(n)) => *n,
            Some(Value::Switch(true)) => 1,
            _ => 0,
        }
    }

    /// String value; `""` for missing, unset, or non-string values.
    pub fn get_str(&self, spelling: &str) -> &str {
        match self.entries.get(spelling) {
            Some(Value::Plain(Some(s))) => s,
            _ => "",
        }
    }

    /// List value; empty for missing keys and non-list values.
    pub fn get_vec(&self, spelling: &str) -> &[String] {
        match self.entries.get(spelling) {
            Some(Value::List(items)) => items,
            _ => &[],
        }
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ArgMap {
    /// Renders the map as pretty-printed JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}
