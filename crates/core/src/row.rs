use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One extracted record: column label → raw string value.
///
/// Labels are kept exactly as extracted (case-sensitive). Rows are ephemeral
/// and only live between extraction and normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    pub fn new() -> Self {
        RawRow(BTreeMap::new())
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.0.insert(label.into(), value.into());
    }

    /// First alias with a non-empty value, in the given order. Only an empty
    /// string falls through; a whitespace-only value is returned as is.
    pub fn first_present<'a>(&'a self, aliases: &[&str]) -> Option<&'a str> {
        aliases
            .iter()
            .filter_map(|label| self.get(label))
            .find(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawRow(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
