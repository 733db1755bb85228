//! Resource table: logical path -> owned byte buffer.

use bytes::Bytes;
use indexmap::IndexMap;
use rmpv::Value;
use serde::{Deserialize, Serialize};

/// Ordered mapping from resource path to bytes.
///
/// Enumeration follows insertion order; equality ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceMap(IndexMap<String, Bytes>);

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resource. A missing path is `None`, never an empty buffer.
    pub fn get(&self, path: &str) -> Option<&Bytes> {
        self.0.get(path)
    }

    /// Resource paths in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bytes)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total payload size across all resources.
    pub fn total_bytes(&self) -> usize {
        self.0.values().map(Bytes::len).sum()
    }

    /// Map form used on pack: path string -> binary.
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.0
                .iter()
                .map(|(path, bytes)| (Value::from(path.as_str()), Value::Binary(bytes.to_vec())))
                .collect(),
        )
    }

    pub(crate) fn insert(&mut self, path: String, bytes: Bytes) -> Option<Bytes> {
        self.0.insert(path, bytes)
    }
}

impl<P: Into<String>, B: Into<Bytes>> FromIterator<(P, B)> for ResourceMap {
    fn from_iter<I: IntoIterator<Item = (P, B)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(path, bytes)| (path.into(), bytes.into()))
                .collect(),
        )
    }
}

impl IntoIterator for ResourceMap {
    type Item = (String, Bytes);
    type IntoIter = indexmap::map::IntoIter<String, Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
