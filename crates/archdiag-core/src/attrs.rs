use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Graphviz-style string attributes, kept in insertion order.
///
/// Values stay strings (`"0.60"`, `"#2D3436"`, `"ortho"`) so they can be forwarded verbatim to
/// DOT output; typed readers parse on access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attrs(IndexMap<String, String>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parses a numeric attribute. Non-finite or unparsable values read as absent.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        let v = self.get(key)?.trim().parse::<f64>().ok()?;
        v.is_finite().then_some(v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Overlays `other` on top of `self`, key by key. Existing keys keep their position.
    pub fn extend_from(&mut self, other: &Attrs) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn merged(&self, over: &Attrs) -> Attrs {
        let mut out = self.clone();
        out.extend_from(over);
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
