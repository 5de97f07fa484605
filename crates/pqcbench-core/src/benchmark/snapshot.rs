use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::LiveMetrics;

/// Algorithm name to live metrics, in the order the backend listed them.
///
/// Keys are unique. A repeated key keeps its first position and takes the
/// last value, matching how a browser's `JSON.parse` treats duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveBenchmarkSnapshot {
    entries: Vec<(String, LiveMetrics)>,
}

impl LiveBenchmarkSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, algorithm: impl Into<String>, metrics: LiveMetrics) {
        let algorithm = algorithm.into();
        match self.entries.iter_mut().find(|(name, _)| *name == algorithm) {
            Some((_, existing)) => *existing = metrics,
            None => self.entries.push((algorithm, metrics)),
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, algorithm: &str) -> Option<&LiveMetrics> {
        self.entries
            .iter()
            .find(|(name, _)| name == algorithm)
            .map(|(_, m)| m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LiveMetrics)> {
        self.entries.iter().map(|(name, m)| (name.as_str(), m))
    }

    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, LiveMetrics)> for LiveBenchmarkSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, LiveMetrics)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (algorithm, metrics) in iter {
            snapshot.insert(algorithm, metrics);
        }
        snapshot
    }
}

impl Serialize for LiveBenchmarkSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, metrics) in &self.entries {
            map.serialize_entry(name, metrics)?;
        }
        map.end()
    }
}

struct SnapshotVisitor;

impl<'de> Visitor<'de> for SnapshotVisitor {
    type Value = LiveBenchmarkSnapshot;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of algorithm name to live metrics")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut snapshot = LiveBenchmarkSnapshot {
            entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
        };
        while let Some((algorithm, metrics)) = access.next_entry::<String, LiveMetrics>()? {
            snapshot.insert(algorithm, metrics);
        }
        Ok(snapshot)
    }
}

impl<'de> Deserialize<'de> for LiveBenchmarkSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SnapshotVisitor)
    }
}
