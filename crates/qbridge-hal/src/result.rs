//! Measurement results.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Histogram of measured bitstrings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, n: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += n;
    }

    /// Observations of `bitstring`, zero if it was never seen.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries by descending count, ties broken by bitstring.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.sorted().into_iter().next()
    }

    /// Relative frequency of `bitstring`.
    pub fn probability(&self, bitstring: &str) -> f64 {
        match self.total_shots() {
            0 => 0.0,
            total => self.get(bitstring) as f64 / total as f64,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.sorted().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}

/// Result of executing one circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub counts: Counts,
    pub shots: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl ExecutionResult {
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_accumulates() {
        let mut counts = Counts::new();
        counts.insert("00", 400);
        counts.insert("11", 500);
        counts.insert("00", 100);
        assert_eq!(counts.get("00"), 500);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 1000);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_sorted_ties_by_bitstring() {
        let counts: Counts = [("11", 10), ("00", 10), ("01", 3)].into_iter().collect();
        assert_eq!(counts.sorted(), vec![("00", 10), ("11", 10), ("01", 3)]);
        assert_eq!(counts.most_frequent(), Some(("00", 10)));
        assert_eq!(counts.to_string(), "{00: 10, 11: 10, 01: 3}");
    }

    #[test]
    fn test_probability() {
        let counts: Counts = [("0", 1), ("1", 3)].into_iter().collect();
        assert!((counts.probability("1") - 0.75).abs() < 1e-12);
        assert_eq!(Counts::new().probability("0"), 0.0);
    }

    #[test]
    fn test_result_serde() {
        let counts: Counts = [("0", 7)].into_iter().collect();
        let result = ExecutionResult::new(counts, 7).with_execution_time(12);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["counts"]["0"], 7);
        assert!(json.get("metadata").is_none());
        let back: ExecutionResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
