use serde::{Deserialize, Serialize};
use std::fmt;

/// Row id as emitted by the backend. Rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// One stored benchmarking run from `/benchmarks/sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSessionRecord {
    pub id: RecordId,
    pub algorithm: String,
    pub latency: f64,
    pub stddev: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub throughput: f64,
    pub error_rate: f64,
    pub encryption_time: f64,
    pub timestamp: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Current in-memory aggregate for one algorithm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub average_latency: f64,
    pub stddev_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub throughput: f64,
    pub error_rate: f64,
}

/// Per-algorithm averages over every stored session, from `/benchmarks/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSummary {
    pub algorithm: String,
    pub avg_latency: f64,
    pub avg_stddev: f64,
    pub avg_min_latency: f64,
    pub avg_max_latency: f64,
    pub avg_throughput: f64,
    pub avg_error_rate: f64,
    pub avg_encryption_time: f64,
}
