mod snapshot;
mod types;

pub use snapshot::LiveBenchmarkSnapshot;
pub use types::{BenchmarkSessionRecord, HistoricalSummary, LiveMetrics, RecordId};
