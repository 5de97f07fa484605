// Domain modules
pub mod benchmark;
pub mod config;
pub mod error;
pub mod table;
pub mod transaction;

pub use benchmark::{
    BenchmarkSessionRecord, HistoricalSummary, LiveBenchmarkSnapshot, LiveMetrics, RecordId,
};
pub use config::{BackendConfig, ConsoleConfig, SessionConfig};
pub use error::{PqcBenchError, Result};
pub use table::{format_metric, Table};
pub use transaction::{BulkFormat, BulkReceipt, EncryptedTransaction};
