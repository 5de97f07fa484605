use pqcbench_core::Table;
use std::sync::{Mutex, MutexGuard};

pub const INVALID_JSON: &str = "❌ Invalid JSON format.";
pub const SINGLE_PUSHED: &str = "✅ 1 transaction pushed successfully!";
pub const NO_FILE_SELECTED: &str = "Please select a file.";

pub fn push_failed(reason: &str) -> String {
    format!("❌ Push failed: {}", reason)
}

pub fn bulk_complete(total_records: u64) -> String {
    format!("✅ Bulk load complete. Processed: {}.", total_records)
}

pub fn bulk_failed(reason: &str) -> String {
    format!("❌ Bulk load failed: {}", reason)
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// A single line of user-facing status text. Last write wins.
#[derive(Debug, Default)]
pub struct StatusSurface {
    text: Mutex<String>,
}

impl StatusSurface {
    pub fn set(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!("Status: {}", text);
        *lock(&self.text) = text;
    }

    pub fn text(&self) -> String {
        lock(&self.text).clone()
    }
}

/// Per-step log of the most recent bulk upload.
#[derive(Debug, Default)]
pub struct BulkLog {
    lines: Mutex<Vec<String>>,
}

impl BulkLog {
    pub fn push(&self, line: impl Into<String>) {
        lock(&self.lines).push(line.into());
    }

    pub fn clear(&self) {
        lock(&self.lines).clear();
    }

    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }
}

/// Holds the last successfully rendered table of one kind.
#[derive(Debug, Default)]
pub struct TableSlot {
    table: Mutex<Option<Table>>,
}

impl TableSlot {
    pub fn replace(&self, table: Table) {
        *lock(&self.table) = Some(table);
    }

    pub fn get(&self) -> Option<Table> {
        lock(&self.table).clone()
    }
}
