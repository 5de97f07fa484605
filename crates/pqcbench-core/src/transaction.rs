use serde::{Deserialize, Serialize};
use std::path::Path;

/// Body of a successful `/encrypt-transaction/` call (hex-encoded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedTransaction {
    pub public_key: String,
    pub oqs_ciphertext: String,
    pub aes_ciphertext: String,
}

/// Body of a successful `/pushBulk` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReceipt {
    pub total_records: u64,
}

/// Bulk file format as implied by its extension.
///
/// Only used to label the multipart part; the backend decides how to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkFormat {
    Csv,
    Json,
    Other,
}

impl BulkFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("csv") => BulkFormat::Csv,
            Some("json") => BulkFormat::Json,
            _ => BulkFormat::Other,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            BulkFormat::Csv => "text/csv",
            BulkFormat::Json => "application/json",
            BulkFormat::Other => "application/octet-stream",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BulkFormat::Csv => "csv",
            BulkFormat::Json => "json",
            BulkFormat::Other => "other",
        }
    }
}
