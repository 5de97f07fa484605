use pqcbench_client::ApiClient;
use pqcbench_core::{
    BulkFormat, BulkReceipt, ConsoleConfig, EncryptedTransaction, PqcBenchError, Result,
    SessionConfig, Table,
};
use std::path::Path;
use std::sync::Mutex;

use crate::status::{self, lock, BulkLog, StatusSurface, TableSlot};
use crate::tabs::TabController;

/// Operator console: panels, status surfaces and rendered tables bound to one backend.
///
/// Every action takes `&self`, so a single transaction push and a bulk upload
/// may run concurrently. Each writes only to its own status surface.
#[derive(Debug)]
pub struct Console {
    client: ApiClient,
    session: SessionConfig,
    tabs: Mutex<TabController>,
    single_status: StatusSurface,
    bulk_status: StatusSurface,
    bulk_log: BulkLog,
    session_table: TableSlot,
    live_table: TableSlot,
    history_table: TableSlot,
    navigations: Mutex<Vec<String>>,
}

impl Console {
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        config.validate()?;
        let client = ApiClient::new(&config.backend)?;

        if let Some(user) = &config.session.user {
            client.set_cookie(&format!("{}={}; path=/", config.session.cookie_name, user));
        }

        Ok(Self {
            client,
            session: config.session.clone(),
            tabs: Mutex::new(TabController::default()),
            single_status: StatusSurface::default(),
            bulk_status: StatusSurface::default(),
            bulk_log: BulkLog::default(),
            session_table: TableSlot::default(),
            live_table: TableSlot::default(),
            history_table: TableSlot::default(),
            navigations: Mutex::new(Vec::new()),
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // -------------------------------------------------------------------------
    // Tabs
    // -------------------------------------------------------------------------

    pub fn show_tab(&self, tab_id: &str) -> bool {
        lock(&self.tabs).show_tab(tab_id)
    }

    pub fn active_tab(&self) -> Option<String> {
        lock(&self.tabs).active().map(str::to_string)
    }

    pub fn tab_ids(&self) -> Vec<String> {
        lock(&self.tabs).ids().map(str::to_string).collect()
    }

    // -------------------------------------------------------------------------
    // Submitters
    // -------------------------------------------------------------------------

    /// Parses `raw` as JSON and submits it for encryption.
    ///
    /// Invalid JSON never reaches the network. The single-transaction status
    /// is updated on every path.
    pub async fn push_single(&self, raw: &str) -> Result<Option<EncryptedTransaction>> {
        let transaction: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                let err = PqcBenchError::InvalidJson(e);
                log_failure("Transaction push", &err);
                self.single_status.set(status::INVALID_JSON);
                return Err(err);
            }
        };

        match self.client.encrypt_transaction(&transaction).await {
            Ok(encrypted) => {
                self.single_status.set(status::SINGLE_PUSHED);
                Ok(encrypted)
            }
            Err(e) => {
                log_failure("Transaction push", &e);
                self.single_status.set(status::push_failed(&e.status_text()));
                Err(e)
            }
        }
    }

    /// Uploads `file` to the bulk-ingest endpoint.
    ///
    /// `None` means no file was selected; nothing is sent in that case.
    pub async fn push_bulk(&self, file: Option<&Path>) -> Result<BulkReceipt> {
        self.bulk_log.clear();

        let Some(path) = file else {
            let err = PqcBenchError::NoFileSelected;
            log_failure("Bulk load", &err);
            self.bulk_status.set(status::NO_FILE_SELECTED);
            return Err(err);
        };

        let result = self.upload(path).await;
        match &result {
            Ok(receipt) => {
                self.bulk_log
                    .push(format!("Processed {} records", receipt.total_records));
                self.bulk_status.set(status::bulk_complete(receipt.total_records));
            }
            Err(e) => {
                log_failure(&format!("Bulk load of {:?}", path), e);
                self.bulk_log.push(format!("Failed: {}", e));
                self.bulk_status.set(status::bulk_failed(&e.status_text()));
            }
        }
        result
    }

    async fn upload(&self, path: &Path) -> Result<BulkReceipt> {
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let format = BulkFormat::from_path(path);

        self.bulk_log.push(format!(
            "Selected {} ({} bytes, {})",
            file_name,
            contents.len(),
            format.label()
        ));
        self.bulk_log.push("Uploading");

        self.client.push_bulk(&file_name, contents, format).await
    }

    // -------------------------------------------------------------------------
    // Benchmark tables
    // -------------------------------------------------------------------------

    /// Rebuilds the session-history table. A failed fetch keeps the previous table.
    pub async fn fetch_session_benchmarks(&self) -> Result<Table> {
        let records = self.client.session_benchmarks().await?;
        tracing::info!("Rendering {} session benchmark records", records.len());
        let table = Table::sessions(&records);
        self.session_table.replace(table.clone());
        Ok(table)
    }

    /// Rebuilds the live-snapshot table, one row per algorithm in response order.
    pub async fn fetch_live_benchmarks(&self) -> Result<Table> {
        let snapshot = self.client.live_benchmarks().await?;
        tracing::info!(
            "Rendering live benchmarks for {}",
            snapshot.algorithms().collect::<Vec<_>>().join(", ")
        );
        let table = Table::live(&snapshot);
        self.live_table.replace(table.clone());
        Ok(table)
    }

    pub async fn fetch_history_benchmarks(&self) -> Result<Table> {
        let summaries = self.client.history_benchmarks().await?;
        let table = Table::history(&summaries);
        self.history_table.replace(table.clone());
        Ok(table)
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// Expires the session cookie and navigates to the logout route.
    ///
    /// Returns the status code of the logout route.
    pub async fn logout(&self) -> Result<u16> {
        self.client.set_cookie(&format!(
            "{}=; Max-Age=0; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/",
            self.session.cookie_name
        ));
        tracing::info!("Cleared {} cookie", self.session.cookie_name);

        let path = self.session.logout_path.clone();
        lock(&self.navigations).push(path.clone());
        self.client.navigate(&path).await
    }

    /// Cancels whatever request is in flight.
    pub fn cancel(&self) {
        self.client.cancel_pending();
    }

    // -------------------------------------------------------------------------
    // View state
    // -------------------------------------------------------------------------

    pub fn single_status(&self) -> String {
        self.single_status.text()
    }

    pub fn bulk_status(&self) -> String {
        self.bulk_status.text()
    }

    pub fn bulk_log(&self) -> Vec<String> {
        self.bulk_log.lines()
    }

    pub fn session_table(&self) -> Option<Table> {
        self.session_table.get()
    }

    pub fn live_table(&self) -> Option<Table> {
        self.live_table.get()
    }

    pub fn history_table(&self) -> Option<Table> {
        self.history_table.get()
    }

    pub fn session_cookie(&self) -> Option<String> {
        self.client.cookie(&self.session.cookie_name)
    }

    pub fn navigations(&self) -> Vec<String> {
        lock(&self.navigations).clone()
    }
}

/// Operator input mistakes are warnings; anything past the network is an error.
fn log_failure(action: &str, err: &PqcBenchError) {
    if err.is_input_error() {
        tracing::warn!("{} rejected locally: {}", action, err);
    } else {
        tracing::error!("{} failed: {}", action, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabs::{LIVE_TAB, PUSH_TAB};

    fn offline_console() -> Console {
        let mut config = ConsoleConfig::default();
        config.backend.base_url = "http://127.0.0.1:9".to_string();
        config.session.user = Some("alice".to_string());
        Console::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_json_sets_fixed_message() {
        let console = offline_console();
        for raw in ["", "{", "not json", "{'a': 1}", "[1,]"] {
            let err = console.push_single(raw).await.unwrap_err();
            assert!(matches!(err, PqcBenchError::InvalidJson(_)), "input {raw:?}");
            assert_eq!(console.single_status(), status::INVALID_JSON);
        }
        assert_eq!(console.bulk_status(), "");
    }

    #[tokio::test]
    async fn test_missing_file_sets_message() {
        let console = offline_console();
        let err = console.push_bulk(None).await.unwrap_err();
        assert!(matches!(err, PqcBenchError::NoFileSelected));
        assert_eq!(console.bulk_status(), status::NO_FILE_SELECTED);
        assert!(console.bulk_log().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_file_is_reported() {
        let console = offline_console();
        let missing = Path::new("/definitely/not/here.csv");
        let err = console.push_bulk(Some(missing)).await.unwrap_err();
        assert!(matches!(err, PqcBenchError::Io(_)));
        assert!(console.bulk_status().starts_with("❌ Bulk load failed:"));
    }

    #[test]
    fn test_seeded_cookie_and_tabs() {
        let console = offline_console();
        assert_eq!(console.session_cookie().as_deref(), Some("alice"));
        assert_eq!(console.active_tab().as_deref(), Some(PUSH_TAB));
        assert!(console.show_tab(LIVE_TAB));
        assert_eq!(console.active_tab().as_deref(), Some(LIVE_TAB));
        assert!(!console.show_tab("nope"));
        assert_eq!(console.active_tab(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ConsoleConfig::default();
        config.backend.timeout_secs = 0;
        assert!(Console::new(&config).is_err());
    }
}
