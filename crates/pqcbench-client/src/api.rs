use pqcbench_core::{
    BackendConfig, BenchmarkSessionRecord, BulkFormat, BulkReceipt, EncryptedTransaction,
    HistoricalSummary, LiveBenchmarkSnapshot, PqcBenchError, Result,
};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{multipart, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub const ENCRYPT_TRANSACTION_PATH: &str = "/encrypt-transaction/";
pub const PUSH_BULK_PATH: &str = "/pushBulk";
pub const SESSIONS_PATH: &str = "/benchmarks/sessions";
pub const LIVE_PATH: &str = "/benchmarks/live";
pub const HISTORY_PATH: &str = "/benchmarks/history";

/// Multipart field the bulk endpoint reads the upload from.
pub const BULK_FIELD: &str = "file";

/// Client for the encryption and benchmark backend.
///
/// Every call honours the configured timeout and can be aborted with
/// [`ApiClient::cancel_pending`]. Cookies set by the backend or seeded with
/// [`ApiClient::set_cookie`] are sent on every request.
#[derive(Debug)]
pub struct ApiClient {
    base_url: Url,
    client: reqwest::Client,
    cookies: Arc<Jar>,
    cancel: Mutex<CancellationToken>,
}

impl ApiClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| PqcBenchError::Config(format!("invalid backend URL: {}", e)))?;
        let cookies = Arc::new(Jar::default());

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .cookie_provider(cookies.clone())
            .build()
            .map_err(|e| PqcBenchError::Http(e.to_string()))?;

        Ok(Self {
            base_url,
            client,
            cookies,
            cancel: Mutex::new(CancellationToken::new()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Stores a `Set-Cookie` style string for the backend origin.
    pub fn set_cookie(&self, cookie: &str) {
        self.cookies.add_cookie_str(cookie, &self.base_url);
    }

    /// Current value of a cookie the client would send to the backend.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.cookies.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }

    /// Aborts every in-flight call. Calls started afterwards are unaffected.
    pub fn cancel_pending(&self) {
        let mut token = self.cancel.lock().unwrap_or_else(|e| e.into_inner());
        token.cancel();
        *token = CancellationToken::new();
        tracing::info!("Cancelled pending requests");
    }

    fn current_token(&self) -> CancellationToken {
        self.cancel.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let token = self.current_token();
        let exchange = async {
            let resp = request.send().await.map_err(transport_error)?;
            let status = resp.status();
            let body = resp.text().await.map_err(transport_error)?;
            Ok::<_, PqcBenchError>((status, body))
        };

        tokio::select! {
            _ = token.cancelled() => Err(PqcBenchError::Cancelled),
            result = exchange => result,
        }
    }

    async fn execute_ok(&self, request: RequestBuilder) -> Result<String> {
        let (status, body) = self.execute(request).await?;
        if !status.is_success() {
            tracing::warn!("Backend rejected request: {}", status);
            return Err(PqcBenchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::info!("GET {}", url);
        let body = self.execute_ok(self.client.get(&url)).await?;
        decode(&body)
    }

    /// Submits one transaction for encryption.
    ///
    /// The value is sent as-is with a JSON content type. A 2xx body that is not
    /// an encryption result is tolerated and yields `None`.
    pub async fn encrypt_transaction(
        &self,
        transaction: &serde_json::Value,
    ) -> Result<Option<EncryptedTransaction>> {
        let url = self.url(ENCRYPT_TRANSACTION_PATH);
        tracing::info!("POST {}", url);

        let body = self
            .execute_ok(self.client.post(&url).json(transaction))
            .await?;

        let encrypted = serde_json::from_str::<EncryptedTransaction>(&body).ok();
        if encrypted.is_none() {
            tracing::debug!("Encrypt response carried no ciphertext: {}", snippet(&body));
        }
        Ok(encrypted)
    }

    /// Uploads a bulk transaction file as multipart form data.
    pub async fn push_bulk(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        format: BulkFormat,
    ) -> Result<BulkReceipt> {
        let url = self.url(PUSH_BULK_PATH);
        tracing::info!(
            "POST {} ({} bytes, {} format)",
            url,
            contents.len(),
            format.label()
        );

        let part = multipart::Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str(format.mime_type())
            .map_err(|e| PqcBenchError::Http(e.to_string()))?;
        let form = multipart::Form::new().part(BULK_FIELD, part);

        let body = self
            .execute_ok(self.client.post(&url).multipart(form))
            .await?;
        decode(&body)
    }

    pub async fn session_benchmarks(&self) -> Result<Vec<BenchmarkSessionRecord>> {
        self.get_json(SESSIONS_PATH).await
    }

    pub async fn live_benchmarks(&self) -> Result<LiveBenchmarkSnapshot> {
        self.get_json(LIVE_PATH).await
    }

    pub async fn history_benchmarks(&self) -> Result<Vec<HistoricalSummary>> {
        self.get_json(HISTORY_PATH).await
    }

    /// Follows a navigation to `path`, returning the final status code.
    pub async fn navigate(&self, path: &str) -> Result<u16> {
        let url = self.url(path);
        tracing::info!("Navigating to {}", url);
        let (status, _) = self.execute(self.client.get(&url)).await?;
        Ok(status.as_u16())
    }
}

fn transport_error(e: reqwest::Error) -> PqcBenchError {
    if e.is_timeout() {
        PqcBenchError::Timeout
    } else {
        PqcBenchError::Http(e.to_string())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| PqcBenchError::Decode(format!("{} - Body: {}", e, snippet(body))))
}

fn snippet(body: &str) -> &str {
    match body.char_indices().nth(500) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
