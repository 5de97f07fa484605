use thiserror::Error;

#[derive(Error, Debug)]
pub enum PqcBenchError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("No file selected")]
    NoFileSelected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl PqcBenchError {
    /// Text shown on a status surface for this failure.
    ///
    /// Server rejections surface the response body verbatim; everything else
    /// uses the error's display form.
    pub fn status_text(&self) -> String {
        match self {
            PqcBenchError::Rejected { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }

    /// True for failures detected before any request was sent.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PqcBenchError::InvalidJson(_) | PqcBenchError::NoFileSelected | PqcBenchError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PqcBenchError>;
