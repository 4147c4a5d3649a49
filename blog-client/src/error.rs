use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogClientError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Server error ({0}): {1}")]
    Server(StatusCode, String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl BlogClientError {
    pub async fn from_http_response(resp: reqwest::Response) -> Self {
        let status = resp.status();
        match resp.text().await {
            Ok(body) => Self::from_status(status, &body),
            Err(e) => BlogClientError::RequestError(e),
        }
    }

    /// Maps a non-success status and its body onto an error, preferring the
    /// server's `{"error": ...}` message over the raw body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|parsed| parsed.error)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::NOT_FOUND => BlogClientError::NotFound(message),
            s if s.is_client_error() => BlogClientError::InvalidRequest(message),
            s => BlogClientError::Server(s, message),
        }
    }
}
