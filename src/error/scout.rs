use reqwest::StatusCode;
use thiserror::Error as ThisError;

use super::IsRetryable;

#[derive(Debug, ThisError)]
pub enum ScoutError {
    #[error("Upstream error with status {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration extract error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Run cancelled")]
    Cancelled,
}

impl ScoutError {
    pub fn config(message: impl Into<String>) -> Self {
        ScoutError::Config(message.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScoutError::Cancelled)
    }
}

impl From<figment::Error> for ScoutError {
    fn from(err: figment::Error) -> Self {
        ScoutError::Figment(Box::new(err))
    }
}

impl IsRetryable for ScoutError {
    fn is_retryable(&self) -> bool {
        match self {
            ScoutError::ReqwestError(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            ScoutError::UpstreamStatus { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_server_side_statuses_are_retryable() {
        let bad_gateway = ScoutError::UpstreamStatus {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        let not_found = ScoutError::UpstreamStatus {
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        };
        assert!(bad_gateway.is_retryable());
        assert!(!not_found.is_retryable());
        assert!(!ScoutError::Cancelled.is_retryable());
        assert!(!ScoutError::config("missing proxy").is_retryable());
    }
}
