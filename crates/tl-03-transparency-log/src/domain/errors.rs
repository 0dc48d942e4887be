//! # Transparency-Log Errors

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LogError {
    /// Could not connect to the log server.
    #[error("Connection to transparency log failed: {0}")]
    Connection(String),

    /// Request did not complete in time.
    #[error("Transparency log request timed out: {0}")]
    Timeout(String),

    /// Server answered with an error status.
    #[error("Transparency log returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Server answered with something unparseable.
    #[error("Invalid transparency log response: {0}")]
    InvalidResponse(String),

    /// Submission rejected before it was sent.
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),
}

impl LogError {
    /// Connection and timeout errors are retried; everything else is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}

impl From<reqwest::Error> for LogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            Self::Connection(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            Self::Connection(err.to_string())
        }
    }
}
