//! Failures of the pending-description store.
//!
//! Every variant except [`Unexpected`](StoreError::Unexpected) carries a
//! human-readable message that can be shown to the operator as-is.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The target product or pending record no longer exists.
    #[error("{0}")]
    NotFound(String),

    /// The record's version no longer matches the backend (concurrent modification).
    #[error("{0}")]
    Conflict(String),

    /// Missing or insufficient credentials (HTTP 401/403).
    #[error("{0}")]
    Unauthorized(String),

    /// Any other non-success response.
    #[error("backend returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport failure (DNS, connection refused, timeout, undecodable body).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A failure that carries no description.
    #[error("unexpected store failure")]
    Unexpected,
}

impl StoreError {
    /// The message to show the operator, or `None` when the failure is opaque
    /// and a generic fallback should be used instead.
    pub fn describe(&self) -> Option<String> {
        if matches!(self, StoreError::Unexpected) {
            return None;
        }
        let message = self.to_string();
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}
