use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while bootstrapping the review tool. Failures of individual
/// review operations never surface here; the engine turns them into display
/// messages.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
