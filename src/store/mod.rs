pub mod client;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod types;

pub use client::HttpDescriptionStore;
pub use error::StoreError;
pub use types::PendingDescription;

/// Remote access to the pending set and the catalog it feeds.
///
/// The review engine receives an implementation at construction time, so tests
/// can substitute an in-memory fake for the HTTP client.
#[allow(async_fn_in_trait)]
pub trait DescriptionStore {
    /// Fetch every pending description, in backend order.
    async fn fetch_all(&self) -> Result<Vec<PendingDescription>, StoreError>;

    /// Write `text` as the description of the catalog item identified by `key`.
    async fn commit_description(&self, key: &str, text: &str) -> Result<(), StoreError>;

    /// Delete the pending record `id`, guarded by its `version`.
    async fn discard(&self, id: &str, version: u64) -> Result<(), StoreError>;
}
