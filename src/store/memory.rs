//! In-memory [`DescriptionStore`] used by the engine and session tests.
//!
//! Records every call together with the engine's `processing_id` at the time
//! of the call, and can be told to fail the next fetch, commit or discard.
//! Each call yields once so concurrent reviews interleave like remote calls do.

use std::sync::Mutex;

use tokio::sync::watch;

use super::DescriptionStore;
use super::error::StoreError;
use super::types::{DescriptionValue, PendingDescription};
use crate::engine::WorkflowViewState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FetchAll,
    Commit { key: String, text: String },
    Discard { id: String, version: u64 },
}

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Vec<PendingDescription>>,
    calls: Mutex<Vec<(StoreCall, Option<String>)>>,
    fail_fetch: Mutex<Option<StoreError>>,
    fail_commit: Mutex<Option<StoreError>>,
    fail_discard: Mutex<Option<StoreError>>,
    probe: Mutex<Option<watch::Receiver<WorkflowViewState>>>,
}

impl MemoryStore {
    pub fn with_items(items: Vec<PendingDescription>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    /// Lets the store observe engine state while a call is in flight.
    pub fn attach_probe(&self, rx: watch::Receiver<WorkflowViewState>) {
        *self.probe.lock().unwrap() = Some(rx);
    }

    pub fn fail_next_fetch(&self, err: StoreError) {
        *self.fail_fetch.lock().unwrap() = Some(err);
    }

    pub fn fail_next_commit(&self, err: StoreError) {
        *self.fail_commit.lock().unwrap() = Some(err);
    }

    pub fn fail_next_discard(&self, err: StoreError) {
        *self.fail_discard.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }

    /// `processing_id` as seen at each recorded call.
    pub fn processing_seen(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, seen)| seen.clone())
            .collect()
    }

    pub fn remaining_ids(&self) -> Vec<String> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .map(|i| i.id.clone())
            .collect()
    }

    fn record(&self, call: StoreCall) {
        let seen = self
            .probe
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|rx| rx.borrow().processing_id.clone());
        self.calls.lock().unwrap().push((call, seen));
    }
}

impl DescriptionStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<PendingDescription>, StoreError> {
        tokio::task::yield_now().await;
        self.record(StoreCall::FetchAll);
        if let Some(err) = self.fail_fetch.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.items.lock().unwrap().clone())
    }

    async fn commit_description(&self, key: &str, text: &str) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.record(StoreCall::Commit {
            key: key.to_string(),
            text: text.to_string(),
        });
        if let Some(err) = self.fail_commit.lock().unwrap().take() {
            return Err(err);
        }
        Ok(())
    }

    async fn discard(&self, id: &str, version: u64) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.record(StoreCall::Discard {
            id: id.to_string(),
            version,
        });
        if let Some(err) = self.fail_discard.lock().unwrap().take() {
            return Err(err);
        }
        let mut items = self.items.lock().unwrap();
        match items.iter().position(|i| i.id == id) {
            Some(index) if items[index].version == version => {
                items.remove(index);
                Ok(())
            }
            Some(index) => Err(StoreError::Conflict(format!(
                "Object {id} has a different version than expected. Expected: {version} - Actual: {}.",
                items[index].version
            ))),
            None => Err(StoreError::NotFound(format!(
                "The CustomObject with ID '{id}' was not found."
            ))),
        }
    }
}

/// Builds a pending description with the given display fields.
pub fn pending(id: &str, name: &str, text: Option<&str>) -> PendingDescription {
    PendingDescription {
        id: id.to_string(),
        key: format!("product-{id}"),
        version: 1,
        value: DescriptionValue {
            image_url: Some(format!("https://img.example/{id}.png")),
            product_name: Some(name.to_string()),
            temporary_description: text.map(str::to_string),
            generated_at: None,
        },
    }
}
