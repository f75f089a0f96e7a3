//! Wire types for the review backend.
//!
//! Pending descriptions are stored as custom objects whose `value` carries the
//! generated text plus display metadata. Product updates use the backend's
//! action-based update format.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One generated description awaiting an operator decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDescription {
    /// Identifier of the pending record, stable across reloads.
    pub id: String,
    /// Key of the catalog item the description applies to.
    pub key: String,
    /// Optimistic-concurrency token of the pending record.
    pub version: u64,
    pub value: DescriptionValue,
}

/// Payload of a pending record. Everything except the text is display-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionValue {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub temporary_description: Option<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

impl PendingDescription {
    /// Text to commit on accept. An absent description commits as empty.
    pub fn description_text(&self) -> &str {
        self.value.temporary_description.as_deref().unwrap_or("")
    }

    pub fn product_name(&self) -> &str {
        self.value.product_name.as_deref().unwrap_or("")
    }
}

/// Paged listing returned by the custom-object container endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingPage {
    /// Size of the whole container; absent when the backend skips counting.
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub results: Vec<PendingDescription>,
}

/// The only part of a product the commit step needs to read.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductVersion {
    pub version: u64,
}

/// Body of a product update request.
#[derive(Debug, Clone, Serialize)]
pub struct ProductUpdate {
    pub version: u64,
    pub actions: Vec<UpdateAction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum UpdateAction {
    /// Replaces the localized product description.
    SetDescription { description: BTreeMap<String, String> },
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendError {
    #[serde(default)]
    pub message: String,
}
