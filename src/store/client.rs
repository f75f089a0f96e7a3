use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use super::DescriptionStore;
use super::error::StoreError;
use super::types::{
    BackendError, PendingDescription, PendingPage, ProductUpdate, ProductVersion, UpdateAction,
};
use crate::config::ReviewConfig;
use crate::error::ReviewError;

/// Largest page the container endpoint serves in one request.
const PAGE_LIMIT: u64 = 500;

/// HTTP implementation of [`DescriptionStore`] against the commerce API.
pub struct HttpDescriptionStore {
    client: Client,
    api_url: String,
    project_key: String,
    container: String,
    locale: String,
    access_token: String,
}

impl HttpDescriptionStore {
    pub fn from_config(config: &ReviewConfig) -> Result<Self, ReviewError> {
        config.validate()?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(StoreError::from)?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            project_key: config.project_key.clone(),
            container: config.container.clone(),
            locale: config.locale.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn project_url(&self) -> String {
        format!("{}/{}", self.api_url, self.project_key)
    }

    fn product_url(&self, key: &str) -> String {
        format!("{}/products/key={key}", self.project_url())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        check_status(response).await
    }
}

/// Maps non-success responses onto [`StoreError`], preferring the backend's own
/// error message.
async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<BackendError>(&body)
        .ok()
        .map(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .or_else(|| status.canonical_reason().map(str::to_string));
    let Some(message) = message else {
        return Err(StoreError::Unexpected);
    };

    Err(match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        StatusCode::CONFLICT => StoreError::Conflict(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(message),
        _ => StoreError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

impl DescriptionStore for HttpDescriptionStore {
    async fn fetch_all(&self) -> Result<Vec<PendingDescription>, StoreError> {
        let url = format!("{}/custom-objects/{}", self.project_url(), self.container);
        let mut items = Vec::new();
        let mut offset = 0;
        loop {
            debug!(%url, offset, "fetching pending descriptions");
            let request = self
                .client
                .get(&url)
                .query(&[("limit", PAGE_LIMIT), ("offset", offset)]);
            let page = self.send(request).await?.json::<PendingPage>().await?;

            let received = page.results.len() as u64;
            items.extend(page.results);
            offset += received;
            let exhausted = match page.total {
                Some(total) => offset >= total,
                None => received < PAGE_LIMIT,
            };
            if received == 0 || exhausted {
                break;
            }
        }
        Ok(items)
    }

    async fn commit_description(&self, key: &str, text: &str) -> Result<(), StoreError> {
        let url = self.product_url(key);
        debug!(%url, "reading product version");
        let product = self
            .send(self.client.get(&url))
            .await?
            .json::<ProductVersion>()
            .await?;

        let update = ProductUpdate {
            version: product.version,
            actions: vec![UpdateAction::SetDescription {
                description: BTreeMap::from([(self.locale.clone(), text.to_string())]),
            }],
        };
        debug!(%url, version = product.version, "writing product description");
        self.send(self.client.post(&url).json(&update)).await?;
        Ok(())
    }

    async fn discard(&self, id: &str, version: u64) -> Result<(), StoreError> {
        let url = format!("{}/custom-objects/{id}", self.project_url());
        debug!(%url, version, "discarding pending description");
        self.send(self.client.delete(&url).query(&[("version", version)]))
            .await?;
        Ok(())
    }
}
