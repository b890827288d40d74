//! JSON-over-HTTP inventory client.

use crate::error::{InventoryError, InventoryResult};
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tag_reconciler::{ClientError, Tag, TagClient, TagOperation};
use tracing::{debug, error};
use url::Url;

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Request body shared by the create and delete endpoints.
#[derive(Debug, Serialize)]
struct TagsRequest<'a> {
    resources: [&'a str; 1],
    tags: &'a [Tag],
}

/// Blocking client for the inventory tag endpoints.
#[derive(Clone, Debug)]
pub struct HttpInventoryClient {
    http_client: reqwest::blocking::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpInventoryClient {
    /// Create a client for the inventory rooted at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Inventory API root, e.g. `https://inventory.internal/api`
    /// * `api_token` - Bearer token sent with every request, if any
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> InventoryResult<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|err| InventoryError::Config(format!("invalid inventory URL: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(InventoryError::Config(format!(
                "inventory URL cannot be a base: {base_url}"
            )));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            api_token: api_token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, operation: TagOperation) -> InventoryResult<Url> {
        let path = match operation {
            TagOperation::Delete => "v1/tags/delete",
            TagOperation::Create => "v1/tags/create",
        };
        self.base_url
            .join(path)
            .map_err(|err| InventoryError::Config(format!("invalid endpoint {path}: {err}")))
    }

    /// Send one tag mutation for a single identifier.
    pub fn send(
        &self,
        operation: TagOperation,
        identifier: &str,
        tags: &[Tag],
    ) -> InventoryResult<()> {
        let url = self.endpoint(operation)?;
        let body = TagsRequest {
            resources: [identifier],
            tags,
        };

        debug!(%operation, identifier, count = tags.len(), "Sending inventory request");

        let mut request = self.http_client.post(url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            error!(%operation, identifier, status, body_summary = %body_summary, "Inventory API error");
            return Err(InventoryError::Api {
                status,
                message: format!("upstream error ({body_summary})"),
            });
        }

        debug!(%operation, identifier, "Inventory request succeeded");
        Ok(())
    }
}

impl TagClient for HttpInventoryClient {
    fn delete_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
        self.send(TagOperation::Delete, identifier, tags)
            .map_err(Into::into)
    }

    fn create_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
        self.send(TagOperation::Create, identifier, tags)
            .map_err(Into::into)
    }
}
