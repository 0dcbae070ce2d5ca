//! Read access to the node REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use localnet_types::TransactionResult;

use crate::errors::ApiError;

/// Lookups against the node's REST surface.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Fetches a committed transaction, including its state changes.
    async fn transaction_by_hash(&self, hash: &str) -> Result<TransactionResult, ApiError>;
}

/// HTTP client for `GET /v1/transactions/by_hash/{hash}`.
#[derive(Debug, Clone)]
pub struct NodeApiClient {
    client: Client,
    base_url: Url,
}

impl NodeApiClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build().map_err(|source| ApiError::Request {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self { client, base_url })
    }

    /// URL of a transaction lookup, preserving any path prefix on the base URL.
    pub fn transaction_url(&self, hash: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(["v1", "transactions", "by_hash", hash]);
        Ok(url)
    }
}

#[async_trait]
impl NodeApi for NodeApiClient {
    async fn transaction_by_hash(&self, hash: &str) -> Result<TransactionResult, ApiError> {
        let url = self.transaction_url(hash)?;
        debug!(url = %url, "Fetching transaction");

        let response = self.client.get(url.clone()).send().await.map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json::<TransactionResult>().await.map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
