//! HTTP data access for the catalog API

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use catalog_core::{Item, NewItem, Page, StatsLookup};

use crate::error::ClientError;

/// Where the catalog server listens by default
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3001";

/// Listing parameters sent as a query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: usize,
    pub limit: usize,
    pub q: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            q: String::new(),
        }
    }
}

impl ListParams {
    /// Query pairs; `q` is left out when empty
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if !self.q.is_empty() {
            pairs.push(("q", self.q.clone()));
        }
        pairs
    }
}

/// Client for the catalog HTTP API
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CatalogClient {
    /// Creates a client for the server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of items
    #[instrument(skip(self), fields(page = params.page, q = %params.q))]
    pub async fn list_items(&self, params: &ListParams) -> Result<Page<Item>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/items", self.base_url))
            .query(&params.to_query())
            .send()
            .await?;
        let page: Page<Item> = decode(response).await?;
        debug!(total = page.total, "Fetched items");
        Ok(page)
    }

    /// Fetch a single item
    pub async fn get_item(&self, id: i64) -> Result<Item, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/items/{}", self.base_url, id))
            .send()
            .await?;
        decode(response).await
    }

    /// Create an item, returning it with its assigned id
    pub async fn create_item(&self, item: &NewItem) -> Result<Item, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/items", self.base_url))
            .json(item)
            .send()
            .await?;
        decode(response).await
    }

    /// Fetch collection statistics
    pub async fn stats(&self) -> Result<StatsLookup, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/stats", self.base_url))
            .send()
            .await?;
        decode(response).await
    }
}

/// Any non-2xx status becomes [`ClientError::Api`] carrying the server's
/// `message` (or `error`) text.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body: serde_json::Value = response.json().await.unwrap_or_default();
    let message = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status));

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// The most recently fetched listing, as exposed to list consumers
#[derive(Debug, Clone, PartialEq)]
pub struct ItemsData {
    pub items: Vec<Item>,
    pub total_pages: usize,
}

impl Default for ItemsData {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 1,
        }
    }
}

impl ItemsData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a page and replace the current results with it.
    ///
    /// On error the previous results are kept.
    pub async fn fetch_items(
        &mut self,
        client: &CatalogClient,
        params: &ListParams,
    ) -> Result<(), ClientError> {
        let page = client.list_items(params).await?;
        self.apply_page(page);
        Ok(())
    }

    /// Take results from a fetched page. A reported page count of 0 is shown
    /// as 1.
    pub fn apply_page(&mut self, page: Page<Item>) {
        self.items = page.results;
        self.total_pages = page.total_pages.max(1);
    }
}
