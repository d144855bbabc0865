use crate::config::BrowserConfig;
use crate::models::{ListingsPage, NeighborhoodsResponse};
use crate::sources::traits::ListingSource;
use crate::sources::types::ListingQuery;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Listing source backed by the public listing API
pub struct HttpListingSource {
    client: Client,
    base_url: String,
}

impl HttpListingSource {
    /// Create a new HTTP source for the API configured in `config`
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_listings(&self, query: &ListingQuery) -> Result<ListingsPage> {
        let url = self.endpoint("listings");
        debug!("Fetching {} page {} ({} per page)", url, query.page, query.page_size);

        let response = self
            .client
            .get(&url)
            .query(&query.to_pairs())
            .send()
            .await
            .context("Failed to fetch listings")?;

        if !response.status().is_success() {
            warn!("Listing service returned status: {}", response.status());
            anyhow::bail!("Failed to fetch listings: {}", response.status());
        }

        let page: ListingsPage = response
            .json()
            .await
            .context("Failed to decode listings response")?;

        info!(
            "Fetched page {}/{} with {} listings",
            page.page_number,
            page.total_pages,
            page.listings.len()
        );
        Ok(page)
    }

    async fn fetch_neighborhoods(&self) -> Result<Vec<String>> {
        let url = self.endpoint("neighborhoods");
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch neighborhoods")?;

        if !response.status().is_success() {
            warn!("Neighborhood service returned status: {}", response.status());
            anyhow::bail!("Failed to fetch neighborhoods: {}", response.status());
        }

        let body: NeighborhoodsResponse = response
            .json()
            .await
            .context("Failed to decode neighborhoods response")?;

        Ok(body.neighborhoods)
    }

    fn source_name(&self) -> &'static str {
        "Listing API"
    }
}
