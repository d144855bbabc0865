use crate::models::ListingsPage;
use crate::sources::types::ListingQuery;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for all listing backends
/// The browser only ever talks to the listing and neighborhood services through this
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch one page of listings matching the query
    async fn fetch_listings(&self, query: &ListingQuery) -> Result<ListingsPage>;

    /// Fetch every neighborhood name that can be filtered on
    async fn fetch_neighborhoods(&self) -> Result<Vec<String>>;

    /// Get the name of the source
    fn source_name(&self) -> &'static str;
}
