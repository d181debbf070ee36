use crate::types::{FeedQuery, ItemStats, ListingPage, PublisherSummary, Result};
use async_trait::async_trait;

/// The upstream video platform, as seen by the aggregator.
///
/// Every method is one network round trip. Detail lookups return records in
/// whatever order upstream chooses and silently omit ids it does not know.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Fetch one page of the listing for `query`, starting at `page_token`
    /// (`None` for the first page).
    async fn list(
        &self,
        query: &FeedQuery,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ListingPage>;

    /// Engagement counters and publisher id for each video id.
    async fn item_stats(&self, ids: &[String]) -> Result<Vec<ItemStats>>;

    /// Display name and avatar for each publisher id.
    async fn publishers(&self, ids: &[String]) -> Result<Vec<PublisherSummary>>;
}
