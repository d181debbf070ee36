use crate::traits::VideoPlatform;
use crate::types::{
    AggregatorConfig, EnrichedItem, FeedQuery, ItemStats, PublisherSummary, RawResultItem, Result,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A fully enriched page, ready to be appended to a feed.
#[derive(Debug, Clone)]
pub struct PageLoad {
    pub items: Vec<EnrichedItem>,
    pub next_page_token: Option<String>,
}

/// Run the list, stats and publisher stages for one page.
///
/// The stages are strictly sequential: each request is built from the
/// previous stage's response. Any stage failing fails the whole page.
pub async fn load_page(
    platform: &dyn VideoPlatform,
    query: &FeedQuery,
    config: &AggregatorConfig,
    page_token: Option<&str>,
) -> Result<PageLoad> {
    let listing = platform.list(query, config.page_size, page_token).await?;
    debug!(
        "List stage for {} returned {} items (next token: {:?})",
        query.describe(),
        listing.items.len(),
        listing.next_page_token
    );

    if listing.items.is_empty() {
        return Ok(PageLoad {
            items: Vec::new(),
            next_page_token: listing.next_page_token,
        });
    }

    let item_ids: Vec<String> = listing.items.iter().map(|item| item.id.clone()).collect();
    let mut stats = Vec::with_capacity(item_ids.len());
    for chunk in item_ids.chunks(config.max_batch_size.max(1)) {
        stats.extend(platform.item_stats(chunk).await?);
    }
    debug!("Stats stage returned {} of {} records", stats.len(), item_ids.len());

    let publisher_ids = distinct_publisher_ids(&stats);
    let mut publishers = Vec::with_capacity(publisher_ids.len());
    for chunk in publisher_ids.chunks(config.max_batch_size.max(1)) {
        publishers.extend(platform.publishers(chunk).await?);
    }
    debug!(
        "Publisher stage returned {} of {} records",
        publishers.len(),
        publisher_ids.len()
    );

    Ok(PageLoad {
        items: merge_page(listing.items, stats, publishers),
        next_page_token: listing.next_page_token,
    })
}

/// Publisher ids in first-seen order, without repeats or blanks.
pub fn distinct_publisher_ids(stats: &[ItemStats]) -> Vec<String> {
    let mut seen = HashSet::new();
    stats
        .iter()
        .map(|record| record.publisher_id.as_str())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Left-join listing items with their stats (by item id) and publishers (by
/// publisher id). Listing order is preserved and no item is ever dropped.
pub fn merge_page(
    items: Vec<RawResultItem>,
    stats: Vec<ItemStats>,
    publishers: Vec<PublisherSummary>,
) -> Vec<EnrichedItem> {
    let stats_by_id: HashMap<String, ItemStats> = stats
        .into_iter()
        .map(|record| (record.id.clone(), record))
        .collect();
    let publishers_by_id: HashMap<String, PublisherSummary> = publishers
        .into_iter()
        .map(|publisher| (publisher.id.clone(), publisher))
        .collect();

    items
        .into_iter()
        .map(|item| {
            // an id listed twice on one page shares its stats record
            let record = stats_by_id.get(&item.id).cloned();
            if record.is_none() {
                debug!("No stats for item {}", item.id);
            }

            let publisher_id = record
                .as_ref()
                .map(|r| r.publisher_id.as_str())
                .filter(|id| !id.is_empty())
                .unwrap_or(item.publisher_id.as_str());
            let publisher = publishers_by_id.get(publisher_id).cloned();
            if publisher.is_none() {
                debug!("No publisher {:?} for item {}", publisher_id, item.id);
            }

            EnrichedItem {
                counters: record.map(|r| r.counters),
                publisher,
                item,
            }
        })
        .collect()
}
