use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a feed lists. Fixed for the lifetime of an aggregation session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedQuery {
    /// Free-text search.
    Search { term: String },
    /// Most-popular chart, optionally narrowed to one platform category.
    Chart {
        category_id: Option<String>,
        region_code: String,
    },
    /// A single channel's uploads, newest first.
    Channel { channel_id: String },
}

impl FeedQuery {
    pub fn search(term: impl Into<String>) -> Self {
        FeedQuery::Search { term: term.into() }
    }

    pub fn channel(channel_id: impl Into<String>) -> Self {
        FeedQuery::Channel {
            channel_id: channel_id.into(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FeedQuery::Search { term } => format!("search:{}", term),
            FeedQuery::Chart {
                category_id: Some(category_id),
                region_code,
            } => format!("chart:{}:{}", region_code, category_id),
            FeedQuery::Chart {
                category_id: None,
                region_code,
            } => format!("chart:{}", region_code),
            FeedQuery::Channel { channel_id } => format!("channel:{}", channel_id),
        }
    }
}

/// One entry from the listing call, before enrichment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResultItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub publisher_id: String,
    pub publisher_title: String,
    pub published_at: Option<DateTime<Utc>>,
    // size name ("default", "medium", "high", ...) -> url
    pub thumbnails: BTreeMap<String, String>,
}

impl RawResultItem {
    /// Smallest thumbnail available, preferring the platform's "default" size.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnails
            .get("default")
            .or_else(|| self.thumbnails.values().next())
            .map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounters {
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
}

/// A stats-stage record: counters plus the publisher the item belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStats {
    pub id: String,
    pub publisher_id: String,
    pub counters: EngagementCounters,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherSummary {
    pub id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub subscriber_count: Option<u64>,
}

/// A listing item joined with its counters and publisher. Either side of the
/// join may be missing; the item is kept regardless.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedItem {
    pub item: RawResultItem,
    pub counters: Option<EngagementCounters>,
    pub publisher: Option<PublisherSummary>,
}

impl EnrichedItem {
    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn view_count(&self) -> u64 {
        self.counters
            .as_ref()
            .and_then(|c| c.view_count)
            .unwrap_or(0)
    }

    pub fn publisher_name(&self) -> &str {
        match &self.publisher {
            Some(publisher) => &publisher.display_name,
            None => &self.item.publisher_title,
        }
    }
}

/// One page from the listing endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub items: Vec<RawResultItem>,
    pub next_page_token: Option<String>,
}
