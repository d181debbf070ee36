use crate::traits::VideoPlatform;
use crate::types::{
    EngagementCounters, FeedError, FeedQuery, FetchConfig, ItemStats, ListingPage,
    PublisherSummary, RawResultItem, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// HTTP client for the upstream video API.
pub struct Fetcher {
    client: Client,
    base_url: Url,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        // Url::join drops the last path segment unless it ends with '/'
        let base_url = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.base_url.join(endpoint)?;
        let start_time = Instant::now();

        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(url.clone())
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!(
            "{} responded {} in {}ms ({} bytes)",
            url,
            status,
            start_time.elapsed().as_millis(),
            body.len()
        );

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown").to_string());
            warn!("{} failed with HTTP {}: {}", url, status.as_u16(), message);
            return Err(FeedError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl VideoPlatform for Fetcher {
    async fn list(
        &self,
        query: &FeedQuery,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ListingPage> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("maxResults", page_size.to_string()),
        ];
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            params.push(("pageToken", token.to_string()));
        }

        match query {
            FeedQuery::Search { term } => {
                params.push(("q", term.clone()));
                params.push(("type", "video".to_string()));
                let response: SearchResponse = self.get_json("search", &params).await?;
                Ok(response.into_page())
            }
            FeedQuery::Channel { channel_id } => {
                params.push(("channelId", channel_id.clone()));
                params.push(("order", "date".to_string()));
                params.push(("type", "video".to_string()));
                let response: SearchResponse = self.get_json("search", &params).await?;
                Ok(response.into_page())
            }
            FeedQuery::Chart {
                category_id,
                region_code,
            } => {
                params.push(("chart", "mostPopular".to_string()));
                params.push(("regionCode", region_code.clone()));
                if let Some(category_id) = category_id {
                    params.push(("videoCategoryId", category_id.clone()));
                }
                let response: VideoListResponse = self.get_json("videos", &params).await?;
                Ok(response.into_page())
            }
        }
    }

    async fn item_stats(&self, ids: &[String]) -> Result<Vec<ItemStats>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let params = [
            ("part", "statistics,snippet".to_string()),
            ("id", ids.join(",")),
        ];
        let response: VideoListResponse = self.get_json("videos", &params).await?;

        Ok(response
            .items
            .into_iter()
            .map(|video| ItemStats {
                publisher_id: video
                    .snippet
                    .map(|snippet| snippet.channel_id)
                    .unwrap_or_default(),
                counters: video.statistics.unwrap_or_default().into_counters(),
                id: video.id,
            })
            .collect())
    }

    async fn publishers(&self, ids: &[String]) -> Result<Vec<PublisherSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let params = [
            ("part", "snippet,statistics".to_string()),
            ("id", ids.join(",")),
        ];
        let response: ChannelListResponse = self.get_json("channels", &params).await?;

        Ok(response
            .items
            .into_iter()
            .map(ChannelResource::into_summary)
            .collect())
    }
}

// Upstream wire shapes. Only the fields the feed uses are modelled.

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<SearchResult>,
}

impl SearchResponse {
    fn into_page(self) -> ListingPage {
        let items = self
            .items
            .into_iter()
            // channels and playlists also come back from search
            .filter_map(|result| {
                let id = result.id.video_id?;
                Some(result.snippet.into_item(id))
            })
            .collect();

        ListingPage {
            items,
            next_page_token: self.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: SearchResultId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoListResponse {
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<VideoResource>,
}

impl VideoListResponse {
    fn into_page(self) -> ListingPage {
        let items = self
            .items
            .into_iter()
            .map(|video| video.snippet.unwrap_or_default().into_item(video.id))
            .collect();

        ListingPage {
            items,
            next_page_token: self.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
    snippet: Option<Snippet>,
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Snippet {
    title: String,
    description: String,
    channel_id: String,
    channel_title: String,
    published_at: Option<DateTime<Utc>>,
    thumbnails: BTreeMap<String, Thumbnail>,
}

impl Snippet {
    fn into_item(self, id: String) -> RawResultItem {
        RawResultItem {
            id,
            title: self.title,
            description: self.description,
            publisher_id: self.channel_id,
            publisher_title: self.channel_title,
            published_at: self.published_at,
            thumbnails: self
                .thumbnails
                .into_iter()
                .map(|(size, thumbnail)| (size, thumbnail.url))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

// Counters arrive as decimal strings; hidden ones are simply absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

impl VideoStatistics {
    fn into_counters(self) -> EngagementCounters {
        EngagementCounters {
            view_count: parse_count(self.view_count),
            like_count: parse_count(self.like_count),
            comment_count: parse_count(self.comment_count),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelResource>,
}

#[derive(Debug, Deserialize)]
struct ChannelResource {
    id: String,
    #[serde(default)]
    snippet: ChannelSnippet,
    #[serde(default)]
    statistics: ChannelStatistics,
}

impl ChannelResource {
    fn into_summary(self) -> PublisherSummary {
        let mut thumbnails = self.snippet.thumbnails;
        let avatar_url = thumbnails
            .remove("default")
            .or_else(|| thumbnails.into_values().next())
            .map(|thumbnail| thumbnail.url);

        PublisherSummary {
            id: self.id,
            display_name: self.snippet.title,
            avatar_url,
            subscriber_count: parse_count(self.statistics.subscriber_count),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChannelSnippet {
    title: String,
    thumbnails: BTreeMap<String, Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
}

fn parse_count(value: Option<String>) -> Option<u64> {
    value.and_then(|v| v.parse().ok())
}
