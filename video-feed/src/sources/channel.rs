use crate::aggregator::FeedAggregator;
use crate::traits::VideoPlatform;
use crate::types::{AggregatorConfig, FeedError, FeedQuery, PublisherSummary, Result};
use std::sync::Arc;
use tracing::info;

/// A channel screen: the publisher's header plus a feed of its uploads.
pub struct ChannelPage {
    pub channel: PublisherSummary,
    pub feed: FeedAggregator,
}

impl ChannelPage {
    /// Look up the channel and prepare its uploads feed. No page is fetched
    /// until the caller triggers one.
    pub async fn load(
        platform: Arc<dyn VideoPlatform>,
        channel_id: &str,
        config: AggregatorConfig,
    ) -> Result<Self> {
        let channel = platform
            .publishers(&[channel_id.to_string()])
            .await?
            .into_iter()
            .find(|publisher| publisher.id == channel_id)
            .ok_or_else(|| FeedError::NotFound {
                kind: "channel",
                id: channel_id.to_string(),
            })?;

        info!("Loaded channel {} ({})", channel.display_name, channel.id);

        let feed = FeedAggregator::new(platform, FeedQuery::channel(channel_id), config);
        Ok(Self { channel, feed })
    }
}
