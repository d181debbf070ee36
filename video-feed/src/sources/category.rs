use crate::aggregator::FeedAggregator;
use crate::traits::VideoPlatform;
use crate::types::{AggregatorConfig, FeedError, FeedQuery};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_REGION_CODE: &str = "US";

/// Named category screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    All,
    Movies,
    Songs,
    News,
    Trending,
    Reels,
    Education,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::All,
        Category::Movies,
        Category::Songs,
        Category::News,
        Category::Trending,
        Category::Reels,
        Category::Education,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Movies => "Movies",
            Category::Songs => "Songs",
            Category::News => "News",
            Category::Trending => "Trending",
            Category::Reels => "Reels",
            Category::Education => "Education",
        }
    }

    /// Platform category id used to filter the most-popular chart.
    pub fn video_category_id(&self) -> Option<&'static str> {
        match self {
            Category::Movies => Some("1"),
            Category::Songs => Some("10"),
            Category::News => Some("25"),
            _ => None,
        }
    }

    pub fn feed_query(&self, region_code: &str) -> FeedQuery {
        match self {
            // no chart category covers it, so it is a canned search
            Category::Education => FeedQuery::search("learning videos"),
            _ => FeedQuery::Chart {
                category_id: self.video_category_id().map(str::to_string),
                region_code: region_code.to_string(),
            },
        }
    }

    pub fn aggregator(
        &self,
        platform: Arc<dyn VideoPlatform>,
        config: AggregatorConfig,
    ) -> FeedAggregator {
        FeedAggregator::new(platform, self.feed_query(DEFAULT_REGION_CODE), config)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FeedError::NotFound {
                kind: "category",
                id: s.to_string(),
            })
    }
}
