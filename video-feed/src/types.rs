use std::env;

// Use the interfaces crate for core types
pub use interfaces::defs::{
    EngagementCounters, EnrichedItem, FeedQuery, ItemStats, ListingPage, PublisherSummary,
    RawResultItem,
};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_PAGE_SIZE: u32 = 30;
// Upstream rejects more than 50 ids per `id=` lookup.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub api_key: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            user_agent: "Video-Feed/1.0".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl FetchConfig {
    /// Reads `VIDEO_API_KEY` (required), `VIDEO_API_BASE_URL` and
    /// `VIDEO_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("VIDEO_API_KEY").map_err(|_| {
            FeedError::Config("missing required environment variable: VIDEO_API_KEY".to_string())
        })?;

        let mut config = Self {
            api_key,
            ..Self::default()
        };

        if let Ok(base_url) = env::var("VIDEO_API_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(timeout) = env::var("VIDEO_API_TIMEOUT_SECS") {
            config.timeout_seconds = timeout.parse().map_err(|_| {
                FeedError::Config(format!("invalid value for VIDEO_API_TIMEOUT_SECS: {}", timeout))
            })?;
        }

        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub page_size: u32,
    pub max_batch_size: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
