use crate::types::{EnrichedItem, FeedQuery};
use uuid::Uuid;

/// Message recorded on the feed when a page fails to load.
pub const PAGE_ERROR_MESSAGE: &str = "Failed to fetch videos. Please try again.";

/// Accumulated state of one aggregation session.
///
/// Items are append-only for the lifetime of a session. A query change
/// replaces the whole state with a new session.
#[derive(Debug, Clone)]
pub struct FeedState {
    pub session_id: Uuid,
    pub generation: u64,
    pub query: FeedQuery,
    pub items: Vec<EnrichedItem>,
    pub page_token: Option<String>,
    /// At least one page has been committed this session.
    pub started: bool,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl FeedState {
    pub fn new(query: FeedQuery, generation: u64) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            generation,
            query,
            items: Vec::new(),
            page_token: None,
            started: false,
            loading: false,
            last_error: None,
        }
    }

    /// The last committed page carried no continuation token.
    pub fn is_exhausted(&self) -> bool {
        self.started && self.page_token.is_none()
    }

    /// Whether the continuation trigger may start a fetch right now.
    pub fn can_fetch_more(&self) -> bool {
        !self.loading && !self.is_exhausted()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            session_id: self.session_id,
            query: self.query.clone(),
            items: self.items.clone(),
            page_token: self.page_token.clone(),
            loading: self.loading,
            exhausted: self.is_exhausted(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Owned copy of a feed for rendering.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub session_id: Uuid,
    pub query: FeedQuery,
    pub items: Vec<EnrichedItem>,
    pub page_token: Option<String>,
    pub loading: bool,
    pub exhausted: bool,
    pub last_error: Option<String>,
}

/// What a fetch request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was committed.
    Appended { count: usize, has_more: bool },
    /// Another fetch was already in flight; nothing was requested.
    Suppressed,
    /// The feed has no further pages; nothing was requested.
    Exhausted,
    /// The viewport is not at the end of the list; nothing was requested.
    NotAtEnd,
    /// The response belonged to a superseded query and was dropped.
    Stale,
}

/// Scroll geometry reported by whatever renders the feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl Viewport {
    // absorbs sub-pixel rounding in reported scroll offsets
    const END_TOLERANCE: f64 = 1.0;

    pub fn new(scroll_top: f64, viewport_height: f64, content_height: f64) -> Self {
        Self {
            scroll_top,
            viewport_height,
            content_height,
        }
    }

    pub fn reached_end(&self) -> bool {
        self.scroll_top + self.viewport_height + Self::END_TOLERANCE >= self.content_height
    }
}
