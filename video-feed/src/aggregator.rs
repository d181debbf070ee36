use crate::pipeline::load_page;
use crate::state::{FeedSnapshot, FeedState, FetchOutcome, Viewport, PAGE_ERROR_MESSAGE};
use crate::traits::VideoPlatform;
use crate::types::{AggregatorConfig, FeedQuery, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// Incremental feed over one query: fetches a page at a time, enriches it and
/// appends it to an accumulating list.
///
/// The state lock is never held across a network call. It is taken to claim
/// the in-flight flag and again to commit the finished page, so concurrent
/// triggers observe either "loading" or a committed page, never a half-merged
/// one.
pub struct FeedAggregator {
    platform: Arc<dyn VideoPlatform>,
    config: AggregatorConfig,
    state: Mutex<FeedState>,
}

impl FeedAggregator {
    pub fn new(
        platform: Arc<dyn VideoPlatform>,
        query: FeedQuery,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            platform,
            config,
            state: Mutex::new(FeedState::new(query, 0)),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn query(&self) -> FeedQuery {
        self.lock().query.clone()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock().is_exhausted()
    }

    pub fn can_fetch_more(&self) -> bool {
        self.lock().can_fetch_more()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Fetch the page at `page_token` and append it to the feed.
    ///
    /// Without a token the feed continues from its stored cursor: the first
    /// page before anything was committed, the next page after that, and
    /// `Exhausted` once upstream reported no further page. An explicit token
    /// is fetched as given.
    ///
    /// Returns `Suppressed` without any request if a fetch is already in
    /// flight, and `Stale` if the query changed while this page was loading.
    /// On failure nothing is appended, the page token is left as it was and
    /// the error is recorded on the feed as well as returned.
    pub async fn fetch_page(&self, page_token: Option<String>) -> Result<FetchOutcome> {
        self.run(page_token).await
    }

    /// Continuation trigger: fetch the next page if nothing is in flight and
    /// the feed has not ended.
    pub async fn fetch_next(&self) -> Result<FetchOutcome> {
        self.run(None).await
    }

    /// Continuation trigger driven by scroll position.
    pub async fn on_scroll(&self, viewport: Viewport) -> Result<FetchOutcome> {
        if !viewport.reached_end() {
            return Ok(FetchOutcome::NotAtEnd);
        }
        self.fetch_next().await
    }

    /// Replace the query: the feed is reset to empty under a new session and
    /// the first page of the new query is fetched. Any page still in flight
    /// for the old query is discarded when it lands.
    pub async fn set_query(&self, query: FeedQuery) -> Result<FetchOutcome> {
        {
            let mut state = self.lock();
            let generation = state.generation + 1;
            info!(
                "Query changed from {} to {} (session generation {})",
                state.query.describe(),
                query.describe(),
                generation
            );
            *state = FeedState::new(query, generation);
        }
        self.fetch_page(None).await
    }

    async fn run(&self, page_token: Option<String>) -> Result<FetchOutcome> {
        let (query, generation, page_token) = {
            let mut state = self.lock();
            if state.loading {
                debug!("Fetch already in flight for {}, suppressing", state.query.describe());
                return Ok(FetchOutcome::Suppressed);
            }
            let page_token = match page_token.filter(|token| !token.is_empty()) {
                Some(token) => Some(token),
                None if state.is_exhausted() => return Ok(FetchOutcome::Exhausted),
                None => state.page_token.clone(),
            };
            state.loading = true;
            state.last_error = None;
            (state.query.clone(), state.generation, page_token)
        };

        let mut in_flight = InFlight {
            state: &self.state,
            generation,
            armed: true,
        };

        let result = load_page(
            self.platform.as_ref(),
            &query,
            &self.config,
            page_token.as_deref(),
        )
        .await;

        let mut state = self.lock();
        in_flight.armed = false;

        if state.generation != generation {
            warn!(
                "Discarding stale page for {} (generation {}, current {})",
                query.describe(),
                generation,
                state.generation
            );
            if let Err(e) = &result {
                debug!("Stale page for {} had failed: {}", query.describe(), e);
            }
            return Ok(FetchOutcome::Stale);
        }

        state.loading = false;
        match result {
            Ok(page) => {
                let count = page.items.len();
                state.items.extend(page.items);
                state.page_token = page.next_page_token;
                state.started = true;
                let has_more = state.page_token.is_some();
                info!(
                    "Appended {} items to {} ({} total, more: {})",
                    count,
                    query.describe(),
                    state.items.len(),
                    has_more
                );
                Ok(FetchOutcome::Appended { count, has_more })
            }
            Err(e) => {
                error!("Failed to fetch page for {}: {}", query.describe(), e);
                state.last_error = Some(format!("{} ({})", PAGE_ERROR_MESSAGE, e));
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    // the guarded section never panics mid-update, so a poisoned lock still
    // holds consistent state
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Releases the in-flight flag if a fetch is dropped before it commits, e.g.
/// when a caller races it against a timer.
struct InFlight<'a> {
    state: &'a Mutex<FeedState>,
    generation: u64,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock_state(self.state);
        if state.generation == self.generation {
            warn!("Fetch for {} cancelled before completion", state.query.describe());
            state.loading = false;
            state.last_error = Some(format!("{} (request cancelled)", PAGE_ERROR_MESSAGE));
        }
    }
}
