#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Notify;
use video_feed::{
    EngagementCounters, FeedError, FeedQuery, ItemStats, ListingPage, PublisherSummary,
    RawResultItem, Result, VideoPlatform,
};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A request the scripted platform received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        query: FeedQuery,
        page_token: Option<String>,
    },
    Stats(Vec<String>),
    Publishers(Vec<String>),
}

/// Holds `list` calls for one query until the test releases them.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// In-process platform answering from canned pages and detail records.
#[derive(Default)]
pub struct ScriptedPlatform {
    pages: Mutex<HashMap<(FeedQuery, Option<String>), ListingPage>>,
    stats: Mutex<HashMap<String, ItemStats>>,
    publishers: Mutex<HashMap<String, PublisherSummary>>,
    gates: Mutex<HashMap<FeedQuery, Arc<Gate>>>,
    calls: Mutex<Vec<Call>>,
    pub fail_list: AtomicBool,
    pub fail_stats: AtomicBool,
    pub fail_publishers: AtomicBool,
}

impl ScriptedPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a listing page together with stats for every item on it.
    pub fn add_page(
        &self,
        query: &FeedQuery,
        page_token: Option<&str>,
        items: Vec<RawResultItem>,
        next_page_token: Option<&str>,
    ) {
        for item in &items {
            self.add_stats(stats_for(item, 1_000));
        }
        self.add_bare_page(query, page_token, items, next_page_token);
    }

    /// Register a listing page without any stats records.
    pub fn add_bare_page(
        &self,
        query: &FeedQuery,
        page_token: Option<&str>,
        items: Vec<RawResultItem>,
        next_page_token: Option<&str>,
    ) {
        self.pages.lock().unwrap().insert(
            (query.clone(), page_token.map(str::to_string)),
            ListingPage {
                items,
                next_page_token: next_page_token.map(str::to_string),
            },
        );
    }

    pub fn add_stats(&self, stats: ItemStats) {
        self.stats.lock().unwrap().insert(stats.id.clone(), stats);
    }

    pub fn remove_stats(&self, id: &str) {
        self.stats.lock().unwrap().remove(id);
    }

    pub fn add_publisher(&self, publisher: PublisherSummary) {
        self.publishers
            .lock()
            .unwrap()
            .insert(publisher.id.clone(), publisher);
    }

    pub fn gate(&self, query: &FeedQuery) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates.lock().unwrap().insert(query.clone(), gate.clone());
        gate
    }

    pub fn ungate(&self, query: &FeedQuery) {
        self.gates.lock().unwrap().remove(query);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List { page_token, .. } => Some(page_token),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn upstream_failure() -> FeedError {
    FeedError::Status {
        status: 500,
        message: "Backend Error".to_string(),
    }
}

#[async_trait]
impl VideoPlatform for ScriptedPlatform {
    async fn list(
        &self,
        query: &FeedQuery,
        _page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ListingPage> {
        self.record(Call::List {
            query: query.clone(),
            page_token: page_token.map(str::to_string),
        });

        let gate = self.gates.lock().unwrap().get(query).cloned();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.fail_list.load(Ordering::SeqCst) {
            return Err(upstream_failure());
        }

        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&(query.clone(), page_token.map(str::to_string)))
            .cloned()
            .unwrap_or_default())
    }

    async fn item_stats(&self, ids: &[String]) -> Result<Vec<ItemStats>> {
        self.record(Call::Stats(ids.to_vec()));
        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(upstream_failure());
        }
        let stats = self.stats.lock().unwrap();
        Ok(ids.iter().filter_map(|id| stats.get(id).cloned()).collect())
    }

    async fn publishers(&self, ids: &[String]) -> Result<Vec<PublisherSummary>> {
        self.record(Call::Publishers(ids.to_vec()));
        if self.fail_publishers.load(Ordering::SeqCst) {
            return Err(upstream_failure());
        }
        let publishers = self.publishers.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| publishers.get(id).cloned())
            .collect())
    }
}

pub fn video(id: &str, channel_id: &str) -> RawResultItem {
    RawResultItem {
        id: id.to_string(),
        title: format!("Video {}", id),
        description: format!("Description of {}", id),
        publisher_id: channel_id.to_string(),
        publisher_title: format!("Listed {}", channel_id),
        published_at: None,
        thumbnails: [(
            "default".to_string(),
            format!("https://i.example.com/{}/default.jpg", id),
        )]
        .into_iter()
        .collect(),
    }
}

/// `count` videos with ids `{prefix}-0`, `{prefix}-1`, ... on one channel.
pub fn videos(prefix: &str, count: usize, channel_id: &str) -> Vec<RawResultItem> {
    (0..count)
        .map(|i| video(&format!("{}-{}", prefix, i), channel_id))
        .collect()
}

pub fn stats_for(item: &RawResultItem, views: u64) -> ItemStats {
    ItemStats {
        id: item.id.clone(),
        publisher_id: item.publisher_id.clone(),
        counters: EngagementCounters {
            view_count: Some(views),
            like_count: Some(views / 10),
            comment_count: None,
        },
    }
}

pub fn channel(id: &str, name: &str) -> PublisherSummary {
    PublisherSummary {
        id: id.to_string(),
        display_name: name.to_string(),
        avatar_url: Some(format!("https://yt.example.com/{}.jpg", id)),
        subscriber_count: Some(12_345),
    }
}
