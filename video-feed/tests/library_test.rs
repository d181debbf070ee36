mod common;

use common::{channel, init_tracing, video};
use video_feed::library::HISTORY_LIMIT;
use video_feed::{
    EnrichedItem, LibraryStore, MemoryLibraryStore, SqliteLibraryStore, UserLibrary,
};

fn enriched(id: &str) -> EnrichedItem {
    EnrichedItem {
        item: video(id, "UC1"),
        counters: None,
        publisher: Some(channel("UC1", "Channel One")),
    }
}

#[test]
fn test_history_is_most_recent_first_and_unique() {
    let mut library = UserLibrary::default();
    library.record_watch(&enriched("a"));
    library.record_watch(&enriched("b"));
    library.record_watch(&enriched("a"));

    let ids: Vec<&str> = library.history.iter().map(|e| e.video_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(library.history[0].publisher_name, "Channel One");
    assert_eq!(
        library.history[0].thumbnail_url.as_deref(),
        Some("https://i.example.com/a/default.jpg")
    );
}

#[test]
fn test_history_is_capped() {
    let mut library = UserLibrary::default();
    for i in 0..HISTORY_LIMIT + 5 {
        library.record_watch(&enriched(&format!("v{}", i)));
    }
    assert_eq!(library.history.len(), HISTORY_LIMIT);
    assert_eq!(library.history[0].video_id, format!("v{}", HISTORY_LIMIT + 4));
}

#[test]
fn test_likes_and_dark_mode() {
    let mut library = UserLibrary::default();

    assert!(library.like(&enriched("a")));
    assert!(!library.like(&enriched("a")), "liking twice is a no-op");
    assert!(library.like(&enriched("b")));
    assert!(library.is_liked("a"));
    assert_eq!(library.liked[0].video_id, "b");

    assert!(library.unlike("a"));
    assert!(!library.unlike("a"));
    assert!(!library.is_liked("a"));

    assert!(!library.dark_mode);
    assert!(library.toggle_dark_mode());
    assert!(!library.toggle_dark_mode());
}

#[tokio::test]
async fn test_memory_store_round_trip() {
    init_tracing();

    let store = MemoryLibraryStore::new();
    assert_eq!(store.load("alice").await.unwrap(), UserLibrary::default());

    let mut library = UserLibrary::default();
    library.toggle_dark_mode();
    library.like(&enriched("a"));
    store.save("alice", &library).await.unwrap();

    assert_eq!(store.load("alice").await.unwrap(), library);
    assert_eq!(store.load("bob").await.unwrap(), UserLibrary::default());
}

#[tokio::test]
async fn test_sqlite_store_persists_and_overwrites() {
    init_tracing();

    let store = SqliteLibraryStore::in_memory()
        .await
        .expect("Failed to open in-memory store");

    assert_eq!(store.load("alice").await.unwrap(), UserLibrary::default());

    let mut library = UserLibrary::default();
    library.record_watch(&enriched("a"));
    library.like(&enriched("b"));
    store.save("alice", &library).await.unwrap();
    assert_eq!(store.load("alice").await.unwrap(), library);

    library.toggle_dark_mode();
    library.unlike("b");
    store.save("alice", &library).await.unwrap();

    let reloaded = store.load("alice").await.unwrap();
    assert!(reloaded.dark_mode);
    assert!(reloaded.liked.is_empty());
    assert_eq!(reloaded.history.len(), 1);
    assert_eq!(store.load("bob").await.unwrap(), UserLibrary::default());
}
