use crate::types::{EnrichedItem, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const HISTORY_LIMIT: usize = 200;

/// A video remembered in a user's library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub publisher_name: String,
    pub at: DateTime<Utc>,
}

impl LibraryEntry {
    pub fn from_item(item: &EnrichedItem, at: DateTime<Utc>) -> Self {
        Self {
            video_id: item.id().to_string(),
            title: item.item.title.clone(),
            thumbnail_url: item.item.thumbnail_url().map(str::to_string),
            publisher_name: item.publisher_name().to_string(),
            at,
        }
    }
}

/// Per-user state: watch history, liked videos and the dark-mode preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLibrary {
    #[serde(default)]
    pub dark_mode: bool,
    /// Most recent first, one entry per video.
    #[serde(default)]
    pub history: Vec<LibraryEntry>,
    /// Most recently liked first.
    #[serde(default)]
    pub liked: Vec<LibraryEntry>,
}

impl UserLibrary {
    pub fn record_watch(&mut self, item: &EnrichedItem) {
        self.history.retain(|entry| entry.video_id != item.id());
        self.history.insert(0, LibraryEntry::from_item(item, Utc::now()));
        self.history.truncate(HISTORY_LIMIT);
    }

    /// Returns false if the video was already liked.
    pub fn like(&mut self, item: &EnrichedItem) -> bool {
        if self.is_liked(item.id()) {
            return false;
        }
        self.liked.insert(0, LibraryEntry::from_item(item, Utc::now()));
        true
    }

    /// Returns false if the video was not liked.
    pub fn unlike(&mut self, video_id: &str) -> bool {
        let before = self.liked.len();
        self.liked.retain(|entry| entry.video_id != video_id);
        self.liked.len() != before
    }

    pub fn is_liked(&self, video_id: &str) -> bool {
        self.liked.iter().any(|entry| entry.video_id == video_id)
    }

    /// Flip the preference and return the new value.
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }
}

/// Persistence for user libraries, one document per user.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// A user with no stored document gets the default library.
    async fn load(&self, user_id: &str) -> Result<UserLibrary>;

    async fn save(&self, user_id: &str, library: &UserLibrary) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryLibraryStore {
    libraries: RwLock<HashMap<String, UserLibrary>>,
}

impl MemoryLibraryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LibraryStore for MemoryLibraryStore {
    async fn load(&self, user_id: &str) -> Result<UserLibrary> {
        let libraries = self.libraries.read().await;
        Ok(libraries.get(user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: &str, library: &UserLibrary) -> Result<()> {
        let mut libraries = self.libraries.write().await;
        libraries.insert(user_id.to_string(), library.clone());
        Ok(())
    }
}

/// SQLite-backed store keeping each library as a JSON document.
pub struct SqliteLibraryStore {
    db: Pool<Sqlite>,
}

impl SqliteLibraryStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = SqlitePoolOptions::new().connect(database_url).await?;
        Self::with_pool(db).await
    }

    /// Private in-memory database. A single connection, since every
    /// connection to `sqlite::memory:` opens a fresh database.
    pub async fn in_memory() -> Result<Self> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(db).await
    }

    async fn with_pool(db: Pool<Sqlite>) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_libraries (
                user_id TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        info!("User library store ready");
        Ok(Self { db })
    }
}

#[async_trait]
impl LibraryStore for SqliteLibraryStore {
    async fn load(&self, user_id: &str) -> Result<UserLibrary> {
        let row = sqlx::query("SELECT document FROM user_libraries WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some(row) => {
                let document: String = row.try_get("document")?;
                Ok(serde_json::from_str(&document)?)
            }
            None => {
                debug!("No library stored for user {}", user_id);
                Ok(UserLibrary::default())
            }
        }
    }

    async fn save(&self, user_id: &str, library: &UserLibrary) -> Result<()> {
        let document = serde_json::to_string(library)?;

        sqlx::query(
            r#"
            INSERT INTO user_libraries (user_id, document, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id) DO UPDATE SET
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(document)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        debug!("Saved library for user {}", user_id);
        Ok(())
    }
}
