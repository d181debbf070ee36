pub mod types;
pub mod traits;
pub mod fetcher;
pub mod pipeline;
pub mod state;
pub mod aggregator;
pub mod sources;
pub mod library;
pub mod utils;

pub use types::*;
pub use traits::VideoPlatform;
pub use fetcher::Fetcher;
pub use pipeline::{load_page, merge_page, PageLoad};
pub use state::{FeedSnapshot, FeedState, FetchOutcome, Viewport};
pub use aggregator::FeedAggregator;
pub use sources::{Category, ChannelPage};
pub use library::{LibraryEntry, LibraryStore, MemoryLibraryStore, SqliteLibraryStore, UserLibrary};
