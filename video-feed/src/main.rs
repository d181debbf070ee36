use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use video_feed::utils::{count, text};
use video_feed::{
    AggregatorConfig, Category, ChannelPage, FeedAggregator, FeedQuery, FetchConfig,
    FetchOutcome, Fetcher, LibraryStore, SqliteLibraryStore, VideoPlatform,
};

#[derive(Parser)]
#[command(name = "video-feed", about = "Browse video platform feeds from the terminal")]
struct Cli {
    #[command(flatten)]
    api: ApiArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ApiArgs {
    /// Upstream API key (falls back to VIDEO_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Upstream API base URL
    #[arg(long, env = "VIDEO_API_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Results requested per page
    #[arg(long, default_value_t = video_feed::DEFAULT_PAGE_SIZE, global = true)]
    page_size: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Search videos by free text
    Search {
        term: String,
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Show a category feed (all, movies, songs, news, trending, reels, education)
    Category {
        name: String,
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Show a channel and its latest uploads
    Channel {
        channel_id: String,
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Show a user's library
    Library {
        user_id: String,
        #[arg(long, default_value = "sqlite://video-feed.db?mode=rwc")]
        database_url: String,
        /// Flip the dark-mode preference before printing
        #[arg(long)]
        toggle_dark_mode: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AggregatorConfig {
        page_size: cli.api.page_size,
        ..AggregatorConfig::default()
    };

    match cli.command {
        Command::Search { term, pages } => {
            let platform = platform(&cli.api)?;
            let feed = FeedAggregator::new(platform, FeedQuery::search(term), config);
            run_feed(&feed, pages).await
        }
        Command::Category { name, pages } => {
            let category: Category = name.parse()?;
            let platform = platform(&cli.api)?;
            info!("Loading category {}", category);
            let feed = category.aggregator(platform, config);
            run_feed(&feed, pages).await
        }
        Command::Channel { channel_id, pages } => {
            let platform = platform(&cli.api)?;
            let page = ChannelPage::load(platform, &channel_id, config).await?;
            println!(
                "{} ({} subscribers)",
                page.channel.display_name,
                page.channel
                    .subscriber_count
                    .map(count::format_views)
                    .unwrap_or_else(|| "hidden".to_string())
            );
            run_feed(&page.feed, pages).await
        }
        Command::Library {
            user_id,
            database_url,
            toggle_dark_mode,
        } => {
            let store = SqliteLibraryStore::connect(&database_url)
                .await
                .with_context(|| format!("opening library database {}", database_url))?;
            let mut library = store.load(&user_id).await?;
            if toggle_dark_mode {
                library.toggle_dark_mode();
                store.save(&user_id, &library).await?;
            }

            println!("dark mode: {}", if library.dark_mode { "on" } else { "off" });
            println!("history ({}):", library.history.len());
            for entry in &library.history {
                println!(
                    "  {}  {} - {}",
                    entry.at.format("%Y-%m-%d %H:%M"),
                    entry.title,
                    entry.publisher_name
                );
            }
            println!("liked ({}):", library.liked.len());
            for entry in &library.liked {
                println!("  {} - {}", entry.title, entry.publisher_name);
            }
            Ok(())
        }
    }
}

fn platform(args: &ApiArgs) -> anyhow::Result<Arc<dyn VideoPlatform>> {
    let mut fetch_config = match &args.api_key {
        Some(api_key) => FetchConfig {
            api_key: api_key.clone(),
            ..FetchConfig::default()
        },
        None => FetchConfig::from_env()
            .context("an API key is required (--api-key or VIDEO_API_KEY)")?,
    };
    if let Some(base_url) = &args.base_url {
        fetch_config.base_url = base_url.clone();
    }

    Ok(Arc::new(Fetcher::new(fetch_config)?))
}

async fn run_feed(feed: &FeedAggregator, pages: usize) -> anyhow::Result<()> {
    let mut printed = 0;

    for _ in 0..pages {
        match feed.fetch_next().await {
            Ok(FetchOutcome::Appended { .. }) => {}
            Ok(FetchOutcome::Exhausted) => break,
            Ok(outcome) => info!("Fetch skipped: {:?}", outcome),
            Err(e) => {
                error!("{}", feed.last_error().unwrap_or_else(|| e.to_string()));
                return Err(e.into());
            }
        }

        let snapshot = feed.snapshot();
        for (index, item) in snapshot.items.iter().enumerate().skip(printed) {
            println!(
                "{:>4}. {:<60} {:>7} views  {}",
                index + 1,
                text::truncate_title(&item.item.title, text::DEFAULT_TITLE_WORDS),
                count::format_views(item.view_count()),
                item.publisher_name()
            );
        }
        printed = snapshot.items.len();

        if snapshot.exhausted {
            break;
        }
    }

    Ok(())
}
