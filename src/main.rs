//! Crypto Sentiment API server
//!
//! Usage:
//!   cargo run --release --bin crypto_sentiment
//!
//! Environment variables: see `AppConfig::from_env`.

use crypto_sentiment::aggregator::SentimentAggregator;
use crypto_sentiment::api::{self, AppState};
use crypto_sentiment::config::AppConfig;
use crypto_sentiment::history::{HistoryStore, SqliteHistoryStore};
use crypto_sentiment::sentiment::{lexicon_reload_task, Lexicon, LexiconReloader, LexiconScorer};
use crypto_sentiment::sources::{
    build_http_client, RedditFetcher, SourceFetcher, TwitterFetcher, REDDIT_SOURCE, TWITTER_SOURCE,
};
use dotenv::dotenv;
use log::{error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("🚀 Crypto Sentiment API");

    let config = AppConfig::from_env()?;

    // Lexicon: file if configured (must be valid at startup), built-in otherwise
    let scorer = match &config.lexicon_path {
        Some(path) => {
            let lexicon = Lexicon::from_file(path).map_err(|e| {
                error!("❌ Failed to load lexicon {}: {}", path.display(), e);
                e
            })?;
            info!("📖 Loaded {} lexicon words from {}", lexicon.len(), path.display());

            let scorer = Arc::new(LexiconScorer::new(lexicon));
            let mut reloader = LexiconReloader::new(path);
            reloader.mark_loaded();
            tokio::spawn(lexicon_reload_task(
                scorer.clone(),
                reloader,
                config.lexicon_reload_interval,
            ));
            scorer
        }
        None => {
            let scorer = Arc::new(LexiconScorer::default());
            info!("📖 Using built-in lexicon ({} words)", scorer.lexicon().len());
            scorer
        }
    };

    let client = build_http_client(config.http_timeout)?;
    let mut aggregator = SentimentAggregator::new(scorer);
    let mut enabled: HashSet<String> = HashSet::new();

    match &config.reddit {
        Some(creds) if config.is_source_allowed(REDDIT_SOURCE) => {
            let fetcher = RedditFetcher::new(client.clone(), creds.clone());
            enabled.insert(fetcher.source_id().to_string());
            aggregator = aggregator.with_fetcher(Arc::new(fetcher));
            info!("   ├─ ✅ Reddit enabled");
        }
        Some(_) => info!("   ├─ Reddit disabled by DISABLED_SOURCES"),
        None => info!("   ├─ Reddit not configured"),
    }

    match &config.twitter {
        Some(creds) if config.is_source_allowed(TWITTER_SOURCE) => {
            let fetcher = TwitterFetcher::new(client.clone(), creds.clone());
            match fetcher.authenticate().await {
                Ok(()) => {
                    enabled.insert(fetcher.source_id().to_string());
                    aggregator = aggregator.with_fetcher(Arc::new(fetcher));
                    info!("   └─ ✅ X enabled");
                }
                Err(e) => warn!("   └─ ⚠️  X authentication failed, source disabled: {}", e),
            }
        }
        Some(_) => info!("   └─ X disabled by DISABLED_SOURCES"),
        None => info!("   └─ X not configured"),
    }

    if enabled.is_empty() {
        warn!("⚠️  No sources enabled; sentiment requests will return 503");
    }

    let mut state = AppState::new(Arc::new(aggregator), enabled)
        .with_trending_symbols(config.trending_symbols.clone());

    if let Some(path) = &config.db_path {
        let store: Arc<dyn HistoryStore> = Arc::new(SqliteHistoryStore::open(path)?);
        state = state.with_history(store);
    } else {
        info!("🗄️  Sentiment history disabled");
    }

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("🔄 Press CTRL+C to shutdown gracefully");

    api::serve(listener, Arc::new(state), shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
        Err(err) => error!("❌ Failed to listen for CTRL+C: {}", err),
    }
}
