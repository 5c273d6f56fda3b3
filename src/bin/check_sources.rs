//! Connectivity check for configured sources
//!
//! Fetches one symbol from every configured source and prints the item count
//! and average score, without starting the server. Scores use the configured
//! lexicon (`LEXICON_PATH`) or the built-in one.
//!
//! Usage:
//!   cargo run --bin check_sources -- [SYMBOL]    (default: BTC)

use crypto_sentiment::aggregator::{summarize, SourceOutcome};
use crypto_sentiment::config::AppConfig;
use crypto_sentiment::sentiment::Lexicon;
use crypto_sentiment::sources::{build_http_client, RedditFetcher, SourceFetcher, TwitterFetcher};
use dotenv::dotenv;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let symbol = env::args().nth(1).unwrap_or_else(|| "BTC".to_string());
    let config = AppConfig::from_env()?;
    let client = build_http_client(config.http_timeout)?;
    let lexicon = Lexicon::load_configured(config.lexicon_path.as_deref())?;

    let mut fetchers: Vec<Box<dyn SourceFetcher>> = Vec::new();
    if let Some(creds) = &config.reddit {
        fetchers.push(Box::new(RedditFetcher::new(client.clone(), creds.clone())));
    }
    if let Some(creds) = &config.twitter {
        fetchers.push(Box::new(TwitterFetcher::new(client.clone(), creds.clone())));
    }

    if fetchers.is_empty() {
        println!("⚠️  No sources configured (set REDDIT_* or TWITTER_* variables)");
        return Ok(());
    }

    println!(
        "🔍 Checking {} source(s) for {} ({} lexicon words)",
        fetchers.len(),
        symbol,
        lexicon.len()
    );

    let mut failures = 0;
    for fetcher in &fetchers {
        let id = fetcher.source_id();
        let note = if config.is_source_allowed(id) {
            ""
        } else {
            " (disabled by DISABLED_SOURCES)"
        };

        let outcome = SourceOutcome::from_fetch(fetcher.fetch(&symbol).await);
        let Some(summary) = summarize(id, outcome, &lexicon) else {
            continue;
        };

        match &summary.error {
            None => println!(
                "✅ {}{}: {} items, average score {:.4}",
                id, note, summary.item_count, summary.average_score
            ),
            Some(error) => {
                failures += 1;
                println!("❌ {}{}: {}", id, note, error);
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
