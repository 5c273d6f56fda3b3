//! Trending symbols: the aggregate call looped over a fixed symbol list

use super::engine::SentimentAggregator;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_TRENDING_SYMBOLS: [&str; 5] = ["BTC", "ETH", "BNB", "XRP", "DOGE"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingEntry {
    pub symbol: String,
    pub score: f64,
    pub posts: usize,
}

/// Aggregate every symbol and keep the ones with data
///
/// Symbols whose aggregate fails or that produced no items are left out.
/// Output order follows `symbols`.
pub async fn trending(
    aggregator: &SentimentAggregator,
    symbols: &[String],
    enabled: &HashSet<String>,
) -> Vec<TrendingEntry> {
    let results = join_all(
        symbols
            .iter()
            .map(|symbol| aggregator.aggregate(symbol, enabled)),
    )
    .await;

    symbols
        .iter()
        .zip(results)
        .filter_map(|(symbol, result)| match result {
            Ok(aggregate) if aggregate.total_items() > 0 => Some(TrendingEntry {
                symbol: symbol.clone(),
                score: aggregate.overall_score,
                posts: aggregate.total_items(),
            }),
            Ok(_) => None,
            Err(e) => {
                log::debug!("Trending skipped {}: {}", symbol, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{LexiconScorer, RawItem};
    use crate::sources::{FetchError, SourceFetcher};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Returns "moon" posts for BTC, nothing for ETH, fails otherwise
    struct SymbolFetcher;

    #[async_trait]
    impl SourceFetcher for SymbolFetcher {
        fn source_id(&self) -> &str {
            "reddit"
        }

        async fn fetch(&self, symbol: &str) -> Result<Vec<RawItem>, FetchError> {
            match symbol {
                "BTC" => Ok(vec![
                    RawItem::new("reddit", "moon"),
                    RawItem::new("reddit", "bullish breakout"),
                ]),
                "ETH" => Ok(Vec::new()),
                _ => Err(FetchError::Decode("unknown symbol".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_trending_filters_empty_and_failed() {
        let aggregator = SentimentAggregator::new(Arc::new(LexiconScorer::default()))
            .with_fetcher(Arc::new(SymbolFetcher));
        let symbols: Vec<String> = DEFAULT_TRENDING_SYMBOLS.iter().map(|s| s.to_string()).collect();
        let enabled = HashSet::from(["reddit".to_string()]);

        let entries = trending(&aggregator, &symbols, &enabled).await;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].symbol, "BTC");
        assert_eq!(entries[0].posts, 2);
        assert!(entries[0].score > 0.0);
    }
}
