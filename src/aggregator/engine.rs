//! Sentiment aggregator - concurrent fan-out over source fetchers
//!
//! ```text
//! aggregate(symbol, enabled)
//!     ↓ join_all: one fetch per enabled source, each into its own slot
//! Vec<(source_id, SourceOutcome)>
//!     ↓ summarize (one lexicon snapshot per request)
//! Vec<SourceSummary>
//!     ↓ combine
//! AggregateResult | AggregateError
//! ```
//!
//! The aggregator waits for every launched fetch; one failing source never
//! cancels the others. Timeouts belong to the fetchers.

use super::outcome::{combine, summarize, SourceOutcome};
use super::types::{AggregateError, AggregateResult};
use crate::sentiment::LexiconScorer;
use crate::sources::SourceFetcher;
use futures::future::join_all;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

pub struct SentimentAggregator {
    scorer: Arc<LexiconScorer>,
    /// Registered fetchers keyed by source id
    fetchers: BTreeMap<String, Arc<dyn SourceFetcher>>,
}

impl SentimentAggregator {
    pub fn new(scorer: Arc<LexiconScorer>) -> Self {
        Self {
            scorer,
            fetchers: BTreeMap::new(),
        }
    }

    /// Register a fetcher under its source id
    ///
    /// A later fetcher with the same id replaces the earlier one.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn SourceFetcher>) -> Self {
        let id = fetcher.source_id().to_string();
        if self.fetchers.insert(id.clone(), fetcher).is_some() {
            log::warn!("⚠️  Fetcher for source '{}' registered twice, keeping the last", id);
        }
        self
    }

    pub fn scorer(&self) -> &Arc<LexiconScorer> {
        &self.scorer
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.fetchers.keys().map(String::as_str)
    }

    /// Fetch, score, and combine sentiment for `symbol`
    ///
    /// Only sources in `enabled` are fetched. Registered sources outside the
    /// set are treated as disabled and never appear in the result.
    ///
    /// # Returns
    /// * `Ok(AggregateResult)` - at least one enabled source succeeded
    /// * `Err(AllSourcesFailed)` - every enabled source failed
    /// * `Err(NoSourcesEnabled)` - nothing to fetch
    pub async fn aggregate(
        &self,
        symbol: &str,
        enabled: &HashSet<String>,
    ) -> Result<AggregateResult, AggregateError> {
        for id in enabled {
            if !self.fetchers.contains_key(id) {
                log::warn!("⚠️  Source '{}' is enabled but has no fetcher, ignoring", id);
            }
        }

        let fetches = self.fetchers.iter().map(|(id, fetcher)| async move {
            let outcome = if enabled.contains(id) {
                SourceOutcome::from_fetch(fetcher.fetch(symbol).await)
            } else {
                SourceOutcome::Disabled
            };
            (id.as_str(), outcome)
        });
        let outcomes = join_all(fetches).await;

        let lexicon = self.scorer.lexicon();
        let summaries = outcomes.into_iter().filter_map(|(id, outcome)| {
            match &outcome {
                SourceOutcome::Success { items } => {
                    log::debug!("✅ {} returned {} items for {}", id, items.len(), symbol)
                }
                SourceOutcome::Failure { error } => {
                    log::warn!("❌ {} fetch failed for {}: {}", id, symbol, error)
                }
                SourceOutcome::Disabled => {}
            }
            summarize(id, outcome, &lexicon)
        });

        let result = combine(symbol, summaries, chrono::Utc::now());
        match &result {
            Ok(aggregate) => log::info!(
                "📊 {} sentiment: overall={:.4} items={} sources={}",
                symbol,
                aggregate.overall_score,
                aggregate.total_items(),
                aggregate.per_source.len()
            ),
            Err(e) => log::warn!("⚠️  {} sentiment unavailable: {}", symbol, e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{Lexicon, RawItem};
    use crate::sources::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const EPS: f64 = 1e-9;

    /// Fetcher returning canned texts after a delay
    struct StubFetcher {
        id: &'static str,
        delay_ms: u64,
        result: Result<Vec<&'static str>, &'static str>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn ok(id: &'static str, delay_ms: u64, texts: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                id,
                delay_ms,
                result: Ok(texts),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(id: &'static str, delay_ms: u64, error: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                delay_ms,
                result: Err(error),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SourceFetcher for StubFetcher {
        fn source_id(&self) -> &str {
            self.id
        }

        async fn fetch(&self, _symbol: &str) -> Result<Vec<RawItem>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            match &self.result {
                Ok(texts) => Ok(texts.iter().map(|t| RawItem::new(self.id, *t)).collect()),
                Err(e) => Err(FetchError::Auth(e.to_string())),
            }
        }
    }

    fn scorer() -> Arc<LexiconScorer> {
        let lexicon = Lexicon::new(
            HashMap::from([("moon".to_string(), 1.0), ("up".to_string(), 0.5)]),
            HashMap::from([("crash".to_string(), -1.0)]),
        )
        .unwrap();
        Arc::new(LexiconScorer::new(lexicon))
    }

    fn enabled(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_weighted_across_sources() {
        // a: [1.0, 0.0] mean 0.5; b: eight items, mean -0.125
        let a = StubFetcher::ok("a", 0, vec!["moon", "meh"]);
        let b = StubFetcher::ok(
            "b",
            0,
            vec!["crash", "crash", "up", "up", "meh", "meh", "meh", "meh"],
        );
        let aggregator = SentimentAggregator::new(scorer())
            .with_fetcher(a)
            .with_fetcher(b);

        let result = aggregator.aggregate("BTC", &enabled(&["a", "b"])).await.unwrap();

        let expected = (0.5 * 2.0 + -0.125 * 8.0) / 10.0;
        assert!((result.overall_score - expected).abs() < EPS, "got {}", result.overall_score);
        assert_eq!(result.per_source["a"].item_count, 2);
        assert_eq!(result.per_source["b"].item_count, 8);
        assert_eq!(result.symbol, "BTC");
    }

    #[tokio::test]
    async fn test_completion_order_does_not_matter() {
        let texts_a = vec!["moon", "up", "crash"];
        let texts_b = vec!["crash", "crash", "moon", "up", "up"];

        let fast_a = SentimentAggregator::new(scorer())
            .with_fetcher(StubFetcher::ok("a", 1, texts_a.clone()))
            .with_fetcher(StubFetcher::ok("b", 40, texts_b.clone()));
        let fast_b = SentimentAggregator::new(scorer())
            .with_fetcher(StubFetcher::ok("a", 40, texts_a))
            .with_fetcher(StubFetcher::ok("b", 1, texts_b));

        let ids = enabled(&["a", "b"]);
        let first = fast_a.aggregate("ETH", &ids).await.unwrap();
        let second = fast_b.aggregate("ETH", &ids).await.unwrap();

        assert_eq!(first.overall_score.to_bits(), second.overall_score.to_bits());
        assert_eq!(first.per_source, second.per_source);
    }

    #[tokio::test]
    async fn test_all_failed_returns_error() {
        let aggregator = SentimentAggregator::new(scorer())
            .with_fetcher(StubFetcher::failing("a", 0, "down"))
            .with_fetcher(StubFetcher::failing("b", 5, "denied"));

        let result = aggregator.aggregate("BTC", &enabled(&["a", "b"])).await;
        assert!(matches!(result, Err(AggregateError::AllSourcesFailed { ref failures }) if failures.len() == 2));
    }

    #[tokio::test]
    async fn test_partial_failure() {
        let failing = StubFetcher::failing("a", 0, "down");
        let working = StubFetcher::ok("b", 20, vec!["moon", "up"]);
        let aggregator = SentimentAggregator::new(scorer())
            .with_fetcher(failing.clone())
            .with_fetcher(working.clone());

        let result = aggregator.aggregate("BTC", &enabled(&["a", "b"])).await.unwrap();

        let errors: Vec<_> = result.per_source.values().filter(|s| s.is_failure()).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].source_id, "a");
        assert!((result.overall_score - result.per_source["b"].average_score).abs() < EPS);
        assert!((result.overall_score - 0.75).abs() < EPS);

        // The failure did not cancel the slower fetch
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(working.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_source_is_absent_and_not_fetched() {
        let reachable = StubFetcher::ok("a", 0, vec!["moon"]);
        let other = StubFetcher::ok("b", 0, vec!["crash"]);
        let aggregator = SentimentAggregator::new(scorer())
            .with_fetcher(reachable.clone())
            .with_fetcher(other);

        let result = aggregator.aggregate("BTC", &enabled(&["b"])).await.unwrap();

        assert!(!result.per_source.contains_key("a"));
        assert_eq!(result.per_source.len(), 1);
        assert_eq!(result.overall_score, -1.0);
        assert_eq!(reachable.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_nothing_enabled() {
        let aggregator =
            SentimentAggregator::new(scorer()).with_fetcher(StubFetcher::ok("a", 0, vec!["moon"]));

        let result = aggregator.aggregate("BTC", &enabled(&["unknown"])).await;
        assert_eq!(result, Err(AggregateError::NoSourcesEnabled));
    }

    #[tokio::test]
    async fn test_zero_items_is_genuine_zero() {
        let aggregator = SentimentAggregator::new(scorer())
            .with_fetcher(StubFetcher::ok("a", 0, vec![]))
            .with_fetcher(StubFetcher::ok("b", 0, vec![]));

        let result = aggregator.aggregate("BTC", &enabled(&["a", "b"])).await.unwrap();
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.total_items(), 0);
    }

    #[test]
    fn test_source_ids_sorted() {
        let aggregator = SentimentAggregator::new(scorer())
            .with_fetcher(StubFetcher::ok("twitter", 0, vec![]))
            .with_fetcher(StubFetcher::ok("reddit", 0, vec![]));
        assert_eq!(aggregator.source_ids().collect::<Vec<_>>(), vec!["reddit", "twitter"]);
    }
}
