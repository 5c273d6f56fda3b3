//! Shared handler state

use crate::aggregator::SentimentAggregator;
use crate::history::HistoryStore;
use std::collections::HashSet;
use std::sync::Arc;

pub struct AppState {
    pub aggregator: Arc<SentimentAggregator>,
    /// Sources taking part in aggregation; everything else is disabled
    pub enabled_sources: HashSet<String>,
    pub history: Option<Arc<dyn HistoryStore>>,
    pub trending_symbols: Vec<String>,
}

impl AppState {
    pub fn new(aggregator: Arc<SentimentAggregator>, enabled_sources: HashSet<String>) -> Self {
        Self {
            aggregator,
            enabled_sources,
            history: None,
            trending_symbols: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_trending_symbols(mut self, symbols: Vec<String>) -> Self {
        self.trending_symbols = symbols;
        self
    }

    /// Enabled source ids in stable order
    pub fn enabled_list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.enabled_sources.iter().cloned().collect();
        ids.sort();
        ids
    }
}
