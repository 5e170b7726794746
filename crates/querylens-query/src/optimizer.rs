//! Query optimizer facade
//!
//! Composes the recorder, index advisor, suggestion engine and history into
//! one call per statement:
//!
//! explain, execute with timing, classify, recommend indexes, suggest,
//! append to history, return.
//!
//! The only state shared across calls is the history and the slow query
//! threshold, both safe to use from concurrent analyses.

use crate::error::AnalyzeResult;
use crate::history::{HistoryStore, QueryStats};
use crate::recorder::PerformanceRecorder;
use querylens_analyzer::{
    IndexAdvisor, IndexRecommendation, OptimizationSuggestion, PlanInspector, Priority,
    SuggestionEngine,
};
use querylens_core::{DatabaseEngine, OptimizerConfig, QueryPerformance, QueryPlan, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// The result of analyzing one statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub plan: QueryPlan,
    pub performance: QueryPerformance,
    pub suggestions: Vec<OptimizationSuggestion>,
    pub index_recommendations: Vec<IndexRecommendation>,
}

impl QueryAnalysis {
    /// Returns true if any suggestion is high priority
    pub fn has_high_priority(&self) -> bool {
        self.suggestions
            .iter()
            .any(|s| s.priority == Priority::High)
    }

    /// Returns suggestions sorted by priority (high first), rule order kept within a priority
    pub fn suggestions_by_priority(&self) -> Vec<&OptimizationSuggestion> {
        let mut sorted: Vec<_> = self.suggestions.iter().collect();
        sorted.sort_by_key(|s| s.priority.rank());
        sorted
    }
}

/// Analyzes statements against one engine and keeps their history
pub struct QueryOptimizer {
    recorder: PerformanceRecorder,
    advisor: IndexAdvisor,
    suggestions: SuggestionEngine,
    history: Arc<HistoryStore>,
    slow_query_threshold_ms: AtomicU64,
}

impl QueryOptimizer {
    /// Create an optimizer with the default configuration
    pub fn new(engine: Arc<dyn DatabaseEngine>) -> Self {
        Self::build(engine, &OptimizerConfig::default())
    }

    /// Create an optimizer using the thresholds and sizing from `config`.
    ///
    /// Fails with a configuration error if `config` does not validate.
    pub fn with_config(
        engine: Arc<dyn DatabaseEngine>,
        config: &OptimizerConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(engine, config))
    }

    fn build(engine: Arc<dyn DatabaseEngine>, config: &OptimizerConfig) -> Self {
        let inspector = PlanInspector::from_config(config);
        let history = HistoryStore::new(config.max_history_size)
            .with_leaderboard_size(config.leaderboard_size);

        Self {
            recorder: PerformanceRecorder::with_inspector(engine, inspector),
            advisor: IndexAdvisor::new(),
            suggestions: SuggestionEngine::with_inspector(inspector),
            history: Arc::new(history),
            slow_query_threshold_ms: AtomicU64::new(config.slow_query_threshold_ms),
        }
    }

    /// Replace the index advisor, e.g. one backed by a different column extractor
    pub fn with_index_advisor(mut self, advisor: IndexAdvisor) -> Self {
        self.advisor = advisor;
        self
    }

    /// Share an existing history store
    pub fn with_shared_history(mut self, history: Arc<HistoryStore>) -> Self {
        self.history = history;
        self
    }

    /// Run, measure and advise on `sql`.
    ///
    /// EXPLAIN failures are absorbed; execution failures are returned and
    /// leave the history untouched.
    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    pub async fn analyze_query(&self, sql: &str) -> AnalyzeResult<QueryAnalysis> {
        let recording = self.recorder.record(sql).await?;

        let index_recommendations = self.advisor.recommend(sql);
        let suggestions = self.suggestions.suggest_from_signals(
            &recording.signals,
            &recording.performance,
            self.slow_query_threshold_ms(),
        );

        self.history.append(recording.performance.clone());

        tracing::info!(
            execution_time_ms = recording.performance.execution_time_ms(),
            suggestions = suggestions.len(),
            index_recommendations = index_recommendations.len(),
            "query analyzed"
        );

        Ok(QueryAnalysis {
            plan: recording.plan,
            performance: recording.performance,
            suggestions,
            index_recommendations,
        })
    }

    /// Aggregates over the current history
    pub fn get_query_stats(&self) -> QueryStats {
        self.history.stats(self.slow_query_threshold())
    }

    /// Empty the history
    pub fn clear_history(&self) {
        self.history.clear();
    }

    /// Change the slow query threshold for subsequent analyses and stats
    pub fn set_slow_query_threshold(&self, ms: u64) {
        tracing::debug!(slow_query_threshold_ms = ms, "slow query threshold updated");
        self.slow_query_threshold_ms.store(ms, Ordering::Relaxed);
    }

    pub fn slow_query_threshold_ms(&self) -> u64 {
        self.slow_query_threshold_ms.load(Ordering::Relaxed)
    }

    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_threshold_ms())
    }

    /// Copy of every record in the history, oldest first
    pub fn export_history(&self) -> Vec<QueryPerformance> {
        self.history.export_all()
    }

    /// Records whose SQL contains `text`
    pub fn search_history(&self, text: &str) -> Vec<QueryPerformance> {
        self.history.search(text)
    }

    /// The shared history store
    pub fn history(&self) -> Arc<HistoryStore> {
        Arc::clone(&self.history)
    }

    /// The engine statements run against
    pub fn engine(&self) -> &Arc<dyn DatabaseEngine> {
        self.recorder.engine()
    }
}
