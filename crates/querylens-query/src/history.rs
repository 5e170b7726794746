//! Rolling performance history
//!
//! A fixed-capacity FIFO of [`QueryPerformance`] records. When an append
//! pushes the buffer past capacity the oldest inserted record is dropped;
//! reads never affect eviction order.

use parking_lot::Mutex;
use querylens_analyzer::normalize;
use querylens_core::QueryPerformance;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

/// Execution count and mean time for one normalized statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFrequency {
    /// Normalized statement text
    pub query: String,
    pub count: usize,
    pub avg_time_ms: f64,
}

/// Aggregates computed from the history at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStats {
    /// Number of records in the history
    pub total_queries: usize,
    /// Mean execution time, 0 when the history is empty
    pub average_execution_time_ms: f64,
    /// Records slower than the threshold, slowest first
    pub slow_queries: Vec<QueryPerformance>,
    /// Normalized statements, most executed first
    pub most_frequent_queries: Vec<QueryFrequency>,
    /// Occurrences of each index name across all records
    pub index_usage_stats: BTreeMap<String, usize>,
}

/// Bounded FIFO of performance records
pub struct HistoryStore {
    /// Records in insertion order, oldest at the front
    entries: Mutex<VecDeque<QueryPerformance>>,

    /// Maximum records to keep
    capacity: usize,

    /// Length of the stats leaderboards
    leaderboard_size: usize,
}

impl HistoryStore {
    /// Create a store holding at most `capacity` records
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            leaderboard_size: 10,
        }
    }

    /// Set how many entries the slow and frequent leaderboards keep
    pub fn with_leaderboard_size(mut self, size: usize) -> Self {
        self.leaderboard_size = size;
        self
    }

    /// Append a record, evicting the oldest if the store is full
    pub fn append(&self, perf: QueryPerformance) {
        let mut entries = self.entries.lock();
        let execution_time_ms = perf.execution_time_ms();
        entries.push_back(perf);

        let mut evicted = 0usize;
        while entries.len() > self.capacity {
            entries.pop_front();
            evicted += 1;
        }

        tracing::debug!(
            execution_time_ms,
            len = entries.len(),
            evicted,
            "appended query performance to history"
        );
    }

    /// Compute aggregates over the current contents
    pub fn stats(&self, slow_query_threshold: Duration) -> QueryStats {
        let entries = self.entries.lock();

        let total_queries = entries.len();
        if total_queries == 0 {
            return QueryStats::default();
        }

        let total_ms: f64 = entries.iter().map(|p| p.execution_time_ms()).sum();

        let mut slow_queries: Vec<QueryPerformance> = entries
            .iter()
            .filter(|p| p.execution_time > slow_query_threshold)
            .cloned()
            .collect();
        slow_queries.sort_by(|a, b| b.execution_time.cmp(&a.execution_time));
        slow_queries.truncate(self.leaderboard_size);

        QueryStats {
            total_queries,
            average_execution_time_ms: total_ms / total_queries as f64,
            slow_queries,
            most_frequent_queries: self.frequency_leaderboard(&entries),
            index_usage_stats: index_usage_counts(&entries),
        }
    }

    fn frequency_leaderboard(&self, entries: &VecDeque<QueryPerformance>) -> Vec<QueryFrequency> {
        // (normalized query, count, total ms) in order of first appearance
        let mut groups: Vec<(String, usize, f64)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for perf in entries {
            let key = normalize(&perf.query);
            match positions.get(&key) {
                Some(&pos) => {
                    groups[pos].1 += 1;
                    groups[pos].2 += perf.execution_time_ms();
                }
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push((key, 1, perf.execution_time_ms()));
                }
            }
        }

        // Stable, so ties keep first-seen order
        groups.sort_by(|a, b| b.1.cmp(&a.1));
        groups
            .into_iter()
            .take(self.leaderboard_size)
            .map(|(query, count, total_ms)| QueryFrequency {
                query,
                count,
                avg_time_ms: total_ms / count as f64,
            })
            .collect()
    }

    /// Remove every record
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let count = entries.len();
        tracing::info!(entries_cleared = count, "clearing query history");
        entries.clear();
    }

    /// Copy of every record, oldest first
    pub fn export_all(&self) -> Vec<QueryPerformance> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Records whose SQL contains `text`, case-insensitively
    pub fn search(&self, text: &str) -> Vec<QueryPerformance> {
        let needle = text.to_lowercase();
        self.entries
            .lock()
            .iter()
            .filter(|p| p.query.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Get the number of records
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Maximum number of records kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(1000)
    }
}

fn index_usage_counts(entries: &VecDeque<QueryPerformance>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for index in entries.iter().flat_map(|p| p.index_usage.iter()) {
        *counts.entry(index.clone()).or_insert(0) += 1;
    }
    counts
}
