use std::collections::HashMap;
use std::path::PathBuf;

use crate::engine::{FIELD_BYTES_RECEIVED, FIELD_BYTES_SENT, FIELD_TIME_TAKEN};
use crate::error::{AnalysisError, AnalysisResult};

/// Insertion-ordered keyed accumulator.
///
/// Values are replaced whole on every update; iteration follows the order in
/// which keys were first seen, so a stable sort over it breaks ties by first
/// appearance.
#[derive(Debug, Clone)]
pub struct KeyedStats<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V> Default for KeyedStats<V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<V: Default + Copy> KeyedStats<V> {
    /// Read-modify-write of the value stored under `key`.
    pub fn update(&mut self, key: &str, f: impl FnOnce(V) -> V) {
        let next = f(self.value(key));
        self.insert(key, next);
    }

    /// Current value under `key`, or the default when the key is unseen.
    pub fn value(&self, key: &str) -> V {
        self.get(key).copied().unwrap_or_default()
    }

    /// Stores `value` under `key`, keeping the slot of an existing key.
    pub fn insert(&mut self, key: &str, value: V) {
        match self.index.get(key) {
            Some(&slot) => self.entries[slot].1 = value,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value));
            }
        }
    }
}

impl<V> KeyedStats<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries ordered by `key_fn` descending, ties kept in first-seen order.
    pub fn sorted_desc_by<K: Ord>(&self, key_fn: impl Fn(&V) -> K) -> Vec<(&str, &V)> {
        let mut sorted: Vec<(&str, &V)> = self.iter().collect();
        sorted.sort_by(|a, b| key_fn(b.1).cmp(&key_fn(a.1)));
        sorted
    }
}

/// Request count and cumulative execution time for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStat {
    pub count: u64,
    pub exec_time_sum: i64,
}

impl RequestStat {
    pub fn record(self, exec_time: i64) -> AnalysisResult<Self> {
        let exec_time_sum = self
            .exec_time_sum
            .checked_add(exec_time)
            .ok_or_else(|| AnalysisError::overflow(FIELD_TIME_TAKEN, exec_time))?;
        Ok(Self {
            count: self.count + 1,
            exec_time_sum,
        })
    }

    /// Integer average, truncated toward zero.
    pub fn average_exec_time(&self) -> i64 {
        if self.count == 0 {
            return 0;
        }
        self.exec_time_sum / self.count as i64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteStat {
    pub sent: i64,
    pub received: i64,
}

impl ByteStat {
    pub fn record(self, sent: i64, received: i64) -> AnalysisResult<Self> {
        Ok(Self {
            sent: self
                .sent
                .checked_add(sent)
                .ok_or_else(|| AnalysisError::overflow(FIELD_BYTES_SENT, sent))?,
            received: self
                .received
                .checked_add(received)
                .ok_or_else(|| AnalysisError::overflow(FIELD_BYTES_RECEIVED, received))?,
        })
    }

    pub fn total(&self) -> AnalysisResult<i64> {
        self.sent
            .checked_add(self.received)
            .ok_or_else(|| AnalysisError::overflow(FIELD_BYTES_RECEIVED, self.received))
    }
}

/// Per-second time-series state for a single second of the day.
#[derive(Debug, Clone, Default)]
pub struct SecondBucket {
    pub request_counts: KeyedStats<u64>,
    pub exec_stats: KeyedStats<RequestStat>,
}

/// What a completed run produced, for the console summary.
#[derive(Debug)]
pub struct RunSummary {
    pub files_processed: usize,
    pub lines_read: u64,
    pub comments_skipped: u64,
    pub records_ingested: u64,
    pub unique_addresses: usize,
    pub unique_urls: usize,
    pub seconds_tracked: usize,
    pub top_urls: Vec<(String, u64)>,
    pub outputs: Vec<PathBuf>,
}
