use chrono::{NaiveTime, Timelike};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{AnalysisError, AnalysisResult};
use crate::parser::Record;
use crate::stats::{ByteStat, KeyedStats, RequestStat, SecondBucket};
use crate::url_key::derive_url_key;

pub const FIELD_CLIENT_IP: &str = "c-ip";
pub const FIELD_URI_STEM: &str = "cs-uri-stem";
pub const FIELD_URI_QUERY: &str = "cs-uri-query";
pub const FIELD_TIME_TAKEN: &str = "time-taken";
pub const FIELD_BYTES_SENT: &str = "sc-bytes";
pub const FIELD_BYTES_RECEIVED: &str = "cs-bytes";
pub const FIELD_TIME: &str = "time";

/// Requests slower than this many milliseconds count as high cost.
pub const HIGH_COST_THRESHOLD_MS: i64 = 100;

/// 17:30:00, the first second-of-day included in the time series.
pub const TIME_SERIES_CUTOFF: u32 = 17 * 3600 + 30 * 60;

/// Running accumulators for one analysis run.
#[derive(Debug, Default)]
pub struct Aggregator {
    addresses: KeyedStats<u64>,
    urls: KeyedStats<RequestStat>,
    high_cost_urls: KeyedStats<RequestStat>,
    bytes: KeyedStats<ByteStat>,
    seconds: BTreeMap<u32, SecondBucket>,
    records: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one record into every accumulator.
    ///
    /// All fields are read, converted and summed before anything is updated,
    /// so a conversion or overflow failure leaves the accumulators untouched.
    pub fn ingest(&mut self, record: &Record<'_>) -> AnalysisResult<()> {
        let address = record.get(FIELD_CLIENT_IP).unwrap_or_default();
        let key = derive_url_key(
            record.require(FIELD_URI_STEM)?,
            record.require(FIELD_URI_QUERY)?,
        );
        let exec_time: i64 = parse_number(record, FIELD_TIME_TAKEN)?;
        let sent: i64 = parse_number(record, FIELD_BYTES_SENT)?;
        let received: i64 = parse_number(record, FIELD_BYTES_RECEIVED)?;
        let second = parse_second_of_day(record.require(FIELD_TIME)?)?;

        // Compute every new value first; only commit once none overflowed.
        let url_stat = self.urls.value(&key).record(exec_time)?;
        let high_cost_stat = if exec_time > HIGH_COST_THRESHOLD_MS {
            Some(self.high_cost_urls.value(&key).record(exec_time)?)
        } else {
            None
        };
        let byte_stat = self.bytes.value(&key).record(sent, received)?;
        let second_stat = if second >= TIME_SERIES_CUTOFF {
            let current = self
                .seconds
                .get(&second)
                .map(|bucket| bucket.exec_stats.value(&key))
                .unwrap_or_default();
            Some(current.record(exec_time)?)
        } else {
            None
        };

        if !address.is_empty() {
            self.addresses.update(address, |count| count + 1);
        }
        self.urls.insert(&key, url_stat);
        if let Some(stat) = high_cost_stat {
            self.high_cost_urls.insert(&key, stat);
        }
        self.bytes.insert(&key, byte_stat);
        if let Some(stat) = second_stat {
            let bucket = self.seconds.entry(second).or_default();
            bucket.request_counts.update(&key, |count| count + 1);
            bucket.exec_stats.insert(&key, stat);
        }

        self.records += 1;
        Ok(())
    }

    pub fn addresses(&self) -> &KeyedStats<u64> {
        &self.addresses
    }

    pub fn urls(&self) -> &KeyedStats<RequestStat> {
        &self.urls
    }

    pub fn high_cost_urls(&self) -> &KeyedStats<RequestStat> {
        &self.high_cost_urls
    }

    pub fn bytes(&self) -> &KeyedStats<ByteStat> {
        &self.bytes
    }

    /// Time-series buckets keyed by second of day, ascending.
    pub fn seconds(&self) -> &BTreeMap<u32, SecondBucket> {
        &self.seconds
    }

    pub fn records(&self) -> u64 {
        self.records
    }
}

fn parse_number<T>(record: &Record<'_>, field: &str) -> AnalysisResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = record.require(field)?;
    value
        .parse()
        .map_err(|e| AnalysisError::conversion(field, value, e))
}

/// Converts `HH:MM:SS[.fff]` into whole seconds since midnight.
pub fn parse_second_of_day(value: &str) -> AnalysisResult<u32> {
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .map(|time| time.num_seconds_from_midnight())
        .map_err(|e| AnalysisError::conversion(FIELD_TIME, value, e))
}
