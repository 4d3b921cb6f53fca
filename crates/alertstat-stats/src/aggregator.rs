//! Bucketing of a newest-first message stream into frequency tables.
//!
//! The scan stops at the first message older than the lookback window. That
//! shortcut is only sound when the source yields non-increasing timestamps;
//! see `MessageSource` in the telegram crate for the contract.

use alertstat_common::Message;
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use futures::{Stream, StreamExt};
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use tracing::{debug, trace};

use crate::classifier::{Classification, MessageClassifier};
use crate::extractor::extract_time;

/// Mapping from key to a positive count. Keys are present only once counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<K: Ord> {
    counts: BTreeMap<K, u64>,
}

impl<K: Ord> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> FrequencyTable<K> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to the count of `key`.
    pub fn increment(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Count of `key`, zero when absent.
    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, u64)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.counts.keys().copied()
    }

    /// Counts in ascending key order.
    pub fn values(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.values().copied()
    }
}

impl FrequencyTable<u8> {
    /// Counts for hours 0..=23 with absent hours as zero.
    pub fn dense_hours(&self) -> [u64; 24] {
        let mut hours = [0; 24];
        for (hour, count) in self.iter() {
            if let Some(slot) = hours.get_mut(usize::from(hour)) {
                *slot = count;
            }
        }
        hours
    }
}

/// The lookback window of one aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationWindow {
    /// Window length in days.
    pub days: u32,
    /// Oldest instant still counted (inclusive).
    pub start: DateTime<Utc>,
    /// Instant the window was computed at.
    pub now: DateTime<Utc>,
}

impl AggregationWindow {
    /// Window of `days` days ending at `now`.
    pub fn ending_at(days: u32, now: DateTime<Utc>) -> Self {
        Self {
            days,
            start: now - Duration::days(i64::from(days)),
            now,
        }
    }

    /// Whether `at` is not strictly before the window start.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start
    }
}

/// Bookkeeping about the scan itself, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Messages pulled from the source, including the one that ended the scan.
    pub scanned: u64,
    /// Messages skipped for lack of a timestamp.
    pub undated: u64,
    /// In-window messages rejected by the classifier.
    pub rejected: u64,
    /// Whether the scan ended on an out-of-window message rather than exhaustion.
    pub stopped_early: bool,
}

/// The three frequency tables of one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationResult {
    /// Accepted messages per UTC calendar day.
    pub by_day: FrequencyTable<NaiveDate>,
    /// Accepted messages per UTC posting hour.
    pub by_hour_received: FrequencyTable<u8>,
    /// Accepted messages per hour announced in their text.
    pub by_hour_extracted: FrequencyTable<u8>,
    /// Accepted messages.
    pub total_messages: u64,
    /// Window the scan was bounded by.
    pub window: AggregationWindow,
    /// Scan bookkeeping.
    pub scan: ScanStats,
}

impl AggregationResult {
    fn empty(window: AggregationWindow) -> Self {
        Self {
            by_day: FrequencyTable::new(),
            by_hour_received: FrequencyTable::new(),
            by_hour_extracted: FrequencyTable::new(),
            total_messages: 0,
            window,
            scan: ScanStats::default(),
        }
    }

    /// Accepted messages with an extracted time.
    pub fn parsed_messages_count(&self) -> u64 {
        self.by_hour_extracted.total()
    }
}

/// Consumes a newest-first message stream into an [`AggregationResult`].
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    classifier: MessageClassifier,
}

impl Aggregator {
    /// Aggregator using the given classifier.
    pub fn new(classifier: MessageClassifier) -> Self {
        Self { classifier }
    }

    /// Aggregates messages yielded newest first.
    pub fn aggregate<I>(&self, messages: I, window_days: u32, now: DateTime<Utc>) -> AggregationResult
    where
        I: IntoIterator<Item = Message>,
    {
        let mut accumulator = Accumulator::new(&self.classifier, AggregationWindow::ending_at(window_days, now));
        for message in messages {
            if accumulator.push(&message).is_break() {
                break;
            }
        }
        accumulator.finish()
    }

    /// Aggregates an async newest-first stream, stopping polling at the window edge.
    pub async fn aggregate_stream<S>(
        &self,
        messages: S,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> AggregationResult
    where
        S: Stream<Item = Message>,
    {
        let mut messages = std::pin::pin!(messages);
        let mut accumulator = Accumulator::new(&self.classifier, AggregationWindow::ending_at(window_days, now));
        while let Some(message) = messages.next().await {
            if accumulator.push(&message).is_break() {
                break;
            }
        }
        accumulator.finish()
    }
}

struct Accumulator<'a> {
    classifier: &'a MessageClassifier,
    result: AggregationResult,
}

impl<'a> Accumulator<'a> {
    fn new(classifier: &'a MessageClassifier, window: AggregationWindow) -> Self {
        Self {
            classifier,
            result: AggregationResult::empty(window),
        }
    }

    fn push(&mut self, message: &Message) -> ControlFlow<()> {
        self.result.scan.scanned += 1;

        let Some(at) = message.utc_timestamp() else {
            self.result.scan.undated += 1;
            return ControlFlow::Continue(());
        };

        if !self.result.window.contains(at) {
            trace!(id = message.id, %at, "Reached the start of the window");
            self.result.scan.stopped_early = true;
            return ControlFlow::Break(());
        }

        match self.classifier.classify(message) {
            Classification::Accepted => {
                self.result.total_messages += 1;
                self.result.by_day.increment(at.date_naive());
                self.result.by_hour_received.increment(at.hour() as u8);
                if let Some(time) = extract_time(&message.text) {
                    self.result.by_hour_extracted.increment(time.hour());
                }
            }
            reason => {
                trace!(id = message.id, ?reason, "Message excluded from statistics");
                self.result.scan.rejected += 1;
            }
        }
        ControlFlow::Continue(())
    }

    fn finish(self) -> AggregationResult {
        let result = self.result;
        debug!(
            total = result.total_messages,
            parsed = result.parsed_messages_count(),
            active_days = result.by_day.len(),
            scanned = result.scan.scanned,
            rejected = result.scan.rejected,
            undated = result.scan.undated,
            stopped_early = result.scan.stopped_early,
            "Aggregation finished"
        );
        result
    }
}
