//! Mean and median over the daily counts.
//!
//! Only active days take part: a day without accepted messages never enters
//! the day table, so a quiet week reports the average of its busy days.

use alertstat_i18n::plural_days;
use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregator::{AggregationResult, FrequencyTable};

/// Summary statistics of one report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailySummary {
    /// Mean accepted messages per active day.
    pub mean: f64,
    /// Median accepted messages per active day.
    pub median: f64,
    /// Days with at least one accepted message.
    pub active_days: usize,
    /// Accepted messages.
    pub total: u64,
}

/// Mean and median of the day table, `(0.0, 0.0)` when empty.
pub fn summarize(by_day: &FrequencyTable<NaiveDate>) -> (f64, f64) {
    let mut counts: Vec<u64> = by_day.values().collect();
    if counts.is_empty() {
        return (0.0, 0.0);
    }
    counts.sort_unstable();

    let len = counts.len();
    let mean = counts.iter().sum::<u64>() as f64 / len as f64;
    let median = if len % 2 == 0 {
        (counts[len / 2 - 1] + counts[len / 2]) as f64 / 2.0
    } else {
        counts[len / 2] as f64
    };
    (mean, median)
}

/// Derives the caption-level statistics of an aggregation.
#[derive(Debug, Default)]
pub struct SummaryComputer;

impl SummaryComputer {
    /// Summarizes an aggregation result.
    pub fn compute(result: &AggregationResult) -> DailySummary {
        let (mean, median) = summarize(&result.by_day);
        DailySummary {
            mean,
            median,
            active_days: result.by_day.len(),
            total: result.total_messages,
        }
    }

    /// The word "day" declined for `days`.
    pub fn day_unit(days: i64) -> &'static str {
        plural_days(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(counts: &[u64]) -> FrequencyTable<NaiveDate> {
        let mut table = FrequencyTable::new();
        let first = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        for (offset, count) in counts.iter().enumerate() {
            let day = first + chrono::Duration::days(offset as i64);
            for _ in 0..*count {
                table.increment(day);
            }
        }
        table
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(summarize(&FrequencyTable::new()), (0.0, 0.0));
    }

    #[test]
    fn test_odd_count() {
        assert_eq!(summarize(&table(&[5, 1, 3])), (3.0, 3.0));
    }

    #[test]
    fn test_even_count_averages_middle_pair() {
        let (mean, median) = summarize(&table(&[1, 2, 4, 10]));
        assert_eq!(mean, 4.25);
        assert_eq!(median, 3.0);
    }

    #[test]
    fn test_single_day() {
        assert_eq!(summarize(&table(&[7])), (7.0, 7.0));
    }

    #[test]
    fn test_day_unit() {
        assert_eq!(SummaryComputer::day_unit(7), "дней");
        assert_eq!(SummaryComputer::day_unit(31), "день");
        assert_eq!(SummaryComputer::day_unit(29), "дней");
        assert_eq!(SummaryComputer::day_unit(30), "дней");
        assert_eq!(SummaryComputer::day_unit(2), "дня");
    }
}
