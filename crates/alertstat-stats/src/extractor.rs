//! Extraction of an announced time of day from free text.
//!
//! Outage posts announce when work is expected to finish in loose formats:
//! "до 17-00", "17 - 00", "к 23:00", "до 18ч", "9 ч". Two patterns are tried
//! in priority order and only the first match of the winning pattern counts.
//! The result is approximate and the reports say so.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hour and minute separated by `-` or `:`, e.g. "17-00", "17 - 00", "23:00".
// ASCII digits only; `\d` would also accept non-Latin decimal digits.
static TIME_RANGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{1,2})\s*[-:]\s*([0-9]{2})").expect("valid time range regex"));

/// Hour followed by the Cyrillic hour marker, e.g. "17ч", "9 Ч".
static HOUR_ONLY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]{1,2})\s*ч\b").expect("valid hour marker regex"));

/// A time of day: hour in 0..=23, minute in 0..=59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Creates a time of day, rejecting out-of-range components.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Hour, 0..=23.
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute, 0..=59.
    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Extracts the announced time of day from `text`.
///
/// An out-of-range match of the hour-minute pattern fails the extraction
/// outright; it is not reinterpreted through the hour-only pattern.
pub fn extract_time(text: &str) -> Option<TimeOfDay> {
    if let Some(captures) = TIME_RANGE_PATTERN.captures(text) {
        let hour = captures[1].parse().ok()?;
        let minute = captures[2].parse().ok()?;
        return TimeOfDay::new(hour, minute);
    }

    if let Some(captures) = HOUR_ONLY_PATTERN.captures(text) {
        let hour = captures[1].parse().ok()?;
        return TimeOfDay::new(hour, 0);
    }

    None
}
