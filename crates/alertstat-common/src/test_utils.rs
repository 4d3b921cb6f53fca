//! Test utilities and shared test helpers for alertstat.
//!
//! Fixtures for building channel messages and timestamps, shared by the unit
//! and integration tests of every crate in the workspace.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{MediaKind, Message};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call multiple times.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Test fixture for creating a mock timestamp.
pub fn mock_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Message fixtures in the shape the statistics pipeline consumes.
pub mod message_fixtures {
    use super::*;

    /// A plain text message posted at `at`.
    pub fn text_message(id: i64, at: DateTime<Utc>, text: &str) -> Message {
        Message::new(id, at, text)
    }

    /// A message without any timestamp.
    pub fn undated_message(id: i64, text: &str) -> Message {
        Message {
            id,
            timestamp: None,
            text: text.to_string(),
            is_forwarded: false,
            media: None,
        }
    }

    /// A photo post with a caption.
    pub fn photo_message(id: i64, at: DateTime<Utc>, caption: &str) -> Message {
        Message::new(id, at, caption).with_media(MediaKind::Photo)
    }

    /// `count` messages spaced `step` apart going backwards from `newest`,
    /// ordered newest first the way a channel history yields them.
    pub fn descending_series(
        count: usize,
        newest: DateTime<Utc>,
        step: Duration,
        text: &str,
    ) -> Vec<Message> {
        (0..count)
            .map(|i| {
                let offset = step * i32::try_from(i).unwrap_or(i32::MAX);
                Message::new(i as i64 + 1, newest - offset, text)
            })
            .collect()
    }

    /// Typical outage announcements as posted in the channel.
    pub fn outage_texts() -> Vec<&'static str> {
        vec![
            "Аварийные работы на ул. Ленина, отключение до 17-00",
            "Плановые работы, водоснабжение восстановят к 23:00",
            "Отключение холодной воды до 18ч",
            "Работы продлены до 9 ч",
            "Уважаемые абоненты, работы завершены",
        ]
    }
}
