//! Integration tests for the shared message model and chat references.

use alertstat_common::{ChatRef, MediaKind, Message, MessageTimestamp};
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

#[test]
fn test_naive_and_aware_timestamps_agree_on_utc() {
    let naive = NaiveDate::from_ymd_opt(2024, 12, 31)
        .unwrap()
        .and_hms_opt(21, 0, 0)
        .unwrap();
    let aware = FixedOffset::east_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .unwrap();

    assert_eq!(
        MessageTimestamp::Naive(naive).to_utc(),
        MessageTimestamp::Aware(aware).to_utc()
    );
}

#[test]
fn test_message_without_timestamp() {
    let msg = Message {
        id: 1,
        timestamp: None,
        text: "текст".to_string(),
        is_forwarded: false,
        media: Some(MediaKind::Document),
    };
    assert_eq!(msg.utc_timestamp(), None);
    assert!(msg.has_media());
}

#[test]
fn test_chat_ref_serde_is_transparent() {
    let chat = ChatRef::new("@channel");
    let json = serde_json::to_string(&chat).unwrap();
    assert_eq!(json, "\"@channel\"");
    let back: ChatRef = serde_json::from_str(&json).unwrap();
    assert_eq!(back, chat);
}

#[test]
fn test_utc_timestamp_roundtrip() {
    let ts = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    let msg = Message::new(1, ts, "leap day");
    assert_eq!(msg.utc_timestamp(), Some(ts));
}

proptest! {
    #[test]
    fn test_property_numeric_chat_ref_matches_own_id(id in any::<i64>()) {
        let chat = ChatRef::new(id.to_string());
        prop_assert_eq!(chat.numeric_id(), Some(id));
        prop_assert!(chat.matches(id, None));
        prop_assert!(chat.username().is_none());
    }

    #[test]
    fn test_property_username_match_is_case_insensitive(name in "[a-zA-Z][a-zA-Z0-9_]{4,31}") {
        let chat = ChatRef::new(format!("@{name}"));
        let lowered = name.to_lowercase();
        prop_assert!(chat.matches(0, Some(lowered.as_str())));
    }
}
