//! Integration tests for alertstat-telegram crate.

use alertstat_common::test_utils::mock_timestamp;
use alertstat_common::{AlertStatError, ChatRef, MediaKind, Message};
use alertstat_telegram::*;
use futures::StreamExt;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio_test::assert_ok;

const EXPORT: &str = r#"{
    "name": "Водоканал",
    "type": "public_channel",
    "id": 1234567890,
    "messages": [
        {"id": 1, "type": "service", "date": "2024-05-01T08:00:00", "date_unixtime": "1714550400", "action": "create_channel", "text": ""},
        {"id": 2, "type": "message", "date": "2024-05-06T12:00:00", "date_unixtime": "1714996800", "text": "Отключение до 17-00"},
        {"id": 3, "type": "message", "date": "2024-05-07T12:00:00", "date_unixtime": "1715083200", "forwarded_from": "Мэрия", "text": "Переслано"},
        {"id": 4, "type": "message", "date": "2024-05-08T12:00:00", "date_unixtime": "1715169600", "photo": "photos/photo_4.jpg",
         "text": [{"type": "bold", "text": "Аварийные работы"}, ", до 18ч"]}
    ]
}"#;

fn write_export(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[tokio::test]
async fn test_export_yields_messages_newest_first() {
    let (_dir, path) = write_export(EXPORT);
    let source = ExportFileSource::new(&path);

    let history = assert_ok!(source.open(&ChatRef::new("-1001234567890")).await);
    assert_eq!(history.title, "Водоканал");

    let messages: Vec<Message> = history.messages.collect().await;
    let ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![4, 3, 2]);

    assert_eq!(messages[0].utc_timestamp(), Some(mock_timestamp(2024, 5, 8, 12, 0, 0)));
    assert_eq!(messages[0].text, "Аварийные работы, до 18ч");
    assert_eq!(messages[0].media, Some(MediaKind::Photo));
    assert!(messages[1].is_forwarded);
    assert!(messages
        .windows(2)
        .all(|pair| pair[0].utc_timestamp() >= pair[1].utc_timestamp()));
}

#[tokio::test]
async fn test_export_accepts_channel_by_username() {
    let (_dir, path) = write_export(EXPORT);
    let history = ExportFileSource::new(&path)
        .open(&ChatRef::new("@vodokanal"))
        .await
        .unwrap();
    assert_eq!(history.messages.count().await, 3);
}

#[tokio::test]
async fn test_export_of_another_channel_is_rejected() {
    let (_dir, path) = write_export(EXPORT);
    let result = ExportFileSource::new(&path)
        .open(&ChatRef::new("-1009999999999"))
        .await;
    assert!(matches!(result, Err(AlertStatError::Source { .. })));
}

#[tokio::test]
async fn test_missing_or_malformed_export_is_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = ExportFileSource::new(dir.path().join("result.json"))
        .open(&ChatRef::new("@vodokanal"))
        .await;
    assert!(matches!(missing, Err(AlertStatError::Source { .. })));

    let (_dir, path) = write_export("{ not json");
    let malformed = ExportFileSource::new(&path).open(&ChatRef::new("@vodokanal")).await;
    assert!(matches!(malformed, Err(AlertStatError::Source { .. })));
}

#[tokio::test]
async fn test_outbox_is_a_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("stat.png");
    std::fs::write(&image, b"png").unwrap();

    let delivery: Box<dyn Delivery> = Box::new(OutboxDelivery::new(dir.path().join("outbox"), false));
    let receipt = delivery
        .send(&ChatRef::new("@reports"), &[image], "caption")
        .await
        .unwrap();

    assert_eq!(delivery.name(), "outbox");
    assert!(matches!(receipt, DeliveryReceipt::Queued { .. }));
}
