//! Integration tests for alertstat-bot crate.
//!
//! Runs the report pipeline end to end: a channel export on disk, real chart
//! rendering, and the outbox transport.

use alertstat_bot::*;
use alertstat_common::test_utils::{init_test_logging, mock_timestamp};
use alertstat_common::ChatRef;
use alertstat_config::Config;
use alertstat_telegram::{DeliveryReceipt, OutboxManifest, CAPTION_FILE, MANIFEST_FILE};
use std::path::Path;
use tokio_test::{assert_err, assert_ok};

fn export_json() -> String {
    let posts = [
        (1, 1_715_086_800, "Аварийные работы, отключение до 17-00", false),
        (2, 1_715_094_000, "Переслано из мэрии", true),
        (3, 1_715_180_400, "Работы продлены до 21:30", false),
        (4, 1_715_266_800, "Отключение до 18ч", false),
        (5, 1_715_270_400, "Статистика за неделю #статистика", false),
        (6, 1_715_353_200, "Вода подана", false),
    ];
    let messages: Vec<serde_json::Value> = posts
        .iter()
        .map(|(id, unix, text, forwarded)| {
            let mut message = serde_json::json!({
                "id": id,
                "type": "message",
                "date_unixtime": unix.to_string(),
                "text": text,
            });
            if *forwarded {
                message["forwarded_from"] = serde_json::json!("Мэрия");
            }
            message
        })
        .collect();

    serde_json::json!({
        "name": "Водоканал",
        "type": "public_channel",
        "id": 1234567890,
        "messages": messages,
    })
    .to_string()
}

fn config(root: &Path) -> Config {
    let history = root.join("export").join("result.json");
    std::fs::create_dir_all(history.parent().unwrap()).unwrap();
    std::fs::write(&history, export_json()).unwrap();

    let mut config = Config::default();
    config.telegram.channel = ChatRef::new("-1001234567890");
    config.telegram.send_to = Some(ChatRef::new("@reports"));
    config.telegram.history_path = history;
    config.report.data_dir = root.join("data");
    std::fs::create_dir_all(&config.report.data_dir).unwrap();
    config
}

#[tokio::test]
async fn test_weekly_report_lands_in_outbox() {
    init_test_logging();
    let root = tempfile::tempdir().unwrap();
    let config = config(root.path());
    let app = App::build(&config).unwrap();

    let outcome = assert_ok!(
        app.runner
            .run(ReportKind::Weekly, mock_timestamp(2024, 5, 11, 12, 0, 0))
            .await
    );

    assert_eq!(outcome.window_days, 7);
    assert_eq!(outcome.total_messages, 4);
    assert_eq!(outcome.files, 3);

    let DeliveryReceipt::Queued { dir } = outcome.receipt else {
        panic!("expected the outbox transport without a bot token");
    };
    assert!(dir.starts_with(config.outbox_dir()));

    let manifest: OutboxManifest = serde_json::from_slice(&std::fs::read(dir.join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(manifest.destination, ChatRef::new("@reports"));
    assert_eq!(
        manifest.files,
        vec!["stat.png", "stat_by_hour.png", "stat_by_parsed_hour.png"]
    );
    for file in &manifest.files {
        assert!(std::fs::metadata(dir.join(file)).unwrap().len() > 0);
    }

    let caption = std::fs::read_to_string(dir.join(CAPTION_FILE)).unwrap();
    assert!(caption.ends_with("#статистика"));
}

#[tokio::test]
async fn test_missing_export_fails_without_delivery() {
    let root = tempfile::tempdir().unwrap();
    let mut config = config(root.path());
    config.telegram.history_path = root.path().join("missing.json");
    let app = App::build(&config).unwrap();

    let result = app.runner.run(ReportKind::Monthly, mock_timestamp(2024, 6, 1, 0, 0, 0)).await;
    assert_err!(result);
    assert!(!config.outbox_dir().exists());

    app.runner.run_logged(ReportKind::Monthly).await;
}

#[tokio::test]
async fn test_scheduler_accepts_configured_crons() {
    let config = Config::default();
    let scheduler = SchedulerService::new().await.unwrap();

    for (name, cron) in [("weekly", &config.report.weekly_cron), ("monthly", &config.report.monthly_cron)] {
        scheduler.add_job(name, cron.as_str(), None, || async {}).await.unwrap();
    }

    assert_eq!(scheduler.list_jobs().await.len(), 2);
}
