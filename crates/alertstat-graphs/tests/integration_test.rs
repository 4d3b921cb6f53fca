//! Integration tests for alertstat-graphs crate.
//!
//! These tests drive the full aggregation-to-report path with the real
//! plotters renderer writing into a temporary directory.

use alertstat_common::test_utils::{init_test_logging, message_fixtures::*, mock_timestamp};
use alertstat_common::{Message, Result};
use alertstat_graphs::*;
use alertstat_i18n::Messages;
use alertstat_stats::{Aggregator, MessageClassifier};
use async_trait::async_trait;
use chrono::Duration;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// Records the charts it is asked to draw instead of drawing them.
#[derive(Default)]
struct RecordingRenderer {
    charts: Mutex<Vec<(String, ChartDescriptor)>>,
}

#[async_trait]
impl ChartRenderer for RecordingRenderer {
    async fn render(&self, chart: &ChartDescriptor, path: &Path) -> Result<PathBuf> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.charts.lock().unwrap().push((name, chart.clone()));
        Ok(path.to_path_buf())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

fn week_of_messages() -> (Vec<Message>, chrono::DateTime<chrono::Utc>) {
    let now = mock_timestamp(2024, 5, 13, 0, 0, 0);
    let texts = outage_texts();
    let messages = (0..30)
        .map(|i| {
            let at = now - Duration::hours(5 * i + 1);
            text_message(100 - i, at, texts[i as usize % texts.len()])
        })
        .collect();
    (messages, now)
}

#[tokio::test]
async fn test_weekly_report_renders_three_pngs() {
    init_test_logging();
    let dir = tempdir().unwrap();
    let (messages, now) = week_of_messages();
    let result = Aggregator::default().aggregate(messages, 7, now);

    let assembler = ReportAssembler::new(
        Arc::new(PlottersBarRenderer::new()),
        Messages::russian().unwrap(),
        dir.path(),
    );
    let report = assembler.render(&result, 7).await.unwrap();

    assert_eq!(report.files.len(), 3);
    for (file, expected) in report.files.iter().zip([DAILY_CHART_FILE, HOURLY_CHART_FILE, EXTRACTED_CHART_FILE]) {
        assert_eq!(file, &dir.path().join(expected));
        assert!(file.exists(), "{} was not written", file.display());
    }
}

#[tokio::test]
async fn test_percentages_use_distinct_denominators() {
    let now = mock_timestamp(2024, 5, 8, 12, 0, 0);
    let messages = vec![
        text_message(4, mock_timestamp(2024, 5, 8, 9, 0, 0), "до 17-00"),
        text_message(3, mock_timestamp(2024, 5, 7, 9, 0, 0), "Работы завершены"),
        text_message(2, mock_timestamp(2024, 5, 7, 10, 0, 0), "Работы завершены"),
        text_message(1, mock_timestamp(2024, 5, 6, 10, 0, 0), "Работы завершены"),
    ];
    let result = Aggregator::default().aggregate(messages, 7, now);

    let renderer = Arc::new(RecordingRenderer::default());
    let assembler = ReportAssembler::new(renderer.clone(), Messages::russian().unwrap(), "out");
    assembler.render(&result, 7).await.unwrap();

    let charts = renderer.charts.lock().unwrap();
    let names: Vec<&str> = charts.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["stat.png", "stat_by_hour.png", "stat_by_parsed_hour.png"]);

    let hourly = &charts[1].1;
    assert_eq!(hourly.bars[9].annotation.as_deref(), Some("50.0%"));
    assert_eq!(hourly.bars[10].annotation.as_deref(), Some("50.0%"));

    let extracted = &charts[2].1;
    assert_eq!(extracted.bars[17].annotation.as_deref(), Some("100.0%"));
    assert_eq!(extracted.watermark.as_deref(), Some("Приблизительные данные!*"));
    assert!(extracted.footnote.is_some());
}

#[test]
fn test_caption_text_and_self_exclusion() {
    let now = mock_timestamp(2024, 5, 8, 12, 0, 0);
    let messages = vec![
        text_message(3, mock_timestamp(2024, 5, 8, 9, 0, 0), "до 17-00"),
        text_message(2, mock_timestamp(2024, 5, 8, 10, 0, 0), "до 18ч"),
        text_message(1, mock_timestamp(2024, 5, 7, 9, 0, 0), "Работы"),
    ];
    let result = Aggregator::default().aggregate(messages, 7, now);
    let assembler = ReportAssembler::new(
        Arc::new(RecordingRenderer::default()),
        Messages::russian().unwrap(),
        "out",
    );

    let caption = assembler.caption(&result, 7).unwrap();
    assert_eq!(
        caption,
        "Статистика за 7 дней\n\
         Среднее количество оповещений в день: 1.50\n\
         Медиана: 1.50\n\
         Всего оповещений: 3\n\
         \n\
         #статистика"
    );

    let republished = text_message(10, now, &caption);
    assert!(!MessageClassifier::new().accepts(&republished));
}

#[test]
fn test_empty_aggregation_has_no_reference_lines() {
    let now = mock_timestamp(2024, 5, 8, 12, 0, 0);
    let result = Aggregator::default().aggregate(Vec::new(), 31, now);
    let assembler = ReportAssembler::new(
        Arc::new(RecordingRenderer::default()),
        Messages::russian().unwrap(),
        "out",
    );

    let report = assembler.assemble(&result, 31).unwrap();

    assert!(report.charts[0].chart.bars.is_empty());
    assert!(report.charts[0].chart.reference_lines.is_empty());
    assert!(report.charts[1].chart.bars.iter().all(|bar| bar.annotation.is_none()));
    assert!(report.caption.starts_with("Статистика за 31 день\n"));
    assert!(report.caption.contains("Среднее количество оповещений в день: 0.00"));
}
