//! One report run: scan the channel, aggregate, render and deliver.

use alertstat_common::ChatRef;
use alertstat_graphs::ReportAssembler;
use alertstat_stats::Aggregator;
use alertstat_telegram::{Delivery, DeliveryReceipt, MessageSource};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, info_span, Instrument};

use crate::error::{BotError, BotResult};

/// Which report to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// The last seven days.
    Weekly,
    /// The previous calendar month's length in days.
    Monthly,
}

impl ReportKind {
    /// Short name used for jobs and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Lookback window for a run on `today`.
    pub fn window_days(self, today: NaiveDate) -> u32 {
        match self {
            Self::Weekly => 7,
            Self::Monthly => days_in_previous_month(today),
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of days in the calendar month before `date`'s month.
pub fn days_in_previous_month(date: NaiveDate) -> u32 {
    date.with_day(1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Summary of a delivered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    /// Window the report covered.
    pub window_days: u32,
    /// Messages counted.
    pub total_messages: u64,
    /// Charts delivered.
    pub files: usize,
    /// What the transport returned.
    pub receipt: DeliveryReceipt,
}

/// Runs reports one at a time.
pub struct ReportRunner {
    source: Arc<dyn MessageSource>,
    delivery: Arc<dyn Delivery>,
    assembler: Arc<ReportAssembler>,
    aggregator: Aggregator,
    channel: ChatRef,
    destination: ChatRef,
    timeout: Duration,
    running: Mutex<()>,
}

impl std::fmt::Debug for ReportRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportRunner")
            .field("source", &self.source.name())
            .field("delivery", &self.delivery.name())
            .field("channel", &self.channel)
            .field("destination", &self.destination)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ReportRunner {
    /// Creates a runner scanning `channel` and delivering to `destination`.
    pub fn new(
        source: Arc<dyn MessageSource>,
        delivery: Arc<dyn Delivery>,
        assembler: Arc<ReportAssembler>,
        channel: ChatRef,
        destination: ChatRef,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            delivery,
            assembler,
            aggregator: Aggregator::default(),
            channel,
            destination,
            timeout,
            running: Mutex::new(()),
        }
    }

    /// Runs one report as of `now`. Overlapping calls wait for each other.
    pub async fn run(&self, kind: ReportKind, now: DateTime<Utc>) -> BotResult<ReportOutcome> {
        self.run_with_clock(kind, move || now).await
    }

    /// Runs one report, reading `clock` once the previous run has finished.
    pub async fn run_with_clock<C>(&self, kind: ReportKind, clock: C) -> BotResult<ReportOutcome>
    where
        C: FnOnce() -> DateTime<Utc>,
    {
        let _guard = self.running.lock().await;
        let now = clock();
        let window_days = kind.window_days(now.date_naive());
        let span = info_span!("report", kind = kind.name(), window_days);

        async move {
            info!(channel = %self.channel, %now, "Report started");

            let history = self.bounded("source", self.source.open(&self.channel)).await??;
            let result = self
                .aggregator
                .aggregate_stream(history.messages, window_days, now)
                .await;
            info!(
                title = %history.title,
                total = result.total_messages,
                scanned = result.scan.scanned,
                "Channel scanned"
            );

            let rendered = self.assembler.render(&result, window_days).await?;
            let receipt = self
                .bounded(
                    "delivery",
                    self.delivery
                        .send(&self.destination, &rendered.files, &rendered.caption),
                )
                .await??;

            info!(destination = %self.destination, transport = self.delivery.name(), "Report finished");
            Ok(ReportOutcome {
                window_days,
                total_messages: result.total_messages,
                files: rendered.files.len(),
                receipt,
            })
        }
        .instrument(span)
        .await
    }

    /// Runs one report now and logs a failure instead of returning it.
    pub async fn run_logged(&self, kind: ReportKind) {
        if let Err(e) = self.run_with_clock(kind, Utc::now).await {
            error!(
                %kind,
                status = ?e.status_code(),
                error = %e,
                "Report job failed; waiting for the next trigger"
            );
        }
    }

    async fn bounded<F: Future>(&self, step: &'static str, fut: F) -> BotResult<F::Output> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| BotError::Timeout {
                step,
                seconds: self.timeout.as_secs(),
            })
    }
}
