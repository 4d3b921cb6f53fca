//! Turns an aggregation into the three report charts and their caption.

use alertstat_common::Result;
use alertstat_i18n::Messages;
use alertstat_stats::{AggregationResult, FrequencyTable, SummaryComputer, STATISTICS_TAG};
use chrono::Datelike;
use plotters::style::{GREEN, RED};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::chart::{
    percentage_annotation, Bar, ChartDescriptor, LabelOrientation, LineStyle, Palette, ReferenceLine,
};
use crate::renderer::ChartRenderer;

/// File name of the per-day chart.
pub const DAILY_CHART_FILE: &str = "stat.png";
/// File name of the hour-received chart.
pub const HOURLY_CHART_FILE: &str = "stat_by_hour.png";
/// File name of the hour-extracted chart.
pub const EXTRACTED_CHART_FILE: &str = "stat_by_parsed_hour.png";

/// Window length that switches the daily chart to weekday labels.
const WEEKLY_WINDOW_DAYS: u32 = 7;

/// A chart together with the file it is rendered to.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportChart {
    /// File name inside the output directory.
    pub file_name: &'static str,
    /// What to draw.
    pub chart: ChartDescriptor,
}

/// The report before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Charts in delivery order.
    pub charts: Vec<ReportChart>,
    /// Caption of the album.
    pub caption: String,
}

/// The report after rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Written image files in delivery order.
    pub files: Vec<PathBuf>,
    /// Caption of the album.
    pub caption: String,
}

/// Builds report charts and caption from an aggregation.
pub struct ReportAssembler {
    renderer: Arc<dyn ChartRenderer>,
    messages: Messages,
    output_dir: PathBuf,
}

impl std::fmt::Debug for ReportAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportAssembler")
            .field("renderer", &self.renderer.name())
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl ReportAssembler {
    /// Creates an assembler writing into `output_dir`.
    pub fn new(renderer: Arc<dyn ChartRenderer>, messages: Messages, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            messages,
            output_dir: output_dir.into(),
        }
    }

    /// Directory the charts are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Builds chart descriptors and caption without touching the disk.
    pub fn assemble(&self, result: &AggregationResult, window_days: u32) -> Result<Report> {
        let charts = vec![
            ReportChart {
                file_name: DAILY_CHART_FILE,
                chart: self.daily_chart(result, window_days)?,
            },
            ReportChart {
                file_name: HOURLY_CHART_FILE,
                chart: self.hourly_chart(result, window_days)?,
            },
            ReportChart {
                file_name: EXTRACTED_CHART_FILE,
                chart: self.extracted_chart(result, window_days)?,
            },
        ];
        let caption = self.caption(result, window_days)?;
        Ok(Report { charts, caption })
    }

    /// Assembles and renders the report.
    pub async fn render(&self, result: &AggregationResult, window_days: u32) -> Result<RenderedReport> {
        let report = self.assemble(result, window_days)?;
        let mut files = Vec::with_capacity(report.charts.len());
        for item in &report.charts {
            let path = self.output_dir.join(item.file_name);
            debug!(renderer = self.renderer.name(), path = %path.display(), "Rendering chart");
            files.push(self.renderer.render(&item.chart, &path).await?);
        }
        info!(files = files.len(), window_days, "Report rendered");
        Ok(RenderedReport {
            files,
            caption: report.caption,
        })
    }

    /// Caption with the trailing statistics tag.
    pub fn caption(&self, result: &AggregationResult, window_days: u32) -> Result<String> {
        let summary = SummaryComputer::compute(result);
        let body = self
            .messages
            .report_caption(window_days, summary.mean, summary.median, summary.total)?;
        Ok(format!("{body}\n\n{STATISTICS_TAG}"))
    }

    fn daily_chart(&self, result: &AggregationResult, window_days: u32) -> Result<ChartDescriptor> {
        let weekly = window_days == WEEKLY_WINDOW_DAYS;
        let mut bars = Vec::with_capacity(result.by_day.len());
        for (date, count) in result.by_day.iter() {
            let bar = Bar::new(date.format("%d.%m.%y").to_string(), count as f64);
            bars.push(if weekly {
                bar.with_sublabel(self.messages.weekday(date.weekday())?)
            } else {
                bar
            });
        }

        let mut chart = ChartDescriptor::new(self.messages.daily_title(window_days)?)
            .with_axes(self.messages.get("chart-daily-x")?, self.messages.get("chart-count-y")?)
            .with_bars(bars)
            .with_palette(Palette::Cool)
            .with_orientation(if weekly {
                LabelOrientation::Horizontal
            } else {
                LabelOrientation::Vertical
            })
            .with_size(1600, 600);

        if !result.by_day.is_empty() {
            let summary = SummaryComputer::compute(result);
            chart = chart
                .with_reference_line(ReferenceLine {
                    value: summary.mean,
                    label: self.messages.legend_mean(summary.mean)?,
                    color: RED,
                    style: LineStyle::Dashed,
                })
                .with_reference_line(ReferenceLine {
                    value: summary.median,
                    label: self.messages.legend_median(summary.median)?,
                    color: GREEN,
                    style: LineStyle::Solid,
                });
        }
        Ok(chart)
    }

    fn hourly_chart(&self, result: &AggregationResult, window_days: u32) -> Result<ChartDescriptor> {
        Ok(ChartDescriptor::new(self.messages.hourly_title(window_days)?)
            .with_axes(self.messages.get("chart-hourly-x")?, self.messages.get("chart-count-y")?)
            .with_bars(hour_bars(&result.by_hour_received, result.total_messages))
            .with_palette(Palette::Plasma))
    }

    fn extracted_chart(&self, result: &AggregationResult, window_days: u32) -> Result<ChartDescriptor> {
        Ok(ChartDescriptor::new(self.messages.extracted_title(window_days)?)
            .with_axes(self.messages.get("chart-extracted-x")?, self.messages.get("chart-count-y")?)
            .with_bars(hour_bars(
                &result.by_hour_extracted,
                result.parsed_messages_count(),
            ))
            .with_palette(Palette::Viridis)
            .with_watermark(self.messages.get("chart-extracted-watermark")?)
            .with_footnote(self.messages.get("chart-extracted-footnote")?))
    }
}

/// 24 bars labelled `HH:00` annotated with their share of `denominator`.
fn hour_bars(table: &FrequencyTable<u8>, denominator: u64) -> Vec<Bar> {
    table
        .dense_hours()
        .iter()
        .enumerate()
        .map(|(hour, &count)| {
            Bar::new(format!("{hour:02}:00"), count as f64)
                .with_annotation(percentage_annotation(count, denominator))
        })
        .collect()
}
