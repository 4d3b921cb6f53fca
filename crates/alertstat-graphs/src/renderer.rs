//! Chart rendering trait and the plotters bitmap implementation

use alertstat_common::{AlertStatError, Result};
use async_trait::async_trait;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::chart::{ChartDescriptor, LabelOrientation, LineStyle};

/// Renders chart descriptors to image files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Renders `chart` as a PNG at `path` and returns the written path.
    async fn render(&self, chart: &ChartDescriptor, path: &Path) -> Result<PathBuf>;

    /// Gets the name of this renderer.
    fn name(&self) -> &'static str;
}

/// Bar chart renderer on the plotters bitmap backend.
#[derive(Debug, Clone)]
pub struct PlottersBarRenderer {
    font_family: String,
}

impl PlottersBarRenderer {
    /// Renderer using the system sans-serif font.
    pub fn new() -> Self {
        Self::with_font("sans-serif")
    }

    /// Renderer using a specific font family. It must cover Cyrillic.
    pub fn with_font(font_family: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
        }
    }

    /// Draws `chart` to `path` on the current thread.
    pub fn draw(&self, chart: &ChartDescriptor, path: &Path) -> Result<()> {
        let font = self.font_family.as_str();
        let (width, height) = chart.size;
        let root = BitMapBackend::new(path, chart.size).into_drawing_area();
        root.fill(&WHITE)?;

        // Category axis: one segment per bar, the range is inclusive
        let segments = chart.bars.len().max(1) as u32;
        let y_max = chart.y_max();
        let vertical = chart.label_orientation == LabelOrientation::Vertical;
        let has_sublabels = chart.bars.iter().any(|bar| bar.sublabel.is_some());

        let x_label_area = match (vertical, has_sublabels) {
            (true, _) => 90,
            (false, true) => 70,
            (false, false) => 50,
        };
        let bottom_margin = if chart.footnote.is_some() { 40 } else { 15 };

        let mut plot = ChartBuilder::on(&root)
            .caption(&chart.title, (font, 26))
            .margin(15)
            .margin_bottom(bottom_margin)
            .x_label_area_size(x_label_area)
            .y_label_area_size(70)
            .build_cartesian_2d((0u32..segments - 1).into_segmented(), 0f64..y_max)?;

        let labels: Vec<&str> = chart.bars.iter().map(|bar| bar.label.as_str()).collect();
        let label_formatter = |value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(index) | SegmentValue::Exact(index) => labels
                .get(*index as usize)
                .map(|label| (*label).to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        };
        let x_label_style = if vertical {
            (font, 13).into_font().transform(FontTransform::Rotate90)
        } else {
            (font, 13).into_font()
        };

        plot.configure_mesh()
            .disable_x_mesh()
            .light_line_style(WHITE)
            .bold_line_style(BLACK.mix(0.15))
            .x_labels(chart.bars.len().max(1))
            .x_label_formatter(&label_formatter)
            .x_label_style(x_label_style)
            .y_label_formatter(&|v| format!("{v:.0}"))
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .axis_desc_style((font, 16))
            .draw()?;

        let colors = chart.palette.colors(chart.bars.len());
        plot.draw_series(
            Histogram::vertical(&plot)
                .margin(3)
                .style_func(move |segment, _value| {
                    let index = match segment {
                        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i as usize,
                        SegmentValue::Last => 0,
                    };
                    colors.get(index).copied().unwrap_or(BLUE).filled()
                })
                .data(
                    chart
                        .bars
                        .iter()
                        .enumerate()
                        .map(|(index, bar)| (index as u32, bar.value)),
                ),
        )?;

        for line in &chart.reference_lines {
            let color = line.color;
            let style = color.stroke_width(2);
            let endpoints = vec![(SegmentValue::Exact(0), line.value), (SegmentValue::Last, line.value)];
            let anno = match line.style {
                LineStyle::Solid => plot.draw_series(LineSeries::new(endpoints, style))?,
                LineStyle::Dashed => plot.draw_series(DashedLineSeries::new(endpoints, 12, 6, style))?,
            };
            anno.label(line.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(2)));
        }

        let annotation_style = (font, 12).into_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Bottom));
        plot.draw_series(chart.bars.iter().enumerate().filter_map(|(index, bar)| {
            bar.annotation.as_ref().map(|text| {
                Text::new(
                    text.clone(),
                    (SegmentValue::CenterOf(index as u32), bar.value),
                    annotation_style.clone(),
                )
            })
        }))?;

        if !chart.reference_lines.is_empty() {
            plot.configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK.mix(0.4))
                .label_font((font, 14))
                .draw()?;
        }

        let sublabel_style = (font, 13).into_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Top));
        for (index, bar) in chart.bars.iter().enumerate() {
            if let Some(sublabel) = &bar.sublabel {
                let (x, y) = plot.backend_coord(&(SegmentValue::CenterOf(index as u32), 0.0));
                root.draw(&Text::new(sublabel.as_str(), (x, y + 28), sublabel_style.clone()))?;
            }
        }

        if let Some(watermark) = &chart.watermark {
            let style = (font, 60)
                .into_font()
                .color(&RGBColor(128, 128, 128).mix(0.2))
                .pos(Pos::new(HPos::Center, VPos::Center));
            root.draw(&Text::new(
                watermark.as_str(),
                (width as i32 / 2, height as i32 / 2),
                style,
            ))?;
        }

        if let Some(footnote) = &chart.footnote {
            let style = (font, 14)
                .into_font()
                .color(&BLACK.mix(0.4))
                .pos(Pos::new(HPos::Left, VPos::Bottom));
            root.draw(&Text::new(footnote.as_str(), (width as i32 / 20, height as i32 - 6), style))?;
        }

        root.present()?;
        debug!(path = %path.display(), bars = chart.bars.len(), "Chart drawn");
        Ok(())
    }
}

impl Default for PlottersBarRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChartRenderer for PlottersBarRenderer {
    async fn render(&self, chart: &ChartDescriptor, path: &Path) -> Result<PathBuf> {
        let renderer = self.clone();
        let chart = chart.clone();
        let path = path.to_path_buf();

        let written = tokio::task::spawn_blocking(move || {
            renderer.draw(&chart, &path)?;
            Ok::<_, AlertStatError>(path)
        })
        .await
        .map_err(|e| AlertStatError::graph(format!("Render task failed: {e}")))??;

        info!("Successfully rendered chart to {}", written.display());
        Ok(written)
    }

    fn name(&self) -> &'static str {
        "plotters_bar"
    }
}
