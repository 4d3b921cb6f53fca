//! Backend-independent description of a bar chart.

use plotters::style::RGBColor;

/// Gradient the bars are coloured with, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Cyan to magenta.
    Cool,
    /// Dark blue through magenta to yellow.
    Plasma,
    /// Dark purple through teal to yellow.
    Viridis,
}

const COOL_STOPS: &[(u8, u8, u8)] = &[(0, 255, 255), (255, 0, 255)];
const PLASMA_STOPS: &[(u8, u8, u8)] = &[
    (13, 8, 135),
    (126, 3, 168),
    (204, 71, 120),
    (248, 149, 64),
    (240, 249, 33),
];
const VIRIDIS_STOPS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

impl Palette {
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            Self::Cool => COOL_STOPS,
            Self::Plasma => PLASMA_STOPS,
            Self::Viridis => VIRIDIS_STOPS,
        }
    }

    /// Colour at position `t`, clamped to `0.0..=1.0`.
    pub fn color_at(self, t: f64) -> RGBColor {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let index = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - index as f64;

        let (r0, g0, b0) = stops[index];
        let (r1, g1, b1) = stops[index + 1];
        let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
        RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
    }

    /// One colour per bar, sampled at `i / max(count, 1)`.
    pub fn colors(self, count: usize) -> Vec<RGBColor> {
        let denominator = count.max(1) as f64;
        (0..count).map(|i| self.color_at(i as f64 / denominator)).collect()
    }
}

/// Stroke of a reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Continuous line.
    Solid,
    /// Evenly dashed line.
    Dashed,
}

/// A horizontal line across the whole plot with a legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    /// Y value the line is drawn at.
    pub value: f64,
    /// Legend text.
    pub label: String,
    /// Line colour.
    pub color: RGBColor,
    /// Stroke.
    pub style: LineStyle,
}

/// Direction of the category labels under the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOrientation {
    /// Read left to right.
    Horizontal,
    /// Rotated a quarter turn.
    Vertical,
}

/// One category of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Category label under the axis.
    pub label: String,
    /// Optional second label line.
    pub sublabel: Option<String>,
    /// Bar height.
    pub value: f64,
    /// Text drawn just above the bar.
    pub annotation: Option<String>,
}

impl Bar {
    /// Bar with a label and a height.
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            sublabel: None,
            value,
            annotation: None,
        }
    }

    /// Adds a second label line.
    pub fn with_sublabel(mut self, sublabel: impl Into<String>) -> Self {
        self.sublabel = Some(sublabel.into());
        self
    }

    /// Adds an annotation above the bar.
    pub fn with_annotation(mut self, annotation: Option<String>) -> Self {
        self.annotation = annotation;
        self
    }
}

/// Everything needed to draw one bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDescriptor {
    /// Caption above the plot.
    pub title: String,
    /// X axis description.
    pub x_desc: String,
    /// Y axis description.
    pub y_desc: String,
    /// Bars, left to right.
    pub bars: Vec<Bar>,
    /// Bar colouring.
    pub palette: Palette,
    /// Horizontal reference lines.
    pub reference_lines: Vec<ReferenceLine>,
    /// Category label direction.
    pub label_orientation: LabelOrientation,
    /// Large translucent text across the plot.
    pub watermark: Option<String>,
    /// Small text in the bottom-left corner.
    pub footnote: Option<String>,
    /// Image size in pixels.
    pub size: (u32, u32),
}

impl ChartDescriptor {
    /// Chart with a title and default layout.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_desc: String::new(),
            y_desc: String::new(),
            bars: Vec::new(),
            palette: Palette::Cool,
            reference_lines: Vec::new(),
            label_orientation: LabelOrientation::Vertical,
            watermark: None,
            footnote: None,
            size: (1200, 600),
        }
    }

    /// Sets both axis descriptions.
    pub fn with_axes(mut self, x_desc: impl Into<String>, y_desc: impl Into<String>) -> Self {
        self.x_desc = x_desc.into();
        self.y_desc = y_desc.into();
        self
    }

    /// Sets the bars.
    pub fn with_bars(mut self, bars: Vec<Bar>) -> Self {
        self.bars = bars;
        self
    }

    /// Sets the palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Appends a reference line.
    pub fn with_reference_line(mut self, line: ReferenceLine) -> Self {
        self.reference_lines.push(line);
        self
    }

    /// Sets the label orientation.
    pub fn with_orientation(mut self, orientation: LabelOrientation) -> Self {
        self.label_orientation = orientation;
        self
    }

    /// Sets the watermark.
    pub fn with_watermark(mut self, watermark: impl Into<String>) -> Self {
        self.watermark = Some(watermark.into());
        self
    }

    /// Sets the footnote.
    pub fn with_footnote(mut self, footnote: impl Into<String>) -> Self {
        self.footnote = Some(footnote.into());
        self
    }

    /// Sets the image size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Upper bound of the y axis: headroom over the tallest bar or line.
    pub fn y_max(&self) -> f64 {
        let tallest = self
            .bars
            .iter()
            .map(|bar| bar.value)
            .chain(self.reference_lines.iter().map(|line| line.value))
            .fold(0.0_f64, f64::max);
        (tallest * 1.15).max(1.0)
    }
}

/// Share of `count` in `denominator` as `p.p%`; `None` when it rounds to nothing.
pub fn percentage_annotation(count: u64, denominator: u64) -> Option<String> {
    if count == 0 || denominator == 0 {
        return None;
    }
    let percent = count as f64 / denominator as f64 * 100.0;
    Some(format!("{percent:.1}%"))
}
