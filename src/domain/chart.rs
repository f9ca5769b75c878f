// Chart series domain models
use super::banding::Zone;
use super::color::{Rgb, Rgba};
use super::reading::Loop;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    /// Solid series colors, threshold lines and background bands
    #[default]
    Standard,
    /// One vertical color ramp for both loops, no thresholds or bands
    Gradient,
}

impl PresentationMode {
    pub fn banding_enabled(self) -> bool {
        matches!(self, PresentationMode::Standard)
    }

    pub fn shows_thresholds(self) -> bool {
        matches!(self, PresentationMode::Standard)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStop {
    /// 0.0 is the top of the drawable area, 1.0 the bottom
    pub offset: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stroke {
    Solid { color: Rgb },
    VerticalGradient { stops: Vec<GradientStop> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub label: String,
    pub data: Vec<f64>,
    pub stroke: Stroke,
    pub border_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_dash: Option<[u32; 2]>,
    pub point_radius: f64,
    pub tension: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub series: Vec<SeriesData>,
    pub y_min: f64,
    pub y_max: f64,
    pub tick_step: f64,
    pub banding: bool,
}

impl ChartSeries {
    /// No readings in range; the presentation layer shows "No data."
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[cfg(test)]
    pub fn series(&self, id: &str) -> Option<&SeriesData> {
        self.series.iter().find(|s| s.id == id)
    }
}

/// Doughnut gauge for one loop: used vs remaining capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    #[serde(rename = "loop")]
    pub loop_id: Loop,
    pub title: String,
    pub value: f64,
    pub remaining: f64,
    pub zone: Zone,
    pub color: Rgb,
    pub track: Rgba,
}
