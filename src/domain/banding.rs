// Banding policy - severity zones and their chart background bands
use super::chart::PresentationMode;
use super::color::{Rgba, GREEN, RED, YELLOW};
use serde::Serialize;

pub const WARNING_THRESHOLD: f64 = 60.0;
pub const CRITICAL_THRESHOLD: f64 = 80.0;

const BAND_ALPHA: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Normal,
    Warning,
    Critical,
}

/// Classify a fullness value. Below 0 is normal and above 100 is critical,
/// so every value lands in exactly one zone.
pub fn zone_for(value: f64) -> Zone {
    if value >= CRITICAL_THRESHOLD {
        Zone::Critical
    } else if value >= WARNING_THRESHOLD {
        Zone::Warning
    } else {
        Zone::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub zone: Zone,
    pub from: f64,
    pub to: f64,
    pub fill: Rgba,
}

pub const BANDS: [Band; 3] = [
    Band {
        zone: Zone::Normal,
        from: 0.0,
        to: WARNING_THRESHOLD,
        fill: GREEN.with_alpha(BAND_ALPHA),
    },
    Band {
        zone: Zone::Warning,
        from: WARNING_THRESHOLD,
        to: CRITICAL_THRESHOLD,
        fill: YELLOW.with_alpha(BAND_ALPHA),
    },
    Band {
        zone: Zone::Critical,
        from: CRITICAL_THRESHOLD,
        to: 100.0,
        fill: RED.with_alpha(BAND_ALPHA),
    },
];

/// Drawable area of a chart in pixels, known only after layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Linear mapping from fullness values to vertical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalScale {
    pub min: f64,
    pub max: f64,
    pub pixel_top: f64,
    pub pixel_bottom: f64,
}

impl VerticalScale {
    pub fn pixel_for_value(&self, value: f64) -> Option<f64> {
        let span = self.max - self.min;
        if span == 0.0 || !span.is_finite() {
            return None;
        }
        let ratio = (value - self.min) / span;
        Some(self.pixel_bottom - ratio * (self.pixel_bottom - self.pixel_top))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandRect {
    pub zone: Zone,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Rgba,
}

/// Background rectangles for the severity bands.
///
/// Empty in gradient mode, and whenever the area or scale has not been
/// established yet.
pub fn band_rects(
    mode: PresentationMode,
    area: Option<&ChartArea>,
    scale: Option<&VerticalScale>,
) -> Vec<BandRect> {
    if !mode.banding_enabled() {
        return Vec::new();
    }
    let (Some(area), Some(scale)) = (area, scale) else {
        return Vec::new();
    };

    BANDS
        .iter()
        .filter_map(|band| {
            let y1 = scale.pixel_for_value(band.from)?;
            let y2 = scale.pixel_for_value(band.to)?;
            Some(BandRect {
                zone: band.zone,
                x: area.left,
                y: y1.min(y2),
                width: area.right - area.left,
                height: (y1 - y2).abs(),
                fill: band.fill,
            })
        })
        .collect()
}
