// Fullness color mapping - typed RGB colors and piecewise interpolation
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation towards `other`. The factor is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, factor: f64) -> Rgb {
        let t = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        let channel = |from: u8, to: u8| {
            let from = f64::from(from);
            (from + (f64::from(to) - from) * t).round() as u8
        };
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }

    pub const fn with_alpha(self, alpha: f64) -> Rgba {
        Rgba { rgb: self, alpha }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Translucent color, used for background fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f64,
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.rgb.r, self.rgb.g, self.rgb.b, self.alpha
        )
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const GREEN: Rgb = Rgb::new(34, 197, 94);
pub const YELLOW: Rgb = Rgb::new(250, 204, 21);
pub const RED: Rgb = Rgb::new(239, 68, 68);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub position: f64,
    pub color: Rgb,
}

/// Stops on the fullness scale, strictly increasing by position.
pub const FULLNESS_STOPS: [ColorStop; 3] = [
    ColorStop { position: 0.0, color: GREEN },
    ColorStop { position: 70.0, color: YELLOW },
    ColorStop { position: 100.0, color: RED },
];

/// Map a fullness percentage to its severity color.
///
/// Green to yellow over `[0, 70]`, yellow to red over `(70, 100]`. Values
/// outside `[0, 100]` saturate at the end colors; NaN maps to green.
pub fn color_for(value: f64) -> Rgb {
    let [low, mid, high] = FULLNESS_STOPS;
    if value.is_nan() {
        return low.color;
    }

    if value <= mid.position {
        let factor = (value - low.position) / (mid.position - low.position);
        low.color.lerp(mid.color, factor)
    } else {
        let factor = (value - mid.position) / (high.position - mid.position);
        mid.color.lerp(high.color, factor)
    }
}
