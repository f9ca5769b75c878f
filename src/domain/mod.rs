// Domain layer - Readings, colors, severity bands and chart models
pub mod banding;
pub mod chart;
pub mod color;
pub mod reading;
