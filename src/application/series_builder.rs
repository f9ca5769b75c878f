// Series builder - Turns loaded readings into chart series and gauges
use crate::domain::banding::{zone_for, CRITICAL_THRESHOLD, WARNING_THRESHOLD};
use crate::domain::chart::{ChartSeries, Gauge, GradientStop, PresentationMode, SeriesData, Stroke};
use crate::domain::color::{color_for, Rgb, Rgba, GREEN, RED, YELLOW};
use crate::domain::reading::{Loop, Reading};
use chrono::{DateTime, Utc};

pub const WEST_COLOR: Rgb = Rgb::new(30, 64, 175);
pub const EAST_COLOR: Rgb = Rgb::new(56, 189, 248);
pub const WARNING_LINE_COLOR: Rgb = Rgb::new(234, 179, 8);
pub const CRITICAL_LINE_COLOR: Rgb = Rgb::new(220, 38, 38);
pub const GAUGE_TRACK: Rgba = Rgb::new(148, 163, 184).with_alpha(0.2);

const THRESHOLD_DASH: [u32; 2] = [6, 6];

/// Build the history chart for `readings` (already in timestamp order).
pub fn build(readings: &[Reading], mode: PresentationMode) -> ChartSeries {
    let labels: Vec<String> = readings.iter().map(|r| label_for(r.timestamp)).collect();

    let mut series: Vec<SeriesData> = Loop::ALL
        .into_iter()
        .map(|loop_id| primary_series(readings, loop_id, mode))
        .collect();

    if mode.shows_thresholds() {
        series.push(threshold_series(
            labels.len(),
            WARNING_THRESHOLD,
            WARNING_LINE_COLOR,
        ));
        series.push(threshold_series(
            labels.len(),
            CRITICAL_THRESHOLD,
            CRITICAL_LINE_COLOR,
        ));
    }

    ChartSeries {
        labels,
        series,
        y_min: 0.0,
        y_max: 100.0,
        tick_step: 10.0,
        banding: mode.banding_enabled(),
    }
}

pub fn gauge(loop_id: Loop, value: f64) -> Gauge {
    Gauge {
        loop_id,
        title: loop_id.title().to_string(),
        value,
        remaining: 100.0 - value,
        zone: zone_for(value),
        color: color_for(value),
        track: GAUGE_TRACK,
    }
}

/// One gauge per loop. Without a reading both gauges sit at zero.
pub fn gauges(latest: Option<&Reading>) -> Vec<Gauge> {
    Loop::ALL
        .into_iter()
        .map(|loop_id| gauge(loop_id, latest.map_or(0.0, |r| r.fullness(loop_id))))
        .collect()
}

/// Red at the top of the plot, yellow midway, green at the bottom.
pub fn vertical_ramp() -> Stroke {
    Stroke::VerticalGradient {
        stops: vec![
            GradientStop { offset: 0.0, color: RED },
            GradientStop { offset: 0.5, color: YELLOW },
            GradientStop { offset: 1.0, color: GREEN },
        ],
    }
}

fn primary_series(readings: &[Reading], loop_id: Loop, mode: PresentationMode) -> SeriesData {
    let stroke = match mode {
        PresentationMode::Standard => Stroke::Solid {
            color: match loop_id {
                Loop::West => WEST_COLOR,
                Loop::East => EAST_COLOR,
            },
        },
        PresentationMode::Gradient => vertical_ramp(),
    };

    SeriesData {
        id: loop_id.id().to_string(),
        label: format!("{} %", loop_id.title()),
        data: readings.iter().map(|r| r.fullness(loop_id)).collect(),
        stroke,
        border_width: 3.0,
        border_dash: None,
        point_radius: 1.0,
        tension: 0.25,
    }
}

fn threshold_series(points: usize, value: f64, color: Rgb) -> SeriesData {
    SeriesData {
        id: format!("threshold-{value}"),
        label: format!("{value}% Threshold"),
        data: vec![value; points],
        stroke: Stroke::Solid { color },
        border_width: 2.0,
        border_dash: Some(THRESHOLD_DASH),
        point_radius: 0.0,
        tension: 0.0,
    }
}

fn label_for(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::banding::Zone;
    use crate::infrastructure::memory_repository::at;

    fn scenario() -> Vec<Reading> {
        vec![
            Reading::new(1, at(8, 0), 40.0, 50.0),
            Reading::new(2, at(9, 0), 65.0, 55.0),
            Reading::new(3, at(10, 0), 82.0, 60.0),
        ]
    }

    #[test]
    fn test_standard_mode_scenario() {
        let chart = build(&scenario(), PresentationMode::Standard);

        assert_eq!(chart.labels, vec!["08:00", "09:00", "10:00"]);
        let ids: Vec<&str> = chart.series.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["west", "east", "threshold-60", "threshold-80"]);

        let west = chart.series("west").unwrap();
        assert_eq!(west.data, vec![40.0, 65.0, 82.0]);
        assert_eq!(west.label, "West Loop %");
        assert_eq!(west.stroke, Stroke::Solid { color: WEST_COLOR });
        assert_eq!(chart.series("east").unwrap().data, vec![50.0, 55.0, 60.0]);

        let warning = chart.series("threshold-60").unwrap();
        assert_eq!(warning.data, vec![60.0; 3]);
        assert_eq!(warning.label, "60% Threshold");
        assert_eq!(warning.border_dash, Some([6, 6]));
        assert_eq!(chart.series("threshold-80").unwrap().data, vec![80.0; 3]);
        assert!(chart.banding);
    }

    #[test]
    fn test_gradient_mode_replaces_colors_and_drops_thresholds() {
        let chart = build(&scenario(), PresentationMode::Gradient);

        assert_eq!(chart.series.len(), 2);
        assert!(chart.series.iter().all(|s| s.stroke == vertical_ramp()));
        assert_eq!(chart.series("west").unwrap().data, vec![40.0, 65.0, 82.0]);
        assert!(!chart.banding);
    }

    #[test]
    fn test_modes_share_labels_and_data() {
        let readings = scenario();
        let standard = build(&readings, PresentationMode::Standard);
        let gradient = build(&readings, PresentationMode::Gradient);

        assert_eq!(gradient.labels, standard.labels);
        assert_eq!((gradient.y_min, gradient.y_max), (standard.y_min, standard.y_max));
        for (shaded, solid) in gradient.series.iter().zip(&standard.series) {
            assert_eq!(shaded.id, solid.id);
            assert_eq!(shaded.data, solid.data);
            assert_ne!(shaded.stroke, solid.stroke);
        }
        assert_ne!(gradient, standard);
    }

    #[test]
    fn test_empty_readings_give_empty_series() {
        for mode in [PresentationMode::Standard, PresentationMode::Gradient] {
            let chart = build(&[], mode);
            assert!(chart.is_empty());
            assert!(chart.series.iter().all(|s| s.data.is_empty()));
        }
    }

    #[test]
    fn test_gauge_for_latest_reading() {
        let readings = scenario();
        let gauges = gauges(readings.last());

        let west = &gauges[0];
        assert_eq!(west.loop_id, Loop::West);
        assert_eq!(west.value, 82.0);
        assert_eq!(west.remaining, 18.0);
        assert_eq!(west.zone, Zone::Critical);
        assert_eq!(west.color, Rgb::new(246, 150, 40));
        assert!(west.color.r > west.color.g);
        assert_eq!(gauges[1].value, 60.0);
        assert_eq!(gauges[1].zone, Zone::Warning);
    }

    #[test]
    fn test_gauges_without_reading_sit_at_zero() {
        let gauges = gauges(None);
        assert!(gauges.iter().all(|g| g.value == 0.0 && g.remaining == 100.0));
        assert!(gauges.iter().all(|g| g.color == GREEN));
    }
}
