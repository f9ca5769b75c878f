// Response and request bodies for the HTTP surface
use crate::application::monitor_state::{MonitorState, RefreshStatus};
use crate::application::point_service::SearchOutcome;
use crate::domain::banding::BandRect;
use crate::domain::chart::{ChartSeries, Gauge, PresentationMode};
use crate::domain::reading::{Reading, TimeRange};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoopView {
    pub loading: bool,
    pub active: bool,
    pub status: RefreshStatus,
    pub mode: PresentationMode,
    pub range: TimeRange,
    pub latest: Option<Reading>,
    pub gauges: Vec<Gauge>,
    pub readings: Vec<Reading>,
}

impl From<&MonitorState> for LoopView {
    fn from(state: &MonitorState) -> Self {
        Self {
            loading: state.loading,
            active: state.active,
            status: state.status(),
            mode: state.mode,
            range: state.range,
            latest: state.latest.clone(),
            gauges: state.gauges(),
            readings: state.readings.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChartView {
    #[serde(flatten)]
    pub chart: ChartSeries,
    pub bands: Vec<BandRect>,
    pub no_data: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchView {
    pub found: bool,
    pub reading: Option<Reading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<SearchOutcome> for SearchView {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Found(reading) => Self {
                found: true,
                reading: Some(reading),
                message: None,
            },
            SearchOutcome::NotFound => Self {
                found: false,
                reading: None,
                message: Some("No reading found.".to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct ModeBody {
    pub mode: PresentationMode,
}

#[derive(Debug, Deserialize)]
pub struct RangeBody {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub at: Option<String>,
}
