// Monitor state - last known readings plus the operator's selections
use crate::application::reading_repository::StoreError;
use crate::application::series_builder;
use crate::domain::chart::{ChartSeries, Gauge, PresentationMode};
use crate::domain::reading::{RangeSelection, Reading, TimeRange};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStatus {
    Idle,
    Refreshing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Latest,
    Range,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// The fetch failed; the previous value stays.
    Retained,
    /// The monitor was inactive, a newer request already landed, or the
    /// operator moved to another window meanwhile.
    Discarded,
}

/// Request numbering for one fetch kind.
#[derive(Debug, Clone, Copy, Default)]
struct Sequence {
    issued: u64,
    applied: u64,
}

impl Sequence {
    fn next(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn supersedes(&self, seq: u64) -> bool {
        seq <= self.applied
    }
}

/// Owned by the refresh scheduler; only its completion handlers and the
/// operator setters mutate it.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub active: bool,
    /// True until the first full refresh cycle has completed
    pub loading: bool,
    pub latest: Option<Reading>,
    pub readings: Vec<Reading>,
    /// The window as last resolved for a range query
    pub range: TimeRange,
    pub mode: PresentationMode,
    selection: RangeSelection,
    in_flight: usize,
    latest_seq: Sequence,
    range_seq: Sequence,
}

impl MonitorState {
    pub fn new(selection: RangeSelection, now: DateTime<Utc>) -> Self {
        Self {
            active: false,
            loading: true,
            latest: None,
            readings: Vec::new(),
            range: selection.resolve(now),
            mode: PresentationMode::default(),
            selection,
            in_flight: 0,
            latest_seq: Sequence::default(),
            range_seq: Sequence::default(),
        }
    }

    pub fn status(&self) -> RefreshStatus {
        if self.in_flight > 0 {
            RefreshStatus::Refreshing
        } else {
            RefreshStatus::Idle
        }
    }

    /// Register an outgoing fetch and return its sequence number.
    pub fn begin_fetch(&mut self, kind: FetchKind) -> u64 {
        self.in_flight += 1;
        match kind {
            FetchKind::Latest => self.latest_seq.next(),
            FetchKind::Range => self.range_seq.next(),
        }
    }

    pub fn selection(&self) -> RangeSelection {
        self.selection
    }

    /// Re-resolve the window against `now`. Only a trailing window moves.
    pub fn resolve_range(&mut self, now: DateTime<Utc>) -> TimeRange {
        self.range = self.selection.resolve(now);
        self.range
    }

    pub fn apply_latest(
        &mut self,
        seq: u64,
        result: Result<Option<Reading>, StoreError>,
    ) -> Applied {
        self.in_flight = self.in_flight.saturating_sub(1);
        if !self.active || self.latest_seq.supersedes(seq) {
            return Applied::Discarded;
        }

        match result {
            Ok(reading) => {
                self.latest_seq.applied = seq;
                // An empty store keeps whatever was shown before.
                if reading.is_some() {
                    self.latest = reading;
                }
                Applied::Updated
            }
            Err(_) => Applied::Retained,
        }
    }

    /// `selection` is the window the fetch was issued for.
    pub fn apply_range(
        &mut self,
        seq: u64,
        selection: RangeSelection,
        result: Result<Vec<Reading>, StoreError>,
    ) -> Applied {
        self.in_flight = self.in_flight.saturating_sub(1);
        if !self.active || self.range_seq.supersedes(seq) || selection != self.selection {
            return Applied::Discarded;
        }

        match result {
            Ok(readings) => {
                self.range_seq.applied = seq;
                self.readings = readings;
                Applied::Updated
            }
            Err(_) => Applied::Retained,
        }
    }

    pub fn finish_cycle(&mut self) {
        if self.active {
            self.loading = false;
        }
    }

    pub fn set_range(&mut self, range: TimeRange) {
        self.selection = RangeSelection::Fixed(range);
        self.range = range;
    }

    pub fn set_mode(&mut self, mode: PresentationMode) {
        self.mode = mode;
    }

    pub fn chart(&self) -> ChartSeries {
        series_builder::build(&self.readings, self.mode)
    }

    pub fn gauges(&self) -> Vec<Gauge> {
        series_builder::gauges(self.latest.as_ref())
    }
}
