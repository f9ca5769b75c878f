// Loop fullness reading domain models
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Store-assigned row identifier. Integer and text keys are both accepted;
/// only equality and ordering are relied on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingId {
    Int(i64),
    Text(String),
}

impl From<i64> for ReadingId {
    fn from(id: i64) -> Self {
        ReadingId::Int(id)
    }
}

impl From<&str> for ReadingId {
    fn from(id: &str) -> Self {
        ReadingId::Text(id.to_string())
    }
}

impl fmt::Display for ReadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingId::Int(id) => write!(f, "{id}"),
            ReadingId::Text(id) => f.write_str(id),
        }
    }
}

/// One sampled observation of both shipping loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: ReadingId,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub west_fullness: f64,
    pub east_fullness: f64,
}

impl Reading {
    #[cfg(test)]
    pub fn new(id: i64, timestamp: DateTime<Utc>, west_fullness: f64, east_fullness: f64) -> Self {
        Self {
            id: ReadingId::Int(id),
            timestamp,
            west_fullness,
            east_fullness,
        }
    }

    pub fn fullness(&self, loop_id: Loop) -> f64 {
        match loop_id {
            Loop::West => self.west_fullness,
            Loop::East => self.east_fullness,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loop {
    West,
    East,
}

impl Loop {
    pub const ALL: [Loop; 2] = [Loop::West, Loop::East];

    pub fn id(self) -> &'static str {
        match self {
            Loop::West => "west",
            Loop::East => "east",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Loop::West => "West Loop",
            Loop::East => "East Loop",
        }
    }
}

/// Operator-selected `[start, end]` window. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Parse operator input. Blank bounds are treated as open.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, InstantError> {
        let parse_bound = |input: Option<&str>| match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_instant(value).map(Some),
        };
        Ok(Self::new(parse_bound(start)?, parse_bound(end)?))
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| timestamp >= start)
            && self.end.is_none_or(|end| timestamp <= end)
    }
}

/// How the monitored window is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelection {
    /// An explicit window set by the operator.
    Fixed(TimeRange),
    /// The last `Duration` up to the moment of each refresh.
    Trailing(chrono::Duration),
}

impl RangeSelection {
    pub fn resolve(self, now: DateTime<Utc>) -> TimeRange {
        match self {
            RangeSelection::Fixed(range) => range,
            RangeSelection::Trailing(span) => {
                TimeRange::new(now.checked_sub_signed(span), Some(now))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstantError {
    #[error("Select a date and time.")]
    Missing,
    #[error("Unrecognized date and time: {0}")]
    Invalid(String),
}

/// Parse an absolute instant from operator or store input.
///
/// Accepts RFC 3339 as well as the offset-less `YYYY-MM-DDTHH:MM[:SS[.fff]]`
/// shape produced by `datetime-local` inputs and `timestamp` columns, which is
/// read as UTC.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>, InstantError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InstantError::Missing);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| InstantError::Invalid(input.to_string()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_instant(&raw).map_err(serde::de::Error::custom)
}
