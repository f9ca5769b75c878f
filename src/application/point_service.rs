// Point-lookup service - Use case for "latest reading at or before" queries
use crate::application::reading_repository::{ReadingRepository, StoreError};
use crate::domain::reading::{parse_instant, InstantError, Reading};
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Reading),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("Select a date and time.")]
    MissingInstant,
    #[error("Unrecognized date and time: {0}")]
    InvalidInstant(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<InstantError> for SearchError {
    fn from(err: InstantError) -> Self {
        match err {
            InstantError::Missing => SearchError::MissingInstant,
            InstantError::Invalid(input) => SearchError::InvalidInstant(input),
        }
    }
}

#[derive(Clone)]
pub struct PointLookupService {
    repository: Arc<dyn ReadingRepository>,
}

impl PointLookupService {
    pub fn new(repository: Arc<dyn ReadingRepository>) -> Self {
        Self { repository }
    }

    pub async fn latest_at_or_before(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<Option<Reading>, StoreError> {
        let reading = self.repository.latest_at_or_before(instant).await?;
        tracing::debug!(%instant, found = reading.is_some(), "Point lookup");
        Ok(reading)
    }

    /// Operator search by time. Input is validated before the store is asked.
    pub async fn search(&self, input: Option<&str>) -> Result<SearchOutcome, SearchError> {
        let instant = parse_instant(input.unwrap_or_default())?;

        Ok(match self.latest_at_or_before(instant).await? {
            Some(reading) => SearchOutcome::Found(reading),
            None => SearchOutcome::NotFound,
        })
    }
}
