// Range query service - Use case for loading readings inside a time window
use crate::application::reading_repository::{ReadingRepository, StoreError};
use crate::domain::reading::{Reading, TimeRange};
use std::sync::Arc;

#[derive(Clone)]
pub struct RangeQueryService {
    repository: Arc<dyn ReadingRepository>,
}

impl RangeQueryService {
    pub fn new(repository: Arc<dyn ReadingRepository>) -> Self {
        Self { repository }
    }

    /// Readings inside `range`, ascending by timestamp.
    pub async fn fetch_range(&self, range: &TimeRange) -> Result<Vec<Reading>, StoreError> {
        if range.is_inverted() {
            tracing::debug!(?range, "Inverted time range, nothing to fetch");
            return Ok(Vec::new());
        }

        let mut readings = self.repository.readings_in_range(range).await?;
        readings.retain(|r| range.contains(r.timestamp));
        // Stable, so equal timestamps keep the store's order.
        readings.sort_by_key(|r| r.timestamp);

        tracing::debug!("Fetched {} readings for {:?}", readings.len(), range);
        Ok(readings)
    }
}
