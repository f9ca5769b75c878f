// Repository trait for loop fullness readings
use crate::domain::reading::{Reading, TimeRange};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The store could not answer. An empty answer is never an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("reading store unreachable: {0}")]
    Transport(String),
    #[error("reading store returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode reading store response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Readings whose timestamp falls inside the range, bounds inclusive
    async fn readings_in_range(&self, range: &TimeRange) -> Result<Vec<Reading>, StoreError>;

    /// The reading with the greatest timestamp `<= instant`, highest id on ties
    async fn latest_at_or_before(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<Option<Reading>, StoreError>;
}
