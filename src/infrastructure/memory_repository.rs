// In-memory reading store for tests
use crate::application::reading_repository::{ReadingRepository, StoreError};
use crate::domain::reading::{Reading, TimeRange};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// 2024-05-01 at the given wall clock time, UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
}

/// Returns readings in insertion order, which callers must not rely on.
#[derive(Default)]
pub struct MemoryRepository {
    readings: RwLock<Vec<Reading>>,
    failing: AtomicBool,
    delay_ms: AtomicU64,
    range_calls: AtomicUsize,
    latest_calls: AtomicUsize,
}

impl MemoryRepository {
    pub fn with_readings(readings: Vec<Reading>) -> Self {
        Self {
            readings: RwLock::new(readings),
            ..Self::default()
        }
    }

    /// 08:00 west 40 east 50, 09:00 west 65 east 55, 10:00 west 82 east 60
    pub fn scenario() -> Self {
        Self::with_readings(vec![
            Reading::new(1, at(8, 0), 40.0, 50.0),
            Reading::new(2, at(9, 0), 65.0, 55.0),
            Reading::new(3, at(10, 0), 82.0, 60.0),
        ])
    }

    pub fn insert(&self, reading: Reading) {
        self.readings.write().unwrap().push(reading);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every query sleeps this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    pub fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    async fn round_trip(&self) -> Result<(), StoreError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReadingRepository for MemoryRepository {
    async fn readings_in_range(&self, range: &TimeRange) -> Result<Vec<Reading>, StoreError> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;

        let readings = self.readings.read().unwrap();
        Ok(readings
            .iter()
            .filter(|r| range.contains(r.timestamp))
            .cloned()
            .collect())
    }

    async fn latest_at_or_before(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<Option<Reading>, StoreError> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;

        let readings = self.readings.read().unwrap();
        Ok(readings
            .iter()
            .filter(|r| r.timestamp <= instant)
            .max_by(|a, b| (a.timestamp, &a.id).cmp(&(b.timestamp, &b.id)))
            .cloned())
    }
}
