// Refresh scheduler - Periodic and on-demand reloads of loop readings
use crate::application::monitor_state::{Applied, FetchKind, MonitorState};
use crate::application::point_service::PointLookupService;
use crate::application::range_service::RangeQueryService;
use crate::domain::chart::PresentationMode;
use crate::domain::reading::{RangeSelection, TimeRange};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Drives refresh cycles and owns the monitor state.
///
/// Each cycle runs in its own task, so stopping the periodic ticker never
/// cancels fetches that are already out; their results are dropped by the
/// state once it is inactive.
#[derive(Clone)]
pub struct RefreshScheduler {
    range_service: RangeQueryService,
    point_service: PointLookupService,
    state: Arc<watch::Sender<MonitorState>>,
    interval: Duration,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RefreshScheduler {
    /// `interval` must be non-zero.
    pub fn new(
        range_service: RangeQueryService,
        point_service: PointLookupService,
        range: RangeSelection,
        interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(MonitorState::new(range, Utc::now()));
        Self {
            range_service,
            point_service,
            state: Arc::new(state),
            interval,
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    pub fn snapshot(&self) -> MonitorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.subscribe()
    }

    /// Start the periodic ticker. The first tick fires immediately.
    pub fn activate(&self) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if ticker.is_some() {
            return;
        }

        self.state.send_modify(|state| state.active = true);

        let this = self.clone();
        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(this.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                this.refresh_now();
            }
        }));

        tracing::info!(interval_secs = self.interval.as_secs(), "Loop monitor activated");
    }

    /// Stop the periodic ticker. Returns false if it was not running.
    pub fn deactivate(&self) -> bool {
        let handle = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(handle) = handle else {
            return false;
        };
        handle.abort();
        self.state.send_modify(|state| state.active = false);

        tracing::info!("Loop monitor deactivated");
        true
    }

    /// Run one full cycle (latest + range) in the background.
    pub fn refresh_now(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.run_cycle().await })
    }

    /// Change the window. Only the range query is re-issued.
    pub fn set_range(&self, range: TimeRange) -> Option<JoinHandle<()>> {
        let mut pending = None;
        self.state.send_modify(|state| {
            state.set_range(range);
            if state.active {
                pending = Some(state.begin_fetch(FetchKind::Range));
            }
        });

        let seq = pending?;
        let this = self.clone();
        Some(tokio::spawn(async move {
            this.load_range(seq, RangeSelection::Fixed(range), range).await
        }))
    }

    /// Switch presentation mode. Series are re-derived from loaded readings.
    pub fn set_mode(&self, mode: PresentationMode) {
        self.state.send_modify(|state| state.set_mode(mode));
        tracing::debug!(?mode, "Presentation mode changed");
    }

    async fn run_cycle(&self) {
        let now = Utc::now();
        let mut begun = None;
        self.state.send_modify(|state| {
            let range = state.resolve_range(now);
            begun = Some((
                state.selection(),
                range,
                state.begin_fetch(FetchKind::Latest),
                state.begin_fetch(FetchKind::Range),
            ));
        });
        let Some((selection, range, latest_seq, range_seq)) = begun else {
            return;
        };

        tokio::join!(
            self.load_latest(latest_seq, now),
            self.load_range(range_seq, selection, range)
        );

        self.state.send_modify(MonitorState::finish_cycle);
    }

    async fn load_latest(&self, seq: u64, now: DateTime<Utc>) {
        let result = self.point_service.latest_at_or_before(now).await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Latest reading refresh failed, keeping previous value");
        }

        let mut applied = Applied::Discarded;
        self.state
            .send_modify(|state| applied = state.apply_latest(seq, result));
        if applied == Applied::Discarded {
            tracing::debug!(seq, "Discarded latest reading result");
        }
    }

    async fn load_range(&self, seq: u64, selection: RangeSelection, range: TimeRange) {
        let result = self.range_service.fetch_range(&range).await;
        if let Err(err) = &result {
            tracing::warn!(
                error = %err,
                ?range,
                "Range refresh failed, keeping previous readings"
            );
        }

        let mut applied = Applied::Discarded;
        self.state
            .send_modify(|state| applied = state.apply_range(seq, selection, result));
        if applied == Applied::Discarded {
            tracing::debug!(seq, "Discarded range result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::monitor_state::RefreshStatus;
    use crate::domain::reading::{Reading, ReadingId};
    use crate::infrastructure::memory_repository::{at, MemoryRepository};

    fn scheduler(repo: &Arc<MemoryRepository>) -> RefreshScheduler {
        RefreshScheduler::new(
            RangeQueryService::new(repo.clone()),
            PointLookupService::new(repo.clone()),
            RangeSelection::Fixed(TimeRange::new(Some(at(8, 0)), Some(at(10, 0)))),
            Duration::from_secs(60),
        )
    }

    fn latest_id(state: &MonitorState) -> Option<ReadingId> {
        state.latest.as_ref().map(|r| r.id.clone())
    }

    async fn activated(
        repo: &Arc<MemoryRepository>,
    ) -> (RefreshScheduler, watch::Receiver<MonitorState>) {
        let scheduler = scheduler(repo);
        start(scheduler).await
    }

    async fn start(
        scheduler: RefreshScheduler,
    ) -> (RefreshScheduler, watch::Receiver<MonitorState>) {
        let mut rx = scheduler.subscribe();
        scheduler.activate();
        rx.wait_for(|s| !s.loading).await.unwrap();
        (scheduler, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_activation_loads_latest_and_range() {
        let repo = Arc::new(MemoryRepository::scenario());
        let (scheduler, _rx) = activated(&repo).await;

        let state = scheduler.snapshot();
        assert_eq!(state.readings.len(), 3);
        assert_eq!(latest_id(&state), Some(ReadingId::Int(3)));
        assert_eq!(state.status(), RefreshStatus::Idle);
        assert_eq!(repo.latest_calls(), 1);
        assert_eq!(repo.range_calls(), 1);

        let chart = state.chart();
        assert_eq!(chart.series("west").unwrap().data, vec![40.0, 65.0, 82.0]);
        assert_eq!(chart.series.len(), 4);
        assert_eq!(state.gauges()[0].value, 82.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_refresh_picks_up_new_readings() {
        let repo = Arc::new(MemoryRepository::scenario());
        let started = tokio::time::Instant::now();
        let (_scheduler, mut rx) = activated(&repo).await;

        repo.insert(Reading::new(4, at(9, 30), 70.0, 70.0));
        let state = rx.wait_for(|s| s.readings.len() == 4).await.unwrap().clone();

        assert!(started.elapsed() >= Duration::from_secs(60));
        assert_eq!(state.readings[2].id, ReadingId::Int(4));
        assert_eq!(repo.range_calls(), 2);
        assert_eq!(repo.latest_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trailing_window_picks_up_readings_after_activation() {
        let repo = Arc::new(MemoryRepository::default());
        let trailing = RefreshScheduler::new(
            RangeQueryService::new(repo.clone()),
            PointLookupService::new(repo.clone()),
            RangeSelection::Trailing(chrono::Duration::hours(6)),
            Duration::from_secs(60),
        );
        let (scheduler, mut rx) = start(trailing).await;
        assert!(scheduler.snapshot().readings.is_empty());

        let stamp = Utc::now();
        repo.insert(Reading::new(1, stamp, 55.0, 45.0));
        let state = rx.wait_for(|s| s.readings.len() == 1).await.unwrap().clone();

        assert_eq!(latest_id(&state), Some(ReadingId::Int(1)));
        assert!(state.range.end >= Some(stamp));
        assert_eq!(repo.range_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_stale_data() {
        let repo = Arc::new(MemoryRepository::scenario());
        let (scheduler, _rx) = activated(&repo).await;

        repo.set_failing(true);
        scheduler.refresh_now().await.unwrap();

        let state = scheduler.snapshot();
        assert_eq!(state.readings.len(), 3);
        assert_eq!(latest_id(&state), Some(ReadingId::Int(3)));
        assert_eq!(state.status(), RefreshStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_range_change_refreshes_only_the_range() {
        let repo = Arc::new(MemoryRepository::scenario());
        let (scheduler, _rx) = activated(&repo).await;
        let (latest_calls, range_calls) = (repo.latest_calls(), repo.range_calls());

        let handle = scheduler.set_range(TimeRange::new(Some(at(9, 0)), Some(at(9, 0))));
        handle.unwrap().await.unwrap();

        let state = scheduler.snapshot();
        assert_eq!(state.readings.len(), 1);
        assert_eq!(state.range.start, Some(at(9, 0)));
        assert_eq!(repo.range_calls(), range_calls + 1);
        assert_eq!(repo.latest_calls(), latest_calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inverted_range_clears_chart_without_error() {
        let repo = Arc::new(MemoryRepository::scenario());
        let (scheduler, _rx) = activated(&repo).await;

        let inverted = TimeRange::new(Some(at(10, 0)), Some(at(8, 0)));
        scheduler.set_range(inverted).unwrap().await.unwrap();

        let state = scheduler.snapshot();
        assert!(state.readings.is_empty());
        assert!(state.chart().is_empty());
        assert_eq!(latest_id(&state), Some(ReadingId::Int(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_switch_does_not_query() {
        let repo = Arc::new(MemoryRepository::scenario());
        let (scheduler, _rx) = activated(&repo).await;
        let (latest_calls, range_calls) = (repo.latest_calls(), repo.range_calls());

        scheduler.set_mode(PresentationMode::Gradient);
        let gradient = scheduler.snapshot().chart();
        assert_eq!(gradient.series.len(), 2);
        assert!(!gradient.banding);

        scheduler.set_mode(PresentationMode::Standard);
        assert_eq!(scheduler.snapshot().chart().series.len(), 4);
        assert_eq!(repo.latest_calls(), latest_calls);
        assert_eq!(repo.range_calls(), range_calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_stops_ticker_and_discards_in_flight_results() {
        let repo = Arc::new(MemoryRepository::scenario());
        let (scheduler, _rx) = activated(&repo).await;

        repo.set_delay(Duration::from_secs(5));
        repo.insert(Reading::new(4, at(9, 30), 70.0, 70.0));
        let in_flight = scheduler.refresh_now();
        tokio::task::yield_now().await;
        assert_eq!(scheduler.snapshot().status(), RefreshStatus::Refreshing);

        assert!(scheduler.deactivate());
        assert!(!scheduler.deactivate());

        in_flight.await.unwrap();
        let state = scheduler.snapshot();
        assert!(!state.active);
        assert_eq!(state.readings.len(), 3);
        assert_eq!(state.status(), RefreshStatus::Idle);

        let calls = repo.range_calls();
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(repo.range_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_range_change_while_inactive_only_records_range() {
        let repo = Arc::new(MemoryRepository::scenario());
        let scheduler = scheduler(&repo);

        let range = TimeRange::new(Some(at(9, 0)), None);
        assert!(scheduler.set_range(range).is_none());
        assert_eq!(scheduler.snapshot().range, range);
        assert_eq!(repo.range_calls(), 0);
    }
}
