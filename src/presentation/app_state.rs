// Application state for HTTP handlers
use crate::application::point_service::PointLookupService;
use crate::application::refresh_scheduler::RefreshScheduler;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: RefreshScheduler,
    pub point_service: PointLookupService,
}
