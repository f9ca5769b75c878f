// HTTP request handlers
use crate::application::point_service::SearchError;
use crate::domain::banding::{band_rects, ChartArea, VerticalScale};
use crate::domain::reading::TimeRange;
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::{accepts_brotli, json_status_response};
use crate::presentation::app_state::AppState;
use crate::presentation::views::{
    ChartQuery, ChartView, ErrorView, LoopView, ModeBody, RangeBody, SearchQuery, SearchView,
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

async fn respond<T: Serialize>(status: StatusCode, data: &T, headers: &HeaderMap) -> Response {
    match json_status_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

async fn respond_error(status: StatusCode, error: impl ToString, headers: &HeaderMap) -> Response {
    let body = ErrorView {
        error: error.to_string(),
    };
    respond(status, &body, headers).await
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full monitor snapshot: gauges, readings and selections
pub async fn get_loops(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let view = LoopView::from(&state.scheduler.snapshot());
    respond(StatusCode::OK, &view, &headers).await
}

pub async fn get_latest(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let latest = state.scheduler.snapshot().latest;
    respond(StatusCode::OK, &latest, &headers).await
}

pub async fn get_readings(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let readings = state.scheduler.snapshot().readings;
    respond(StatusCode::OK, &readings, &headers).await
}

pub async fn get_gauges(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let gauges = state.scheduler.snapshot().gauges();
    respond(StatusCode::OK, &gauges, &headers).await
}

/// Chart series for the active mode. Bands are rendered only when the
/// caller supplies the drawable size.
pub async fn get_chart(
    Query(query): Query<ChartQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let snapshot = state.scheduler.snapshot();
    let chart = snapshot.chart();

    let layout = match (query.width, query.height) {
        (Some(width), Some(height)) if width > 0.0 && height > 0.0 => Some((
            ChartArea {
                left: 0.0,
                top: 0.0,
                right: width,
                bottom: height,
            },
            VerticalScale {
                min: chart.y_min,
                max: chart.y_max,
                pixel_top: 0.0,
                pixel_bottom: height,
            },
        )),
        _ => None,
    };
    let bands = band_rects(
        snapshot.mode,
        layout.as_ref().map(|(area, _)| area),
        layout.as_ref().map(|(_, scale)| scale),
    );

    let view = ChartView {
        no_data: chart.is_empty(),
        chart,
        bands,
    };
    respond(StatusCode::OK, &view, &headers).await
}

pub async fn put_mode(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ModeBody>,
) -> Response {
    state.scheduler.set_mode(body.mode);
    let view = LoopView::from(&state.scheduler.snapshot());
    respond(StatusCode::OK, &view, &headers).await
}

/// Change the time window; the range query is re-issued in the background.
pub async fn put_range(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RangeBody>,
) -> Response {
    let range = match TimeRange::parse(body.start.as_deref(), body.end.as_deref()) {
        Ok(range) => range,
        Err(e) => return respond_error(StatusCode::BAD_REQUEST, e, &headers).await,
    };

    state.scheduler.set_range(range);
    let view = LoopView::from(&state.scheduler.snapshot());
    respond(StatusCode::ACCEPTED, &view, &headers).await
}

pub async fn post_refresh(State(state): State<Arc<AppState>>) -> StatusCode {
    state.scheduler.refresh_now();
    StatusCode::ACCEPTED
}

/// Search by time: the latest reading at or before `at`
pub async fn search(
    Query(query): Query<SearchQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.point_service.search(query.at.as_deref()).await {
        Ok(outcome) => respond(StatusCode::OK, &SearchView::from(outcome), &headers).await,
        Err(e @ (SearchError::MissingInstant | SearchError::InvalidInstant(_))) => {
            respond_error(StatusCode::BAD_REQUEST, e, &headers).await
        }
        Err(SearchError::Store(e)) => {
            tracing::warn!(error = %e, "Search by time failed");
            respond_error(StatusCode::SERVICE_UNAVAILABLE, e, &headers).await
        }
    }
}

/// Stream a snapshot on every state change (progressive updates)
pub async fn stream_loops(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    stream_from_watch(
        state.scheduler.subscribe(),
        |snapshot| LoopView::from(snapshot),
        accepts_brotli(&headers),
    )
}
