use crate::infra::{deserialize_optional_date, parse_date, AppState, CalendarContext};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use cafe_shift::error::AppError;
use cafe_shift::schedule::{
    aggregate, calendar_grid, day_detail, staff_options, CalendarGrid, DayDetail, PeriodStats,
    StaffOption,
};
use cafe_shift::sync::{SnapshotSource, SnapshotStore};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CalendarQuery {
    #[serde(default)]
    pub(crate) staff_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) selected: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatsQuery {
    #[serde(default)]
    pub(crate) staff_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CalendarResponse {
    pub(crate) viewer: Option<String>,
    pub(crate) data_source: SnapshotSource,
    pub(crate) loaded_at: DateTime<Utc>,
    pub(crate) record_count: usize,
    pub(crate) stats: PeriodStats,
    pub(crate) grid: CalendarGrid,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshResponse {
    pub(crate) data_source: SnapshotSource,
    pub(crate) record_count: usize,
    pub(crate) loaded_at: DateTime<Utc>,
}

/// Calendar, day detail, stats, staff, and refresh endpoints.
pub(crate) fn calendar_router<S>(context: CalendarContext<S>) -> Router
where
    S: SnapshotStore + 'static,
{
    Router::new()
        .route("/api/v1/staff", get(staff_endpoint::<S>))
        .route("/api/v1/calendar", get(calendar_endpoint::<S>))
        .route("/api/v1/days/:date", get(day_endpoint::<S>))
        .route("/api/v1/stats", get(stats_endpoint::<S>))
        .route("/api/v1/shifts/refresh", post(refresh_endpoint::<S>))
        .with_state(context)
}

pub(crate) fn with_calendar_routes<S>(context: CalendarContext<S>) -> Router
where
    S: SnapshotStore + 'static,
{
    calendar_router(context)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn staff_endpoint<S>(
    State(context): State<CalendarContext<S>>,
) -> Json<Vec<StaffOption>>
where
    S: SnapshotStore + 'static,
{
    Json(staff_options(&context.catalog))
}

/// HTTP callers name their viewer on every request; nothing is remembered
/// server side.
fn request_viewer(staff_id: Option<String>) -> Option<String> {
    staff_id.filter(|id| !id.trim().is_empty())
}

pub(crate) async fn calendar_endpoint<S>(
    State(context): State<CalendarContext<S>>,
    Query(query): Query<CalendarQuery>,
) -> Json<CalendarResponse>
where
    S: SnapshotStore + 'static,
{
    let CalendarQuery {
        staff_id,
        selected,
        today,
    } = query;

    let viewer = request_viewer(staff_id);
    let snapshot = context.loader.latest();
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let stats = aggregate(&context.catalog, &snapshot.records, viewer.as_deref());
    let grid = calendar_grid(
        &context.catalog,
        &snapshot.records,
        viewer.as_deref(),
        today,
        selected,
    );

    Json(CalendarResponse {
        viewer,
        data_source: snapshot.source,
        loaded_at: snapshot.loaded_at,
        record_count: snapshot.len(),
        stats,
        grid,
    })
}

pub(crate) async fn day_endpoint<S>(
    State(context): State<CalendarContext<S>>,
    Path(date): Path<String>,
) -> Result<Json<DayDetail>, AppError>
where
    S: SnapshotStore + 'static,
{
    let date = parse_date(&date).map_err(AppError::InvalidInput)?;
    let snapshot = context.loader.latest();
    Ok(Json(day_detail(&context.catalog, &snapshot.records, date)))
}

pub(crate) async fn stats_endpoint<S>(
    State(context): State<CalendarContext<S>>,
    Query(query): Query<StatsQuery>,
) -> Json<PeriodStats>
where
    S: SnapshotStore + 'static,
{
    let viewer = request_viewer(query.staff_id);
    let snapshot = context.loader.latest();
    Json(aggregate(
        &context.catalog,
        &snapshot.records,
        viewer.as_deref(),
    ))
}

pub(crate) async fn refresh_endpoint<S>(
    State(context): State<CalendarContext<S>>,
) -> Result<Json<RefreshResponse>, AppError>
where
    S: SnapshotStore + 'static,
{
    let snapshot = context.loader.load().await.map_err(|err| {
        error!(error = %err, "shift refresh failed");
        AppError::from(err)
    })?;
    info!(count = snapshot.len(), source = ?snapshot.source, "shift data refreshed");

    Ok(Json(RefreshResponse {
        data_source: snapshot.source,
        record_count: snapshot.len(),
        loaded_at: snapshot.loaded_at,
    }))
}
