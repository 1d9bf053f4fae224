//! REST endpoints for planning status, the stored trip and its timeline.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::watch;

use crate::store::{ItineraryStore, StoredItinerary};
use crate::timeline::Timeline;

use super::driver::PlanningStatus;

/// Shared state for trip routes.
#[derive(Clone)]
pub struct TripRouteState {
    pub status: watch::Receiver<PlanningStatus>,
    pub store: ItineraryStore,
}

/// GET /api/trip/status
///
/// Step, progress and collected trip details of the live session.
async fn get_status(State(state): State<TripRouteState>) -> impl IntoResponse {
    let status = state.status.borrow().clone();
    Json(status)
}

/// GET /api/trip
///
/// The stored trip document, or 404 if nothing has been generated yet.
async fn get_trip(State(state): State<TripRouteState>) -> Response {
    match load(&state).await {
        Ok(doc) => Json(doc).into_response(),
        Err(response) => response,
    }
}

#[derive(Debug, Deserialize)]
struct TimelineQuery {
    day: Option<u32>,
}

/// GET /api/trip/timeline?day=N
///
/// Parsed day-by-day timeline with summary. `day` selects the day returned
/// under `day` (clamped to the trip, default 1). When the stored text has no
/// day headings, `rawFallback` is set, `days` is empty and `day` is null.
async fn get_timeline(
    State(state): State<TripRouteState>,
    Query(query): Query<TimelineQuery>,
) -> Response {
    let doc = match load(&state).await {
        Ok(doc) => doc,
        Err(response) => return response,
    };
    let mut timeline = Timeline::from_stored(doc);
    if let Some(day) = query.day {
        timeline.select_day(day);
    }
    let summary = timeline.summary();
    let day = timeline.current().cloned();
    Json(serde_json::json!({
        "summary": summary,
        "day": day,
        "timeline": timeline,
    }))
    .into_response()
}

async fn load(state: &TripRouteState) -> Result<StoredItinerary, Response> {
    match state.store.load().await {
        Ok(Some(doc)) => Ok(doc),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No itinerary has been generated yet"})),
        )
            .into_response()),
        Err(e) => {
            tracing::warn!("Failed to load itinerary: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to load itinerary"})),
            )
                .into_response())
        }
    }
}

/// Build the trip REST routes.
pub fn trip_routes(state: TripRouteState) -> Router {
    Router::new()
        .route("/api/trip/status", get(get_status))
        .route("/api/trip", get(get_trip))
        .route("/api/trip/timeline", get(get_timeline))
        .with_state(state)
}
