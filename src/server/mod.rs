//! Thin JSON API over the matchup engine.
//!
//! Routing stays dumb: handlers deserialize, call the engine or history
//! store, and map the two failure classes onto status codes (unsupported
//! sport → 400, infrastructure → 500). All semantics live in the engine.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::engine::{MatchupEngine, MatchupRequest};
use crate::history::HistoryStore;
use crate::teams;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchupEngine>,
    pub history: Arc<dyn HistoryStore>,
}

/// Build the Axum router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/compare", post(compare_handler))
        .route("/api/matchups", get(matchups_handler))
        .route("/api/teams", get(teams_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/compare
async fn compare_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MatchupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .engine
        .analyze(&request)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

#[derive(Deserialize)]
struct MatchupsQuery {
    limit: Option<i64>,
    team: Option<String>,
}

#[derive(Serialize)]
struct MatchupSummary {
    id: i64,
    team1: String,
    team2: String,
    predicted_winner: String,
    win_probability: f64,
    confidence_label: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// GET /api/matchups?limit=20&team=Celtics
async fn matchups_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MatchupsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    state
        .history
        .recent(limit, query.team.as_deref())
        .map(|entries| {
            let summaries: Vec<MatchupSummary> = entries
                .into_iter()
                .map(|e| MatchupSummary {
                    id: e.id,
                    team1: e.team1,
                    team2: e.team2,
                    predicted_winner: e.predicted_winner,
                    win_probability: e.win_probability,
                    confidence_label: e.confidence_label,
                    created_at: e.created_at,
                })
                .collect();
            Json(summaries)
        })
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[derive(Serialize)]
struct TeamListing {
    name: &'static str,
    abbreviation: &'static str,
}

/// GET /api/teams
async fn teams_handler() -> impl IntoResponse {
    let listing: Vec<TeamListing> = teams::all_teams()
        .map(|t| TeamListing {
            name: t.canonical,
            abbreviation: t.abbreviation,
        })
        .collect();
    Json(listing)
}
