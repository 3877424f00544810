//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::domain::StopId;
use crate::geometry::MaxGap;
use crate::planner::{Planner, PlannerConfig, SearchError, SearchRequest};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/route-planner", get(route_planner))
        .route("/stops/search", get(search_stops))
        .route("/topology", get(topology_summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Plan a journey between two stops.
///
/// Out-of-range parameters are a 400; anything the planner rejects is a
/// 200 with `success: false`.
async fn route_planner(
    State(state): State<AppState>,
    query: Result<Query<RoutePlannerQuery>, QueryRejection>,
) -> Result<Json<RoutePlannerResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;
    let (max_transfers, max_gap) = parameters(&query, &state.config)?;

    let request = match search_request(&query, max_transfers, max_gap) {
        Ok(request) => request,
        Err(e) => return Ok(Json(RoutePlannerResponse::failure(e.to_string()))),
    };

    let topology = state.store.current().await;
    let config = std::sync::Arc::clone(&state.config);
    let planned = tokio::task::spawn_blocking(move || {
        Planner::with_config(&topology, &config).plan(&request)
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("search task failed: {e}"),
    })?;

    match planned {
        Ok(result) => {
            info!(
                from = %query.from,
                to = %query.to,
                max_transfers,
                minutes = result.journey.total_duration().num_minutes(),
                transfers = result.journey.transfer_count(),
                "Journey planned"
            );
            Ok(Json(RoutePlannerResponse::found(
                &result.journey,
                &result.alternatives,
            )))
        }
        Err(e) => {
            info!(from = %query.from, to = %query.to, error = %e, "No journey");
            Ok(Json(RoutePlannerResponse::failure(e.to_string())))
        }
    }
}

/// Validate the numeric parameters, filling in configured defaults.
fn parameters(
    query: &RoutePlannerQuery,
    config: &PlannerConfig,
) -> Result<(u32, MaxGap), AppError> {
    let max_transfers = query.max_transfers.unwrap_or(config.default_max_transfers);
    if max_transfers > config.max_transfers_limit {
        return Err(AppError::BadRequest {
            message: format!(
                "max_transfers must be between 0 and {}, got {max_transfers}",
                config.max_transfers_limit
            ),
        });
    }

    let max_gap = match query.max_gap {
        Some(meters) => MaxGap::from_meters_or_disabled(meters).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?,
        None => config.default_max_gap().map_err(|e| AppError::Internal {
            message: e.to_string(),
        })?,
    };

    Ok((max_transfers, max_gap))
}

/// Malformed ids can't name a stop, so they fail like unknown ones.
fn search_request(
    query: &RoutePlannerQuery,
    max_transfers: u32,
    max_gap: MaxGap,
) -> Result<SearchRequest, SearchError> {
    let origin =
        StopId::parse(&query.from).map_err(|_| SearchError::OriginNotFound(query.from.clone()))?;
    let destination =
        StopId::parse(&query.to).map_err(|_| SearchError::DestinationNotFound(query.to.clone()))?;

    Ok(SearchRequest::new(origin, destination, max_transfers, max_gap)
        .with_alternatives(query.alternatives))
}

/// Search stops by name or id.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchRequest>,
) -> Json<StopSearchResponse> {
    let limit = req.limit.unwrap_or(10).min(50);
    let topology = state.store.current().await;

    let stops = topology
        .search_stops(&req.q, limit)
        .into_iter()
        .map(|stop| StopResult::from_stop(stop))
        .collect();

    Json(StopSearchResponse { stops })
}

/// Counts and load time of the current snapshot.
async fn topology_summary(State(state): State<AppState>) -> Json<TopologyResponse> {
    let topology = state.store.current().await;
    Json(topology.summary().into())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "Request failed");

        (status, Json(RoutePlannerResponse::failure(message))).into_response()
    }
}
