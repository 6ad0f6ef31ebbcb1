//! HTTP request handlers for the Courier Quote Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{QuoteRequest, quote_batch};
use crate::config::{CourierCatalog, CourierConfig, CourierStore};
use crate::reference::PincodeTable;

use super::request::{CourierUpsertRequest, RecommendRequest};
use super::response::{
    AckResponse, ApiError, ApiErrorResponse, CourierListResponse, CourierResponse,
    RecentResponse, RecommendResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/recommend", post(recommend_handler))
        .route("/couriers", get(list_couriers_handler).post(upsert_courier_handler))
        .route(
            "/couriers/:name",
            get(get_courier_handler).delete(delete_courier_handler),
        )
        .route("/recent", get(recent_handler))
        .route("/recent/clear", post(clear_recent_handler))
        .with_state(state)
}

/// Handler for POST /recommend endpoint.
///
/// Quotes every pincode with every courier and names the cheapest courier
/// per pincode.
async fn recommend_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing recommend request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let requests: Arc<[QuoteRequest]> = request.into_quote_requests().into();
    let catalog = state.catalog();
    let courier_count = catalog.couriers().len();

    let start_time = Instant::now();
    match quote_batch(catalog, Arc::clone(&requests)).await {
        Ok(results) => {
            let recorded = results
                .iter()
                .filter(|result| state.recent().record(result))
                .count();
            let response = RecommendResponse::from_results(results, courier_count);
            info!(
                correlation_id = %correlation_id,
                pincodes = requests.len(),
                couriers = courier_count,
                quoted = recorded,
                duration_us = start_time.elapsed().as_micros(),
                "Recommendation completed successfully"
            );
            json_response(StatusCode::OK, &response)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Recommendation failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for GET /couriers endpoint.
async fn list_couriers_handler(State(state): State<AppState>) -> Response {
    let catalog = state.catalog();
    let couriers = catalog
        .list()
        .iter()
        .map(|config| courier_response(&catalog, config))
        .collect();
    json_response(StatusCode::OK, &CourierListResponse { couriers })
}

/// Handler for GET /couriers/:name endpoint.
async fn get_courier_handler(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let catalog = state.catalog();
    match catalog.get(&name) {
        Ok(config) => json_response(StatusCode::OK, &courier_response(&catalog, config)),
        Err(err) => error_response(err.into()),
    }
}

/// Handler for POST /couriers endpoint.
///
/// Validates the courier and swaps in a new catalog snapshot containing it.
async fn upsert_courier_handler(
    State(state): State<AppState>,
    payload: Result<Json<CourierUpsertRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let config = match request.courier.into_config() {
        Ok(config) => config,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Courier upsert rejected");
            return error_response(err.into());
        }
    };
    let table = request
        .reference_rows
        .map(|rows| Arc::new(PincodeTable::from_rows(rows)));

    let name = config.name.clone();
    match state.update_catalog(|catalog| Ok(catalog.with_courier(config, table))) {
        Ok(catalog) => {
            info!(correlation_id = %correlation_id, courier = %name, "Courier upserted");
            match catalog.get(&name) {
                Ok(config) => json_response(StatusCode::OK, &courier_response(&catalog, config)),
                Err(err) => error_response(err.into()),
            }
        }
        Err(err) => error_response(err.into()),
    }
}

/// Handler for DELETE /couriers/:name endpoint.
async fn delete_courier_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.update_catalog(|catalog| catalog.without_courier(&name)) {
        Ok(_) => {
            info!(courier = %name, "Courier removed");
            json_response(StatusCode::OK, &AckResponse::ok(format!("Removed courier {}", name)))
        }
        Err(err) => error_response(err.into()),
    }
}

/// Handler for GET /recent endpoint.
async fn recent_handler(State(state): State<AppState>) -> Response {
    json_response(
        StatusCode::OK,
        &RecentResponse {
            recent: state.recent().recent(),
        },
    )
}

/// Handler for POST /recent/clear endpoint.
async fn clear_recent_handler(State(state): State<AppState>) -> Response {
    state.recent().clear();
    json_response(StatusCode::OK, &AckResponse::ok("Recent quotes cleared"))
}

fn courier_response(catalog: &CourierCatalog, config: &CourierConfig) -> CourierResponse {
    CourierResponse {
        config: config.clone(),
        reference_pincodes: catalog
            .reference_table(&config.name)
            .map(|table| table.len())
            .unwrap_or(0),
    }
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, &error)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(api_error: ApiErrorResponse) -> Response {
    json_response(api_error.status, &api_error.error)
}
