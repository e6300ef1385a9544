//! # Garage API
//!
//! The HTTP layer, powered by Axum. Handlers parse the request, call
//! [`CarService`] and map the outcome onto a status code and JSON body.
//!
//! ## Endpoints
//!
//! - `GET /api/cars` - List cars (`q`, `status`, `sortBy`, `sortDir`); `/api/cars/` routes the same
//! - `GET /api/cars/:id` - Get one car
//! - `POST /api/cars` - Create a car
//! - `PUT /api/cars/:id` - Partially update a car
//! - `DELETE /api/cars/:id` - Delete a car
//! - `GET /health` - Health check
//! - anything else - embedded web client, or 404

use crate::client::serve_client;
use crate::db::GarageStore;
use crate::error::{GarageError, GarageResult};
use crate::payload::CarPayload;
use crate::query::{CarFilter, ListParams};
use crate::service::{CarService, CAR_NOT_FOUND};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub cars: CarService,
}

impl AppState {
    pub fn new(store: Arc<GarageStore>) -> Self {
        Self {
            cars: CarService::new(store),
        }
    }
}

/// Creates the Axum router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/cars", get(list_cars).post(create_car))
        .route("/api/cars/", get(list_cars).post(create_car))
        .route(
            "/api/cars/:id",
            get(get_car).put(update_car).delete(delete_car),
        )
        .route("/health", get(health_handler))
        .fallback(serve_client)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Ids that are not integers cannot name a record
fn parse_id(raw: &str) -> GarageResult<i64> {
    raw.parse()
        .map_err(|_| GarageError::NotFound(CAR_NOT_FOUND.to_string()))
}

/// A missing content type reads as an empty body; malformed JSON is rejected
fn read_payload(body: Result<Json<Value>, JsonRejection>) -> GarageResult<CarPayload> {
    match body {
        Ok(Json(value)) => Ok(CarPayload::from_json(&value)),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(CarPayload::default()),
        Err(rejection) => Err(GarageError::Validation(rejection.body_text())),
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    health_response(state.cars.store().ping().await)
}

/// Store failures are logged, never echoed to the caller
fn health_response(ping: GarageResult<()>) -> (StatusCode, Json<Value>) {
    match ping {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected"
                })),
            )
        }
    }
}

/// GET /api/cars
async fn list_cars(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> GarageResult<impl IntoResponse> {
    // An undecodable query string filters nothing, like any other bad filter
    let pairs = pairs.map(|Query(pairs)| pairs).unwrap_or_else(|e| {
        debug!("Ignoring list query: {}", e.body_text());
        Vec::new()
    });
    let filter = CarFilter::from(ListParams::from_pairs(pairs));
    debug!("Listing cars with {:?}", filter);

    let cars = state
        .cars
        .list(&filter)
        .await
        .map_err(|e| e.context("Error fetching cars"))?;

    Ok(Json(cars))
}

/// GET /api/cars/:id
async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> GarageResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let car = state
        .cars
        .get(id)
        .await
        .map_err(|e| e.context("Error fetching car"))?;

    Ok(Json(car))
}

/// POST /api/cars
async fn create_car(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> GarageResult<impl IntoResponse> {
    let payload = read_payload(body)?;
    let car = state
        .cars
        .create(payload)
        .await
        .map_err(|e| e.context("Error creating car"))?;

    Ok((StatusCode::CREATED, Json(car)))
}

/// PUT /api/cars/:id
async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> GarageResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let payload = read_payload(body)?;
    let car = state
        .cars
        .update(id, payload)
        .await
        .map_err(|e| e.context("Error updating car"))?;

    Ok(Json(car))
}

/// DELETE /api/cars/:id
async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> GarageResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    state
        .cars
        .delete(id)
        .await
        .map_err(|e| e.context("Error deleting car"))?;

    Ok(Json(json!({ "message": "Car deleted" })))
}
