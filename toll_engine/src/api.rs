//! HTTP API for the Toll Engine.
//!
//! This module exposes a small REST API around the fee engine using
//! the [`axum`](https://crates.io/crates/axum) framework.  Clients can
//! price an arbitrary day of passages, or look up a registered
//! vehicle and receive its fees for every day it has passages
//! recorded.  Vehicles live in an in-memory register.

use crate::config::TollConfig;
use crate::engine::FeeEngine;
use crate::error::TollError;
use crate::models::{
    DailyFee, FeeRequest, PassagesRequest, Vehicle, VehicleFeeReport, VehicleQuery,
};
use crate::repository::{InMemoryVehicleRepository, VehicleRepository};
use crate::settings::Settings;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across requests.
pub struct AppState {
    pub engine: FeeEngine,
    pub vehicles: Arc<dyn VehicleRepository>,
}

impl AppState {
    pub fn new(engine: FeeEngine, vehicles: Arc<dyn VehicleRepository>) -> Self {
        Self { engine, vehicles }
    }

    /// Builds the state described by `settings`: the toll configuration
    /// (or the built-in defaults) and the seeded vehicle register.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let config = match &settings.config_path {
            Some(path) => TollConfig::load(path)
                .with_context(|| format!("loading toll configuration from {}", path.display()))?,
            None => {
                info!("no toll configuration given, using built-in defaults");
                TollConfig::default()
            }
        };
        let vehicles = match &settings.vehicles_path {
            Some(path) => InMemoryVehicleRepository::load(path)
                .with_context(|| format!("loading vehicles from {}", path.display()))?,
            None => InMemoryVehicleRepository::new(),
        };
        Ok(Self::new(FeeEngine::new(config), Arc::new(vehicles)))
    }
}

/// A [`TollError`] rendered as `{"error": ...}` with a matching status.
#[derive(Debug)]
pub struct ApiError(TollError);

impl From<TollError> for ApiError {
    fn from(err: TollError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TollError::PassagesSpanMultipleDays { .. } => StatusCode::BAD_REQUEST,
            TollError::VehicleNotFound(_) => StatusCode::NOT_FOUND,
            TollError::VehicleAlreadyExists(_) => StatusCode::CONFLICT,
            TollError::InvalidRateTable(_)
            | TollError::InvalidConfig(_)
            | TollError::Io(_)
            | TollError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Build the API router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/fee", post(fee_handler))
        .route("/api/vehicle", post(vehicle_report_handler))
        .route("/api/vehicles", get(list_vehicles_handler).post(register_vehicle_handler))
        .route("/api/vehicles/:registration", get(get_vehicle_handler))
        .route("/api/vehicles/:registration/passages", post(record_passages_handler))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Handler for POST /api/fee
async fn fee_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FeeRequest>,
) -> Result<Json<DailyFee>, ApiError> {
    let day = state
        .engine
        .daily_breakdown(request.category, &request.passages)?;
    Ok(Json(day))
}

/// Handler for POST /api/vehicle
///
/// An unknown registration number is a 404, never a zero fee.
async fn vehicle_report_handler(
    State(state): State<Arc<AppState>>,
    Json(query): Json<VehicleQuery>,
) -> Result<Json<VehicleFeeReport>, ApiError> {
    let vehicle = find_vehicle(&state, &query.registration_number)?;
    let days = state.engine.fees_by_day(vehicle.category, &vehicle.passages)?;
    let total = days.iter().map(|day| day.total).sum();
    Ok(Json(VehicleFeeReport {
        toll_free_vehicle: state.engine.is_toll_free_vehicle(vehicle.category),
        registration_number: vehicle.registration_number,
        category: vehicle.category,
        days,
        total,
    }))
}

async fn list_vehicles_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Vehicle>> {
    Json(state.vehicles.list())
}

async fn get_vehicle_handler(
    State(state): State<Arc<AppState>>,
    Path(registration): Path<String>,
) -> Result<Json<Vehicle>, ApiError> {
    Ok(Json(find_vehicle(&state, &registration)?))
}

async fn register_vehicle_handler(
    State(state): State<Arc<AppState>>,
    Json(vehicle): Json<Vehicle>,
) -> Result<(StatusCode, Json<Vehicle>), ApiError> {
    let registration = vehicle.registration_number.clone();
    state.vehicles.register(vehicle)?;
    info!(%registration, "registered vehicle");
    let stored = find_vehicle(&state, &registration)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn record_passages_handler(
    State(state): State<Arc<AppState>>,
    Path(registration): Path<String>,
    Json(request): Json<PassagesRequest>,
) -> Result<Json<Vehicle>, ApiError> {
    let vehicle = state
        .vehicles
        .record_passages(&registration, &request.passages)?;
    info!(%registration, count = request.passages.len(), "recorded passages");
    Ok(Json(vehicle))
}

fn find_vehicle(state: &AppState, registration: &str) -> Result<Vehicle, TollError> {
    state.vehicles.find(registration).ok_or_else(|| {
        warn!(%registration, "vehicle lookup missed");
        TollError::VehicleNotFound(registration.to_string())
    })
}

/// Launch the API server.  This builds the state from `settings`,
/// binds to the configured address and runs until Ctrl-C.
pub async fn serve(settings: &Settings) -> Result<()> {
    let state = Arc::new(AppState::from_settings(settings)?);
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    info!(addr = %settings.bind_addr, "server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| e.into())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
