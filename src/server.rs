// HTTP surface: package search, plan persistence, health
// Browser callers from any origin are allowed; preflights get an empty success response.

use crate::assembler::PackageAssembler;
use crate::error::PackageError;
use crate::models::TripRequest;
use crate::plans::{PlanStore, VacationPlan};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<PackageAssembler>,
    pub plans: Arc<dyn PlanStore>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    details: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest { message: String, details: String },
    Internal { message: String, details: String },
}

impl ApiError {
    fn malformed_body(err: serde_json::Error) -> Self {
        ApiError::BadRequest {
            message: "Malformed request body".to_string(),
            details: err.to_string(),
        }
    }
}

impl From<PackageError> for ApiError {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::InvalidRequest(ref message) => ApiError::BadRequest {
                message: message.clone(),
                details: err.to_string(),
            },
            other => ApiError::Internal {
                message: other.to_string(),
                details: format!("{:?}", other),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            ApiError::BadRequest { message, details } => (StatusCode::BAD_REQUEST, message, details),
            ApiError::Internal { message, details } => {
                error!(error = %message, "Package request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message, details)
            }
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                details,
            }),
        )
            .into_response()
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    Router::new()
        .route("/", post(search_packages).options(preflight))
        .route("/packages", post(search_packages).options(preflight))
        .route("/plans", post(save_plan).options(preflight))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "live_fetch": state.assembler.live_fetch_enabled(),
    }))
}

async fn search_packages(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request: TripRequest = serde_json::from_slice(&body).map_err(ApiError::malformed_body)?;
    info!(
        origin = %request.origin,
        destination = %request.destination,
        departure_date = %request.departure_date,
        adults = request.adults,
        budget = ?request.budget,
        package_type = ?request.package_type,
        "Package search"
    );

    let assembly = state.assembler.assemble(&request).await?;

    match request.package_type {
        Some(tier) => {
            let package = assembly.tier(tier).cloned().ok_or_else(|| ApiError::Internal {
                message: format!("no {} package assembled", tier),
                details: format!("source: {:?}", assembly.source),
            })?;
            Ok(Json(package).into_response())
        }
        None => Ok(Json(assembly.packages).into_response()),
    }
}

async fn save_plan(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let plan: VacationPlan = serde_json::from_slice(&body).map_err(ApiError::malformed_body)?;
    state.plans.save(plan.clone()).await?;
    info!(user_id = %plan.user_id, trip = %plan.trip_key(), "Saved vacation plan");
    Ok((StatusCode::CREATED, Json(plan)).into_response())
}
