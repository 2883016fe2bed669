use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use fairdraw_shared::{
    ApiError, ClientSeedRequest, CommitmentResponse, RotateResponse, RoundLogEntry, RoundRequest,
    RoundResponse, VerifyRequest, VerifyResponse,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::state::{self, AppState};

const DEFAULT_ROUNDS_LIMIT: usize = 20;

pub struct AppError(ApiError);

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

type HandlerResult<T> = Result<Json<T>, AppError>;

async fn route_commitment(State(state): State<Arc<AppState>>) -> HandlerResult<CommitmentResponse> {
    Ok(Json(state.commitment()?))
}

async fn route_client_seed(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClientSeedRequest>,
) -> HandlerResult<CommitmentResponse> {
    Ok(Json(state.set_client_seed(req)?))
}

async fn route_round(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RoundRequest>,
) -> HandlerResult<RoundResponse> {
    Ok(Json(state.play(req)?))
}

async fn route_admin_rotate(
    State(state): State<Arc<AppState>>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> HandlerResult<RotateResponse> {
    state.authorize(bearer.token())?;
    Ok(Json(state.rotate()?))
}

async fn route_verify(Json(req): Json<VerifyRequest>) -> HandlerResult<VerifyResponse> {
    Ok(Json(state::verify_round(req)?))
}

#[derive(Debug, Deserialize)]
struct RoundsQuery {
    limit: Option<usize>,
}

async fn route_rounds(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RoundsQuery>,
) -> HandlerResult<Vec<RoundLogEntry>> {
    Ok(Json(state.recent_rounds(q.limit.unwrap_or(DEFAULT_ROUNDS_LIMIT))?))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/commitment", get(route_commitment))
        .route("/client-seed", post(route_client_seed))
        .route("/round", post(route_round))
        .route("/rounds", get(route_rounds))
        .route("/verify", post(route_verify))
        .route("/admin/rotate", post(route_admin_rotate))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
