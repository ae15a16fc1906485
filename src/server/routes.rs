use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use super::{error::AppError, state::AppState};
use crate::api::{Credentials, LoginResponse, RegisterResponse};

fn credentials(payload: Result<Json<Credentials>, JsonRejection>) -> Result<Credentials, AppError> {
    payload.map(|Json(body)| body).map_err(|e| {
        debug!("Rejected request body: {e}");
        AppError::MalformedPayload
    })
}

/// `POST /api/register`
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let credentials = credentials(payload)?;

    let registration = state
        .auth
        .register(credentials.name(), credentials.password())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Company registered successfully".to_string(),
            id: registration.id,
            nombre_empresa: registration.name,
        }),
    ))
}

/// `POST /api/login`
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let credentials = credentials(payload)?;

    let name = state
        .auth
        .login(credentials.name(), credentials.password())
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        nombre_empresa: name,
    }))
}
