use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

const ACCEPTED_MESSAGE: &str = "If the address belongs to an account, a reset link has been sent";

pub async fn request_password_reset<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<ApiSuccess<PasswordResetAcceptedData>, ApiError> {
    state
        .auth_service
        .request_password_reset(&body.email)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::ACCEPTED,
                PasswordResetAcceptedData {
                    message: ACCEPTED_MESSAGE.to_string(),
                },
            )
        })
}

pub async fn confirm_password_reset<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<PasswordResetConfirmRequest>,
) -> Result<ApiSuccess<()>, ApiError> {
    state
        .auth_service
        .confirm_password_reset(&body.token, &body.new_password)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordResetRequest {
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordResetConfirmRequest {
    token: String,
    new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordResetAcceptedData {
    pub message: String,
}
