use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::refresh::RefreshRequest;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn logout<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<RefreshRequest>,
) -> Result<ApiSuccess<()>, ApiError> {
    state
        .auth_service
        .logout(&body.refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}
