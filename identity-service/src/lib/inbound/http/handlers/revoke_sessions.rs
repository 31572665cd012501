use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::get_subject::parse_subject_id;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::ports::AuthServicePort;
use crate::domain::subject::models::Principal;
use crate::inbound::http::router::AppState;

/// Logout everywhere.
pub async fn revoke_sessions<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<Principal>,
    Path(subject_id): Path<String>,
) -> Result<ApiSuccess<RevokeSessionsResponseData>, ApiError> {
    let subject_id = parse_subject_id(&subject_id)?;

    state
        .auth_service
        .logout_all(&principal, &subject_id)
        .await
        .map_err(ApiError::from)
        .map(|revoked| ApiSuccess::new(StatusCode::OK, RevokeSessionsResponseData { revoked }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevokeSessionsResponseData {
    pub revoked: u64,
}
