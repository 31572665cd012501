use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::get_subject::parse_subject_id;
use super::ApiError;
use super::ApiSuccess;
use super::SubjectData;
use crate::domain::account::ports::AuthServicePort;
use crate::domain::subject::models::Principal;
use crate::inbound::http::router::AppState;

pub async fn set_status<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<Principal>,
    Path(subject_id): Path<String>,
    Json(body): Json<SetStatusRequest>,
) -> Result<ApiSuccess<SubjectData>, ApiError> {
    let subject_id = parse_subject_id(&subject_id)?;

    state
        .auth_service
        .set_active(&principal, &subject_id, body.is_active)
        .await
        .map_err(ApiError::from)
        .map(|ref subject| ApiSuccess::new(StatusCode::OK, subject.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetStatusRequest {
    is_active: bool,
}
