use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::SubjectData;
use crate::domain::account::ports::AuthServicePort;
use crate::domain::subject::models::Principal;
use crate::domain::subject::models::SubjectId;
use crate::inbound::http::router::AppState;

pub async fn get_subject<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<Principal>,
    Path(subject_id): Path<String>,
) -> Result<ApiSuccess<SubjectData>, ApiError> {
    let subject_id = parse_subject_id(&subject_id)?;

    state
        .auth_service
        .get_subject(&principal, &subject_id)
        .await
        .map_err(ApiError::from)
        .map(|ref subject| ApiSuccess::new(StatusCode::OK, subject.into()))
}

pub(super) fn parse_subject_id(raw: &str) -> Result<SubjectId, ApiError> {
    SubjectId::from_string(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}
