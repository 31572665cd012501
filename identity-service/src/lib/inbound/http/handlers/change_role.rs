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
use crate::domain::subject::models::Role;
use crate::inbound::http::router::AppState;

pub async fn change_role<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<Principal>,
    Path(subject_id): Path<String>,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<ApiSuccess<SubjectData>, ApiError> {
    let subject_id = parse_subject_id(&subject_id)?;
    let role = body
        .role
        .parse::<Role>()
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    state
        .auth_service
        .change_role(&principal, &subject_id, role)
        .await
        .map_err(ApiError::from)
        .map(|ref subject| ApiSuccess::new(StatusCode::OK, subject.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeRoleRequest {
    role: String,
}
