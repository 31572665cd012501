use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::account::errors::AuthError;
use crate::domain::account::models::TokenPair;
use crate::domain::subject::models::Subject;

pub mod change_role;
pub mod get_subject;
pub mod login;
pub mod logout;
pub mod password_reset;
pub mod refresh;
pub mod register;
pub mod revoke_sessions;
pub mod set_status;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::TokenInvalid(_)
            | AuthError::TokenExpired
            | AuthError::TokenReusedOrUnknown => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::TokenNotFound | AuthError::TokenAlreadyUsed => {
                ApiError::BadRequest("Invalid or already used reset token".to_string())
            }
            AuthError::ResetTokenExpired => ApiError::BadRequest("Reset token expired".to_string()),
            AuthError::Conflict(msg) => ApiError::Conflict(msg),
            AuthError::WeakPassword(_) | AuthError::Validation(_) => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            AuthError::Authorization(_) => ApiError::Forbidden(err.to_string()),
            AuthError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AuthError::Delivery(_) | AuthError::Internal(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Subject as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Subject> for SubjectData {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id.to_string(),
            username: subject.username.as_str().to_string(),
            email: subject.email.as_str().to_string(),
            role: subject.role.as_str().to_string(),
            is_active: subject.is_active,
            created_at: subject.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl From<TokenPair> for TokenPairData {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_at: pair.access_expires_at,
            refresh_expires_at: pair.refresh_expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failures_collapse_to_unauthorized() {
        for err in [
            AuthError::TokenExpired,
            AuthError::TokenReusedOrUnknown,
            AuthError::TokenInvalid("bad signature".to_string()),
        ] {
            assert_eq!(
                ApiError::from(err),
                ApiError::Unauthorized("Invalid or expired token".to_string())
            );
        }
    }

    #[test]
    fn test_reset_token_failures_are_bad_requests() {
        assert_eq!(
            ApiError::from(AuthError::ResetTokenExpired),
            ApiError::BadRequest("Reset token expired".to_string())
        );
        for err in [AuthError::TokenNotFound, AuthError::TokenAlreadyUsed] {
            assert_eq!(
                ApiError::from(err),
                ApiError::BadRequest("Invalid or already used reset token".to_string())
            );
        }
    }

    #[test]
    fn test_authorization_is_forbidden() {
        let err = ApiError::from(AuthError::Authorization("not owner".to_string()));
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let response =
            ApiError::InternalServerError("password hash table missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
