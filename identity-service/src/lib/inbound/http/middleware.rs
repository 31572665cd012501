use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Middleware that verifies the bearer access token and stores the resulting
/// `Principal` in the request extensions.
pub async fn authenticate<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let principal = state
        .auth_service
        .verify_access_token(token)
        .await
        .map_err(|_| unauthorized("Invalid or expired token"))?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "status_code": StatusCode::UNAUTHORIZED.as_u16(),
            "data": { "message": message }
        })),
    )
        .into_response()
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("Invalid Authorization header format. Expected: Bearer <token>"))
}
