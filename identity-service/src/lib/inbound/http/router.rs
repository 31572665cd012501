use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_role::change_role;
use super::handlers::get_subject::get_subject;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::password_reset::confirm_password_reset;
use super::handlers::password_reset::request_password_reset;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::revoke_sessions::revoke_sessions;
use super::handlers::set_status::set_status;
use super::middleware::authenticate as auth_middleware;
use crate::domain::account::ports::AuthServicePort;

pub struct AppState<S: AuthServicePort> {
    pub auth_service: Arc<S>,
}

impl<S: AuthServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: self.auth_service.clone(),
        }
    }
}

pub fn create_router<S: AuthServicePort>(auth_service: Arc<S>) -> Router {
    let state = AppState { auth_service };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register::<S>))
        .route("/api/auth/login", post(login::<S>))
        .route("/api/auth/refresh", post(refresh::<S>))
        .route("/api/auth/logout", post(logout::<S>))
        .route(
            "/api/auth/password-reset/request",
            post(request_password_reset::<S>),
        )
        .route(
            "/api/auth/password-reset/confirm",
            post(confirm_password_reset::<S>),
        );

    let protected_routes = Router::new()
        .route("/api/subjects/:subject_id", get(get_subject::<S>))
        .route(
            "/api/subjects/:subject_id/sessions",
            delete(revoke_sessions::<S>),
        )
        .route("/api/subjects/:subject_id/role", put(change_role::<S>))
        .route("/api/subjects/:subject_id/status", put(set_status::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    // Headers are left out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
