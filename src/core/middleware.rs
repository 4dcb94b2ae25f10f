use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::Key;
use axum_extra::extract::SignedCookieJar;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

use crate::features::auth::model::CurrentUser;
use crate::features::auth::services::{AuthService, SessionStore};
use crate::shared::constants::SESSION_COOKIE_NAME;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// State carried by the session-resolution middleware.
#[derive(Clone)]
pub struct SessionLayerState {
    pub sessions: Arc<SessionStore>,
    pub auth_service: Arc<AuthService>,
    pub cookie_key: Key,
}

/// Resolve the request's session principal and attach it as `CurrentUser`.
///
/// An absent cookie, an unknown token and a stale user id all resolve to the
/// anonymous principal; no request fails here.
pub async fn session_middleware(
    State(state): State<SessionLayerState>,
    mut req: Request,
    next: Next,
) -> Response {
    let jar = SignedCookieJar::from_headers(req.headers(), state.cookie_key.clone());

    let mut principal = None;
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        if let Some(user_id) = state.sessions.principal(cookie.value()) {
            principal = state.auth_service.resolve_principal(user_id).await;
        }
    }

    req.extensions_mut().insert(CurrentUser(principal));
    next.run(req).await
}
