use axum::{routing::get, Router};

use crate::features::auth::handlers::{google_callback, google_login, AuthState};

/// Browser-facing sign-in routes (no session required).
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/auth/google", get(google_login))
        .route("/auth/google/callback", get(google_callback))
        .with_state(state)
}
