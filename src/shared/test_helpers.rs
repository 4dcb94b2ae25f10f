#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
use axum_extra::extract::cookie::Key;

#[cfg(test)]
use crate::core::config::GoogleConfig;
#[cfg(test)]
use crate::features::auth::clients::GoogleAuthClient;
#[cfg(test)]
use crate::features::auth::handlers::AuthState;
#[cfg(test)]
use crate::features::auth::model::{CurrentUser, User};
#[cfg(test)]
use crate::features::auth::services::{AuthService, SessionStore};
#[cfg(test)]
use crate::features::auth::routes as auth_routes;
#[cfg(test)]
use crate::features::files::{routes as files_routes, FileService};
#[cfg(test)]
use crate::modules::storage::{RowStore, SqliteStore};

/// In-memory row store with the schema applied.
#[cfg(test)]
pub async fn sqlite_store() -> Arc<dyn RowStore> {
    // A single connection keeps every query on the same in-memory database.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");

    let store = SqliteStore::new(pool, std::time::Duration::from_secs(5));
    store.ensure_schema().await.expect("create schema");
    Arc::new(store)
}

/// The files routes plus the root route, as `main` assembles them.
#[cfg(test)]
pub fn files_app(store: Arc<dyn RowStore>, attribute_owner: bool) -> Router {
    async fn root() -> &'static str {
        "Server is online"
    }

    let service = Arc::new(FileService::new(store, attribute_owner));
    Router::new()
        .merge(files_routes::routes(service))
        .route("/", axum::routing::get(root))
}

#[cfg(test)]
pub fn test_google_config() -> GoogleConfig {
    GoogleConfig {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        callback_url: "http://127.0.0.1:3001/auth/google/callback".to_string(),
        auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
        token_url: "https://oauth2.googleapis.com/token".to_string(),
        userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
    }
}

/// The auth routes wired against an in-memory store and a fixed cookie key.
#[cfg(test)]
pub fn auth_app(store: Arc<dyn RowStore>) -> Router {
    let state = AuthState {
        google_client: Arc::new(GoogleAuthClient::new(test_google_config())),
        auth_service: Arc::new(AuthService::new(store)),
        sessions: Arc::new(SessionStore::new()),
        cookie_key: Key::derive_from(b"test-session-secret-at-least-32-bytes-long"),
    };
    auth_routes::routes(state)
}

#[cfg(test)]
async fn inject_user_middleware(user: User, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CurrentUser(Some(user)));
    next.run(request).await
}

/// Wrap a router so every request carries `user` as its session principal.
#[cfg(test)]
pub fn with_session_user(router: Router, user: User) -> Router {
    router.layer(axum::middleware::from_fn(
        move |request: Request, next: Next| {
            let user = user.clone();
            async move { inject_user_middleware(user, request, next).await }
        },
    ))
}
