use std::sync::Arc;

use axum::extract::{FromRef, Query, State};
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::{redirect_found, AppError, Result};
use crate::features::auth::clients::GoogleAuthClient;
use crate::features::auth::services::{AuthService, SessionStore};
use crate::shared::constants::{OAUTH_STATE_COOKIE_NAME, SESSION_COOKIE_NAME};

/// Shared state for the auth routes.
#[derive(Clone)]
pub struct AuthState {
    pub google_client: Arc<GoogleAuthClient>,
    pub auth_service: Arc<AuthService>,
    pub sessions: Arc<SessionStore>,
    pub cookie_key: Key,
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Key {
        state.cookie_key.clone()
    }
}

/// Query parameters the provider appends to the callback redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Start the sign-in flow: remember a state nonce and send the browser to
/// the consent screen.
#[utoipa::path(
    get,
    path = "/auth/google",
    tag = "auth",
    responses(
        (status = 302, description = "Redirect to the provider consent screen")
    )
)]
pub async fn google_login(
    State(state): State<AuthState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Response) {
    let nonce = Uuid::new_v4().to_string();
    let url = state.google_client.authorization_url(&nonce);

    let state_cookie = Cookie::build((OAUTH_STATE_COOKIE_NAME, nonce))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    (jar.add(state_cookie), redirect_found(&url))
}

/// Finish the sign-in flow: verify the state nonce, resolve the user and
/// establish a session. Denials and failures land on the login page.
#[utoipa::path(
    get,
    path = "/auth/google/callback",
    tag = "auth",
    responses(
        (status = 302, description = "Redirect to / on success, /login on denial or failure")
    )
)]
pub async fn google_callback(
    State(state): State<AuthState>,
    Query(query): Query<CallbackQuery>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Response)> {
    if let Some(reason) = query.error {
        return Err(AppError::UpstreamAuth(format!("consent denied: {}", reason)));
    }

    let jar = verify_state_nonce(jar, query.state.as_deref())?;

    let code = query.code.ok_or_else(|| {
        AppError::UpstreamAuth("callback carries no authorization code".to_string())
    })?;

    let profile = state.google_client.fetch_verified_profile(&code).await?;
    let user = state.auth_service.verify_and_resolve_user(&profile).await?;

    let token = state.sessions.create(user.id);
    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!("User {} signed in", user.id);
    Ok((jar.add(session_cookie), redirect_found("/")))
}

/// The callback must present the nonce set when the flow started; the cookie
/// is cleared either way.
fn verify_state_nonce(jar: SignedCookieJar, presented: Option<&str>) -> Result<SignedCookieJar> {
    let expected = jar
        .get(OAUTH_STATE_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string());
    let jar = jar.remove(Cookie::build(OAUTH_STATE_COOKIE_NAME).path("/"));

    match (expected, presented) {
        (Some(expected), Some(presented)) if expected == presented => Ok(jar),
        _ => Err(AppError::UpstreamAuth(
            "state nonce missing or mismatched".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::shared::test_helpers::{auth_app, sqlite_store};

    #[tokio::test]
    async fn login_redirects_to_the_consent_screen() {
        let server = TestServer::new(auth_app(sqlite_store().await)).unwrap();

        let res = server.get("/auth/google").await;
        res.assert_status(StatusCode::FOUND);

        let location = res.header("location");
        let location = location.to_str().unwrap();
        assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(location.contains("client_id=client-id"));
        assert!(location.contains("state="));

        // The state nonce travels in a cookie for the callback to verify.
        let set_cookie = res.header("set-cookie");
        assert!(set_cookie.to_str().unwrap().contains("oauth_state"));
    }

    #[tokio::test]
    async fn denied_consent_lands_on_the_login_page() {
        let server = TestServer::new(auth_app(sqlite_store().await)).unwrap();

        let res = server
            .get("/auth/google/callback")
            .add_query_param("error", "access_denied")
            .await;
        res.assert_status(StatusCode::FOUND);
        assert_eq!(res.header("location").to_str().unwrap(), "/login");
    }

    #[tokio::test]
    async fn callback_without_a_code_lands_on_the_login_page() {
        let server = TestServer::new(auth_app(sqlite_store().await)).unwrap();

        let res = server.get("/auth/google/callback").await;
        res.assert_status(StatusCode::FOUND);
        assert_eq!(res.header("location").to_str().unwrap(), "/login");
    }

    #[tokio::test]
    async fn callback_with_a_forged_state_lands_on_the_login_page() {
        let server = TestServer::new(auth_app(sqlite_store().await)).unwrap();

        let res = server
            .get("/auth/google/callback")
            .add_query_param("code", "some-code")
            .add_query_param("state", "not-the-nonce")
            .await;
        res.assert_status(StatusCode::FOUND);
        assert_eq!(res.header("location").to_str().unwrap(), "/login");
    }
}
