/// Cookie holding the signed session token.
pub const SESSION_COOKIE_NAME: &str = "sid";

/// Cookie holding the OAuth state nonce between consent redirect and
/// callback.
pub const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

/// Fixed name stored for text uploads (the upload endpoint takes no name).
pub const TEXT_UPLOAD_NAME: &str = "text";

/// Redirect target for failed or denied sign-ins.
pub const LOGIN_FAILURE_PATH: &str = "/login";
