use serde::Serialize;
use sqlx::FromRow;

/// A locally registered user, created on first verified sign-in and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub provider_id: String,
}

/// The verified identity returned by the provider after a successful
/// handshake.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    /// Stable provider-side subject identifier.
    pub id: String,
    pub email: String,
}

/// The principal attached to the current request, if any.
///
/// Inserted by the session middleware; an absent or stale session resolves to
/// `None` rather than an error.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}
