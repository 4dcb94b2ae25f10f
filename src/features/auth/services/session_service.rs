use dashmap::DashMap;
use uuid::Uuid;

/// Process-wide session table mapping opaque tokens to user ids.
///
/// Entries are allocated only on successful sign-in (anonymous visits never
/// allocate) and are never rewritten on read. No expiry beyond process
/// lifetime.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, i64>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a session for `user_id` and return its opaque token.
    pub fn create(&self, user_id: i64) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), user_id);
        token
    }

    /// Resolve a token to the user id it was issued for.
    pub fn principal(&self, token: &str) -> Option<i64> {
        self.sessions.get(token).map(|entry| *entry.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_sessions_resolve_to_their_user() {
        let store = SessionStore::new();
        let token = store.create(42);
        assert_eq!(store.principal(&token), Some(42));
    }

    #[test]
    fn unknown_tokens_resolve_to_nothing() {
        let store = SessionStore::new();
        store.create(42);
        assert_eq!(store.principal("forged-token"), None);
    }

    #[test]
    fn tokens_are_unique_per_session() {
        let store = SessionStore::new();
        let first = store.create(1);
        let second = store.create(1);
        assert_ne!(first, second);
    }
}
