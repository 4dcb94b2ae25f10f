use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{ProviderProfile, User};
use crate::modules::storage::{RowStore, StoreError};

/// Service mapping verified provider profiles to local user rows.
pub struct AuthService {
    store: Arc<dyn RowStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Find or create the user for a verified profile.
    ///
    /// An existing row is returned unchanged (no profile sync on login). Two
    /// concurrent first logins for the same identity may both reach the
    /// insert; the loser hits the unique constraint and re-reads the winner's
    /// row instead of failing.
    pub async fn verify_and_resolve_user(&self, profile: &ProviderProfile) -> Result<User> {
        if let Some(user) = self
            .store
            .find_user_by_provider_id(&profile.id)
            .await
            .map_err(backend_unreachable)?
        {
            return Ok(user);
        }

        match self.store.insert_user(&profile.email, &profile.id).await {
            Ok(user) => {
                tracing::info!(
                    "Registered user {} for provider subject {}",
                    user.id,
                    user.provider_id
                );
                Ok(user)
            }
            Err(StoreError::UniqueViolation(_)) => self
                .store
                .find_user_by_provider_id(&profile.id)
                .await
                .map_err(backend_unreachable)?
                .ok_or_else(|| {
                    AppError::IdentityBackend(
                        "user row vanished after conflicting insert".to_string(),
                    )
                }),
            Err(err) => Err(backend_unreachable(err)),
        }
    }

    /// Re-read the user a session principal points at.
    ///
    /// A stale id (row gone) and an unreachable store both resolve to `None`:
    /// the request proceeds anonymously instead of failing.
    pub async fn resolve_principal(&self, user_id: i64) -> Option<User> {
        match self.store.find_user_by_id(user_id).await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!("Principal lookup failed for user {}: {}", user_id, err);
                None
            }
        }
    }
}

fn backend_unreachable(err: StoreError) -> AppError {
    AppError::IdentityBackend(err.to_string())
}
