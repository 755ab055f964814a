use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use sova_core::error::RepoError;
use sova_core::ports::RevokedTokenRepository;

/// In-memory revocation list. Entries past their expiry are pruned on write.
#[derive(Default)]
pub struct InMemoryRevokedTokenRepository {
    revoked: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl InMemoryRevokedTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevokedTokenRepository for InMemoryRevokedTokenRepository {
    async fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), RepoError> {
        let now = Utc::now();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(token_id, expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token_id: Uuid) -> Result<bool, RepoError> {
        Ok(self.revoked.read().await.contains_key(&token_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[tokio::test]
    async fn test_revoke() {
        let repo = InMemoryRevokedTokenRepository::new();
        let token_id = Uuid::new_v4();

        assert!(!repo.is_revoked(token_id).await.unwrap());
        repo.revoke(token_id, Utc::now() + TimeDelta::hours(1))
            .await
            .unwrap();
        assert!(repo.is_revoked(token_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_entries_are_pruned() {
        let repo = InMemoryRevokedTokenRepository::new();
        let stale = Uuid::new_v4();

        repo.revoke(stale, Utc::now() - TimeDelta::hours(1))
            .await
            .unwrap();
        repo.revoke(Uuid::new_v4(), Utc::now() + TimeDelta::hours(1))
            .await
            .unwrap();

        assert!(!repo.is_revoked(stale).await.unwrap());
    }
}
