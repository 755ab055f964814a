use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use sova_core::domain::User;
use sova_core::error::RepoError;
use sova_core::ports::{BaseRepository, UserRepository};

/// In-memory user store keyed by id. Emails are unique.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(store: &HashMap<Uuid, User>, user: &User) -> bool {
        store
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&user.id) || Self::email_taken(&store, &user) {
            return Err(RepoError::Duplicate("Entity already exists".to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if Self::email_taken(&store, &user) {
            return Err(RepoError::Duplicate("Entity already exists".to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self.store.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sova_core::domain::Role;

    fn user(email: &str) -> User {
        User::new(
            "Someone".to_string(),
            email.to_string(),
            "hash".to_string(),
            Role::Editor,
        )
    }

    #[tokio::test]
    async fn test_create_and_find_by_email() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.create(user("editor@example.com")).await.unwrap();

        let found = repo.find_by_email("editor@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(saved.id));
    }

    #[tokio::test]
    async fn test_email_lookup_is_exact() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("editor@example.com")).await.unwrap();

        assert!(repo.find_by_email("Editor@Example.com").await.unwrap().is_none());
        assert!(repo.create(user("Editor@example.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("dup@example.com")).await.unwrap();

        let result = repo.create(user("dup@example.com")).await;
        assert!(matches!(result, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create(user("a@example.com")).await.unwrap();

        let found = repo.find_by_ids(&[a.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
