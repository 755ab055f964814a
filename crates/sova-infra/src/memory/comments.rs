use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use sova_core::domain::Comment;
use sova_core::error::RepoError;
use sova_core::ports::{BaseRepository, CommentRepository};

/// In-memory comment store keyed by id.
#[derive(Default)]
pub struct InMemoryCommentRepository {
    pub(super) store: RwLock<HashMap<Uuid, Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&comment.id) {
            return Err(RepoError::Duplicate("Entity already exists".to_string()));
        }
        store.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&comment.id) {
            Some(existing) => {
                *existing = comment.clone();
                Ok(comment)
            }
            None => Err(RepoError::NotFound),
        }
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
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post_id(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let store = self.store.read().await;
        let mut comments: Vec<Comment> = store
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_comments_grouped_by_post() {
        let repo = InMemoryCommentRepository::new();
        let post_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        repo.create(Comment::new(post_id, user_id, "first".to_string()))
            .await
            .unwrap();
        repo.create(Comment::new(post_id, user_id, "second".to_string()))
            .await
            .unwrap();
        repo.create(Comment::new(Uuid::new_v4(), user_id, "elsewhere".to_string()))
            .await
            .unwrap();

        let comments = repo.find_by_post_id(post_id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert!(comments.iter().all(|c| c.post_id == post_id));
    }
}
