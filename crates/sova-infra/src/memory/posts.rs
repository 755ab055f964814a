use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use sova_core::domain::{Page, PageRequest, Post};
use sova_core::error::RepoError;
use sova_core::policy::PostFilter;
use sova_core::ports::{BaseRepository, PostRepository};

use super::InMemoryCommentRepository;

/// In-memory post store keyed by id. Titles and slugs are unique.
///
/// Holds the comment store so a post and its comments can be removed
/// under the same pair of locks.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
    comments: Arc<InMemoryCommentRepository>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share `comments` with the comment repository handed to callers.
    pub fn with_comments(comments: Arc<InMemoryCommentRepository>) -> Self {
        Self {
            store: RwLock::default(),
            comments,
        }
    }

    fn conflicts(store: &HashMap<Uuid, Post>, post: &Post) -> bool {
        store.values().any(|p| {
            p.id != post.id
                && (p.title == post.title || (p.slug.is_some() && p.slug == post.slug))
        })
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&post.id) || Self::conflicts(&store, &post) {
            return Err(RepoError::Duplicate("Entity already exists".to_string()));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        if Self::conflicts(&store, &post) {
            return Err(RepoError::Duplicate("Entity already exists".to_string()));
        }
        store.insert(post.id, post.clone());
        Ok(post)
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
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .find(|p| p.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|p| p.title == title).cloned())
    }

    async fn paginate(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;
        let mut matching: Vec<&Post> = store.values().filter(|p| filter.matches(p)).collect();
        matching.sort_by_key(|p| Reverse(p.updated_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.per_page as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    async fn delete_with_comments(&self, post_id: Uuid) -> Result<u64, RepoError> {
        // Lock order: posts, then comments.
        let mut posts = self.store.write().await;
        if !posts.contains_key(&post_id) {
            return Err(RepoError::NotFound);
        }

        let mut comments = self.comments.store.write().await;
        let before = comments.len();
        comments.retain(|_, c| c.post_id != post_id);
        posts.remove(&post_id);

        Ok((before - comments.len()) as u64)
    }
}
