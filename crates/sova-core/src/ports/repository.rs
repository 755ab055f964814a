use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Comment, Page, PageRequest, Post, User};
use crate::error::RepoError;
use crate::policy::PostFilter;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Batch lookup, used to attach author names to posts and comments.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    async fn list_all(&self) -> Result<Vec<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn find_by_title(&self, title: &str) -> Result<Option<Post>, RepoError>;

    /// Most recently updated first, with `filter` applied before paging.
    async fn paginate(&self, filter: PostFilter, page: PageRequest)
    -> Result<Page<Post>, RepoError>;

    /// Delete a post together with its comments as one unit. Returns the
    /// number of comments removed, or `NotFound` with nothing deleted.
    async fn delete_with_comments(&self, post_id: Uuid) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post, oldest first.
    async fn find_by_post_id(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// Revocation list for access tokens invalidated before they expire.
#[async_trait]
pub trait RevokedTokenRepository: Send + Sync {
    async fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), RepoError>;

    async fn is_revoked(&self, token_id: Uuid) -> Result<bool, RepoError>;
}
