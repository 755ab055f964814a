//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use sova_core::domain::{Comment, Page, PageRequest, Post, User};
use sova_core::error::RepoError;
use sova_core::policy::PostFilter;
use sova_core::ports::{
    CommentRepository, PostRepository, RevokedTokenRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::revoked_token::{self, Entity as RevokedTokenEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};
use crate::pii::mask_email;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL revoked token repository.
pub type PostgresRevokedTokenRepository = PostgresBaseRepository<RevokedTokenEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Title.eq(title))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn paginate(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let mut query = PostEntity::find().order_by_desc(post::Column::UpdatedAt);

        if let PostFilter::PublishedAsOf(now) = filter {
            query = query
                .filter(post::Column::PublishedAt.is_not_null())
                .filter(post::Column::PublishedAt.lte(now));
        }

        let paginator = query.paginate(&self.db, page.per_page);
        let total = paginator.num_items().await.map_err(map_db_err)?;
        let items = paginator
            .fetch_page(page.page - 1)
            .await
            .map_err(map_db_err)?;

        Ok(Page {
            items: items.into_iter().map(Into::into).collect(),
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    async fn delete_with_comments(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let comments = CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        let deleted = PostEntity::delete_by_id(post_id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        // Dropping the transaction rolls the comment delete back.
        if deleted.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(comments.rows_affected)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post_id(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl RevokedTokenRepository for PostgresRevokedTokenRepository {
    async fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), RepoError> {
        let model = revoked_token::ActiveModel {
            jti: Set(token_id),
            expires_at: Set(expires_at.into()),
        };

        match model.insert(&self.db).await.map_err(map_db_err) {
            // Revoking twice is a no-op.
            Ok(_) | Err(RepoError::Duplicate(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn is_revoked(&self, token_id: Uuid) -> Result<bool, RepoError> {
        let found = RevokedTokenEntity::find_by_id(token_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(found.is_some())
    }
}
