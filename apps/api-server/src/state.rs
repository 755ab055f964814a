//! Application state - shared across all handlers.

use std::sync::Arc;

use sova_core::ports::{
    CommentRepository, PostRepository, RevokedTokenRepository, UserRepository,
};
use sova_infra::database::{DatabaseConfig, DatabaseConnections};
use sova_infra::memory::{
    InMemoryCommentRepository, InMemoryPostRepository, InMemoryRevokedTokenRepository,
    InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
use sova_infra::database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresRevokedTokenRepository,
    PostgresUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub revoked_tokens: Arc<dyn RevokedTokenRepository>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        let state = match db_config {
            Some(config) => match DatabaseConnections::init(config).await {
                Ok(connections) => Self::postgres(Arc::new(connections)),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Failed to connect to database. Using in-memory fallback."
                    );
                    Self::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Self::in_memory()
        };

        tracing::info!("Application state initialized");
        state
    }

    #[cfg(feature = "postgres")]
    fn postgres(db: Arc<DatabaseConnections>) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(db.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.main.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.main.clone())),
            revoked_tokens: Arc::new(PostgresRevokedTokenRepository::new(db.main.clone())),
            db: Some(db),
        }
    }

    /// State backed by in-memory repositories. Data is lost on restart.
    pub fn in_memory() -> Self {
        let comments = Arc::new(InMemoryCommentRepository::new());
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::with_comments(comments.clone())),
            comments,
            revoked_tokens: Arc::new(InMemoryRevokedTokenRepository::new()),
            db: None,
        }
    }
}
