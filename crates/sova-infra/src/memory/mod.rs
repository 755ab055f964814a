//! In-memory repositories - used when no database is configured and in tests.
//!
//! Data is lost on process restart. Uniqueness rules mirror the database
//! schema so callers see the same `RepoError::Duplicate` failures.

mod comments;
mod posts;
mod tokens;
mod users;

pub use comments::InMemoryCommentRepository;
pub use posts::InMemoryPostRepository;
pub use tokens::InMemoryRevokedTokenRepository;
pub use users::InMemoryUserRepository;
