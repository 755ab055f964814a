//! # Sova Infrastructure
//!
//! Concrete implementations of the ports defined in `sova-core`.
//! This crate contains the database repositories, the in-memory fallbacks,
//! and the authentication and rate limiting services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `rate-limit` - Rate limiting via governor

pub mod database;
pub mod memory;
pub mod pii;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use database::DatabaseConnections;
pub use memory::{
    InMemoryCommentRepository, InMemoryPostRepository, InMemoryRevokedTokenRepository,
    InMemoryUserRepository,
};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService, PasswordConfig};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
