//! # Sova Core
//!
//! The domain layer of the Sova blog backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the blog entities, the authorization policy, and the ports that
//! infrastructure must implement.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;

pub use error::{AccessDenied, DomainError};
pub use policy::{Actor, Policy, PostFilter};
