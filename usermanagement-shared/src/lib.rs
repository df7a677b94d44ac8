//! # User Management Shared Library
//!
//! Users, groups and the membership link between them, with soft deletes
//! throughout. The HTTP server in `usermanagement-api` is a thin layer over
//! the stores defined here.
//!
//! ## Module Organization
//!
//! - `store`: identity, group and membership stores holding the invariants
//! - `repository`: storage traits plus PostgreSQL and in-memory backends
//! - `models`: row types and their SQL
//! - `credential`: password salting and PBKDF2 encoding
//! - `pagination`: offset/limit windows and page envelopes
//! - `db`: connection pool and migrations
//! - `error`: the store error taxonomy

pub mod credential;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
