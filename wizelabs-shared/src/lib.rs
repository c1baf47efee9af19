//! # Wizelabs Shared Library
//!
//! Data access and authentication shared by the Wizelabs API server and the
//! sync worker.
//!
//! ## Module Organization
//!
//! - `db`: connection pool and migrations
//! - `models`: one module per table with its queries
//! - `auth`: session tokens, role policy and permission checks

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Wizelabs shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
