//! # Taskdeck Shared Library
//!
//! Shared types and business logic used by the taskdeck API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and CRUD operations
//! - `auth`: Password hashing, token issuance, request authentication
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
