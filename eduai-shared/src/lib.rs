//! # EduAI Shared Library
//!
//! Domain types and business logic of the EduAI classroom backend, used by
//! the API server.
//!
//! ## Module Organization
//!
//! - `class_code`: class code generation and validation
//! - `classroom`: the course membership coordinator and content operations
//! - `auth`: password hashing, JWTs, request authentication, content gate
//! - `store`: the record store trait with PostgreSQL and in-memory backends
//! - `models`: database models and their queries
//! - `db`: connection pool and migrations

pub mod auth;
pub mod class_code;
pub mod classroom;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the EduAI shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
