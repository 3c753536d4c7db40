//! Core library for Eventify.
//!
//! Holds the storage-agnostic repository contract for super users and
//! events, the three interchangeable backends (in-process, PostgreSQL,
//! SurrealDB), and the service layer that owns validation, password hashing
//! and reset-token generation.
#![allow(missing_docs)]

pub mod auth;
pub mod database;
pub mod error;
pub mod superusers;

pub use auth::{AuthCrypto, AuthCryptoError};
pub use database::context::{DatabaseBackend, DatabaseContext};
pub use database::ports::{events::EventRepository, superusers::SuperUserRepository};
pub use error::{CoreError, ErrorKind, Result};
pub use superusers::{SuperUserService, SuperUserServiceError};

pub use eventify_model as model;

/// Embedded schema migrations for the PostgreSQL backend.
#[cfg(feature = "postgres")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
