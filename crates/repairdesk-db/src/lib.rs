//! RepairDesk Database — SurrealDB connection management, schema
//! evolution, identifier seeding and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`],
//!   [`ensure_column`])
//! - Counter seeding from stored ids ([`initialize_counters`])
//! - Repository implementations of the `repairdesk-core` traits
//!   ([`repository`])
//! - Error types ([`DbError`])

mod connection;
mod error;
mod identity;
mod schema;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use identity::{initialize_counters, max_persisted_id};
pub use schema::{
    ColumnDefault, ColumnType, column_exists, current_version, ensure_column, latest_version,
    run_migrations, schema_v1,
};
