//! SQLite storage implementation for the academy fee ledger.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `academy-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for fee plans, challans, payments and directories
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!      core (domain)      server (HTTP)
//!            │                  │
//!            └────────┬─────────┘
//!                     │
//!                     ▼
//!          storage-sqlite (this crate)
//!                     │
//!                     ▼
//!                 SQLite DB
//! ```
//!
//! Every write goes through the single writer actor, which runs each job in
//! one immediate transaction. Two-table ledger updates (a payment and its
//! challan) are always one job.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod directory;
pub mod fees;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from academy-core for convenience
pub use academy_core::errors::{DatabaseError, Error, Result};
