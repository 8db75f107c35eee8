//! Academy Core - fee domain entities, services, and traits.
//!
//! This crate contains the fee ledger business logic for academy management.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod context;
pub mod directory;
pub mod errors;
pub mod fees;

pub use context::ActorContext;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
