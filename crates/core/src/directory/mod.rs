//! Directory module - read-only student and program lookups.
//!
//! Students and programs are owned by admissions and program management;
//! the fee ledger only resolves them by id.

mod directory_model;
mod directory_traits;

pub use directory_model::{Program, ProgramStatus, Student, StudentStatus};
pub use directory_traits::{ProgramDirectoryTrait, StudentDirectoryTrait};
