//! SQLite storage implementation for the student and program directories.

mod model;
mod repository;

pub use model::{ProgramDB, StudentDB};
pub use repository::DirectoryRepository;
