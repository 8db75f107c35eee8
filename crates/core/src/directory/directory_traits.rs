use crate::errors::Result;

use super::directory_model::{Program, ProgramStatus, Student, StudentStatus};

/// Read-only access to the student registry of one academy.
pub trait StudentDirectoryTrait: Send + Sync {
    /// Looks up a student by id within the academy.
    fn get_student(&self, academy_no: &str, student_id: &str) -> Result<Student>;

    /// Lists students, optionally restricted to one status.
    fn list_students(
        &self,
        academy_no: &str,
        status_filter: Option<StudentStatus>,
    ) -> Result<Vec<Student>>;
}

/// Read-only access to the program catalog of one academy.
pub trait ProgramDirectoryTrait: Send + Sync {
    fn get_program(&self, academy_no: &str, program_id: &str) -> Result<Program>;

    fn list_programs(
        &self,
        academy_no: &str,
        status_filter: Option<ProgramStatus>,
    ) -> Result<Vec<Program>>;
}
