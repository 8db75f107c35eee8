use academy_core::directory::{
    Program, ProgramDirectoryTrait, ProgramStatus, Student, StudentDirectoryTrait, StudentStatus,
};
use academy_core::Result;

use super::model::{ProgramDB, StudentDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{programs, students};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

/// Student and program lookups backed by the academy's own tables.
pub struct DirectoryRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl DirectoryRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        DirectoryRepository { pool, writer }
    }

    /// Registers a student. Admissions owns this data; the ledger never calls it.
    pub async fn insert_student(&self, student: Student) -> Result<Student> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Student> {
                let row = diesel::insert_into(students::table)
                    .values(StudentDB::from(student))
                    .returning(StudentDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Student::from(row))
            })
            .await
    }

    /// Registers a program in the catalog.
    pub async fn insert_program(&self, program: Program) -> Result<Program> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Program> {
                let row = diesel::insert_into(programs::table)
                    .values(ProgramDB::from(program))
                    .returning(ProgramDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Program::from(row))
            })
            .await
    }
}

impl StudentDirectoryTrait for DirectoryRepository {
    fn get_student(&self, academy_no: &str, student_id: &str) -> Result<Student> {
        let mut conn = get_connection(&self.pool)?;
        let row = students::table
            .filter(students::academy_no.eq(academy_no))
            .filter(students::id.eq(student_id))
            .select(StudentDB::as_select())
            .first::<StudentDB>(&mut conn)
            .into_core()?;
        Ok(Student::from(row))
    }

    fn list_students(
        &self,
        academy_no: &str,
        status_filter: Option<StudentStatus>,
    ) -> Result<Vec<Student>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = students::table
            .filter(students::academy_no.eq(academy_no))
            .into_boxed();
        if let Some(status) = status_filter {
            query = query.filter(students::status.eq(status.as_str()));
        }
        let rows = query
            .order(students::name.asc())
            .select(StudentDB::as_select())
            .load::<StudentDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Student::from).collect())
    }
}

impl ProgramDirectoryTrait for DirectoryRepository {
    fn get_program(&self, academy_no: &str, program_id: &str) -> Result<Program> {
        let mut conn = get_connection(&self.pool)?;
        let row = programs::table
            .filter(programs::academy_no.eq(academy_no))
            .filter(programs::id.eq(program_id))
            .select(ProgramDB::as_select())
            .first::<ProgramDB>(&mut conn)
            .into_core()?;
        Ok(Program::from(row))
    }

    fn list_programs(
        &self,
        academy_no: &str,
        status_filter: Option<ProgramStatus>,
    ) -> Result<Vec<Program>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = programs::table
            .filter(programs::academy_no.eq(academy_no))
            .into_boxed();
        if let Some(status) = status_filter {
            query = query.filter(programs::status.eq(status.as_str()));
        }
        let rows = query
            .order(programs::name.asc())
            .select(ProgramDB::as_select())
            .load::<ProgramDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Program::from).collect())
    }
}
