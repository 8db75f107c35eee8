//! Database models for students and programs.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::{parse_decimal_tolerant, parse_enum_tolerant};
use academy_core::directory::{Program, Student};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StudentDB {
    pub id: String,
    pub academy_no: String,
    pub name: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::programs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProgramDB {
    pub id: String,
    pub academy_no: String,
    pub code: String,
    pub name: String,
    pub fee_amount: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<StudentDB> for Student {
    fn from(db: StudentDB) -> Self {
        Self {
            status: parse_enum_tolerant(&db.status, "student status"),
            id: db.id,
            academy_no: db.academy_no,
            name: db.name,
        }
    }
}

impl From<Student> for StudentDB {
    fn from(domain: Student) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id,
            academy_no: domain.academy_no,
            name: domain.name,
            status: domain.status.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<ProgramDB> for Program {
    fn from(db: ProgramDB) -> Self {
        Self {
            fee_amount: db
                .fee_amount
                .as_deref()
                .map(|v| parse_decimal_tolerant(v, "program fee_amount")),
            status: parse_enum_tolerant(&db.status, "program status"),
            id: db.id,
            academy_no: db.academy_no,
            code: db.code,
            name: db.name,
        }
    }
}

impl From<Program> for ProgramDB {
    fn from(domain: Program) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id,
            academy_no: domain.academy_no,
            code: domain.code,
            name: domain.name,
            fee_amount: domain.fee_amount.map(|f| f.to_string()),
            status: domain.status.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
