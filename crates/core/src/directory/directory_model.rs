//! Student and program reference models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Graduated,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
            StudentStatus::Graduated => "graduated",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(StudentStatus::Active),
            "inactive" => Ok(StudentStatus::Inactive),
            "graduated" => Ok(StudentStatus::Graduated),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown student status '{}'",
                other
            )))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgramStatus {
    #[default]
    Active,
    Inactive,
}

impl ProgramStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramStatus::Active => "active",
            ProgramStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgramStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProgramStatus::Active),
            "inactive" => Ok(ProgramStatus::Inactive),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown program status '{}'",
                other
            )))),
        }
    }
}

/// A student as seen by the fee ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub academy_no: String,
    pub name: String,
    pub status: StudentStatus,
}

impl Student {
    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}

/// A program as seen by the fee ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub academy_no: String,
    pub code: String,
    pub name: String,
    /// Catalog fee; new fee plans default their actual fee to this.
    pub fee_amount: Option<Decimal>,
    pub status: ProgramStatus,
}

impl Program {
    pub fn is_active(&self) -> bool {
        self.status == ProgramStatus::Active
    }
}
