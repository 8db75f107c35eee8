//! Identity context passed into every tenant-scoped operation.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// The academy (tenant) a request acts on and the staff user acting.
///
/// `academy_no` scopes every read and write; `user_id` is only stamped onto
/// `created_by` / `updated_by` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorContext {
    pub academy_no: String,
    pub user_id: Option<String>,
}

impl ActorContext {
    pub fn new(academy_no: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            academy_no: academy_no.into(),
            user_id,
        }
    }

    /// Rejects a context without a tenant; nothing may run unscoped.
    pub fn validate(&self) -> Result<()> {
        if self.academy_no.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "academy_no".to_string(),
            )));
        }
        Ok(())
    }
}
