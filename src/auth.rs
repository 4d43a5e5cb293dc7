use std::fmt;

use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Patient,
    Doctor,
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "patient" => Role::Patient,
            "doctor" => Role::Doctor,
            other => Role::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => f.write_str("patient"),
            Role::Doctor => f.write_str("doctor"),
            Role::Other(name) => f.write_str(name),
        }
    }
}

/// The authenticated caller, passed explicitly into every service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(subject_id: Uuid, role: Role) -> Self {
        Self { subject_id, role }
    }

    pub fn patient(subject_id: Uuid) -> Self {
        Self::new(subject_id, Role::Patient)
    }

    pub fn doctor(subject_id: Uuid) -> Self {
        Self::new(subject_id, Role::Doctor)
    }

    /// Forbidden with `message` unless the caller holds `role`.
    pub fn require(&self, role: Role, message: &str) -> AppResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(message.to_string()))
        }
    }
}
