//! Users and departments.
//!
//! Both are reference data: accounts and departments are created by the
//! admin side and only read here. The lifecycle engine never writes either
//! table, and a lookup failure is treated as "unknown" where a display value
//! is all that is needed.

use serde::{Deserialize, Serialize};

use super::ids::{DepartmentId, UserId};

/// Department name shown when a ticket has none, or its department is gone.
pub const UNASSIGNED_DEPARTMENT: &str = "Tidak Ditentukan";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    /// Support staff may act on any ticket.
    pub is_staff: bool,
}

impl User {
    /// "First Last" when either part is set, otherwise the username.
    pub fn display_name(&self) -> String {
        if !self.first_name.is_empty() || !self.last_name.is_empty() {
            format!("{} {}", self.first_name, self.last_name)
        } else {
            self.username.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

/// Resolves the department name for display.
pub fn department_name(department: Option<&Department>) -> String {
    department
        .map(|d| d.name.clone())
        .unwrap_or_else(|| UNASSIGNED_DEPARTMENT.to_string())
}
