//! Role names and the default role definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::permissions::{Permission, PermissionSet};

pub const ADMIN: &str = "Admin";
pub const TEACHER: &str = "Teacher";
pub const STUDENT: &str = "Student";

/// Longest role name accepted.
pub const MAX_ROLE_NAME_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleNameError {
    #[error("Role name must not be empty")]
    Empty,
    #[error("Role name must not exceed 64 characters")]
    TooLong,
}

/// A validated role name. Trimmed, non-empty, compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    pub fn parse(raw: &str) -> Result<Self, RoleNameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RoleNameError::Empty);
        }
        if trimmed.chars().count() > MAX_ROLE_NAME_LEN {
            return Err(RoleNameError::TooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoleName {
    type Error = RoleNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roles created at initialization together with the permissions they start with.
pub fn default_roles() -> Vec<(RoleName, PermissionSet)> {
    let admin = [
        Permission::ManageUsers,
        Permission::ManageRoles,
        Permission::ManagePermissions,
        Permission::CreateAssignment,
        Permission::EditAssignment,
        Permission::DeleteAssignment,
        Permission::GradeAssignment,
        Permission::ViewStudentSubmissions,
        Permission::ViewAssignments,
    ];
    let teacher = [
        Permission::CreateAssignment,
        Permission::EditAssignment,
        Permission::DeleteAssignment,
        Permission::GradeAssignment,
        Permission::ViewStudentSubmissions,
        Permission::ViewAssignments,
    ];
    let student = [
        Permission::ViewAssignments,
        Permission::SubmitAssignment,
        Permission::ViewGrades,
    ];

    vec![
        (RoleName(ADMIN.to_string()), admin.into_iter().collect()),
        (RoleName(TEACHER.to_string()), teacher.into_iter().collect()),
        (RoleName(STUDENT.to_string()), student.into_iter().collect()),
    ]
}
