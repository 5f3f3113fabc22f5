//! The permission catalog for the Classdesk API.
//!
//! Permissions form a closed set known at build time. Each one belongs to a
//! subject area (admin, teacher, student) and has a stable wire name, which is
//! what gets stored as a role claim and what clients send to the admin API.
//!
//! # Example
//!
//! ```ignore
//! use classdesk_core::permissions::{Permission, PermissionSet};
//!
//! let requested: Permission = "GradeAssignment".parse()?;
//! let granted: PermissionSet = [Permission::GradeAssignment].into_iter().collect();
//!
//! assert!(granted.contains(&requested));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A set of permissions. Ordered so listings are stable.
pub type PermissionSet = BTreeSet<Permission>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    // =========================================================================
    // Admin permissions
    // =========================================================================
    /// Manage users and their role memberships
    ManageUsers,
    /// List and create roles
    ManageRoles,
    /// Change the permissions a role grants
    ManagePermissions,

    // =========================================================================
    // Teacher permissions
    // =========================================================================
    /// Create assignments
    CreateAssignment,
    /// Edit assignments
    EditAssignment,
    /// Delete assignments
    DeleteAssignment,
    /// Grade student submissions
    GradeAssignment,
    /// View submissions made by students
    ViewStudentSubmissions,

    // =========================================================================
    // Student permissions
    // =========================================================================
    /// View assignments
    ViewAssignments,
    /// Submit work for an assignment
    SubmitAssignment,
    /// View own grades
    ViewGrades,
}

/// The group a permission is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubjectArea {
    Admin,
    Teacher,
    Student,
}

impl SubjectArea {
    pub const ALL: [SubjectArea; 3] = [SubjectArea::Admin, SubjectArea::Teacher, SubjectArea::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectArea::Admin => "admin",
            SubjectArea::Teacher => "teacher",
            SubjectArea::Student => "student",
        }
    }
}

/// Returned when a string does not name a catalog permission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl Permission {
    /// Every permission in the catalog, in declaration order.
    pub const ALL: [Permission; 11] = [
        Permission::ManageUsers,
        Permission::ManageRoles,
        Permission::ManagePermissions,
        Permission::CreateAssignment,
        Permission::EditAssignment,
        Permission::DeleteAssignment,
        Permission::GradeAssignment,
        Permission::ViewStudentSubmissions,
        Permission::ViewAssignments,
        Permission::SubmitAssignment,
        Permission::ViewGrades,
    ];

    /// Wire name, as stored in role claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageUsers => "ManageUsers",
            Permission::ManageRoles => "ManageRoles",
            Permission::ManagePermissions => "ManagePermissions",
            Permission::CreateAssignment => "CreateAssignment",
            Permission::EditAssignment => "EditAssignment",
            Permission::DeleteAssignment => "DeleteAssignment",
            Permission::GradeAssignment => "GradeAssignment",
            Permission::ViewStudentSubmissions => "ViewStudentSubmissions",
            Permission::ViewAssignments => "ViewAssignments",
            Permission::SubmitAssignment => "SubmitAssignment",
            Permission::ViewGrades => "ViewGrades",
        }
    }

    pub fn subject_area(&self) -> SubjectArea {
        match self {
            Permission::ManageUsers | Permission::ManageRoles | Permission::ManagePermissions => {
                SubjectArea::Admin
            }
            Permission::CreateAssignment
            | Permission::EditAssignment
            | Permission::DeleteAssignment
            | Permission::GradeAssignment
            | Permission::ViewStudentSubmissions => SubjectArea::Teacher,
            Permission::ViewAssignments | Permission::SubmitAssignment | Permission::ViewGrades => {
                SubjectArea::Student
            }
        }
    }

    /// Catalog entries for one subject area.
    pub fn in_area(area: SubjectArea) -> impl Iterator<Item = Permission> {
        Self::ALL
            .into_iter()
            .filter(move |permission| permission.subject_area() == area)
    }

    /// Parses every string, failing on the first one outside the catalog.
    pub fn parse_all<I, S>(names: I) -> Result<PermissionSet, UnknownPermission>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect()
    }
}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
