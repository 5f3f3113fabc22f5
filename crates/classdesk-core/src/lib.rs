//! # Classdesk Core
//!
//! Core types, errors, and the permission catalog for the Classdesk API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`permissions`]: The closed catalog of permissions, grouped by subject area
//! - [`roles`]: Validated role names and the default role definitions
//!
//! # Example
//!
//! ```ignore
//! use classdesk_core::errors::AppError;
//! use classdesk_core::permissions::Permission;
//! use classdesk_core::roles::RoleName;
//!
//! let permission: Permission = "CreateAssignment".parse()?;
//! let role = RoleName::parse("Teacher")?;
//!
//! let error = AppError::forbidden(format!("{role} lacks {permission}"));
//! ```

pub mod errors;
pub mod permissions;
pub mod roles;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorResponse, ErrorStatus, StatusCode};
pub use permissions::{Permission, PermissionSet, SubjectArea, UnknownPermission};
pub use roles::{RoleName, RoleNameError};
