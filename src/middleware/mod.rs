//! Authentication and authorization for request handling.
//!
//! - [`auth`]: Identity providers and the `AuthUser` extractor
//! - [`permission`]: The authorization gate, its route middleware and extractors
//!
//! # Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. The identity provider turns the token into an `Identity` (or nothing: 401)
//! 3. The gate resolves the caller's roles from the store and checks the
//!    required permission (missing: 403)
//! 4. The handler runs
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::permission::RequireManagePermissions;
//!
//! async fn update_role_permissions(
//!     RequireManagePermissions(actor): RequireManagePermissions,
//! ) -> impl IntoResponse {
//!     // Only runs when the caller's roles grant ManagePermissions
//! }
//! ```

pub mod auth;
pub mod permission;
