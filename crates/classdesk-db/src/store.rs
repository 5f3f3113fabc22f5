//! Store traits for roles, their permission claims, and user memberships.
//!
//! Both traits promise replace-set semantics: a replacement is applied as a
//! whole, so a concurrent reader observes either the previous complete set or
//! the new complete set.

use std::collections::BTreeSet;

use async_trait::async_trait;
use classdesk_core::{Permission, PermissionSet, RoleName};
use tracing::warn;
use uuid::Uuid;

/// Claim type under which permissions are attached to a role.
pub const PERMISSION_CLAIM_TYPE: &str = "permission";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Role not found: {0}")]
    RoleNotFound(RoleName),
    #[error("User not found: {0}")]
    UserNotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// A `(type, value)` pair attached to a role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoleClaim {
    pub claim_type: String,
    pub claim_value: String,
}

impl RoleClaim {
    pub fn new(claim_type: impl Into<String>, claim_value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }

    pub fn permission(permission: Permission) -> Self {
        Self::new(PERMISSION_CLAIM_TYPE, permission.as_str())
    }

    pub fn is_permission(&self) -> bool {
        self.claim_type == PERMISSION_CLAIM_TYPE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithRoles {
    pub user: UserRecord,
    pub roles: Vec<RoleName>,
}

/// Source of truth for what each role grants.
#[async_trait]
pub trait RolePermissionStore: Send + Sync {
    /// Permissions currently granted by `role`. Empty when the role does not exist.
    async fn get_permissions(&self, role: &RoleName) -> StoreResult<PermissionSet>;

    /// Replaces every permission claim of `role` with `permissions`.
    /// Claims of other types are kept.
    async fn replace_permissions(
        &self,
        role: &RoleName,
        permissions: &PermissionSet,
    ) -> StoreResult<()>;

    /// All role names, sorted.
    async fn list_roles(&self) -> StoreResult<Vec<RoleName>>;

    async fn role_exists(&self, role: &RoleName) -> StoreResult<bool>;

    /// Creates `role` with no claims. Returns `false` if it already existed.
    async fn create_role(&self, role: &RoleName) -> StoreResult<bool>;
}

/// User registry and role memberships.
#[async_trait]
pub trait UserRoleStore: Send + Sync {
    /// Role names held by the user. Empty for an unknown user.
    async fn roles_of(&self, user_id: Uuid) -> StoreResult<Vec<RoleName>>;

    /// Replaces the user's memberships with exactly `roles`.
    async fn replace_roles(&self, user_id: Uuid, roles: &BTreeSet<RoleName>) -> StoreResult<()>;

    /// Every user with their roles, sorted by email.
    async fn list_users(&self) -> StoreResult<Vec<UserWithRoles>>;

    /// Returns the user with `email`, creating it when missing.
    async fn upsert_user(&self, email: &str, full_name: Option<&str>) -> StoreResult<UserRecord>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;
}

/// Parses stored permission claim values. Values outside the catalog grant nothing.
pub(crate) fn parse_permission_claims<I>(role: &RoleName, values: I) -> PermissionSet
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values
        .into_iter()
        .filter_map(|value| match value.as_ref().parse::<Permission>() {
            Ok(permission) => Some(permission),
            Err(err) => {
                warn!(role = %role, error = %err, "Ignoring unknown permission claim");
                None
            }
        })
        .collect()
}
