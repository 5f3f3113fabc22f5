use std::sync::Arc;

use classdesk_core::{Permission, PermissionSet, RoleName};
use classdesk_db::{RolePermissionStore, UserRoleStore};
use tracing::{instrument, warn};
use uuid::Uuid;

/// Answers "does this user hold this permission" from the stores, on every call.
///
/// Lookups fail closed: a storage error is logged and counts as granting nothing.
#[derive(Clone)]
pub struct PermissionResolver {
    roles: Arc<dyn RolePermissionStore>,
    memberships: Arc<dyn UserRoleStore>,
}

impl PermissionResolver {
    pub fn new(roles: Arc<dyn RolePermissionStore>, memberships: Arc<dyn UserRoleStore>) -> Self {
        Self { roles, memberships }
    }

    /// Roles held by the user. Empty if the membership lookup fails.
    #[instrument(skip(self))]
    pub async fn roles_of(&self, user_id: Uuid) -> Vec<RoleName> {
        match self.memberships.roles_of(user_id).await {
            Ok(roles) => roles,
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "Role lookup failed, denying");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn user_has_permission(&self, user_id: Uuid, permission: Permission) -> bool {
        for role in self.roles_of(user_id).await {
            match self.roles.get_permissions(&role).await {
                Ok(granted) if granted.contains(&permission) => return true,
                Ok(_) => {}
                Err(err) => {
                    warn!(role = %role, error = %err, "Permission lookup failed, skipping role");
                }
            }
        }
        false
    }

    /// Union of the permissions granted by every role the user holds.
    #[instrument(skip(self))]
    pub async fn effective_permissions(&self, user_id: Uuid) -> PermissionSet {
        let roles = self.roles_of(user_id).await;
        self.permissions_of_roles(&roles).await
    }

    /// Union of the permissions granted by `roles`. A role whose lookup fails adds nothing.
    pub async fn permissions_of_roles(&self, roles: &[RoleName]) -> PermissionSet {
        let mut effective = PermissionSet::new();
        for role in roles {
            match self.roles.get_permissions(role).await {
                Ok(granted) => effective.extend(granted),
                Err(err) => {
                    warn!(role = %role, error = %err, "Permission lookup failed, skipping role");
                }
            }
        }
        effective
    }
}
