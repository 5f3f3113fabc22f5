//! Administrative changes to roles, their permissions and user memberships.
//!
//! Shared by the HTTP admin endpoints and the CLI so both write paths apply
//! the same validation and logging.

use std::collections::BTreeSet;
use std::sync::Arc;

use classdesk_core::{
    ErrorStatus, Permission, PermissionSet, RoleName, RoleNameError, StatusCode,
    UnknownPermission,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::store::{RolePermissionStore, StoreError, UserRecord, UserRoleStore, UserWithRoles};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Role not found: {0}")]
    RoleNotFound(RoleName),
    #[error("User not found: {0}")]
    UserNotFound(Uuid),
    #[error("No user with email {0}")]
    UnknownEmail(String),
    #[error(transparent)]
    UnknownPermission(#[from] UnknownPermission),
    #[error("Invalid role name: {0}")]
    InvalidRoleName(#[from] RoleNameError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RoleNotFound(role) => AdminError::RoleNotFound(role),
            StoreError::UserNotFound(id) => AdminError::UserNotFound(id),
            other => AdminError::Store(other),
        }
    }
}

impl ErrorStatus for AdminError {
    fn status(&self) -> StatusCode {
        match self {
            AdminError::RoleNotFound(_)
            | AdminError::UserNotFound(_)
            | AdminError::UnknownEmail(_) => StatusCode::NOT_FOUND,
            AdminError::UnknownPermission(_) | AdminError::InvalidRoleName(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AdminError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Administrative changes to roles, their permissions and user memberships.
///
/// Every input is validated before the store is touched, so a rejected call
/// leaves all state as it was.
#[derive(Clone)]
pub struct RoleMembershipAdmin {
    roles: Arc<dyn RolePermissionStore>,
    memberships: Arc<dyn UserRoleStore>,
}

impl RoleMembershipAdmin {
    pub fn new(roles: Arc<dyn RolePermissionStore>, memberships: Arc<dyn UserRoleStore>) -> Self {
        Self { roles, memberships }
    }

    /// Replaces the user's roles with exactly `role_names`. Duplicates collapse.
    #[instrument(skip(self))]
    pub async fn set_user_roles<S>(
        &self,
        user_id: Uuid,
        role_names: &[S],
    ) -> Result<BTreeSet<RoleName>, AdminError>
    where
        S: AsRef<str> + std::fmt::Debug,
    {
        let roles = role_names
            .iter()
            .map(|name| RoleName::parse(name.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()?;

        self.memberships.replace_roles(user_id, &roles).await?;

        info!(user_id = %user_id, roles = ?roles, "Replaced user roles");
        Ok(roles)
    }

    /// Looks the user up by email, then behaves like [`Self::set_user_roles`].
    pub async fn set_user_roles_by_email<S>(
        &self,
        email: &str,
        role_names: &[S],
    ) -> Result<(UserRecord, BTreeSet<RoleName>), AdminError>
    where
        S: AsRef<str> + std::fmt::Debug,
    {
        let user = self
            .memberships
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AdminError::UnknownEmail(email.to_string()))?;

        let roles = self.set_user_roles(user.id, role_names).await?;
        Ok((user, roles))
    }

    /// Replaces the permissions `role` grants. Every name must be in the catalog.
    ///
    /// Returns the normalized role name with the set now stored.
    #[instrument(skip(self))]
    pub async fn set_role_permissions<S>(
        &self,
        role: &str,
        permissions: &[S],
    ) -> Result<(RoleName, PermissionSet), AdminError>
    where
        S: AsRef<str> + std::fmt::Debug,
    {
        let role = RoleName::parse(role)?;
        let permissions = Permission::parse_all(permissions)?;

        self.roles.replace_permissions(&role, &permissions).await?;

        info!(role = %role, count = permissions.len(), "Replaced role permissions");
        Ok((role, permissions))
    }

    pub async fn list_roles(&self) -> Result<Vec<RoleName>, AdminError> {
        Ok(self.roles.list_roles().await?)
    }

    /// Permissions granted by `role`, with the role name as it was matched.
    ///
    /// A role that does not exist grants nothing. That includes names no role
    /// could ever have, which read as an empty set rather than an error.
    pub async fn role_permissions(
        &self,
        role: &str,
    ) -> Result<(String, PermissionSet), AdminError> {
        match RoleName::parse(role) {
            Ok(role) => {
                let permissions = self.roles.get_permissions(&role).await?;
                Ok((role.into(), permissions))
            }
            Err(err) => {
                debug!(role = %role, error = %err, "Unusable role name, no permissions");
                Ok((role.trim().to_string(), PermissionSet::new()))
            }
        }
    }

    pub async fn list_users_with_roles(&self) -> Result<Vec<UserWithRoles>, AdminError> {
        Ok(self.memberships.list_users().await?)
    }

    /// Creates an empty role. The flag is `false` when the role already existed.
    #[instrument(skip(self))]
    pub async fn create_role(&self, name: &str) -> Result<(RoleName, bool), AdminError> {
        let role = RoleName::parse(name)?;
        let created = self.roles.create_role(&role).await?;

        if created {
            info!(role = %role, "Created role");
        }
        Ok((role, created))
    }
}

#[cfg(test)]
mod tests {
    use crate::InMemoryRbacStore;

    use super::*;

    async fn admin_with_roles(names: &[&str]) -> (RoleMembershipAdmin, Arc<InMemoryRbacStore>) {
        let store = Arc::new(InMemoryRbacStore::new());
        for name in names {
            store
                .create_role(&RoleName::parse(name).unwrap())
                .await
                .unwrap();
        }
        (RoleMembershipAdmin::new(store.clone(), store.clone()), store)
    }

    #[tokio::test]
    async fn test_set_role_permissions_rejects_unknown_permission() {
        let (admin, store) = admin_with_roles(&["Teacher"]).await;
        admin
            .set_role_permissions("Teacher", &["ViewAssignments"])
            .await
            .unwrap();

        let err = admin
            .set_role_permissions("Teacher", &["GradeAssignment", "Teleport"])
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::UnknownPermission(ref p) if p.0 == "Teleport"));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let teacher = RoleName::parse("Teacher").unwrap();
        assert_eq!(
            store.get_permissions(&teacher).await.unwrap(),
            PermissionSet::from([Permission::ViewAssignments])
        );
    }

    #[tokio::test]
    async fn test_set_role_permissions_unknown_role() {
        let (admin, store) = admin_with_roles(&["Teacher"]).await;
        let err = admin
            .set_role_permissions("Janitor", &["ManageUsers"])
            .await
            .unwrap_err();

        assert!(matches!(err, AdminError::RoleNotFound(ref r) if r.as_str() == "Janitor"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            store.list_roles().await.unwrap(),
            vec![RoleName::parse("Teacher").unwrap()]
        );
    }

    #[tokio::test]
    async fn test_set_user_roles_collapses_duplicates() {
        let (admin, store) = admin_with_roles(&["Teacher", "Student"]).await;
        let user = store.upsert_user("u@test.com", None).await.unwrap();

        let applied = admin
            .set_user_roles(user.id, &["Teacher", "Teacher", " Student "])
            .await
            .unwrap();
        assert_eq!(applied.len(), 2);
        assert_eq!(store.roles_of(user.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_user_roles_errors() {
        let (admin, store) = admin_with_roles(&["Teacher"]).await;
        let user = store.upsert_user("u@test.com", None).await.unwrap();

        let err = admin
            .set_user_roles(Uuid::new_v4(), &["Teacher"])
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::UserNotFound(_)));

        let err = admin.set_user_roles(user.id, &["Ghost"]).await.unwrap_err();
        assert!(matches!(err, AdminError::RoleNotFound(_)));

        let err = admin.set_user_roles(user.id, &["  "]).await.unwrap_err();
        assert!(matches!(err, AdminError::InvalidRoleName(RoleNameError::Empty)));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        assert!(store.roles_of(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_role_reports_existing() {
        let (admin, _) = admin_with_roles(&["Teacher"]).await;

        let (role, created) = admin.create_role("Librarian").await.unwrap();
        assert_eq!(role.as_str(), "Librarian");
        assert!(created);

        let (_, created) = admin.create_role("Teacher").await.unwrap();
        assert!(!created);
    }

    #[tokio::test]
    async fn test_role_permissions_of_unknown_role_is_empty() {
        let (admin, _) = admin_with_roles(&[]).await;
        let (role, permissions) = admin.role_permissions("Nobody").await.unwrap();
        assert_eq!(role, "Nobody");
        assert!(permissions.is_empty());
    }

    #[tokio::test]
    async fn test_role_permissions_of_impossible_name_is_empty() {
        let (admin, _) = admin_with_roles(&["Teacher"]).await;

        let (_, permissions) = admin.role_permissions(&"r".repeat(65)).await.unwrap();
        assert!(permissions.is_empty());

        let (role, permissions) = admin.role_permissions("   ").await.unwrap();
        assert_eq!(role, "");
        assert!(permissions.is_empty());
    }

    #[tokio::test]
    async fn test_set_role_permissions_returns_normalized_name() {
        let (admin, store) = admin_with_roles(&["Teacher"]).await;

        let (role, permissions) = admin
            .set_role_permissions(" Teacher ", &["GradeAssignment"])
            .await
            .unwrap();
        assert_eq!(role.as_str(), "Teacher");
        assert_eq!(store.get_permissions(&role).await.unwrap(), permissions);

        let (role, _) = admin.role_permissions(" Teacher ").await.unwrap();
        assert_eq!(role, "Teacher");
    }

    #[tokio::test]
    async fn test_set_user_roles_by_email() {
        let (admin, store) = admin_with_roles(&["Teacher", "Student"]).await;
        let user = store.upsert_user("t@test.com", None).await.unwrap();

        let (found, roles) = admin
            .set_user_roles_by_email("t@test.com", &["Teacher"])
            .await
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(roles.len(), 1);
        assert_eq!(
            store.roles_of(user.id).await.unwrap(),
            vec![RoleName::parse("Teacher").unwrap()]
        );

        let err = admin
            .set_user_roles_by_email("ghost@test.com", &["Teacher"])
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::UnknownEmail(ref e) if e == "ghost@test.com"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = admin
            .set_user_roles_by_email("t@test.com", &["Teacher", ""])
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::InvalidRoleName(_)));
        assert_eq!(store.roles_of(user.id).await.unwrap().len(), 1);
    }

    #[test]
    fn test_store_errors_map_to_admin_errors() {
        let err = AdminError::from(StoreError::Unavailable("down".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let id = Uuid::new_v4();
        assert!(matches!(
            AdminError::from(StoreError::UserNotFound(id)),
            AdminError::UserNotFound(found) if found == id
        ));
    }
}
