//! In-process store backed by a single lock.
//!
//! Every mutation runs inside one write-lock critical section, which gives the
//! same all-or-nothing visibility the Postgres store gets from a transaction.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use classdesk_core::{PermissionSet, RoleName};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{
    RoleClaim, RolePermissionStore, StoreError, StoreResult, UserRecord, UserRoleStore,
    UserWithRoles, parse_permission_claims,
};

#[derive(Debug, Clone)]
struct UserEntry {
    record: UserRecord,
    roles: BTreeSet<RoleName>,
}

#[derive(Debug, Default)]
struct RbacState {
    roles: BTreeMap<RoleName, Vec<RoleClaim>>,
    users: BTreeMap<Uuid, UserEntry>,
}

#[derive(Debug, Default)]
pub struct InMemoryRbacStore {
    state: RwLock<RbacState>,
}

impl InMemoryRbacStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an arbitrary claim to an existing role.
    pub async fn add_claim(&self, role: &RoleName, claim: RoleClaim) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let claims = state
            .roles
            .get_mut(role)
            .ok_or_else(|| StoreError::RoleNotFound(role.clone()))?;

        if !claims.contains(&claim) {
            claims.push(claim);
        }
        Ok(())
    }

    /// Every claim on `role`, sorted. Empty when the role does not exist.
    pub async fn claims_of(&self, role: &RoleName) -> Vec<RoleClaim> {
        let state = self.state.read().await;
        let mut claims = state.roles.get(role).cloned().unwrap_or_default();
        claims.sort();
        claims
    }
}

#[async_trait]
impl RolePermissionStore for InMemoryRbacStore {
    async fn get_permissions(&self, role: &RoleName) -> StoreResult<PermissionSet> {
        let state = self.state.read().await;
        let Some(claims) = state.roles.get(role) else {
            return Ok(PermissionSet::new());
        };

        Ok(parse_permission_claims(
            role,
            claims
                .iter()
                .filter(|claim| claim.is_permission())
                .map(|claim| claim.claim_value.as_str()),
        ))
    }

    async fn replace_permissions(
        &self,
        role: &RoleName,
        permissions: &PermissionSet,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let claims = state
            .roles
            .get_mut(role)
            .ok_or_else(|| StoreError::RoleNotFound(role.clone()))?;

        claims.retain(|claim| !claim.is_permission());
        claims.extend(permissions.iter().copied().map(RoleClaim::permission));
        Ok(())
    }

    async fn list_roles(&self) -> StoreResult<Vec<RoleName>> {
        Ok(self.state.read().await.roles.keys().cloned().collect())
    }

    async fn role_exists(&self, role: &RoleName) -> StoreResult<bool> {
        Ok(self.state.read().await.roles.contains_key(role))
    }

    async fn create_role(&self, role: &RoleName) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if state.roles.contains_key(role) {
            return Ok(false);
        }
        state.roles.insert(role.clone(), Vec::new());
        Ok(true)
    }
}

#[async_trait]
impl UserRoleStore for InMemoryRbacStore {
    async fn roles_of(&self, user_id: Uuid) -> StoreResult<Vec<RoleName>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&user_id)
            .map(|entry| entry.roles.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn replace_roles(&self, user_id: Uuid, roles: &BTreeSet<RoleName>) -> StoreResult<()> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&user_id) {
            return Err(StoreError::UserNotFound(user_id));
        }
        if let Some(missing) = roles.iter().find(|role| !state.roles.contains_key(*role)) {
            return Err(StoreError::RoleNotFound(missing.clone()));
        }

        if let Some(entry) = state.users.get_mut(&user_id) {
            entry.roles = roles.clone();
        }
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<UserWithRoles>> {
        let state = self.state.read().await;
        let mut users: Vec<UserWithRoles> = state
            .users
            .values()
            .map(|entry| UserWithRoles {
                user: entry.record.clone(),
                roles: entry.roles.iter().cloned().collect(),
            })
            .collect();
        users.sort_by(|a, b| a.user.email.cmp(&b.user.email));
        Ok(users)
    }

    async fn upsert_user(&self, email: &str, full_name: Option<&str>) -> StoreResult<UserRecord> {
        let mut state = self.state.write().await;

        if let Some(entry) = state.users.values().find(|entry| entry.record.email == email) {
            return Ok(entry.record.clone());
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: full_name.map(str::to_string),
        };
        state.users.insert(
            record.id,
            UserEntry {
                record: record.clone(),
                roles: BTreeSet::new(),
            },
        );
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|entry| entry.record.email == email)
            .map(|entry| entry.record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use classdesk_core::Permission;

    use super::*;

    fn role(name: &str) -> RoleName {
        RoleName::parse(name).unwrap()
    }

    fn set(permissions: &[Permission]) -> PermissionSet {
        permissions.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_unknown_role_has_no_permissions() {
        let store = InMemoryRbacStore::new();
        let permissions = store.get_permissions(&role("Ghost")).await.unwrap();
        assert!(permissions.is_empty());
    }

    #[tokio::test]
    async fn test_replace_then_read_returns_exact_set() {
        let store = InMemoryRbacStore::new();
        let teacher = role("Teacher");
        store.create_role(&teacher).await.unwrap();

        let first = set(&[Permission::CreateAssignment, Permission::GradeAssignment]);
        store.replace_permissions(&teacher, &first).await.unwrap();
        assert_eq!(store.get_permissions(&teacher).await.unwrap(), first);

        let second = set(&[Permission::GradeAssignment]);
        store.replace_permissions(&teacher, &second).await.unwrap();
        assert_eq!(store.get_permissions(&teacher).await.unwrap(), second);

        store
            .replace_permissions(&teacher, &PermissionSet::new())
            .await
            .unwrap();
        assert!(store.get_permissions(&teacher).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_unknown_role_fails_without_side_effects() {
        let store = InMemoryRbacStore::new();
        let teacher = role("Teacher");
        store.create_role(&teacher).await.unwrap();
        store
            .replace_permissions(&teacher, &set(&[Permission::ViewAssignments]))
            .await
            .unwrap();

        let result = store
            .replace_permissions(&role("Janitor"), &set(&[Permission::ManageUsers]))
            .await;
        assert!(matches!(result, Err(StoreError::RoleNotFound(r)) if r.as_str() == "Janitor"));

        assert_eq!(store.list_roles().await.unwrap(), vec![teacher.clone()]);
        assert_eq!(
            store.get_permissions(&teacher).await.unwrap(),
            set(&[Permission::ViewAssignments])
        );
    }

    #[tokio::test]
    async fn test_replace_keeps_other_claim_types() {
        let store = InMemoryRbacStore::new();
        let admin = role("Admin");
        store.create_role(&admin).await.unwrap();
        store
            .add_claim(&admin, RoleClaim::new("display_color", "red"))
            .await
            .unwrap();
        store
            .replace_permissions(&admin, &set(&[Permission::ManageUsers]))
            .await
            .unwrap();
        store
            .replace_permissions(&admin, &set(&[Permission::ManageRoles]))
            .await
            .unwrap();

        assert_eq!(
            store.claims_of(&admin).await,
            vec![
                RoleClaim::new("display_color", "red"),
                RoleClaim::permission(Permission::ManageRoles),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_permission_claim_grants_nothing() {
        let store = InMemoryRbacStore::new();
        let admin = role("Admin");
        store.create_role(&admin).await.unwrap();
        store
            .add_claim(&admin, RoleClaim::new("permission", "DropDatabase"))
            .await
            .unwrap();
        store
            .add_claim(&admin, RoleClaim::permission(Permission::ManageUsers))
            .await
            .unwrap();

        assert_eq!(
            store.get_permissions(&admin).await.unwrap(),
            set(&[Permission::ManageUsers])
        );
    }

    #[tokio::test]
    async fn test_create_role_is_idempotent() {
        let store = InMemoryRbacStore::new();
        assert!(store.create_role(&role("Student")).await.unwrap());
        assert!(!store.create_role(&role("Student")).await.unwrap());
        assert!(store.role_exists(&role("Student")).await.unwrap());
        assert!(!store.role_exists(&role("student")).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_roles_is_sorted() {
        let store = InMemoryRbacStore::new();
        for name in ["Teacher", "Admin", "Student"] {
            store.create_role(&role(name)).await.unwrap();
        }
        assert_eq!(
            store.list_roles().await.unwrap(),
            vec![role("Admin"), role("Student"), role("Teacher")]
        );
    }

    #[tokio::test]
    async fn test_replace_roles_is_total() {
        let store = InMemoryRbacStore::new();
        for name in ["Teacher", "Student"] {
            store.create_role(&role(name)).await.unwrap();
        }
        let user = store.upsert_user("u@test.com", None).await.unwrap();

        store
            .replace_roles(user.id, &BTreeSet::from([role("Teacher")]))
            .await
            .unwrap();
        store
            .replace_roles(user.id, &BTreeSet::from([role("Student")]))
            .await
            .unwrap();

        assert_eq!(store.roles_of(user.id).await.unwrap(), vec![role("Student")]);
    }

    #[tokio::test]
    async fn test_replace_roles_rejects_unknown_user_and_role() {
        let store = InMemoryRbacStore::new();
        store.create_role(&role("Teacher")).await.unwrap();
        let user = store.upsert_user("u@test.com", None).await.unwrap();
        store
            .replace_roles(user.id, &BTreeSet::from([role("Teacher")]))
            .await
            .unwrap();

        let missing_user = Uuid::new_v4();
        assert!(matches!(
            store.replace_roles(missing_user, &BTreeSet::new()).await,
            Err(StoreError::UserNotFound(id)) if id == missing_user
        ));

        let result = store
            .replace_roles(user.id, &BTreeSet::from([role("Teacher"), role("Wizard")]))
            .await;
        assert!(matches!(result, Err(StoreError::RoleNotFound(r)) if r.as_str() == "Wizard"));
        assert_eq!(store.roles_of(user.id).await.unwrap(), vec![role("Teacher")]);
    }

    #[tokio::test]
    async fn test_upsert_user_returns_existing() {
        let store = InMemoryRbacStore::new();
        let first = store
            .upsert_user("admin@test.com", Some("System Administrator"))
            .await
            .unwrap();
        let second = store.upsert_user("admin@test.com", None).await.unwrap();
        assert_eq!(first, second);

        let found = store.find_user_by_email("admin@test.com").await.unwrap();
        assert_eq!(found, Some(first));
        assert!(store.find_user_by_email("nobody@test.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users_sorted_by_email() {
        let store = InMemoryRbacStore::new();
        store.create_role(&role("Student")).await.unwrap();
        let zed = store.upsert_user("zed@test.com", None).await.unwrap();
        store.upsert_user("amy@test.com", None).await.unwrap();
        store
            .replace_roles(zed.id, &BTreeSet::from([role("Student")]))
            .await
            .unwrap();

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user.email, "amy@test.com");
        assert!(users[0].roles.is_empty());
        assert_eq!(users[1].roles, vec![role("Student")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_observe_partial_replacement() {
        let store = Arc::new(InMemoryRbacStore::new());
        let teacher = role("Teacher");
        store.create_role(&teacher).await.unwrap();

        let old = set(&[
            Permission::CreateAssignment,
            Permission::EditAssignment,
            Permission::DeleteAssignment,
        ]);
        let new = set(&[Permission::GradeAssignment, Permission::ViewStudentSubmissions]);
        store.replace_permissions(&teacher, &old).await.unwrap();

        let writer = {
            let store = Arc::clone(&store);
            let teacher = teacher.clone();
            let (old, new) = (old.clone(), new.clone());
            tokio::spawn(async move {
                for i in 0..500 {
                    let next = if i % 2 == 0 { &new } else { &old };
                    store.replace_permissions(&teacher, next).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let teacher = teacher.clone();
                let (old, new) = (old.clone(), new.clone());
                tokio::spawn(async move {
                    for _ in 0..500 {
                        let seen = store.get_permissions(&teacher).await.unwrap();
                        assert!(seen == old || seen == new, "observed mixed set {seen:?}");
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_observe_partial_membership() {
        let store = Arc::new(InMemoryRbacStore::new());
        for name in ["Admin", "Student", "Teacher"] {
            store.create_role(&role(name)).await.unwrap();
        }
        let user = store.upsert_user("u@test.com", None).await.unwrap();

        let one = BTreeSet::from([role("Teacher")]);
        let two = BTreeSet::from([role("Student"), role("Admin")]);
        store.replace_roles(user.id, &one).await.unwrap();

        let writer = {
            let store = Arc::clone(&store);
            let (one, two) = (one.clone(), two.clone());
            tokio::spawn(async move {
                for i in 0..500 {
                    let next = if i % 2 == 0 { &two } else { &one };
                    store.replace_roles(user.id, next).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let expected_one: Vec<RoleName> = one.into_iter().collect();
        let expected_two: Vec<RoleName> = two.into_iter().collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let (one, two) = (expected_one.clone(), expected_two.clone());
                tokio::spawn(async move {
                    for _ in 0..500 {
                        let seen = store.roles_of(user.id).await.unwrap();
                        assert!(seen == one || seen == two, "observed mixed roles {seen:?}");
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
