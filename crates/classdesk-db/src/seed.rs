//! Default roles, their permissions and demo users.

use std::collections::BTreeSet;

use classdesk_core::RoleName;
use classdesk_core::roles::{self, default_roles};
use tracing::{info, warn};

use crate::store::{RolePermissionStore, StoreResult, UserRoleStore};

/// A demo account created by [`seed_demo_users`].
#[derive(Debug, Clone, Copy)]
pub struct DemoUser {
    pub email: &'static str,
    pub full_name: &'static str,
    pub role: &'static str,
}

pub const DEMO_USERS: [DemoUser; 3] = [
    DemoUser {
        email: "admin@test.com",
        full_name: "System Administrator",
        role: roles::ADMIN,
    },
    DemoUser {
        email: "teacher@test.com",
        full_name: "Demo Teacher",
        role: roles::TEACHER,
    },
    DemoUser {
        email: "student@test.com",
        full_name: "Demo Student",
        role: roles::STUDENT,
    },
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub roles_created: Vec<RoleName>,
    pub roles_reset: Vec<RoleName>,
    pub users_assigned: Vec<String>,
}

/// Ensures the default roles exist.
///
/// A role that is created here starts with its default permission set. Roles
/// that already existed keep whatever an admin configured, unless `reset` is
/// set, in which case their permission claims are replaced with the defaults.
pub async fn initialize_roles_with_permissions(
    store: &dyn RolePermissionStore,
    reset: bool,
    report: &mut SeedReport,
) -> StoreResult<()> {
    for (role, permissions) in default_roles() {
        let created = store.create_role(&role).await?;

        if created || reset {
            store.replace_permissions(&role, &permissions).await?;
        }

        if created {
            info!(role = %role, permissions = permissions.len(), "Created default role");
            report.roles_created.push(role);
        } else if reset {
            info!(role = %role, "Reset default role permissions");
            report.roles_reset.push(role);
        }
    }
    Ok(())
}

/// Creates the demo accounts. A demo user that has no roles is given its default role;
/// one that already holds roles is left alone.
pub async fn seed_demo_users(store: &dyn UserRoleStore, report: &mut SeedReport) -> StoreResult<()> {
    for demo in DEMO_USERS {
        let user = store.upsert_user(demo.email, Some(demo.full_name)).await?;

        if !store.roles_of(user.id).await?.is_empty() {
            continue;
        }

        let role = match RoleName::parse(demo.role) {
            Ok(role) => role,
            Err(err) => {
                warn!(email = demo.email, error = %err, "Skipping demo user with invalid role");
                continue;
            }
        };

        store.replace_roles(user.id, &BTreeSet::from([role])).await?;
        info!(email = demo.email, role = demo.role, "Assigned demo user role");
        report.users_assigned.push(demo.email.to_string());
    }
    Ok(())
}

/// Runs the full seeding sequence against a store that holds both roles and users.
pub async fn seed_all<S>(store: &S, reset_permissions: bool) -> StoreResult<SeedReport>
where
    S: RolePermissionStore + UserRoleStore,
{
    let mut report = SeedReport::default();
    initialize_roles_with_permissions(store, reset_permissions, &mut report).await?;
    seed_demo_users(store, &mut report).await?;
    Ok(report)
}
