use std::sync::Arc;

use classdesk_config::{CorsConfig, JwtConfig};
use classdesk_db::{
    PgPool, PgRbacStore, RoleMembershipAdmin, RolePermissionStore, UserRoleStore,
};

use crate::middleware::auth::{IdentityProvider, JwtIdentityProvider};
use crate::middleware::permission::AuthorizationGate;
use crate::modules::permissions::service::PermissionResolver;

#[derive(Clone)]
pub struct AppState {
    pub gate: AuthorizationGate,
    pub resolver: PermissionResolver,
    pub admin: RoleMembershipAdmin,
    pub cors_config: CorsConfig,
}

impl AppState {
    /// Wires the services around one store that holds both roles and memberships.
    pub fn new<S>(
        store: Arc<S>,
        identity: Arc<dyn IdentityProvider>,
        cors_config: CorsConfig,
    ) -> Self
    where
        S: RolePermissionStore + UserRoleStore + 'static,
    {
        let roles: Arc<dyn RolePermissionStore> = store.clone();
        let memberships: Arc<dyn UserRoleStore> = store;

        let resolver = PermissionResolver::new(roles.clone(), memberships.clone());
        Self {
            gate: AuthorizationGate::new(identity, resolver.clone()),
            resolver,
            admin: RoleMembershipAdmin::new(roles, memberships),
            cors_config,
        }
    }
}

pub fn init_app_state(pool: PgPool, jwt_config: JwtConfig, cors_config: CorsConfig) -> AppState {
    AppState::new(
        Arc::new(PgRbacStore::new(pool)),
        Arc::new(JwtIdentityProvider::new(jwt_config)),
        cors_config,
    )
}
