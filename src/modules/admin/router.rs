use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    routing::{get, put},
};
use classdesk_core::Permission;

use crate::middleware::permission::require_permission;
use crate::state::AppState;

use super::controller::{
    create_role, get_role_permissions, get_roles, get_users, update_role_permissions,
    update_user_roles,
};

/// Admin routes. Role and user routes are guarded by a route layer; the role
/// permission handlers authorize through their `RequireManagePermissions` extractor.
pub fn init_admin_router(state: AppState) -> Router<AppState> {
    let roles = Router::new()
        .route("/roles", get(get_roles).post(create_role))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            |state: State<AppState>, req: Request, next: Next| {
                require_permission(state, req, next, Permission::ManageRoles)
            },
        ));

    let role_permissions = Router::new().route(
        "/roles/{role}/permissions",
        get(get_role_permissions).put(update_role_permissions),
    );

    let users = Router::new()
        .route("/users", get(get_users))
        .route("/users/{id}/roles", put(update_user_roles))
        .route_layer(middleware::from_fn_with_state(
            state,
            |state: State<AppState>, req: Request, next: Next| {
                require_permission(state, req, next, Permission::ManageUsers)
            },
        ));

    Router::new()
        .merge(roles)
        .merge(role_permissions)
        .merge(users)
}
