use axum::{Json, extract::State};

use classdesk_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::model::{MyPermissionsResponse, PermissionCatalogResponse};

#[utoipa::path(
    get,
    path = "/api/permissions",
    responses(
        (status = 200, description = "Permission catalog grouped by subject area", body = PermissionCatalogResponse),
        (status = 401, description = "Unauthorized", body = classdesk_core::ErrorResponse)
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_catalog(_auth_user: AuthUser) -> Result<Json<PermissionCatalogResponse>, AppError> {
    Ok(Json(PermissionCatalogResponse::build()))
}

#[utoipa::path(
    get,
    path = "/api/permissions/me",
    responses(
        (status = 200, description = "Roles and effective permissions of the caller", body = MyPermissionsResponse),
        (status = 401, description = "Unauthorized", body = classdesk_core::ErrorResponse)
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_my_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MyPermissionsResponse>, AppError> {
    let user_id = auth_user.user_id();
    let roles = state.resolver.roles_of(user_id).await;
    let permissions = state.resolver.permissions_of_roles(&roles).await;

    Ok(Json(MyPermissionsResponse {
        user_id,
        email: auth_user.email().to_string(),
        roles: roles.into_iter().map(String::from).collect(),
        permissions: permissions.into_iter().collect(),
    }))
}
