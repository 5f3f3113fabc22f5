use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;
use uuid::Uuid;

use classdesk_core::AppError;

use crate::middleware::auth::Identity;
use crate::middleware::permission::RequireManagePermissions;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    CreateRoleDto, RoleListResponse, RolePermissionsResponse, UpdateRolePermissionsDto,
    UpdateUserRolesDto, UserRolesResponse, UserWithRolesResponse,
};

// ============ Role Endpoints ============

#[utoipa::path(
    get,
    path = "/api/admin/roles",
    responses(
        (status = 200, description = "All role names", body = RoleListResponse),
        (status = 401, description = "Unauthorized", body = classdesk_core::ErrorResponse),
        (status = 403, description = "Missing ManageRoles", body = classdesk_core::ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn get_roles(State(state): State<AppState>) -> Result<Json<RoleListResponse>, AppError> {
    let roles = state
        .admin
        .list_roles()
        .await
        .map_err(AppError::from_domain)?;

    Ok(Json(RoleListResponse {
        roles: roles.into_iter().map(String::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created", body = RolePermissionsResponse),
        (status = 200, description = "Role already existed", body = RolePermissionsResponse),
        (status = 401, description = "Unauthorized", body = classdesk_core::ErrorResponse),
        (status = 403, description = "Missing ManageRoles", body = classdesk_core::ErrorResponse),
        (status = 422, description = "Invalid role name", body = classdesk_core::ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    Extension(actor): Extension<Identity>,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<RolePermissionsResponse>), AppError> {
    let (role, created) = state
        .admin
        .create_role(&dto.name)
        .await
        .map_err(AppError::from_domain)?;

    let (_, permissions) = state
        .admin
        .role_permissions(role.as_str())
        .await
        .map_err(AppError::from_domain)?;

    let status = if created {
        info!(actor = %actor.email, role = %role, "Role created");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(RolePermissionsResponse {
            role: role.into(),
            permissions: permissions.into_iter().collect(),
        }),
    ))
}

// ============ Role Permission Endpoints ============

#[utoipa::path(
    get,
    path = "/api/admin/roles/{role}/permissions",
    params(
        ("role" = String, Path, description = "Role name (case-sensitive)")
    ),
    responses(
        (status = 200, description = "Permissions granted by the role, empty for an unknown role", body = RolePermissionsResponse),
        (status = 401, description = "Unauthorized", body = classdesk_core::ErrorResponse),
        (status = 403, description = "Missing ManagePermissions", body = classdesk_core::ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn get_role_permissions(
    State(state): State<AppState>,
    _guard: RequireManagePermissions,
    Path(role): Path<String>,
) -> Result<Json<RolePermissionsResponse>, AppError> {
    let (role, permissions) = state
        .admin
        .role_permissions(&role)
        .await
        .map_err(AppError::from_domain)?;

    Ok(Json(RolePermissionsResponse {
        role,
        permissions: permissions.into_iter().collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/admin/roles/{role}/permissions",
    params(
        ("role" = String, Path, description = "Role name (case-sensitive)")
    ),
    request_body = UpdateRolePermissionsDto,
    responses(
        (status = 200, description = "Permission set replaced", body = RolePermissionsResponse),
        (status = 401, description = "Unauthorized", body = classdesk_core::ErrorResponse),
        (status = 403, description = "Missing ManagePermissions", body = classdesk_core::ErrorResponse),
        (status = 404, description = "Role not found", body = classdesk_core::ErrorResponse),
        (status = 422, description = "Unknown permission", body = classdesk_core::ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn update_role_permissions(
    State(state): State<AppState>,
    RequireManagePermissions(actor): RequireManagePermissions,
    Path(role): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateRolePermissionsDto>,
) -> Result<Json<RolePermissionsResponse>, AppError> {
    let (role, permissions) = state
        .admin
        .set_role_permissions(&role, &dto.permissions)
        .await
        .map_err(AppError::from_domain)?;

    info!(actor = %actor.email, role = %role, "Role permissions updated");

    Ok(Json(RolePermissionsResponse {
        role: role.into(),
        permissions: permissions.into_iter().collect(),
    }))
}

// ============ User Endpoints ============

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Users with their roles", body = Vec<UserWithRolesResponse>),
        (status = 401, description = "Unauthorized", body = classdesk_core::ErrorResponse),
        (status = 403, description = "Missing ManageUsers", body = classdesk_core::ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn get_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserWithRolesResponse>>, AppError> {
    let users = state
        .admin
        .list_users_with_roles()
        .await
        .map_err(AppError::from_domain)?;

    Ok(Json(users.into_iter().map(UserWithRolesResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/roles",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRolesDto,
    responses(
        (status = 200, description = "Role set replaced", body = UserRolesResponse),
        (status = 401, description = "Unauthorized", body = classdesk_core::ErrorResponse),
        (status = 403, description = "Missing ManageUsers", body = classdesk_core::ErrorResponse),
        (status = 404, description = "User or role not found", body = classdesk_core::ErrorResponse),
        (status = 422, description = "Invalid role name", body = classdesk_core::ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn update_user_roles(
    State(state): State<AppState>,
    Extension(actor): Extension<Identity>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserRolesDto>,
) -> Result<Json<UserRolesResponse>, AppError> {
    let roles = state
        .admin
        .set_user_roles(id, &dto.roles)
        .await
        .map_err(AppError::from_domain)?;

    info!(actor = %actor.email, user_id = %id, "User roles updated");

    Ok(Json(UserRolesResponse {
        user_id: id,
        roles: roles.into_iter().map(String::from).collect(),
    }))
}
