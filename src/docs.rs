use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use classdesk_core::{ErrorResponse, Permission, SubjectArea};

use crate::modules::admin::model::{
    CreateRoleDto, RoleListResponse, RolePermissionsResponse, UpdateRolePermissionsDto,
    UpdateUserRolesDto, UserRolesResponse, UserWithRolesResponse,
};
use crate::modules::permissions::model::{
    MyPermissionsResponse, PermissionCatalogResponse, PermissionGroup,
};
use crate::router::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::router::health,
        crate::modules::admin::controller::get_roles,
        crate::modules::admin::controller::create_role,
        crate::modules::admin::controller::get_role_permissions,
        crate::modules::admin::controller::update_role_permissions,
        crate::modules::admin::controller::get_users,
        crate::modules::admin::controller::update_user_roles,
        crate::modules::permissions::controller::get_catalog,
        crate::modules::permissions::controller::get_my_permissions,
    ),
    components(
        schemas(
            Permission,
            SubjectArea,
            ErrorResponse,
            HealthResponse,
            CreateRoleDto,
            UpdateRolePermissionsDto,
            UpdateUserRolesDto,
            RoleListResponse,
            RolePermissionsResponse,
            UserRolesResponse,
            UserWithRolesResponse,
            PermissionGroup,
            PermissionCatalogResponse,
            MyPermissionsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Admin", description = "Role, permission and membership administration"),
        (name = "Permissions", description = "Permission catalog and caller permissions"),
        (name = "Health", description = "Liveness")
    ),
    info(
        title = "Classdesk API",
        version = "0.1.0",
        description = "Role and permission administration for a school management system.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
