use classdesk_core::Permission;
use classdesk_db::UserWithRoles;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoleDto {
    #[validate(length(min = 1, max = 64, message = "Role name must be between 1 and 64 characters"))]
    #[schema(example = "Librarian")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRolePermissionsDto {
    /// Permission names from the catalog. An empty list revokes everything.
    #[schema(example = json!(["CreateAssignment", "GradeAssignment"]))]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRolesDto {
    #[validate(length(max = 32, message = "A user can hold at most 32 roles"))]
    #[schema(example = json!(["Teacher"]))]
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleListResponse {
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RolePermissionsResponse {
    pub role: String,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserRolesResponse {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserWithRolesResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub roles: Vec<String>,
}

impl From<UserWithRoles> for UserWithRolesResponse {
    fn from(entry: UserWithRoles) -> Self {
        Self {
            id: entry.user.id,
            email: entry.user.email,
            full_name: entry.user.full_name,
            roles: entry.roles.into_iter().map(String::from).collect(),
        }
    }
}
