use classdesk_core::{Permission, SubjectArea};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionGroup {
    pub area: SubjectArea,
    pub permissions: Vec<Permission>,
}

/// The permission catalog, grouped by subject area.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionCatalogResponse {
    pub groups: Vec<PermissionGroup>,
}

impl PermissionCatalogResponse {
    pub fn build() -> Self {
        let groups = SubjectArea::ALL
            .into_iter()
            .map(|area| PermissionGroup {
                area,
                permissions: Permission::in_area(area).collect(),
            })
            .collect();

        Self { groups }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyPermissionsResponse {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub permissions: Vec<Permission>,
}
