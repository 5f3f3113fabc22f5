//! Permission gate for protected routes.
//!
//! Two ways to guard a route:
//! 1. Layer-based, with [`require_permission`] and `from_fn_with_state`
//! 2. Extractor-based, with the types generated by [`require_permission!`]
//!
//! Both go through [`AuthorizationGate::authorize`]: no identity is a 401,
//! an identity whose roles do not grant the permission is a 403.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use classdesk_core::{AppError, ErrorStatus, Permission};
use tracing::{debug, info};

use crate::middleware::auth::{Identity, IdentityProvider};
use crate::modules::permissions::service::PermissionResolver;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Access denied. Missing required permission: {0}")]
    Forbidden(Permission),
}

impl ErrorStatus for AuthzError {
    fn status(&self) -> StatusCode {
        match self {
            AuthzError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthzError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Decides whether a request may run an operation that needs a permission.
#[derive(Clone)]
pub struct AuthorizationGate {
    identity: Arc<dyn IdentityProvider>,
    resolver: PermissionResolver,
}

impl AuthorizationGate {
    pub fn new(identity: Arc<dyn IdentityProvider>, resolver: PermissionResolver) -> Self {
        Self { identity, resolver }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthzError> {
        self.identity
            .authenticate(headers)
            .await
            .ok_or(AuthzError::Unauthenticated)
    }

    /// Authenticates the request, then checks `permission` against the caller's roles.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        permission: Permission,
    ) -> Result<Identity, AuthzError> {
        let identity = self.authenticate(headers).await?;

        if !self
            .resolver
            .user_has_permission(identity.user_id, permission)
            .await
        {
            info!(
                user_id = %identity.user_id,
                permission = %permission,
                "Permission denied"
            );
            return Err(AuthzError::Forbidden(permission));
        }

        debug!(user_id = %identity.user_id, permission = %permission, "Permission granted");
        Ok(identity)
    }
}

/// Middleware that lets the request through only if the caller holds `permission`.
/// The caller's [`Identity`] is added to the request extensions.
///
/// ```rust,ignore
/// let routes = Router::new()
///     .route("/roles", get(list_roles))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         |state: State<AppState>, req: Request, next: Next| {
///             require_permission(state, req, next, Permission::ManageRoles)
///         },
///     ));
/// ```
pub async fn require_permission(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
    permission: Permission,
) -> Result<Response, AppError> {
    let identity = state
        .gate
        .authorize(req.headers(), permission)
        .await
        .map_err(AppError::from_domain)?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Generates an extractor that authorizes the request for one permission.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::Identity);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = classdesk_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                state
                    .gate
                    .authorize(&parts.headers, $permission)
                    .await
                    .map($name)
                    .map_err(classdesk_core::AppError::from_domain)
            }
        }
    };
}

require_permission!(RequireManagePermissions, Permission::ManagePermissions);

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use async_trait::async_trait;
    use axum::http::{HeaderValue, header};
    use classdesk_core::{PermissionSet, RoleName};
    use classdesk_db::{InMemoryRbacStore, RolePermissionStore, UserRoleStore};
    use uuid::Uuid;

    use super::*;

    /// Treats the bearer value as the user id.
    struct HeaderIdentity;

    #[async_trait]
    impl IdentityProvider for HeaderIdentity {
        async fn authenticate(&self, headers: &HeaderMap) -> Option<Identity> {
            let raw = crate::middleware::auth::bearer_token(headers)?;
            Some(Identity {
                user_id: raw.parse().ok()?,
                email: "someone@test.com".to_string(),
            })
        }
    }

    fn headers_for(user_id: Uuid) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {user_id}")).unwrap(),
        );
        headers
    }

    async fn gate_with_teacher() -> (AuthorizationGate, Uuid) {
        let store = Arc::new(InMemoryRbacStore::new());
        let teacher = RoleName::parse("Teacher").unwrap();
        store.create_role(&teacher).await.unwrap();
        store
            .replace_permissions(&teacher, &PermissionSet::from([Permission::GradeAssignment]))
            .await
            .unwrap();
        let user = store.upsert_user("t@test.com", None).await.unwrap();
        store
            .replace_roles(user.id, &BTreeSet::from([teacher]))
            .await
            .unwrap();

        let resolver = PermissionResolver::new(store.clone(), store);
        (AuthorizationGate::new(Arc::new(HeaderIdentity), resolver), user.id)
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthenticated() {
        let (gate, _) = gate_with_teacher().await;
        let result = gate
            .authorize(&HeaderMap::new(), Permission::GradeAssignment)
            .await;
        assert_eq!(result, Err(AuthzError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_granted_permission_returns_identity() {
        let (gate, user_id) = gate_with_teacher().await;
        let identity = gate
            .authorize(&headers_for(user_id), Permission::GradeAssignment)
            .await
            .unwrap();
        assert_eq!(identity.user_id, user_id);
    }

    #[tokio::test]
    async fn test_missing_permission_is_forbidden() {
        let (gate, user_id) = gate_with_teacher().await;
        let result = gate
            .authorize(&headers_for(user_id), Permission::ManageUsers)
            .await;
        assert_eq!(result, Err(AuthzError::Forbidden(Permission::ManageUsers)));
    }

    #[tokio::test]
    async fn test_unknown_user_is_forbidden() {
        let (gate, _) = gate_with_teacher().await;
        let result = gate
            .authorize(&headers_for(Uuid::new_v4()), Permission::ViewAssignments)
            .await;
        assert_eq!(result, Err(AuthzError::Forbidden(Permission::ViewAssignments)));
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(AuthzError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthzError::Forbidden(Permission::ViewGrades).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthzError::Forbidden(Permission::ViewGrades).to_string(),
            "Access denied. Missing required permission: ViewGrades"
        );
    }
}
