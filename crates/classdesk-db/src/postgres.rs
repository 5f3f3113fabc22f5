//! PostgreSQL implementation of the role and membership stores.
//!
//! Replacements run in a single transaction that first locks the owning row
//! (`SELECT ... FOR UPDATE`), so concurrent replacements of the same role or
//! user are serialized and readers only ever see a committed set.

use std::collections::BTreeSet;

use async_trait::async_trait;
use classdesk_core::{PermissionSet, RoleName};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::store::{
    PERMISSION_CLAIM_TYPE, RoleClaim, RolePermissionStore, StoreError, StoreResult, UserRecord,
    UserRoleStore, UserWithRoles, parse_permission_claims,
};

#[derive(Debug, Clone)]
pub struct PgRbacStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRoleRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    role_name: Option<String>,
}

impl PgRbacStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Attaches an arbitrary claim to an existing role.
    #[instrument(skip(self))]
    pub async fn add_claim(&self, role: &RoleName, claim: RoleClaim) -> StoreResult<()> {
        let result = sqlx::query(
            r#"INSERT INTO role_claims (role_id, claim_type, claim_value)
            SELECT id, $2, $3 FROM roles WHERE name = $1
            ON CONFLICT (role_id, claim_type, claim_value) DO NOTHING"#,
        )
        .bind(role.as_str())
        .bind(&claim.claim_type)
        .bind(&claim.claim_value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 && !self.role_exists(role).await? {
            return Err(StoreError::RoleNotFound(role.clone()));
        }
        Ok(())
    }

    /// Every claim on `role`, sorted. Empty when the role does not exist.
    #[instrument(skip(self))]
    pub async fn claims_of(&self, role: &RoleName) -> StoreResult<Vec<RoleClaim>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"SELECT rc.claim_type, rc.claim_value
            FROM role_claims rc
            JOIN roles r ON r.id = rc.role_id
            WHERE r.name = $1
            ORDER BY rc.claim_type, rc.claim_value"#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(claim_type, claim_value)| RoleClaim::new(claim_type, claim_value))
            .collect())
    }
}

/// Turns stored names back into role names. Rows that fail validation are skipped.
fn role_names(names: Vec<String>) -> Vec<RoleName> {
    names
        .into_iter()
        .filter_map(|name| match RoleName::parse(&name) {
            Ok(role) => Some(role),
            Err(err) => {
                tracing::warn!(name = %name, error = %err, "Skipping invalid stored role name");
                None
            }
        })
        .collect()
}

#[async_trait]
impl RolePermissionStore for PgRbacStore {
    #[instrument(skip(self))]
    async fn get_permissions(&self, role: &RoleName) -> StoreResult<PermissionSet> {
        let values: Vec<String> = sqlx::query_scalar(
            r#"SELECT rc.claim_value
            FROM role_claims rc
            JOIN roles r ON r.id = rc.role_id
            WHERE r.name = $1 AND rc.claim_type = $2"#,
        )
        .bind(role.as_str())
        .bind(PERMISSION_CLAIM_TYPE)
        .fetch_all(&self.pool)
        .await?;

        Ok(parse_permission_claims(role, values))
    }

    #[instrument(skip(self))]
    async fn replace_permissions(
        &self,
        role: &RoleName,
        permissions: &PermissionSet,
    ) -> StoreResult<()> {
        let mut transaction = self.pool.begin().await?;

        let role_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM roles WHERE name = $1 FOR UPDATE")
                .bind(role.as_str())
                .fetch_optional(&mut *transaction)
                .await?;
        let Some(role_id) = role_id else {
            return Err(StoreError::RoleNotFound(role.clone()));
        };

        sqlx::query("DELETE FROM role_claims WHERE role_id = $1 AND claim_type = $2")
            .bind(role_id)
            .bind(PERMISSION_CLAIM_TYPE)
            .execute(&mut *transaction)
            .await?;

        let values: Vec<String> = permissions.iter().map(|p| p.as_str().to_string()).collect();
        sqlx::query(
            r#"INSERT INTO role_claims (role_id, claim_type, claim_value)
            SELECT $1, $2, value FROM UNNEST($3::text[]) AS value"#,
        )
        .bind(role_id)
        .bind(PERMISSION_CLAIM_TYPE)
        .bind(&values)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_roles(&self) -> StoreResult<Vec<RoleName>> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(role_names(names))
    }

    #[instrument(skip(self))]
    async fn role_exists(&self, role: &RoleName) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE name = $1)")
                .bind(role.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn create_role(&self, role: &RoleName) -> StoreResult<bool> {
        let result = sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl UserRoleStore for PgRbacStore {
    #[instrument(skip(self))]
    async fn roles_of(&self, user_id: Uuid) -> StoreResult<Vec<RoleName>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.name"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(role_names(names))
    }

    #[instrument(skip(self))]
    async fn replace_roles(&self, user_id: Uuid, roles: &BTreeSet<RoleName>) -> StoreResult<()> {
        let mut transaction = self.pool.begin().await?;

        let user: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *transaction)
            .await?;
        if user.is_none() {
            return Err(StoreError::UserNotFound(user_id));
        }

        let names: Vec<String> = roles.iter().map(|role| role.as_str().to_string()).collect();
        let found: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, name FROM roles WHERE name = ANY($1::text[])")
                .bind(&names)
                .fetch_all(&mut *transaction)
                .await?;

        if let Some(missing) = roles
            .iter()
            .find(|role| !found.iter().any(|(_, name)| name == role.as_str()))
        {
            return Err(StoreError::RoleNotFound(missing.clone()));
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *transaction)
            .await?;

        let role_ids: Vec<Uuid> = found.into_iter().map(|(id, _)| id).collect();
        sqlx::query(
            r#"INSERT INTO user_roles (user_id, role_id)
            SELECT $1, role_id FROM UNNEST($2::uuid[]) AS role_id"#,
        )
        .bind(user_id)
        .bind(&role_ids)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> StoreResult<Vec<UserWithRoles>> {
        let rows: Vec<UserRoleRow> = sqlx::query_as(
            r#"SELECT u.id, u.email, u.full_name, r.name AS role_name
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            LEFT JOIN roles r ON r.id = ur.role_id
            ORDER BY u.email, r.name"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut users: Vec<UserWithRoles> = Vec::new();
        for row in rows {
            let is_same_user = users.last().is_some_and(|last| last.user.id == row.id);
            if !is_same_user {
                users.push(UserWithRoles {
                    user: UserRecord {
                        id: row.id,
                        email: row.email,
                        full_name: row.full_name,
                    },
                    roles: Vec::new(),
                });
            }
            if let (Some(name), Some(entry)) = (row.role_name, users.last_mut()) {
                entry.roles.extend(role_names(vec![name]));
            }
        }
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn upsert_user(&self, email: &str, full_name: Option<&str>) -> StoreResult<UserRecord> {
        let inserted: Option<UserRecord> = sqlx::query_as(
            r#"INSERT INTO users (email, full_name) VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, full_name"#,
        )
        .bind(email)
        .bind(full_name)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(user) => Ok(user),
            None => self
                .find_user_by_email(email)
                .await?
                .ok_or_else(|| StoreError::Unavailable(format!("user {email} vanished during upsert"))),
        }
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, full_name FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
