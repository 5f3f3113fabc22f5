//! # Classdesk DB
//!
//! Database pool and the role/permission stores for the Classdesk API.
//!
//! - [`store`]: The store traits the authorization layer depends on
//! - [`admin`]: Validated changes to roles, permissions and memberships
//! - [`memory`]: In-process implementation used by tests and local tooling
//! - [`postgres`]: PostgreSQL implementation used in production
//! - [`seed`]: Default roles, their permissions and demo users
//!
//! # Example
//!
//! ```ignore
//! use classdesk_config::DatabaseConfig;
//! use classdesk_db::{init_db_pool, run_migrations, PgRbacStore};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! run_migrations(&pool).await?;
//! let store = PgRbacStore::new(pool);
//! ```

pub mod admin;
pub mod memory;
pub mod postgres;
pub mod seed;
pub mod store;

use classdesk_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

// Re-export commonly used types at crate root
pub use admin::{AdminError, RoleMembershipAdmin};
pub use memory::InMemoryRbacStore;
pub use postgres::PgRbacStore;
pub use sqlx::PgPool;
pub use store::{
    PERMISSION_CLAIM_TYPE, RoleClaim, RolePermissionStore, StoreError, StoreResult, UserRecord,
    UserRoleStore, UserWithRoles,
};

/// Opens a PostgreSQL connection pool.
///
/// Called once at startup; the returned pool is cheap to clone.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies the migrations in the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
