use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use classdesk::classdesk_config::{
    CorsConfig, DatabaseConfig, JwtConfig, LoggingConfig, ServerConfig,
};
use classdesk::classdesk_db::{PgRbacStore, init_db_pool, run_migrations, seed};
use classdesk::logging::init_tracing;
use classdesk::router::init_router;
use classdesk::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing(&LoggingConfig::from_env()).context("Failed to initialize logging")?;

    let server_config = ServerConfig::from_env();
    let database_config = DatabaseConfig::from_env()?;

    let pool = init_db_pool(&database_config)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    if server_config.seed_on_startup {
        let report = seed::seed_all(&PgRbacStore::new(pool.clone()), false).await?;
        info!(
            roles_created = report.roles_created.len(),
            users_assigned = report.users_assigned.len(),
            "Seeding complete"
        );
    }

    let state = init_app_state(pool, JwtConfig::from_env(), CorsConfig::from_env());
    let app = init_router(state);

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(address = %address, "Server running");
    info!("Swagger UI available at http://{address}/swagger-ui");
    axum::serve(listener, app).await?;

    Ok(())
}
