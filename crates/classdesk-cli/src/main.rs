use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use classdesk_auth::create_access_token;
use classdesk_config::{DatabaseConfig, JwtConfig};
use classdesk_core::Permission;
use classdesk_db::{
    PgRbacStore, RoleMembershipAdmin, UserRoleStore, init_db_pool, run_migrations, seed,
};

#[derive(Parser)]
#[command(name = "classdesk-cli")]
#[command(about = "Classdesk CLI - Role and permission administration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Create the default roles, their permissions and the demo users
    Seed {
        /// Put the default roles' permissions back to their defaults
        #[arg(long)]
        reset_permissions: bool,
    },
    /// Print an access token for an existing user
    IssueToken {
        /// Email address of the user
        #[arg(short = 'e', long)]
        email: String,
    },
    /// List every role with the permissions it grants
    ListRoles,
    /// Replace the permissions a role grants (no permissions revokes everything)
    SetRolePermissions {
        /// Role name (case-sensitive)
        role: String,
        /// Permission names from the catalog
        permissions: Vec<String>,
    },
    /// Replace the roles a user holds (no roles removes every membership)
    SetUserRoles {
        /// Email address of the user
        email: String,
        /// Role names
        roles: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let store = match connect().await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(store);
    let admin = RoleMembershipAdmin::new(store.clone(), store.clone());

    let result = match cli.command {
        Commands::Migrate => handle_migrate(&store).await,
        Commands::Seed { reset_permissions } => handle_seed(&store, reset_permissions).await,
        Commands::IssueToken { email } => handle_issue_token(&store, &email).await,
        Commands::ListRoles => handle_list_roles(&admin).await,
        Commands::SetRolePermissions { role, permissions } => {
            handle_set_role_permissions(&admin, &role, &permissions).await
        }
        Commands::SetUserRoles { email, roles } => {
            handle_set_user_roles(&admin, &email, &roles).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn connect() -> anyhow::Result<PgRbacStore> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_db_pool(&config)
        .await
        .context("Failed to connect to database")?;
    Ok(PgRbacStore::new(pool))
}

async fn handle_migrate(store: &PgRbacStore) -> anyhow::Result<()> {
    run_migrations(store.pool()).await?;
    println!("✅ Migrations applied");
    Ok(())
}

async fn handle_seed(store: &PgRbacStore, reset_permissions: bool) -> anyhow::Result<()> {
    run_migrations(store.pool()).await?;
    let report = seed::seed_all(store, reset_permissions).await?;

    for role in &report.roles_created {
        println!("✅ Created role: {}", role);
    }
    for role in &report.roles_reset {
        println!("✅ Reset permissions of role: {}", role);
    }
    for email in &report.users_assigned {
        println!("✅ Demo user ready: {}", email);
    }
    println!("🌱 Seeding complete");
    Ok(())
}

async fn handle_issue_token(store: &PgRbacStore, email: &str) -> anyhow::Result<()> {
    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| anyhow!("No user with email {}", email))?;

    let token = create_access_token(user.id, &user.email, &JwtConfig::from_env())
        .map_err(|e| e.error)?;
    println!("{}", token);
    Ok(())
}

async fn handle_list_roles(admin: &RoleMembershipAdmin) -> anyhow::Result<()> {
    for role in admin.list_roles().await? {
        let (_, permissions) = admin.role_permissions(role.as_str()).await?;
        let permissions: Vec<&str> = permissions.iter().map(Permission::as_str).collect();
        println!("{}: {}", role, permissions.join(", "));
    }
    Ok(())
}

async fn handle_set_role_permissions(
    admin: &RoleMembershipAdmin,
    role: &str,
    permissions: &[String],
) -> anyhow::Result<()> {
    let (role, permissions) = admin.set_role_permissions(role, permissions).await?;
    println!("✅ {} now grants {} permission(s)", role, permissions.len());
    Ok(())
}

async fn handle_set_user_roles(
    admin: &RoleMembershipAdmin,
    email: &str,
    roles: &[String],
) -> anyhow::Result<()> {
    let (user, roles) = admin.set_user_roles_by_email(email, roles).await?;
    println!("✅ {} now holds {} role(s)", user.email, roles.len());
    Ok(())
}
