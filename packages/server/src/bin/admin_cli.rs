//! Operator CLI: create admin accounts and sweep expired OTP codes.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use portal_core::common::{Clock, SystemClock};
use portal_core::domains::auth::models::NewAdmin;
use portal_core::domains::auth::password::hash_password;
use portal_core::domains::auth::Role;
use portal_core::kernel::{BaseAccountStore, BaseOtpStore, PgAccountStore, PgOtpStore};
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "admin_cli")]
#[command(about = "Coaching portal admin CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin account
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_enum, default_value_t = AdminRole::Admin)]
        role: AdminRole,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Delete expired OTP codes now
    PurgeExpiredCodes,
}

#[derive(Clone, Copy, ValueEnum)]
enum AdminRole {
    Admin,
    SuperAdmin,
}

impl From<AdminRole> for Role {
    fn from(role: AdminRole) -> Self {
        match role {
            AdminRole::Admin => Role::Admin,
            AdminRole::SuperAdmin => Role::SuperAdmin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,portal_core=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdmin {
            username,
            password,
            role,
            phone,
        } => cmd_create_admin(username, &password, role.into(), phone).await,
        Commands::PurgeExpiredCodes => cmd_purge_expired_codes().await,
    }
}

async fn get_pool() -> Result<PgPool> {
    let _ = dotenvy::dotenv();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_create_admin(
    username: String,
    password: &str,
    role: Role,
    phone: Option<String>,
) -> Result<()> {
    let username = username.trim().to_string();
    if username.is_empty() {
        bail!("Username must not be empty");
    }
    if password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }

    let accounts = PgAccountStore::new(get_pool().await?);
    if accounts.find_admin_by_username(&username).await?.is_some() {
        bail!("Admin '{}' already exists", username);
    }

    let admin = accounts
        .create_admin(NewAdmin {
            username,
            phone,
            password_hash: hash_password(password)?,
            role,
        })
        .await
        .context("Failed to create admin")?;

    println!("Created {} '{}' ({})", admin.role.as_str(), admin.username, admin.id);
    Ok(())
}

async fn cmd_purge_expired_codes() -> Result<()> {
    let store = PgOtpStore::new(get_pool().await?);
    let removed = store.purge_expired_codes(SystemClock.now()).await?;

    println!("Removed {} expired OTP code(s)", removed);
    Ok(())
}
