//! Migrate command - applies or reverts the user store schema

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::storage::{
    connect_pool, revert_storage_migrations, run_storage_migrations,
};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the latest applied migration instead of applying pending ones
    #[arg(long)]
    pub revert: bool,
}

/// Run migrations against the configured PostgreSQL database
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    let pool = connect_pool(&config.storage.postgres_config()?).await?;

    if args.revert {
        match revert_storage_migrations(&pool).await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("No migrations to revert"),
        }
    } else {
        let applied = run_storage_migrations(&pool).await?;
        info!(applied, "Migrations up to date");
    }

    pool.close().await;

    Ok(())
}
