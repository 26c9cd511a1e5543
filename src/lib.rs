//! User Registry
//!
//! HTTP service for user records with:
//! - Ordered field validation with one message per failure
//! - A configurable minimum registration age
//! - Birthdate range search
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, UserServiceTrait};
use infrastructure::storage::{connect_pool, run_storage_migrations, StorageType};
use infrastructure::user::{InMemoryUserRepository, PostgresUserRepository, UserService};
use tracing::info;

/// Create the application state with the backend and age rule from `config`
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_backend = config.storage.storage_type()?;
    let min_age = config.users.min_age;

    info!(backend = %storage_backend, min_age, "Creating user service");

    let user_service: Arc<dyn UserServiceTrait> = match storage_backend {
        StorageType::InMemory => {
            let repository = Arc::new(InMemoryUserRepository::new());
            Arc::new(UserService::new(repository, min_age))
        }
        StorageType::Postgres => {
            info!("Connecting to PostgreSQL...");
            let pool = connect_pool(&config.storage.postgres_config()?).await?;

            let applied = run_storage_migrations(&pool).await?;
            info!(applied, "Storage migrations complete");

            let repository = Arc::new(PostgresUserRepository::new(pool));
            Arc::new(UserService::new(repository, min_age))
        }
    };

    Ok(AppState::new(user_service))
}
