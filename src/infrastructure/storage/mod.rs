//! Storage infrastructure - backend selection, connection pooling and migrations

mod factory;
pub mod migrations;
mod postgres;

pub use factory::StorageType;
pub use migrations::{
    revert_storage_migrations, run_storage_migrations, storage_migrations, Migration,
    PostgresMigrator,
};
pub use postgres::{connect_pool, PostgresConfig};
