//! User infrastructure module
//!
//! Store implementations for user records (in-memory and PostgreSQL) and the
//! service that runs validation and the age rule before touching the store.

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::UserService;
