//! Infrastructure layer - stores, logging, metrics and database plumbing

pub mod logging;
pub mod observability;
pub mod storage;
pub mod user;
