//! User repository trait

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Persistence contract for user records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Insert a user without an id (the store assigns one) or replace the stored
    /// row carrying the same id. Returns the stored user.
    ///
    /// Saving with an id that has no stored row is a not-found error; it never
    /// creates the row.
    async fn save(&self, user: User) -> Result<User, DomainError>;

    /// Get a user by id
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Remove a user by id
    async fn delete_by_id(&self, id: UserId) -> Result<(), DomainError>;

    /// Users born between `from` and `to`, both ends inclusive
    async fn find_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<User>, DomainError>;
}
