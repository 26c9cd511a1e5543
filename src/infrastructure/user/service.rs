//! User service orchestrating validation and persistence

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::domain::user::{
    check_date_range, check_minimum_age, validate, User, UserId, UserRepository, ValidationError,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_user_operation;

/// User service for registration and record maintenance
#[derive(Debug)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    min_age: u32,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service with the registration age threshold
    pub fn new(repository: Arc<R>, min_age: u32) -> Self {
        Self {
            repository,
            min_age,
            today: local_today,
        }
    }

    /// Replace the source of the current date
    #[cfg(test)]
    pub(crate) fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Round-trip a query to the store without counting it as a user operation
    pub async fn check_store(&self) -> Result<(), DomainError> {
        let today = (self.today)();

        self.repository.find_by_date_range(today, today).await?;

        Ok(())
    }

    /// Register a new user
    pub async fn create(&self, mut user: User) -> Result<User, DomainError> {
        let result = self.create_inner(&mut user).await;
        record_user_operation("create", result.is_ok());
        result
    }

    async fn create_inner(&self, user: &mut User) -> Result<User, DomainError> {
        let today = (self.today)();

        if let Err(e) = validate(user, today) {
            debug!(error = %e, "Rejected user payload");
            return Err(e.into());
        }

        if let Some(birth) = user.date() {
            check_minimum_age(birth, today, self.min_age)?;
        }

        // The store owns id assignment
        user.set_id(None);

        let saved = self.repository.save(user.clone()).await?;

        if saved.id().is_none() {
            return Err(DomainError::storage("Store returned a user without an id"));
        }

        info!(user_id = ?saved.id(), "User created");

        Ok(saved)
    }

    /// Replace the mutable fields of an existing user
    ///
    /// Field constraints and the age rule are not re-checked here.
    pub async fn update(&self, id: UserId, payload: User) -> Result<User, DomainError> {
        let result = self.update_inner(id, payload).await;
        record_user_operation("update", result.is_ok());
        result
    }

    async fn update_inner(&self, id: UserId, payload: User) -> Result<User, DomainError> {
        let mut user = self.get_existing(id).await?;

        user.apply_changes(payload);

        let saved = self.repository.save(user).await?;

        info!(user_id = %id, "User updated");

        Ok(saved)
    }

    /// Delete an existing user, returning a confirmation message
    pub async fn delete(&self, id: UserId) -> Result<String, DomainError> {
        let result = self.delete_inner(id).await;
        record_user_operation("delete", result.is_ok());
        result
    }

    async fn delete_inner(&self, id: UserId) -> Result<String, DomainError> {
        self.get_existing(id).await?;

        self.repository.delete_by_id(id).await?;

        info!(user_id = %id, "User deleted");

        Ok(format!("Success delete user with id: {}", id))
    }

    /// Users whose birthdate falls within `[date1, date2]`, in store order
    pub async fn find_by_date_range(
        &self,
        date1: NaiveDate,
        date2: NaiveDate,
    ) -> Result<Vec<User>, DomainError> {
        let result = self.find_by_date_range_inner(date1, date2).await;
        record_user_operation("find_by_date_range", result.is_ok());
        result
    }

    async fn find_by_date_range_inner(
        &self,
        date1: NaiveDate,
        date2: NaiveDate,
    ) -> Result<Vec<User>, DomainError> {
        check_date_range(date1, date2)?;

        let users = self.repository.find_by_date_range(date1, date2).await?;

        debug!(
            from = %date1,
            to = %date2,
            count = users.len(),
            "Birthdate range query"
        );

        Ok(users)
    }

    async fn get_existing(&self, id: UserId) -> Result<User, DomainError> {
        match self.repository.find_by_id(id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = %id, "User not found");
                Err(ValidationError::NotFound(id).into())
            }
        }
    }
}
