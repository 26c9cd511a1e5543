//! Application state for shared services

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::user::UserRepository;
use crate::domain::{DomainError, User, UserId};
use crate::infrastructure::user::UserService;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserServiceTrait>) -> Self {
        Self { user_service }
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, user: User) -> Result<User, DomainError>;
    async fn update(&self, id: UserId, payload: User) -> Result<User, DomainError>;
    async fn delete(&self, id: UserId) -> Result<String, DomainError>;
    async fn find_by_date_range(
        &self,
        date1: NaiveDate,
        date2: NaiveDate,
    ) -> Result<Vec<User>, DomainError>;
    /// Store reachability check for readiness probes
    async fn check_store(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R: UserRepository + 'static> UserServiceTrait for UserService<R> {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        UserService::create(self, user).await
    }

    async fn update(&self, id: UserId, payload: User) -> Result<User, DomainError> {
        UserService::update(self, id, payload).await
    }

    async fn delete(&self, id: UserId) -> Result<String, DomainError> {
        UserService::delete(self, id).await
    }

    async fn find_by_date_range(
        &self,
        date1: NaiveDate,
        date2: NaiveDate,
    ) -> Result<Vec<User>, DomainError> {
        UserService::find_by_date_range(self, date1, date2).await
    }

    async fn check_store(&self) -> Result<(), DomainError> {
        UserService::check_store(self).await
    }
}
