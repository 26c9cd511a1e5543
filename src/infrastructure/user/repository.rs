//! In-memory user repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository, ValidationError};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
///
/// Ids come from a monotonically increasing sequence starting at 1, matching an
/// identity column. Range queries return users in id order.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<BTreeMap<i64, User>>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    fn starting_at(first_id: i64) -> Self {
        Self {
            users: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: AtomicI64::new(first_id),
        }
    }

    /// Take the next id, failing once the sequence reaches `i64::MAX`
    fn allocate_id(&self) -> Result<UserId, DomainError> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map(UserId::new)
            .map_err(|_| DomainError::storage("User id sequence exhausted"))
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, mut user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        let id = match user.id() {
            Some(id) if users.contains_key(&id.value()) => id,
            Some(id) => return Err(ValidationError::NotFound(id).into()),
            None => {
                let id = self.allocate_id()?;
                user.set_id(Some(id));
                id
            }
        };

        users.insert(id.value(), user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&id.value()).cloned())
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        users.remove(&id.value());
        Ok(())
    }

    async fn find_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;

        let result: Vec<User> = users
            .values()
            .filter(|u| u.date().is_some_and(|d| from <= d && d <= to))
            .cloned()
            .collect();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_user(email: &str, birth: NaiveDate) -> User {
        User::new()
            .with_email(email)
            .with_name("Viktor")
            .with_surname("Shelest")
            .with_date(birth)
    }

    async fn seeded(users: Vec<User>) -> InMemoryUserRepository {
        let repo = InMemoryUserRepository::new();

        for user in users {
            repo.save(user).await.unwrap();
        }

        repo
    }

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo
            .save(create_test_user("a@mail.com", date(1990, 1, 1)))
            .await
            .unwrap();
        let second = repo
            .save(create_test_user("b@mail.com", date(1991, 1, 1)))
            .await
            .unwrap();

        assert_eq!(first.id(), Some(UserId::new(1)));
        assert_eq!(second.id(), Some(UserId::new(2)));
    }

    #[tokio::test]
    async fn test_save_with_id_replaces() {
        let repo = InMemoryUserRepository::new();
        let saved = repo
            .save(create_test_user("a@mail.com", date(1990, 1, 1)))
            .await
            .unwrap();

        let changed = saved.clone().with_email("changed@mail.com");
        repo.save(changed).await.unwrap();

        let retrieved = repo.find_by_id(saved.id().unwrap()).await.unwrap().unwrap();
        assert_eq!(retrieved.email(), Some("changed@mail.com"));

        let all = repo
            .find_by_date_range(date(1900, 1, 1), date(2100, 1, 1))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_save_with_unknown_id_is_not_found() {
        let repo = InMemoryUserRepository::new();

        let err = repo
            .save(create_test_user("a@mail.com", date(1990, 1, 1)).with_id(UserId::new(10)))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "User with id: 10 not found");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(repo.find_by_id(UserId::new(10)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_after_delete_does_not_resurrect() {
        let repo = InMemoryUserRepository::new();
        let saved = repo
            .save(create_test_user("a@mail.com", date(1990, 1, 1)))
            .await
            .unwrap();
        let id = saved.id().unwrap();

        repo.delete_by_id(id).await.unwrap();

        assert!(repo.save(saved).await.is_err());
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sequence_exhaustion_is_an_error() {
        let repo = InMemoryUserRepository::starting_at(i64::MAX - 1);

        let last = repo
            .save(create_test_user("a@mail.com", date(1990, 1, 1)))
            .await
            .unwrap();
        assert_eq!(last.id(), Some(UserId::new(i64::MAX - 1)));

        let err = repo
            .save(create_test_user("b@mail.com", date(1990, 1, 1)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalServerError);

        // The exhausted sequence stays exhausted
        assert!(repo
            .save(create_test_user("c@mail.com", date(1990, 1, 1)))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.find_by_id(UserId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let saved = repo
            .save(create_test_user("a@mail.com", date(1990, 1, 1)))
            .await
            .unwrap();
        let id = saved.id().unwrap();

        repo.delete_by_id(id).await.unwrap();

        assert!(repo.find_by_id(id).await.unwrap().is_none());

        // Deleting a missing id is not an error at the store level
        repo.delete_by_id(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_date_range_inclusive() {
        let repo = seeded(vec![
            create_test_user("a@mail.com", date(1990, 1, 1)),
            create_test_user("b@mail.com", date(1995, 6, 15)),
            create_test_user("c@mail.com", date(2000, 12, 31)),
            create_test_user("d@mail.com", date(2005, 3, 3)),
        ])
        .await;

        let found = repo
            .find_by_date_range(date(1995, 6, 15), date(2000, 12, 31))
            .await
            .unwrap();

        let emails: Vec<_> = found.iter().filter_map(|u| u.email()).collect();
        assert_eq!(emails, vec!["b@mail.com", "c@mail.com"]);
    }

    #[tokio::test]
    async fn test_find_by_date_range_empty() {
        let repo = seeded(vec![create_test_user("a@mail.com", date(1990, 1, 1))]).await;

        let found = repo
            .find_by_date_range(date(2001, 1, 1), date(2002, 1, 1))
            .await
            .unwrap();

        assert!(found.is_empty());
    }
}
