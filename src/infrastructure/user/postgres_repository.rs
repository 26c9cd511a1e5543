//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

use crate::domain::user::{User, UserId, UserRepository, ValidationError};
use crate::domain::DomainError;

const USER_COLUMNS: &str = "id, email, name, surname, date, address, phone_number";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, user: &User) -> Result<User, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO users (email, name, surname, date, address, phone_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(user.email())
            .bind(user.name())
            .bind(user.surname())
            .bind(user.date())
            .bind(user.address())
            .bind(user.phone_number())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create user: {}", e)))?;

        row_to_user(&row)
    }

    async fn update(&self, id: UserId, user: &User) -> Result<User, DomainError> {
        let row = sqlx::query(&update_sql())
            .bind(id.value())
            .bind(user.email())
            .bind(user.name())
            .bind(user.surname())
            .bind(user.date())
            .bind(user.address())
            .bind(user.phone_number())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update user {}: {}", id, e)))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(ValidationError::NotFound(id).into()),
        }
    }
}

/// Replaces an existing row only; ids are never written explicitly
fn update_sql() -> String {
    format!(
        r#"
        UPDATE users
        SET email = $2, name = $3, surname = $4, date = $5, address = $6, phone_number = $7
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    )
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: User) -> Result<User, DomainError> {
        match user.id() {
            Some(id) => self.update(id, &user).await,
            None => self.insert(&user).await,
        }
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(())
    }

    async fn find_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<User>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE date BETWEEN $1 AND $2");

        let rows = sqlx::query(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to query users by birthdate: {}", e))
            })?;

        let mut users = Vec::with_capacity(rows.len());

        for row in rows {
            users.push(row_to_user(&row)?);
        }

        Ok(users)
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let map_err = |e: sqlx::Error| DomainError::storage(format!("Invalid user row: {}", e));

    let id: i64 = row.try_get("id").map_err(map_err)?;
    let email: Option<String> = row.try_get("email").map_err(map_err)?;
    let name: Option<String> = row.try_get("name").map_err(map_err)?;
    let surname: Option<String> = row.try_get("surname").map_err(map_err)?;
    let date: Option<NaiveDate> = row.try_get("date").map_err(map_err)?;
    let address: Option<String> = row.try_get("address").map_err(map_err)?;
    let phone_number: Option<String> = row.try_get("phone_number").map_err(map_err)?;

    Ok(build_user(
        id,
        email,
        name,
        surname,
        date,
        address,
        phone_number,
    ))
}

fn build_user(
    id: i64,
    email: Option<String>,
    name: Option<String>,
    surname: Option<String>,
    date: Option<NaiveDate>,
    address: Option<String>,
    phone_number: Option<String>,
) -> User {
    let mut user = User::new().with_id(UserId::new(id));

    user.set_email(email);
    user.set_name(name);
    user.set_surname(surname);
    user.set_date(date);
    user.set_address(address);
    user.set_phone_number(phone_number);

    user
}
