//! User domain
//!
//! Domain types for user records: the entity, the ordered validation rules and
//! the repository contract the persistence layer implements.

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId};
pub use repository::UserRepository;
pub use validation::{
    age_in_years, check_date_range, check_minimum_age, is_valid_email, validate, ValidationError,
};

#[cfg(test)]
pub use repository::MockUserRepository;
