//! Version 1 of the user records API

pub mod users;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            post(users::create_user).get(users::find_users_by_query),
        )
        .route(
            "/users/{id}",
            get(users::find_users_by_path)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}
