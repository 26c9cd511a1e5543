//! User endpoint handlers

use axum::extract::{rejection::QueryRejection, Path, Query, State};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{User, UserId};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query-string form of the birthdate range search
#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub date1: Option<String>,
    pub date2: Option<String>,
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<User>, ApiError> {
    debug!("Creating user");

    let created = state.user_service.create(user).await?;

    Ok(Json(created))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<User>,
) -> Result<Json<User>, ApiError> {
    let id = parse_user_id(&id)?;
    debug!(user_id = %id, "Updating user");

    let updated = state.user_service.update(id, payload).await?;

    Ok(Json(updated))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    let id = parse_user_id(&id)?;
    debug!(user_id = %id, "Deleting user");

    let message = state.user_service.delete(id).await?;

    Ok(message)
}

/// GET /api/v1/users/date1={date1}&date2={date2}
///
/// The range travels inside a single path segment.
pub async fn find_users_by_path(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<Vec<User>>, ApiError> {
    let (date1, date2) = parse_range_segment(&segment)?;

    find_in_range(&state, date1, date2).await
}

/// GET /api/v1/users?date1=..&date2=..
pub async fn find_users_by_query(
    State(state): State<AppState>,
    params: Result<Query<DateRangeParams>, QueryRejection>,
) -> Result<Json<Vec<User>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let date1 = parse_date("date1", params.date1.as_deref())?;
    let date2 = parse_date("date2", params.date2.as_deref())?;

    find_in_range(&state, date1, date2).await
}

async fn find_in_range(
    state: &AppState,
    date1: NaiveDate,
    date2: NaiveDate,
) -> Result<Json<Vec<User>>, ApiError> {
    debug!(date1 = %date1, date2 = %date2, "Searching users by birthdate");

    let users = state.user_service.find_by_date_range(date1, date2).await?;

    Ok(Json(users))
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<i64>()
        .map(UserId::new)
        .map_err(|_| ApiError::bad_request(format!("Invalid user id: {}", raw)))
}

/// Split `date1=yyyy-MM-dd&date2=yyyy-MM-dd` into its two dates
fn parse_range_segment(segment: &str) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let mut date1 = None;
    let mut date2 = None;

    for pair in segment.split('&') {
        match pair.split_once('=') {
            Some(("date1", value)) => date1 = Some(value),
            Some(("date2", value)) => date2 = Some(value),
            _ => {
                return Err(ApiError::bad_request(format!(
                    "Expected date1=yyyy-MM-dd&date2=yyyy-MM-dd, got: {}",
                    segment
                )));
            }
        }
    }

    Ok((parse_date("date1", date1)?, parse_date("date2", date2)?))
}

fn parse_date(name: &str, value: Option<&str>) -> Result<NaiveDate, ApiError> {
    let value = value.ok_or_else(|| ApiError::bad_request(format!("Missing {}", name)))?;

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        ApiError::bad_request(format!(
            "Invalid {} '{}', expected yyyy-MM-dd",
            name, value
        ))
    })
}
