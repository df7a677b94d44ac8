/// User account endpoints
///
/// # Endpoints
///
/// - `POST   /api/v1/users` - Create a user
/// - `GET    /api/v1/users?page=&perPage=` - List active users
/// - `GET    /api/v1/users/:id` - Fetch one user
/// - `PUT    /api/v1/users/:id` - Change name and/or email
/// - `DELETE /api/v1/users/:id` - Soft-delete a user and its membership
/// - `PUT    /api/v1/users/:id/password` - Replace the password

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::PageQuery,
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use usermanagement_shared::{
    credential::validate_password_strength,
    models::user::UserSummary,
    pagination::Paginated,
    store::{CreateUser, UpdateUser},
};
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked with `validate_password_strength`
    pub password: String,
}

/// Update user request
///
/// Omitted fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

fn check_password(password: &str) -> ApiResult<()> {
    validate_password_strength(password).map_err(|e| ApiError::invalid_field("password", e))
}

/// Create a user
///
/// ```text
/// POST /api/v1/users
/// Content-Type: application/json
///
/// { "name": "Jane", "email": "jane@example.com", "password": "hunter22" }
/// ```
///
/// Responds `201 Created` with `{ "id", "name", "email" }`.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: malformed email or short password
/// - `400 Bad Request`: blank field
/// - `409 Conflict`: email held by an active user
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserSummary>)> {
    req.validate()?;
    check_password(&req.password)?;

    let user = state
        .stores
        .identity
        .create_user(CreateUser {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// List active users, one page at a time
///
/// Responds with `{ "items", "total", "page", "perPage" }`.
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<UserSummary>>> {
    let page = state
        .stores
        .identity
        .list_users_page(query.to_request()?)
        .await?;
    Ok(Json(page))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<UserSummary>> {
    Ok(Json(state.stores.identity.get_user(id).await?))
}

/// Update name and/or email
///
/// # Errors
///
/// - `400 Bad Request`: neither field supplied
/// - `409 Conflict`: email held by another active user
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    state
        .stores
        .identity
        .update_user(UpdateUser {
            id,
            name: req.name,
            email: req.email,
        })
        .await?;

    Ok(StatusCode::OK)
}

pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.stores.identity.delete_user(id).await?;
    Ok(StatusCode::OK)
}

/// Replace a user's password
///
/// # Errors
///
/// - `422 Unprocessable Entity`: password shorter than 6 characters
/// - `404 Not Found`: no active user with the id
pub async fn change_password(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    check_password(&req.password)?;

    state
        .stores
        .identity
        .change_password(id, &req.password)
        .await?;

    Ok(StatusCode::OK)
}
