/// Group and group membership endpoints
///
/// # Endpoints
///
/// - `POST   /api/v1/groups` - Create a group
/// - `GET    /api/v1/groups?page=&perPage=` - List active groups
/// - `GET    /api/v1/groups/:id` - Fetch one group
/// - `PUT    /api/v1/groups/:id` - Rename a group
/// - `DELETE /api/v1/groups/:id` - Soft-delete a group and its memberships
/// - `GET    /api/v1/groups/:id/users?page=&perPage=` - List members
/// - `POST   /api/v1/groups/:id/users` - Add a user to the group
/// - `DELETE /api/v1/groups/:id/users/:user_id` - Remove a user from the group

use crate::{
    app::AppState,
    error::ApiResult,
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
    models::{group::GroupSummary, user::UserSummary},
    pagination::Paginated,
};
use validator::Validate;

/// Create or rename request
#[derive(Debug, Deserialize, Validate)]
pub struct GroupRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: i64,
}

/// Create a group
///
/// Responds `201 Created` with `{ "id", "name" }`, or `409 Conflict` when an
/// active group already has the name.
pub async fn create_group(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GroupRequest>,
) -> ApiResult<(StatusCode, Json<GroupSummary>)> {
    req.validate()?;
    let group = state.stores.groups.create_group(&req.name).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn list_groups(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<GroupSummary>>> {
    let page = state
        .stores
        .groups
        .list_groups_page(query.to_request()?)
        .await?;
    Ok(Json(page))
}

pub async fn get_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<GroupSummary>> {
    Ok(Json(state.stores.groups.get_group(id).await?))
}

pub async fn update_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<GroupRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;
    state.stores.groups.update_group(id, &req.name).await?;
    Ok(StatusCode::OK)
}

pub async fn delete_group(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.stores.groups.delete_group(id).await?;
    Ok(StatusCode::OK)
}

/// List the active users of a group
///
/// A group with no members, or an unknown group id, yields an empty page.
pub async fn list_members(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<UserSummary>>> {
    let page = state
        .stores
        .memberships
        .list_members_page(id, query.to_request()?)
        .await?;
    Ok(Json(page))
}

/// Add a user to a group
///
/// ```text
/// POST /api/v1/groups/3/users
/// Content-Type: application/json
///
/// { "user_id": 7 }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: the user already belongs to a group
pub async fn add_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> ApiResult<StatusCode> {
    state.stores.memberships.add_member(req.user_id, id).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_member(
    State(state): State<AppState>,
    ApiPath((id, user_id)): ApiPath<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state.stores.memberships.remove_member(id, user_id).await?;
    Ok(StatusCode::OK)
}
