//! Group API endpoints

use api_types::group::{GroupDetailResponse, GroupJoin, GroupListResponse, GroupNew, GroupView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    user,
    views::{currency_from_api, expense_view, group_view},
};

/// Handle requests for creating a new group. The caller becomes its owner.
pub async fn group_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state
        .engine
        .create_group(
            &payload.name,
            payload.currency.map(currency_from_api),
            &user.username,
        )
        .await?;
    let members = state
        .engine
        .list_members(group.id, &user.username)
        .await?;

    Ok((StatusCode::CREATED, Json(group_view(group, &members))))
}

/// Handle requests for listing the caller's groups
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<GroupListResponse>, ServerError> {
    let groups = state.engine.list_groups(&user.username).await?;

    Ok(Json(GroupListResponse {
        groups: groups
            .into_iter()
            .map(|summary| group_view(summary.group, &summary.members))
            .collect(),
    }))
}

/// Handle requests for joining a group through its invite code
pub async fn join(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupJoin>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state
        .engine
        .join_group(&payload.invite_code, &user.username)
        .await?;
    let members = state
        .engine
        .list_members(group.id, &user.username)
        .await?;

    Ok(Json(group_view(group, &members)))
}

/// Handle requests for a group with its members and expenses
pub async fn detail(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetailResponse>, ServerError> {
    let detail = state
        .engine
        .group_detail(group_id, &user.username)
        .await?;

    Ok(Json(GroupDetailResponse {
        group: group_view(detail.group, &detail.members),
        expenses: detail.expenses.into_iter().map(expense_view).collect(),
    }))
}
