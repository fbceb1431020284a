//! Balance and statistics API endpoints

use api_types::{balance::GroupBalancesResponse, stats::GroupSummaryResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    user,
    views::{balances_response, summary_response},
};

/// Handle requests for member balances and the transfers that settle them
pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupBalancesResponse>, ServerError> {
    let balances = state
        .engine
        .group_balances(group_id, &user.username)
        .await?;

    Ok(Json(balances_response(balances)))
}

/// Handle requests for spending totals
pub async fn summary(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupSummaryResponse>, ServerError> {
    let summary = state
        .engine
        .group_summary(group_id, &user.username)
        .await?;

    Ok(Json(summary_response(summary)))
}
