//! Settlement API endpoints

use api_types::settlement::{SettlementListResponse, SettlementNew, SettlementView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Money, NewSettlementCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user, views::settlement_view};

/// Handle requests for recording a payment between two members
pub async fn settlement_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SettlementNew>,
) -> Result<(StatusCode, Json<SettlementView>), ServerError> {
    let mut cmd = NewSettlementCmd::new(
        payload.group_id,
        user.username,
        payload.payer,
        payload.receiver,
        Money::new(payload.amount_minor),
    );
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.occurred_at(occurred_at.with_timezone(&Utc));
    }

    let settlement = state.engine.create_settlement(cmd).await?;

    Ok((StatusCode::CREATED, Json(settlement_view(settlement))))
}

/// Handle requests for listing a group's settlements
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<SettlementListResponse>, ServerError> {
    let settlements = state
        .engine
        .list_settlements(group_id, &user.username)
        .await?;

    Ok(Json(SettlementListResponse {
        settlements: settlements.into_iter().map(settlement_view).collect(),
    }))
}
