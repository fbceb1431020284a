//! Expense API endpoints

use api_types::expense::{ExpenseNew, ExpenseView, SplitRequest};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::{MemberId, Money, NewExpenseCmd, SplitMode};

use crate::{
    ServerError,
    server::ServerState,
    user,
    views::{category_from_api, expense_view},
};

fn split_mode(split: SplitRequest) -> SplitMode {
    match split {
        SplitRequest::Custom { splits } => SplitMode::Custom(
            splits
                .into_iter()
                .map(|s| (MemberId::from(s.username), Money::new(s.amount_minor)))
                .collect(),
        ),
        SplitRequest::Equal { members } => {
            SplitMode::Equal(members.into_iter().map(MemberId::from).collect())
        }
    }
}

/// Handle requests for recording an expense
pub async fn expense_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let mut cmd = NewExpenseCmd::new(
        payload.group_id,
        user.username,
        payload.title,
        Money::new(payload.amount_minor),
        payload.payer,
        Vec::new(),
    )
    .split(split_mode(payload.split))
    .category(payload.category.map(category_from_api).unwrap_or_default());
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.occurred_at(occurred_at.with_timezone(&Utc));
    }

    let expense = state.engine.create_expense(cmd).await?;

    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}
