use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, app, run, run_with_listener, spawn_with_listener};

mod balances;
mod expenses;
mod groups;
mod server;
mod settlements;
mod user;
mod views;

pub mod types {
    pub mod group {
        pub use api_types::group::{
            GroupDetailResponse, GroupJoin, GroupListResponse, GroupNew, GroupView, MemberRole,
            MemberView,
        };
    }

    pub mod expense {
        pub use api_types::expense::{
            Category, ExpenseNew, ExpenseView, SplitNew, SplitRequest, SplitView,
        };
    }

    pub mod settlement {
        pub use api_types::settlement::{
            SettlementListResponse, SettlementNew, SettlementView,
        };
    }

    pub mod balance {
        pub use api_types::balance::{BalanceView, DebtView, GroupBalancesResponse};
    }

    pub mod stats {
        pub use api_types::stats::{CategoryTotal, GroupSummaryResponse, PayerTotal};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::ResidualImbalance(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidAmount(_)
        | EngineError::InvalidSplit(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidId(_)
        | EngineError::NotMember(_)
        | EngineError::CurrencyMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::ResidualImbalance(detail) => {
            tracing::error!("ledger inconsistency: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
