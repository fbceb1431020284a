use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
}

pub mod group {
    use super::*;
    use crate::expense::ExpenseView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        /// Defaults to EUR.
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupJoin {
        /// Matched case-insensitively.
        pub invite_code: String,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MemberRole {
        Owner,
        Member,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub username: String,
        pub name: String,
        pub role: MemberRole,
        pub joined_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub invite_code: String,
        pub currency: Currency,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
        /// Join order.
        pub members: Vec<MemberView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupListResponse {
        pub groups: Vec<GroupView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupDetailResponse {
        pub group: GroupView,
        /// Newest first.
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Category {
        Food,
        Transport,
        Utilities,
        Entertainment,
        #[default]
        Other,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitNew {
        pub username: String,
        pub amount_minor: i64,
    }

    /// How the amount is divided.
    ///
    /// ```json
    /// {"mode": "equal", "members": ["alice", "bob"]}
    /// {"mode": "custom", "splits": [{"username": "alice", "amount_minor": 500}]}
    /// ```
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "mode", rename_all = "snake_case")]
    pub enum SplitRequest {
        /// Explicit share per member; must add up to the amount (±1 minor unit,
        /// moved onto the largest share when stored).
        Custom { splits: Vec<SplitNew> },
        /// Even shares; leftover minor units go to the first listed members.
        Equal { members: Vec<String> },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub group_id: Uuid,
        pub title: String,
        pub amount_minor: i64,
        pub category: Option<Category>,
        /// Username of the member who paid.
        pub payer: String,
        pub split: SplitRequest,
        /// RFC3339 timestamp. If absent, server uses now().
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub username: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub title: String,
        pub amount_minor: i64,
        pub category: Category,
        pub occurred_at: DateTime<Utc>,
        pub payer: String,
        pub created_by: String,
        pub splits: Vec<SplitView>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementNew {
        pub group_id: Uuid,
        pub payer: String,
        pub receiver: String,
        pub amount_minor: i64,
        /// RFC3339 timestamp. If absent, server uses now().
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub id: Uuid,
        pub payer: String,
        pub receiver: String,
        pub amount_minor: i64,
        pub occurred_at: DateTime<Utc>,
        pub created_by: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementListResponse {
        /// Newest first.
        pub settlements: Vec<SettlementView>,
    }
}

pub mod balance {
    use super::*;

    /// Positive: the group owes this member. Negative: the member owes the
    /// group.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub username: String,
        pub name: String,
        pub amount_minor: i64,
    }

    /// `from` should pay `amount_minor` to `to`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtView {
        pub from: String,
        pub from_name: String,
        pub to: String,
        pub to_name: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupBalancesResponse {
        pub group_id: Uuid,
        pub currency: Currency,
        /// Join order.
        pub balances: Vec<BalanceView>,
        pub debts: Vec<DebtView>,
    }
}

pub mod stats {
    use super::*;
    use crate::expense::Category;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotal {
        pub category: Category,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayerTotal {
        pub username: String,
        pub name: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupSummaryResponse {
        pub group_id: Uuid,
        pub currency: Currency,
        pub total_minor: i64,
        pub by_category: Vec<CategoryTotal>,
        pub by_payer: Vec<PayerTotal>,
    }
}
