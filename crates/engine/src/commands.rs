//! Command structs for engine write operations.
//!
//! These types group parameters for expense and settlement creation, keeping
//! call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Category, MemberId, Money, SplitMode};

/// Create an expense in a group.
#[derive(Clone, Debug)]
pub struct NewExpenseCmd {
    pub group_id: Uuid,
    pub title: String,
    pub amount: Money,
    pub category: Category,
    pub occurred_at: Option<DateTime<Utc>>,
    pub payer_id: MemberId,
    pub split: SplitMode,
    pub user_id: String,
}

impl NewExpenseCmd {
    /// New expense paid by `payer_id` and split evenly among `members`.
    #[must_use]
    pub fn new(
        group_id: Uuid,
        user_id: impl Into<String>,
        title: impl Into<String>,
        amount: Money,
        payer_id: impl Into<MemberId>,
        members: Vec<MemberId>,
    ) -> Self {
        Self {
            group_id,
            title: title.into(),
            amount,
            category: Category::default(),
            occurred_at: None,
            payer_id: payer_id.into(),
            split: SplitMode::Equal(members),
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn split(mut self, split: SplitMode) -> Self {
        self.split = split;
        self
    }

    #[must_use]
    pub fn custom_split(mut self, pairs: Vec<(MemberId, Money)>) -> Self {
        self.split = SplitMode::Custom(pairs);
        self
    }
}

/// Record a direct payment from one member to another.
#[derive(Clone, Debug)]
pub struct NewSettlementCmd {
    pub group_id: Uuid,
    pub payer_id: MemberId,
    pub receiver_id: MemberId,
    pub amount: Money,
    pub occurred_at: Option<DateTime<Utc>>,
    pub user_id: String,
}

impl NewSettlementCmd {
    #[must_use]
    pub fn new(
        group_id: Uuid,
        user_id: impl Into<String>,
        payer_id: impl Into<MemberId>,
        receiver_id: impl Into<MemberId>,
        amount: Money,
    ) -> Self {
        Self {
            group_id,
            payer_id: payer_id.into(),
            receiver_id: receiver_id.into(),
            amount,
            occurred_at: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}
