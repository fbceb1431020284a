//! Expense primitives.
//!
//! An [`Expense`] is money one member fronted for the group. Its splits say
//! how much of it each member owes. Splits are keyed by member, so a member
//! appears at most once per expense.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MemberId, Money, ResultEngine, expense_splits, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Food,
    Transport,
    Utilities,
    Entertainment,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Utilities,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Utilities => "utilities",
            Self::Entertainment => "entertainment",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "utilities" => Ok(Self::Utilities),
            "entertainment" => Ok(Self::Entertainment),
            "other" => Ok(Self::Other),
            other => Err(EngineError::InvalidName(format!("invalid category: {other}"))),
        }
    }
}

/// How an expense is divided among members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitMode {
    /// Explicit amount per member.
    Custom(Vec<(MemberId, Money)>),
    /// The amount divided evenly among the listed members. Leftover minor
    /// units go to the first members in the list.
    Equal(Vec<MemberId>),
}

impl SplitMode {
    /// Turns the split request into one amount per member.
    ///
    /// Rejects empty requests, members listed twice and shares above
    /// [`Money::MAX`]. The sum is not checked here, see [`Expense::new`].
    pub fn resolve(self, amount: Money) -> ResultEngine<BTreeMap<MemberId, Money>> {
        let pairs = match self {
            SplitMode::Custom(pairs) => pairs,
            SplitMode::Equal(members) => {
                let shares = amount.split_evenly(members.len()).ok_or_else(|| {
                    EngineError::InvalidSplit("splits are required".to_string())
                })?;
                members.into_iter().zip(shares).collect()
            }
        };
        if pairs.is_empty() {
            return Err(EngineError::InvalidSplit("splits are required".to_string()));
        }

        let mut splits = BTreeMap::new();
        for (member, share) in pairs {
            if share > Money::MAX {
                return Err(EngineError::InvalidAmount(format!(
                    "split for {member} must be <= {}",
                    Money::MAX.minor()
                )));
            }
            if splits.insert(member.clone(), share).is_some() {
                return Err(EngineError::InvalidSplit(format!(
                    "member {member} appears more than once"
                )));
            }
        }
        Ok(splits)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub amount: Money,
    pub category: Category,
    pub occurred_at: DateTime<Utc>,
    pub payer_id: MemberId,
    pub created_by: String,
    pub splits: BTreeMap<MemberId, Money>,
}

impl Expense {
    /// Builds a validated expense.
    ///
    /// `amount` must be in `1..=Money::MAX`. Splits must be non-empty,
    /// within `0..=Money::MAX`, and sum to `amount` within
    /// [`Money::TOLERANCE`]. A one-unit difference is moved onto the largest
    /// share (first member on ties), so stored splits always sum exactly to
    /// `amount`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        group_id: Uuid,
        title: String,
        amount: Money,
        category: Category,
        occurred_at: DateTime<Utc>,
        payer_id: MemberId,
        created_by: String,
        mut splits: BTreeMap<MemberId, Money>,
    ) -> ResultEngine<Self> {
        let amount = amount.ensure_payable("amount_minor")?;
        if splits.is_empty() {
            return Err(EngineError::InvalidSplit("splits are required".to_string()));
        }
        if let Some((member, _)) = splits.iter().find(|(_, share)| share.is_negative()) {
            return Err(EngineError::InvalidSplit(format!(
                "split for {member} must be >= 0"
            )));
        }
        if let Some((member, _)) = splits.iter().find(|(_, share)| **share > Money::MAX) {
            return Err(EngineError::InvalidAmount(format!(
                "split for {member} must be <= {}",
                Money::MAX.minor()
            )));
        }
        let total = splits
            .values()
            .try_fold(Money::ZERO, |acc, share| acc.checked_add(*share))
            .ok_or_else(|| EngineError::InvalidAmount("split amounts overflow".to_string()))?;
        if !total.approx_eq(amount) {
            return Err(EngineError::InvalidSplit(format!(
                "split amounts ({total}) do not match total amount ({amount})"
            )));
        }
        absorb_rounding(&mut splits, amount - total);

        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            title,
            amount,
            category,
            occurred_at,
            payer_id,
            created_by,
            splits,
        })
    }

    /// Split rows to persist alongside the expense.
    pub(crate) fn split_models(&self) -> Vec<expense_splits::ActiveModel> {
        self.splits
            .iter()
            .map(|(member, share)| expense_splits::ActiveModel {
                expense_id: ActiveValue::Set(self.id.to_string()),
                user_id: ActiveValue::Set(member.as_str().to_string()),
                amount_minor: ActiveValue::Set(share.minor()),
            })
            .collect()
    }
}

/// Moves a sub-tolerance `diff` onto the largest share, first member on ties.
///
/// With `|diff| <= 1` and the split sum off by `diff`, the largest share is
/// at least 1 whenever `diff` is negative, so no share goes below zero.
fn absorb_rounding(splits: &mut BTreeMap<MemberId, Money>, diff: Money) {
    if diff.is_zero() {
        return;
    }
    let largest = splits
        .iter()
        .max_by(|(a_id, a), (b_id, b)| a.cmp(b).then_with(|| b_id.cmp(a_id)))
        .map(|(member, _)| member.clone());
    if let Some(member) = largest {
        if let Some(share) = splits.get_mut(&member) {
            *share += diff;
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub amount_minor: i64,
    pub category: String,
    pub occurred_at: DateTimeUtc,
    pub payer_id: String,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
    #[sea_orm(has_many = "super::expense_splits::Entity")]
    Splits,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::expense_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            group_id: ActiveValue::Set(expense.group_id.to_string()),
            title: ActiveValue::Set(expense.title.clone()),
            amount_minor: ActiveValue::Set(expense.amount.minor()),
            category: ActiveValue::Set(expense.category.as_str().to_string()),
            occurred_at: ActiveValue::Set(expense.occurred_at),
            payer_id: ActiveValue::Set(expense.payer_id.as_str().to_string()),
            created_by: ActiveValue::Set(expense.created_by.clone()),
        }
    }
}

impl TryFrom<(Model, Vec<expense_splits::Model>)> for Expense {
    type Error = EngineError;

    /// Rebuilds a stored expense. Stored rows were validated on the way in and
    /// are not re-validated here.
    fn try_from((model, splits): (Model, Vec<expense_splits::Model>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            group_id: parse_uuid(&model.group_id, "group")?,
            title: model.title,
            amount: Money::new(model.amount_minor),
            category: Category::try_from(model.category.as_str())?,
            occurred_at: model.occurred_at,
            payer_id: MemberId::new(model.payer_id),
            created_by: model.created_by,
            splits: splits
                .into_iter()
                .map(|s| (MemberId::new(s.user_id), Money::new(s.amount_minor)))
                .collect(),
        })
    }
}
