//! Settlements: money one member already handed to another outside the app,
//! recorded so it offsets the computed balances.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MemberId, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub group_id: Uuid,
    pub payer_id: MemberId,
    pub receiver_id: MemberId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
    pub created_by: String,
}

impl Settlement {
    pub fn new(
        group_id: Uuid,
        payer_id: MemberId,
        receiver_id: MemberId,
        amount: Money,
        occurred_at: DateTime<Utc>,
        created_by: String,
    ) -> ResultEngine<Self> {
        let amount = amount.ensure_payable("amount_minor")?;
        if payer_id == receiver_id {
            return Err(EngineError::InvalidAmount(
                "payer and receiver must differ".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            payer_id,
            receiver_id,
            amount,
            occurred_at,
            created_by,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub payer_id: String,
    pub receiver_id: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
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
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Settlement> for ActiveModel {
    fn from(value: &Settlement) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            group_id: ActiveValue::Set(value.group_id.to_string()),
            payer_id: ActiveValue::Set(value.payer_id.as_str().to_string()),
            receiver_id: ActiveValue::Set(value.receiver_id.as_str().to_string()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            occurred_at: ActiveValue::Set(value.occurred_at),
            created_by: ActiveValue::Set(value.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for Settlement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "settlement")?,
            group_id: parse_uuid(&model.group_id, "group")?,
            payer_id: MemberId::new(model.payer_id),
            receiver_id: MemberId::new(model.receiver_id),
            amount: Money::new(model.amount_minor),
            occurred_at: model.occurred_at,
            created_by: model.created_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "InvalidAmount(\"payer and receiver must differ\")")]
    fn fail_settle_with_self() {
        Settlement::new(
            Uuid::new_v4(),
            MemberId::from("bob"),
            MemberId::from("bob"),
            Money::new(100),
            Utc::now(),
            "bob".to_string(),
        )
        .unwrap();
    }

    #[test]
    #[should_panic(expected = "InvalidAmount(\"amount_minor must be > 0\")")]
    fn fail_settle_negative_amount() {
        Settlement::new(
            Uuid::new_v4(),
            MemberId::from("bob"),
            MemberId::from("alice"),
            Money::new(-100),
            Utc::now(),
            "bob".to_string(),
        )
        .unwrap();
    }

    #[test]
    fn fail_settle_above_ceiling() {
        let err = Settlement::new(
            Uuid::new_v4(),
            MemberId::from("bob"),
            MemberId::from("alice"),
            Money::new(i64::MAX),
            Utc::now(),
            "bob".to_string(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("amount_minor must be <= 100000000000".to_string())
        );
    }
}
