//! A `Group` is a household sharing expenses. Users join it through its
//! invite code.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine, util::parse_uuid};

/// Length of the invite code handed out to new members.
pub const INVITE_CODE_LEN: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub invite_code: String,
    pub currency: Currency,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: String, currency: Currency, created_by: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            invite_code: generate_invite_code(),
            currency,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Draws a fresh invite code: the first characters of a random UUID,
/// uppercased (e.g. `3FA85F`).
pub fn generate_invite_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(INVITE_CODE_LEN)
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Normalizes user input for an invite-code lookup.
pub(crate) fn normalize_invite_code(code: &str) -> ResultEngine<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != INVITE_CODE_LEN || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EngineError::KeyNotFound("group not exists".to_string()));
    }
    Ok(code)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub invite_code: String,
    pub currency: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::members::Entity")]
    Members,
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::settlement::Entity")]
    Settlements,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::settlement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settlements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Group> for ActiveModel {
    fn from(value: &Group) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            invite_code: ActiveValue::Set(value.invite_code.clone()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            created_by: ActiveValue::Set(value.created_by.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Group {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "group")?,
            name: model.name,
            invite_code: model.invite_code,
            currency: Currency::try_from(model.currency.as_str())?,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_codes_are_six_uppercase_hex_chars() {
        for _ in 0..32 {
            let code = generate_invite_code();
            assert_eq!(code.len(), INVITE_CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(code, code.to_ascii_uppercase());
        }
    }

    #[test]
    fn invite_code_lookup_is_case_insensitive() {
        assert_eq!(normalize_invite_code(" ab12cd ").unwrap(), "AB12CD");
        assert!(normalize_invite_code("AB12").is_err());
        assert!(normalize_invite_code("AB-12C").is_err());
    }

    #[test]
    fn group_round_trips_through_model() {
        let group = Group::new("Flat 4B".to_string(), Currency::Gbp, "alice");
        let active: ActiveModel = (&group).into();
        let model = Model {
            id: active.id.unwrap(),
            name: active.name.unwrap(),
            invite_code: active.invite_code.unwrap(),
            currency: active.currency.unwrap(),
            created_by: active.created_by.unwrap(),
            created_at: active.created_at.unwrap(),
        };
        assert_eq!(Group::try_from(model).unwrap(), group);
    }
}
