//! Group members.
//!
//! A [`Member`] is a user's membership row within one group. Its identity is
//! the username ([`MemberId`]), which is also the primary key of `users`.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Stable identifier of a member inside a group (the username).
///
/// Ordered lexicographically, which is the tie-break used when two balances
/// are equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MemberId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Created the group.
    Owner,
    /// Joined through the invite code.
    Member,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            other => Err(EngineError::InvalidName(format!(
                "invalid membership role: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub role: String,
    pub joined_at: DateTimeUtc,
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
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<(Model, Option<super::users::Model>)> for Member {
    type Error = EngineError;

    /// Builds a member from its membership row and the (optional) user row.
    /// The display name falls back to the username.
    fn try_from((model, user): (Model, Option<super::users::Model>)) -> Result<Self, Self::Error> {
        let name = user
            .map(|u| u.display_name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| model.user_id.clone());
        Ok(Self {
            id: MemberId::new(model.user_id),
            name,
            role: MemberRole::try_from(model.role.as_str())?,
            joined_at: model.joined_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_ids_order_lexicographically() {
        let mut ids = vec![MemberId::from("carol"), MemberId::from("alice"), MemberId::from("bob")];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                MemberId::from("alice"),
                MemberId::from("bob"),
                MemberId::from("carol")
            ]
        );
    }

    #[test]
    fn member_falls_back_to_username() {
        let model = Model {
            group_id: "g".to_string(),
            user_id: "alice".to_string(),
            role: "owner".to_string(),
            joined_at: Utc::now(),
        };
        let member = Member::try_from((model, None)).unwrap();
        assert_eq!(member.name, "alice");
        assert_eq!(member.role, MemberRole::Owner);
    }

    #[test]
    #[should_panic(expected = "InvalidName(\"invalid membership role: admin\")")]
    fn rejects_unknown_role() {
        MemberRole::try_from("admin").unwrap();
    }
}
