use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Expense, Group, Member, MemberRole, ResultEngine, generate_invite_code,
    group::{self, normalize_invite_code},
    members,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

/// Attempts at drawing an unused invite code before giving up.
const MAX_INVITE_ATTEMPTS: usize = 8;

/// A group together with its roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: Group,
    pub members: Vec<Member>,
}

/// A group with its roster and expense history, newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetail {
    pub group: Group,
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
}

impl Engine {
    /// Creates a group owned by `user_id`.
    ///
    /// The invite code is redrawn until it is unused.
    pub async fn create_group(
        &self,
        name: &str,
        currency: Option<Currency>,
        user_id: &str,
    ) -> ResultEngine<Group> {
        let name = normalize_required_name(name, "group")?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let mut group = Group::new(name, currency.unwrap_or_default(), user_id);
            let mut attempts = 1;
            while self.invite_code_taken(&db_tx, &group.invite_code).await? {
                if attempts >= MAX_INVITE_ATTEMPTS {
                    return Err(EngineError::ExistingKey("invite code".to_string()));
                }
                group.invite_code = generate_invite_code();
                attempts += 1;
            }

            group::ActiveModel::from(&group).insert(&db_tx).await?;
            members::ActiveModel {
                group_id: ActiveValue::Set(group.id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                role: ActiveValue::Set(MemberRole::Owner.as_str().to_string()),
                joined_at: ActiveValue::Set(group.created_at),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(group_id = %group.id, user_id, "group created");
            Ok(group)
        })
    }

    /// Groups `user_id` belongs to, oldest first, each with its roster.
    pub async fn list_groups(&self, user_id: &str) -> ResultEngine<Vec<GroupSummary>> {
        with_tx!(self, |db_tx| {
            let group_ids: Vec<String> = members::Entity::find()
                .filter(members::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| m.group_id)
                .collect();

            let models: Vec<group::Model> = group::Entity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .order_by_asc(group::Column::CreatedAt)
                .order_by_asc(group::Column::Id)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let group = Group::try_from(model)?;
                let members = self.load_roster(&db_tx, group.id).await?;
                out.push(GroupSummary { group, members });
            }
            Ok(out)
        })
    }

    /// Adds `user_id` to the group behind `invite_code` as a plain member.
    pub async fn join_group(&self, invite_code: &str, user_id: &str) -> ResultEngine<Group> {
        let code = normalize_invite_code(invite_code)?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let model = group::Entity::find()
                .filter(group::Column::InviteCode.eq(code.as_str()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))?;
            let group = Group::try_from(model)?;

            let existing = members::Entity::find_by_id((group.id.to_string(), user_id.to_string()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "{user_id} in group {}",
                    group.name
                )));
            }

            members::ActiveModel {
                group_id: ActiveValue::Set(group.id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                role: ActiveValue::Set(MemberRole::Member.as_str().to_string()),
                joined_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(group_id = %group.id, user_id, "member joined group");
            Ok(group)
        })
    }

    /// Group, roster and expenses. Members only.
    pub async fn group_detail(&self, group_id: Uuid, user_id: &str) -> ResultEngine<GroupDetail> {
        with_tx!(self, |db_tx| {
            let model = self.require_member(&db_tx, group_id, user_id).await?;
            let group = Group::try_from(model)?;
            let members = self.load_roster(&db_tx, group_id).await?;
            let expenses = self.load_expenses(&db_tx, group_id).await?;
            Ok(GroupDetail {
                group,
                members,
                expenses,
            })
        })
    }

    /// Roster of a group in join order. Members only.
    pub async fn list_members(&self, group_id: Uuid, user_id: &str) -> ResultEngine<Vec<Member>> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, group_id, user_id).await?;
            self.load_roster(&db_tx, group_id).await
        })
    }

    async fn invite_code_taken(
        &self,
        db: &sea_orm::DatabaseTransaction,
        code: &str,
    ) -> ResultEngine<bool> {
        let found = group::Entity::find()
            .filter(group::Column::InviteCode.eq(code))
            .one(db)
            .await?;
        Ok(found.is_some())
    }
}
