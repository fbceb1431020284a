use std::collections::HashSet;

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Member, MemberId, ResultEngine, group, members, users};

use super::Engine;

impl Engine {
    pub(super) async fn find_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Option<group::Model>> {
        group::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    async fn membership(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Option<members::Model>> {
        members::Entity::find_by_id((group_id.to_string(), user_id.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Returns the group when `user_id` belongs to it.
    ///
    /// A missing group is [`EngineError::KeyNotFound`]; an existing group the
    /// user is not part of is [`EngineError::Forbidden`].
    pub(super) async fn require_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<group::Model> {
        let model = self
            .find_group(db, group_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))?;
        if self.membership(db, group_id, user_id).await?.is_none() {
            return Err(EngineError::Forbidden(
                "not a member of this group".to_string(),
            ));
        }
        Ok(model)
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    /// Members of a group in join order, then by id.
    pub(super) async fn load_roster(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<Member>> {
        let rows: Vec<(members::Model, Option<users::Model>)> = members::Entity::find()
            .filter(members::Column::GroupId.eq(group_id.to_string()))
            .find_also_related(users::Entity)
            .order_by_asc(members::Column::JoinedAt)
            .order_by_asc(members::Column::UserId)
            .all(db)
            .await?;
        rows.into_iter().map(Member::try_from).collect()
    }
}

/// Fails with `err` unless every id in `ids` is on the roster.
pub(super) fn ensure_on_roster<'a, I>(
    roster: &[Member],
    ids: I,
    err: impl Fn(&MemberId) -> EngineError,
) -> ResultEngine<()>
where
    I: IntoIterator<Item = &'a MemberId>,
{
    let known: HashSet<&MemberId> = roster.iter().map(|m| &m.id).collect();
    for id in ids {
        if !known.contains(id) {
            return Err(err(id));
        }
    }
    Ok(())
}
