use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, NewSettlementCmd, ResultEngine, Settlement, settlement};

use super::{Engine, access::ensure_on_roster, with_tx};

impl Engine {
    /// Records a payment already made from one member to another.
    pub async fn create_settlement(&self, cmd: NewSettlementCmd) -> ResultEngine<Settlement> {
        let settlement = Settlement::new(
            cmd.group_id,
            cmd.payer_id,
            cmd.receiver_id,
            cmd.amount,
            cmd.occurred_at.unwrap_or_else(Utc::now),
            cmd.user_id,
        )?;

        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, settlement.group_id, &settlement.created_by)
                .await?;
            let roster = self.load_roster(&db_tx, settlement.group_id).await?;
            ensure_on_roster(&roster, [&settlement.payer_id], |id| {
                EngineError::NotMember(format!("payer {id}"))
            })?;
            ensure_on_roster(&roster, [&settlement.receiver_id], |id| {
                EngineError::NotMember(format!("receiver {id}"))
            })?;

            settlement::ActiveModel::from(&settlement)
                .insert(&db_tx)
                .await?;

            tracing::info!(
                settlement_id = %settlement.id,
                group_id = %settlement.group_id,
                amount_minor = settlement.amount.minor(),
                "settlement recorded"
            );
            Ok(settlement)
        })
    }

    /// Settlements of a group, newest first. Members only.
    pub async fn list_settlements(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<Settlement>> {
        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, group_id, user_id).await?;
            self.load_settlements(&db_tx, group_id).await
        })
    }

    pub(super) async fn load_settlements(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<Settlement>> {
        settlement::Entity::find()
            .filter(settlement::Column::GroupId.eq(group_id.to_string()))
            .order_by_desc(settlement::Column::OccurredAt)
            .order_by_desc(settlement::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(Settlement::try_from)
            .collect()
    }
}
