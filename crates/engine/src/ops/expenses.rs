use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Expense, NewExpenseCmd, ResultEngine, expense, expense_splits,
    util::normalize_required_name,
};

use super::{Engine, access::ensure_on_roster, with_tx};

impl Engine {
    /// Records an expense and its splits in one transaction.
    ///
    /// The caller must belong to the group, and so must the payer and every
    /// split member.
    pub async fn create_expense(&self, cmd: NewExpenseCmd) -> ResultEngine<Expense> {
        let title = normalize_required_name(&cmd.title, "expense")?;
        cmd.amount.ensure_payable("amount_minor")?;

        with_tx!(self, |db_tx| {
            self.require_member(&db_tx, cmd.group_id, &cmd.user_id)
                .await?;
            let roster = self.load_roster(&db_tx, cmd.group_id).await?;
            ensure_on_roster(&roster, [&cmd.payer_id], |id| {
                EngineError::NotMember(format!("payer {id}"))
            })?;

            let splits = cmd.split.resolve(cmd.amount)?;
            ensure_on_roster(&roster, splits.keys(), |id| {
                EngineError::NotMember(format!("split member {id}"))
            })?;

            let expense = Expense::new(
                cmd.group_id,
                title,
                cmd.amount,
                cmd.category,
                cmd.occurred_at.unwrap_or_else(Utc::now),
                cmd.payer_id,
                cmd.user_id.clone(),
                splits,
            )?;

            expense::ActiveModel::from(&expense).insert(&db_tx).await?;
            expense_splits::Entity::insert_many(expense.split_models())
                .exec(&db_tx)
                .await?;

            tracing::info!(
                expense_id = %expense.id,
                group_id = %expense.group_id,
                amount_minor = expense.amount.minor(),
                splits = expense.splits.len(),
                "expense recorded"
            );
            Ok(expense)
        })
    }

    /// Every expense of a group with its splits, newest first.
    pub(super) async fn load_expenses(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<Expense>> {
        let models: Vec<expense::Model> = expense::Entity::find()
            .filter(expense::Column::GroupId.eq(group_id.to_string()))
            .order_by_desc(expense::Column::OccurredAt)
            .order_by_desc(expense::Column::Id)
            .all(db)
            .await?;

        let split_models: Vec<expense_splits::Model> = expense_splits::Entity::find()
            .join(JoinType::InnerJoin, expense_splits::Relation::Expenses.def())
            .filter(expense::Column::GroupId.eq(group_id.to_string()))
            .order_by_asc(expense_splits::Column::UserId)
            .all(db)
            .await?;

        let mut splits_by_expense: HashMap<String, Vec<expense_splits::Model>> = HashMap::new();
        for split in split_models {
            splits_by_expense
                .entry(split.expense_id.clone())
                .or_default()
                .push(split);
        }

        models
            .into_iter()
            .map(|model| {
                let splits = splits_by_expense.remove(&model.id).unwrap_or_default();
                Expense::try_from((model, splits))
            })
            .collect()
    }
}
