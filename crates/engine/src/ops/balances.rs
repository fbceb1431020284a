use std::collections::{BTreeMap, HashMap};

use sea_orm::{DatabaseTransaction, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Category, Currency, EngineError, Expense, Group, Member, MemberId, Money, ResultEngine,
    Settlement, SimplifiedDebt, aggregate, simplify,
};

use super::{Engine, with_tx};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member: Member,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDebt {
    pub from: Member,
    pub to: Member,
    pub amount: Money,
}

/// Net position of every member plus the transfers that settle them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBalances {
    pub group_id: Uuid,
    pub currency: Currency,
    /// Roster order.
    pub balances: Vec<MemberBalance>,
    pub debts: Vec<MemberDebt>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerTotal {
    pub member: Member,
    pub amount: Money,
}

/// Spending totals of a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummaryStats {
    pub group_id: Uuid,
    pub currency: Currency,
    pub total: Money,
    /// Categories with spending, in [`Category::ALL`] order.
    pub by_category: Vec<CategoryTotal>,
    /// Every roster member, in roster order.
    pub by_payer: Vec<PayerTotal>,
}

/// Everything balances are computed from, read in one transaction.
struct Snapshot {
    group: Group,
    roster: Vec<Member>,
    expenses: Vec<Expense>,
    settlements: Vec<Settlement>,
}

impl Engine {
    async fn snapshot(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Snapshot> {
        let model = self.require_member(db, group_id, user_id).await?;
        Ok(Snapshot {
            group: Group::try_from(model)?,
            roster: self.load_roster(db, group_id).await?,
            expenses: self.load_expenses(db, group_id).await?,
            settlements: self.load_settlements(db, group_id).await?,
        })
    }

    /// Current balances and simplified debts of a group. Members only.
    ///
    /// Recomputed from the full history on every call.
    pub async fn group_balances(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<GroupBalances> {
        let snapshot = with_tx!(self, |db_tx| self.snapshot(&db_tx, group_id, user_id).await)?;

        let balances = aggregate(
            snapshot.roster.iter().map(|m| m.id.clone()),
            &snapshot.expenses,
            &snapshot.settlements,
        );
        let debts = simplify(&balances).inspect_err(|err| {
            tracing::error!(%group_id, %err, "group balances do not net out");
        })?;

        let by_id: HashMap<&MemberId, &Member> =
            snapshot.roster.iter().map(|m| (&m.id, m)).collect();
        let lookup = |id: &MemberId| -> ResultEngine<Member> {
            by_id
                .get(id)
                .map(|m| (*m).clone())
                .ok_or_else(|| EngineError::KeyNotFound(format!("member {id}")))
        };

        let balances = balances
            .iter()
            .map(|(id, amount)| {
                Ok(MemberBalance {
                    member: lookup(id)?,
                    amount,
                })
            })
            .collect::<ResultEngine<Vec<_>>>()?;
        let debts = debts
            .into_iter()
            .map(|SimplifiedDebt { from, to, amount }| {
                Ok(MemberDebt {
                    from: lookup(&from)?,
                    to: lookup(&to)?,
                    amount,
                })
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        tracing::debug!(%group_id, debts = debts.len(), "group balances computed");
        Ok(GroupBalances {
            group_id,
            currency: snapshot.group.currency,
            balances,
            debts,
        })
    }

    /// Spending totals of a group. Settlements are not spending and are left
    /// out. Members only.
    pub async fn group_summary(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<GroupSummaryStats> {
        let snapshot = with_tx!(self, |db_tx| self.snapshot(&db_tx, group_id, user_id).await)?;

        let mut total = Money::ZERO;
        let mut by_category: BTreeMap<Category, Money> = BTreeMap::new();
        let mut by_payer: HashMap<&MemberId, Money> = HashMap::new();
        for expense in &snapshot.expenses {
            total += expense.amount;
            *by_category.entry(expense.category).or_default() += expense.amount;
            *by_payer.entry(&expense.payer_id).or_default() += expense.amount;
        }

        let by_category = Category::ALL
            .into_iter()
            .filter_map(|category| {
                by_category
                    .get(&category)
                    .map(|&amount| CategoryTotal { category, amount })
            })
            .collect();
        let by_payer = snapshot
            .roster
            .iter()
            .map(|member| PayerTotal {
                member: member.clone(),
                amount: by_payer.get(&member.id).copied().unwrap_or_default(),
            })
            .collect();

        Ok(GroupSummaryStats {
            group_id,
            currency: snapshot.group.currency,
            total,
            by_category,
            by_payer,
        })
    }
}
