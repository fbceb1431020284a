//! Debt simplification.
//!
//! Turns signed balances into a short list of directed transfers that settles
//! them. Greedy two-pointer matching: largest debtor pays largest creditor,
//! whoever is cleared moves on, repeat. Linear after sorting and fully
//! deterministic; not a minimum-transaction solver.
//!
//! Balances within [`Money::TOLERANCE`] of zero count as settled.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Balances, EngineError, MemberId, Money, ResultEngine};

/// One directed transfer: `from` pays `amount` to `to`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedDebt {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// Output of the greedy sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettlementPlan {
    /// Transfers in emission order.
    pub debts: Vec<SimplifiedDebt>,
    /// Members still beyond tolerance once the sweep stops, with what is
    /// left of their balance.
    pub leftover: Vec<(MemberId, Money)>,
}

#[derive(Debug)]
struct Open {
    member: MemberId,
    balance: Money,
}

/// Most negative first; equal balances by member id.
fn debtor_order(a: &Open, b: &Open) -> Ordering {
    a.balance
        .cmp(&b.balance)
        .then_with(|| a.member.cmp(&b.member))
}

/// Most positive first; equal balances by member id.
fn creditor_order(a: &Open, b: &Open) -> Ordering {
    b.balance
        .cmp(&a.balance)
        .then_with(|| a.member.cmp(&b.member))
}

/// Runs the greedy sweep and reports whatever it could not match.
pub fn plan(balances: &Balances) -> SettlementPlan {
    let mut debtors: Vec<Open> = Vec::new();
    let mut creditors: Vec<Open> = Vec::new();
    for (member, balance) in balances.iter() {
        let open = Open {
            member: member.clone(),
            balance,
        };
        if balance < -Money::TOLERANCE {
            debtors.push(open);
        } else if balance > Money::TOLERANCE {
            creditors.push(open);
        }
    }
    debtors.sort_by(debtor_order);
    creditors.sort_by(creditor_order);

    let mut debts = Vec::with_capacity(debtors.len() + creditors.len());
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];

        let transfer = debtor.balance.abs().min(creditor.balance);
        debts.push(SimplifiedDebt {
            from: debtor.member.clone(),
            to: creditor.member.clone(),
            amount: transfer,
        });

        debtor.balance += transfer;
        creditor.balance -= transfer;

        if debtor.balance.is_settled() {
            i += 1;
        }
        if creditor.balance.is_settled() {
            j += 1;
        }
    }

    let leftover = debtors[i..]
        .iter()
        .chain(&creditors[j..])
        .filter(|open| !open.balance.is_settled())
        .map(|open| (open.member.clone(), open.balance))
        .collect();

    SettlementPlan { debts, leftover }
}

/// Simplifies balances into transfers.
///
/// Fails with [`EngineError::ResidualImbalance`] when the sweep leaves money
/// unaccounted for, which only happens when the balances do not sum to zero
/// (within tolerance). Sub-tolerance dust spread over several members can
/// leave a member a few minor units short without any imbalance; that case is
/// logged and the transfers are returned.
pub fn simplify(balances: &Balances) -> ResultEngine<Vec<SimplifiedDebt>> {
    let SettlementPlan { debts, leftover } = plan(balances);
    if leftover.is_empty() {
        return Ok(debts);
    }

    let total = balances.total();
    if total.is_settled() {
        tracing::debug!(?leftover, "leaving sub-tolerance dust unsettled");
        return Ok(debts);
    }

    let detail = leftover
        .iter()
        .map(|(member, amount)| format!("{member}: {amount}"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(EngineError::ResidualImbalance(format!(
        "balances sum to {total}; unsettled {detail}"
    )))
}
