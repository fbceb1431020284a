//! Ledger aggregation.
//!
//! Folds a group's expenses and settlements into one signed [`Money`] balance
//! per roster member:
//!
//! - an expense credits its payer with the full amount and debits every split
//!   member with their share;
//! - a settlement credits the payer and debits the receiver by the same amount.
//!
//! Positive balances are owed money by the group, negative balances owe the
//! group. For consistent input the balances sum to exactly zero.
//!
//! Only roster members get an entry. References to anyone else (a split or a
//! settlement pointing at a user who is no longer a member) are skipped and
//! logged; the resulting non-zero total is what the simplifier later reports
//! as a residual imbalance.

use std::collections::HashMap;

use crate::{Expense, MemberId, Money, Settlement, SimplifiedDebt};

/// Member → signed balance, keyed by roster membership and kept in roster
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balances {
    entries: Vec<(MemberId, Money)>,
    index: HashMap<MemberId, usize>,
}

impl Balances {
    /// Zero balance for every roster member. Repeated ids keep their first
    /// position.
    pub fn from_roster<I>(roster: I) -> Self
    where
        I: IntoIterator<Item = MemberId>,
    {
        let mut balances = Self::default();
        for member in roster {
            if balances.index.contains_key(&member) {
                continue;
            }
            balances.index.insert(member.clone(), balances.entries.len());
            balances.entries.push((member, Money::ZERO));
        }
        balances
    }

    pub fn get(&self, member: &MemberId) -> Option<Money> {
        self.index.get(member).map(|&idx| self.entries[idx].1)
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.index.contains_key(member)
    }

    /// Iterates in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, Money)> {
        self.entries.iter().map(|(member, amount)| (member, *amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all balances. Zero for consistent input.
    pub fn total(&self) -> Money {
        self.entries.iter().map(|(_, amount)| *amount).sum()
    }

    /// Adds `delta` to a roster member. Returns `false` (and changes nothing)
    /// when the member is not on the roster.
    pub(crate) fn adjust(&mut self, member: &MemberId, delta: Money) -> bool {
        match self.index.get(member) {
            Some(&idx) => {
                self.entries[idx].1 += delta;
                true
            }
            None => false,
        }
    }

    /// Applies a transfer: the debtor pays, so their balance rises; the
    /// creditor is paid, so theirs falls.
    pub fn apply_debt(&mut self, debt: &SimplifiedDebt) {
        self.adjust(&debt.from, debt.amount);
        self.adjust(&debt.to, -debt.amount);
    }
}

/// Running aggregation over a roster.
#[derive(Clone, Debug)]
pub struct Ledger {
    balances: Balances,
}

impl Ledger {
    pub fn new<I>(roster: I) -> Self
    where
        I: IntoIterator<Item = MemberId>,
    {
        Self {
            balances: Balances::from_roster(roster),
        }
    }

    pub fn record_expense(&mut self, expense: &Expense) {
        if !self.balances.adjust(&expense.payer_id, expense.amount) {
            tracing::warn!(
                expense_id = %expense.id,
                member = %expense.payer_id,
                "expense payer is not a group member, credit skipped"
            );
        }
        for (member, share) in &expense.splits {
            if !self.balances.adjust(member, -*share) {
                tracing::warn!(
                    expense_id = %expense.id,
                    member = %member,
                    "split member is not a group member, debit skipped"
                );
            }
        }
    }

    pub fn record_settlement(&mut self, settlement: &Settlement) {
        if !self.balances.adjust(&settlement.payer_id, settlement.amount) {
            tracing::warn!(
                settlement_id = %settlement.id,
                member = %settlement.payer_id,
                "settlement payer is not a group member, credit skipped"
            );
        }
        if !self.balances.adjust(&settlement.receiver_id, -settlement.amount) {
            tracing::warn!(
                settlement_id = %settlement.id,
                member = %settlement.receiver_id,
                "settlement receiver is not a group member, debit skipped"
            );
        }
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub fn into_balances(self) -> Balances {
        self.balances
    }
}

/// Computes the balance of every roster member from the full history of a
/// group. Total over any input; never fails.
pub fn aggregate<'a, R, E, S>(roster: R, expenses: E, settlements: S) -> Balances
where
    R: IntoIterator<Item = MemberId>,
    E: IntoIterator<Item = &'a Expense>,
    S: IntoIterator<Item = &'a Settlement>,
{
    let mut ledger = Ledger::new(roster);
    for expense in expenses {
        ledger.record_expense(expense);
    }
    for settlement in settlements {
        ledger.record_settlement(settlement);
    }
    ledger.into_balances()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use proptest::prelude::*;
    use uuid::Uuid;

    use super::*;
    use crate::Category;

    const NO_EXPENSES: &[Expense] = &[];
    const NO_SETTLEMENTS: &[Settlement] = &[];

    fn id(name: &str) -> MemberId {
        MemberId::from(name)
    }

    fn roster(names: &[&str]) -> Vec<MemberId> {
        names.iter().map(|n| id(n)).collect()
    }

    fn expense(amount: i64, payer: &str, splits: &[(&str, i64)]) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            group_id: Uuid::nil(),
            title: "test".to_string(),
            amount: Money::new(amount),
            category: Category::Other,
            occurred_at: Utc::now(),
            payer_id: id(payer),
            created_by: payer.to_string(),
            splits: splits
                .iter()
                .map(|(m, a)| (id(m), Money::new(*a)))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn settlement(payer: &str, receiver: &str, amount: i64) -> Settlement {
        Settlement {
            id: Uuid::new_v4(),
            group_id: Uuid::nil(),
            payer_id: id(payer),
            receiver_id: id(receiver),
            amount: Money::new(amount),
            occurred_at: Utc::now(),
            created_by: payer.to_string(),
        }
    }

    #[test]
    fn empty_history_gives_zero_balances() {
        let balances = aggregate(roster(&["a", "b"]), NO_EXPENSES, NO_SETTLEMENTS);
        assert_eq!(balances.len(), 2);
        assert!(balances.iter().all(|(_, amount)| amount.is_zero()));
    }

    #[test]
    fn even_three_way_split() {
        let expenses = [expense(9000, "a", &[("a", 3000), ("b", 3000), ("c", 3000)])];
        let balances = aggregate(roster(&["a", "b", "c"]), &expenses, NO_SETTLEMENTS);

        assert_eq!(balances.get(&id("a")), Some(Money::new(6000)));
        assert_eq!(balances.get(&id("b")), Some(Money::new(-3000)));
        assert_eq!(balances.get(&id("c")), Some(Money::new(-3000)));
        assert_eq!(balances.total(), Money::ZERO);
    }

    #[test]
    fn payer_outside_splits_is_credited_in_full() {
        let expenses = [expense(5000, "a", &[("b", 2500), ("c", 2500)])];
        let balances = aggregate(roster(&["a", "b", "c"]), &expenses, NO_SETTLEMENTS);
        assert_eq!(balances.get(&id("a")), Some(Money::new(5000)));
    }

    #[test]
    fn member_outside_an_expense_is_unaffected() {
        let expenses = [expense(2000, "a", &[("a", 1000), ("b", 1000)])];
        let balances = aggregate(roster(&["a", "b", "c"]), &expenses, NO_SETTLEMENTS);
        assert_eq!(balances.get(&id("c")), Some(Money::ZERO));
    }

    #[test]
    fn settlement_offsets_expense_imbalance() {
        let expenses = [expense(9000, "a", &[("a", 3000), ("b", 3000), ("c", 3000)])];
        let settlements = [settlement("b", "a", 3000)];
        let balances = aggregate(roster(&["a", "b", "c"]), &expenses, &settlements);

        assert_eq!(balances.get(&id("a")), Some(Money::new(3000)));
        assert_eq!(balances.get(&id("b")), Some(Money::ZERO));
        assert_eq!(balances.get(&id("c")), Some(Money::new(-3000)));
    }

    #[test]
    fn settlement_moves_payer_up_and_receiver_down() {
        let balances = aggregate(roster(&["a", "b"]), NO_EXPENSES, &[settlement("a", "b", 1234)]);
        assert_eq!(balances.get(&id("a")), Some(Money::new(1234)));
        assert_eq!(balances.get(&id("b")), Some(Money::new(-1234)));
    }

    #[test]
    fn stale_references_are_not_added_to_balances() {
        let expenses = [expense(9000, "a", &[("a", 3000), ("b", 3000), ("gone", 3000)])];
        let settlements = [settlement("gone", "a", 500)];
        let balances = aggregate(roster(&["a", "b"]), &expenses, &settlements);

        assert_eq!(balances.len(), 2);
        assert!(!balances.contains(&id("gone")));
        assert_eq!(balances.get(&id("a")), Some(Money::new(5500)));
        assert_eq!(balances.total(), Money::new(2500));
    }

    #[test]
    fn balances_keep_roster_order() {
        let balances = Balances::from_roster(roster(&["c", "a", "b", "a"]));
        let order: Vec<_> = balances.iter().map(|(m, _)| m.as_str().to_string()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: balances built from consistent expenses and settlements
        /// always sum to zero.
        #[test]
        fn balances_sum_to_zero(
            expenses in prop::collection::vec(
                (0usize..5, prop::collection::vec(0i64..50_000, 5)),
                0..20,
            ),
            settlements in prop::collection::vec((0usize..5, 0usize..5, 1i64..50_000), 0..10),
        ) {
            let names = ["a", "b", "c", "d", "e"];
            let expenses: Vec<Expense> = expenses
                .into_iter()
                .filter_map(|(payer, shares)| {
                    let amount: i64 = shares.iter().sum();
                    (amount > 0).then(|| {
                        let splits: Vec<(&str, i64)> =
                            names.iter().copied().zip(shares.iter().copied()).collect();
                        expense(amount, names[payer], &splits)
                    })
                })
                .collect();
            let settlements: Vec<Settlement> = settlements
                .into_iter()
                .map(|(p, r, amount)| settlement(names[p], names[r], amount))
                .collect();

            let balances = aggregate(roster(&names), &expenses, &settlements);
            prop_assert_eq!(balances.total(), Money::ZERO);
        }
    }
}
