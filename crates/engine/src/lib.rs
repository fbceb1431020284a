//! Shared-expense engine: groups, expenses, settlements, and the balance
//! ledger with its debt simplifier.
//!
//! [`aggregate`] and [`simplify`] are pure. [`Engine`] wraps them with the
//! database reads and writes.

pub use commands::{NewExpenseCmd, NewSettlementCmd};
pub use currency::Currency;
pub use error::EngineError;
pub use expense::{Category, Expense, SplitMode};
pub use group::{Group, INVITE_CODE_LEN, generate_invite_code};
pub use ledger::{Balances, Ledger, aggregate};
pub use members::{Member, MemberId, MemberRole};
pub use money::Money;
pub use ops::{
    CategoryTotal, Engine, EngineBuilder, GroupBalances, GroupDetail, GroupSummary,
    GroupSummaryStats, MemberBalance, MemberDebt, PayerTotal,
};
pub use settlement::Settlement;
pub use simplify::{SettlementPlan, SimplifiedDebt, plan, simplify};

pub mod commands;
mod currency;
mod error;
mod expense;
mod expense_splits;
mod group;
mod ledger;
mod members;
mod money;
mod ops;
mod settlement;
mod simplify;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
