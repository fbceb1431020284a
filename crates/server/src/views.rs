//! Mapping between engine types and the wire types of `api_types`.

use api_types::{
    balance::{BalanceView, DebtView, GroupBalancesResponse},
    expense::{ExpenseView, SplitView},
    group::{GroupView, MemberView},
    settlement::SettlementView,
    stats::{CategoryTotal, GroupSummaryResponse, PayerTotal},
};
use engine::{
    Expense, Group, GroupBalances, GroupSummaryStats, Member, MemberRole, Settlement,
};

pub(crate) fn currency_to_api(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Eur => api_types::Currency::Eur,
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Gbp => api_types::Currency::Gbp,
    }
}

pub(crate) fn currency_from_api(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Eur => engine::Currency::Eur,
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Gbp => engine::Currency::Gbp,
    }
}

pub(crate) fn category_to_api(category: engine::Category) -> api_types::expense::Category {
    use api_types::expense::Category as Api;
    match category {
        engine::Category::Food => Api::Food,
        engine::Category::Transport => Api::Transport,
        engine::Category::Utilities => Api::Utilities,
        engine::Category::Entertainment => Api::Entertainment,
        engine::Category::Other => Api::Other,
    }
}

pub(crate) fn category_from_api(category: api_types::expense::Category) -> engine::Category {
    use api_types::expense::Category as Api;
    match category {
        Api::Food => engine::Category::Food,
        Api::Transport => engine::Category::Transport,
        Api::Utilities => engine::Category::Utilities,
        Api::Entertainment => engine::Category::Entertainment,
        Api::Other => engine::Category::Other,
    }
}

pub(crate) fn member_view(member: &Member) -> MemberView {
    MemberView {
        username: member.id.to_string(),
        name: member.name.clone(),
        role: match member.role {
            MemberRole::Owner => api_types::group::MemberRole::Owner,
            MemberRole::Member => api_types::group::MemberRole::Member,
        },
        joined_at: member.joined_at,
    }
}

pub(crate) fn group_view(group: Group, members: &[Member]) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        invite_code: group.invite_code,
        currency: currency_to_api(group.currency),
        created_by: group.created_by,
        created_at: group.created_at,
        members: members.iter().map(member_view).collect(),
    }
}

pub(crate) fn expense_view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        title: expense.title,
        amount_minor: expense.amount.minor(),
        category: category_to_api(expense.category),
        occurred_at: expense.occurred_at,
        payer: expense.payer_id.to_string(),
        created_by: expense.created_by,
        splits: expense
            .splits
            .into_iter()
            .map(|(member, amount)| SplitView {
                username: member.to_string(),
                amount_minor: amount.minor(),
            })
            .collect(),
    }
}

pub(crate) fn settlement_view(settlement: Settlement) -> SettlementView {
    SettlementView {
        id: settlement.id,
        payer: settlement.payer_id.to_string(),
        receiver: settlement.receiver_id.to_string(),
        amount_minor: settlement.amount.minor(),
        occurred_at: settlement.occurred_at,
        created_by: settlement.created_by,
    }
}

pub(crate) fn balances_response(balances: GroupBalances) -> GroupBalancesResponse {
    GroupBalancesResponse {
        group_id: balances.group_id,
        currency: currency_to_api(balances.currency),
        balances: balances
            .balances
            .into_iter()
            .map(|b| BalanceView {
                username: b.member.id.to_string(),
                name: b.member.name,
                amount_minor: b.amount.minor(),
            })
            .collect(),
        debts: balances
            .debts
            .into_iter()
            .map(|d| DebtView {
                from: d.from.id.to_string(),
                from_name: d.from.name,
                to: d.to.id.to_string(),
                to_name: d.to.name,
                amount_minor: d.amount.minor(),
            })
            .collect(),
    }
}

pub(crate) fn summary_response(summary: GroupSummaryStats) -> GroupSummaryResponse {
    GroupSummaryResponse {
        group_id: summary.group_id,
        currency: currency_to_api(summary.currency),
        total_minor: summary.total.minor(),
        by_category: summary
            .by_category
            .into_iter()
            .map(|c| CategoryTotal {
                category: category_to_api(c.category),
                amount_minor: c.amount.minor(),
            })
            .collect(),
        by_payer: summary
            .by_payer
            .into_iter()
            .map(|p| PayerTotal {
                username: p.member.id.to_string(),
                name: p.member.name,
                amount_minor: p.amount.minor(),
            })
            .collect(),
    }
}
