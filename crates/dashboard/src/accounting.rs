use api_types::accounting::{
    Account, AccountHistory, Category, Expense, Income, Transfer,
};
use serde::Serialize;

use crate::{
    Filter, FlowDiagram, LegendEntry, NodeKind, Series, Slice, UNASSIGNED,
    series::{self, BalanceEntry},
};

/// Label for incomes without a category in the flow diagram.
const INCOME: &str = "Income";

#[derive(Clone, Debug, Default)]
pub struct AccountingData {
    pub accounts: Vec<Account>,
    pub categories: Vec<Category>,
    pub expenses: Vec<Expense>,
    pub incomes: Vec<Income>,
    pub transfers: Vec<Transfer>,
    /// Balance snapshots of all accounts.
    pub histories: Vec<AccountHistory>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AccountingCharts {
    pub accounts_legend: Vec<LegendEntry>,
    pub categories_legend: Vec<LegendEntry>,
    pub account_balances: Vec<Slice>,
    pub expenses_by_category: Vec<Slice>,
    pub expenses_by_account: Vec<Slice>,
    pub incomes_by_account: Vec<Slice>,
    pub balances: Vec<Series>,
    pub flows: FlowDiagram,
    pub totals: Totals,
}

fn account_name(account: Option<&Account>) -> &str {
    account.map_or(UNASSIGNED, |account| account.name.as_str())
}

fn category_name(category: Option<&Category>) -> &str {
    category.map_or(UNASSIGNED, |category| category.name.as_str())
}

pub(crate) fn build(data: &AccountingData, filter: &Filter) -> AccountingCharts {
    let legend = &filter.legend;
    let categories = &filter.categories;

    let expenses: Vec<&Expense> = filter
        .range
        .select(&data.expenses)
        .filter(|expense| {
            legend.is_visible(account_name(expense.account.as_ref()))
                && categories.is_visible(category_name(expense.category.as_ref()))
        })
        .collect();

    let incomes: Vec<&Income> = filter
        .range
        .select(&data.incomes)
        .filter(|income| {
            legend.is_visible(account_name(income.account.as_ref()))
                && income
                    .category
                    .as_ref()
                    .is_none_or(|category| categories.is_visible(&category.name))
        })
        .collect();

    let transfers: Vec<&Transfer> = filter
        .range
        .select(&data.transfers)
        .filter(|transfer| {
            legend.is_visible(account_name(transfer.source.as_ref()))
                && legend.is_visible(account_name(transfer.target.as_ref()))
        })
        .collect();

    let account_balances = series::totals(
        data.accounts
            .iter()
            .filter(|account| legend.is_visible(&account.name))
            .map(|account| (account.name.as_str(), account.balance)),
    );

    let expenses_by_category = series::totals(
        expenses
            .iter()
            .map(|e| (category_name(e.category.as_ref()), e.amount)),
    );
    let expenses_by_account = series::totals(
        expenses
            .iter()
            .map(|e| (account_name(e.account.as_ref()), e.amount)),
    );
    let incomes_by_account = series::totals(
        incomes
            .iter()
            .map(|i| (account_name(i.account.as_ref()), i.amount)),
    );

    let balances = series::balance_series(
        data.histories
            .iter()
            .map(|history| BalanceEntry {
                account: account_name(history.account.as_ref()),
                id: history.id,
                date: history.date,
                amount: history.amount,
            })
            .filter(|entry| legend.is_visible(entry.account)),
        &filter.range,
    );

    let flows = series::flow_diagram(
        incomes
            .iter()
            .map(|i| {
                let source = i
                    .category
                    .as_ref()
                    .map_or(INCOME, |category| category.name.as_str());
                (
                    (NodeKind::IncomeCategory, source),
                    (NodeKind::Account, account_name(i.account.as_ref())),
                    i.amount,
                )
            })
            .chain(transfers.iter().map(|t| {
                (
                    (NodeKind::Account, account_name(t.source.as_ref())),
                    (NodeKind::Account, account_name(t.target.as_ref())),
                    t.amount,
                )
            }))
            .chain(expenses.iter().map(|e| {
                (
                    (NodeKind::Account, account_name(e.account.as_ref())),
                    (NodeKind::ExpenseCategory, category_name(e.category.as_ref())),
                    e.amount,
                )
            })),
    );

    let income: f64 = incomes.iter().map(|i| i.amount).sum();
    let spent: f64 = expenses.iter().map(|e| e.amount).sum();

    AccountingCharts {
        accounts_legend: legend.entries(
            data.accounts
                .iter()
                .map(|a| a.name.as_str())
                .chain(data.expenses.iter().map(|e| account_name(e.account.as_ref())))
                .chain(data.incomes.iter().map(|i| account_name(i.account.as_ref()))),
        ),
        categories_legend: categories.entries(
            data.categories
                .iter()
                .map(|c| c.name.as_str())
                .chain(data.expenses.iter().map(|e| category_name(e.category.as_ref()))),
        ),
        account_balances,
        expenses_by_category,
        expenses_by_account,
        incomes_by_account,
        balances,
        flows,
        totals: Totals {
            income,
            expenses: spent,
            net: income - spent,
        },
    }
}
