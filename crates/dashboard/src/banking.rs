use api_types::banking::{BankAccount, History, Transaction};
use serde::Serialize;

use crate::{
    Filter, LegendEntry, Series, Slice, UNASSIGNED,
    series::{self, BalanceEntry},
};

#[derive(Clone, Debug, Default)]
pub struct BankingData {
    pub histories: Vec<History>,
    pub transactions: Vec<Transaction>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BankingCharts {
    pub legend: Vec<LegendEntry>,
    pub balances: Vec<Series>,
    pub incoming_by_account: Vec<Slice>,
    pub outgoing_by_account: Vec<Slice>,
    /// Money sent, grouped by receiving peer.
    pub outgoing_by_peer: Vec<Slice>,
}

fn account_name(account: Option<&BankAccount>) -> &str {
    account.map_or(UNASSIGNED, |account| account.name.as_str())
}

pub(crate) fn build(data: &BankingData, filter: &Filter) -> BankingCharts {
    let legend = &filter.legend;

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

    let transactions: Vec<&Transaction> = filter
        .range
        .select(&data.transactions)
        .filter(|tx| legend.is_visible(account_name(tx.account.as_ref())))
        .collect();

    let incoming_by_account = series::totals(
        transactions
            .iter()
            .filter(|tx| tx.amount > 0.0)
            .map(|tx| (account_name(tx.account.as_ref()), tx.amount)),
    );
    let outgoing = transactions.iter().filter(|tx| tx.amount < 0.0);
    let outgoing_by_account = series::totals(
        outgoing
            .clone()
            .map(|tx| (account_name(tx.account.as_ref()), -tx.amount)),
    );
    let outgoing_by_peer = series::totals(outgoing.map(|tx| (tx.peer.as_str(), -tx.amount)));

    BankingCharts {
        legend: legend.entries(
            data.histories
                .iter()
                .map(|h| account_name(h.account.as_ref()))
                .chain(
                    data.transactions
                        .iter()
                        .map(|tx| account_name(tx.account.as_ref())),
                ),
        ),
        balances,
        incoming_by_account,
        outgoing_by_account,
        outgoing_by_peer,
    }
}
