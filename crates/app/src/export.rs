//! CSV export of the dated collections.

use std::io::Write;

use api_types::{
    accounting::{Account, Category, Expense, Income, Transfer},
    banking::Transaction,
    fuel::Refuel,
};
use chrono::NaiveDate;
use csv::Writer;
use dashboard::{DateRange, UNASSIGNED};
use serde::Serialize;

use crate::{cli::ExportTarget, commands::Context, error::Result};

#[derive(Debug, Serialize, PartialEq)]
struct ExpenseRow {
    date: NaiveDate,
    reason: String,
    amount: f64,
    account: String,
    category: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct IncomeRow {
    date: NaiveDate,
    reason: String,
    amount: f64,
    account: String,
    category: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
struct TransferRow {
    date: NaiveDate,
    amount: f64,
    source: String,
    target: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct RefuelRow {
    date: NaiveDate,
    car: String,
    fuel_type: String,
    distance: f64,
    consumption: f64,
    cost: f64,
}

#[derive(Debug, Serialize, PartialEq)]
struct TransactionRow {
    date: NaiveDate,
    account: String,
    amount: f64,
    currency: String,
    peer: String,
    reason: String,
}

pub async fn write(
    ctx: &Context,
    target: ExportTarget,
    range: &DateRange,
    out: impl Write,
) -> Result<()> {
    let written = match target {
        ExportTarget::Expenses => {
            let expenses = ctx.accounting().expenses().await?;
            write_rows(out, expense_rows(&expenses, range))?
        }
        ExportTarget::Incomes => {
            let incomes = ctx.accounting().incomes().await?;
            write_rows(out, income_rows(&incomes, range))?
        }
        ExportTarget::Transfers => {
            let transfers = ctx.accounting().transfers().await?;
            write_rows(out, transfer_rows(&transfers, range))?
        }
        ExportTarget::Refuels => {
            let refuels = ctx.fuel().refuels().await?;
            write_rows(out, refuel_rows(&refuels, range))?
        }
        ExportTarget::Transactions => {
            let transactions = ctx.banking().transactions().await?;
            write_rows(out, transaction_rows(&transactions, range))?
        }
    };
    tracing::info!("exported {written} {target:?} rows");
    Ok(())
}

fn write_rows<W: Write, R: Serialize>(out: W, rows: Vec<R>) -> Result<usize> {
    let mut writer = Writer::from_writer(out);
    let count = rows.len();
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(count)
}

fn account_name(account: Option<&Account>) -> String {
    account.map_or(UNASSIGNED, |account| account.name.as_str()).to_string()
}

fn category_name(category: Option<&Category>) -> String {
    category.map_or(UNASSIGNED, |category| category.name.as_str()).to_string()
}

fn expense_rows(expenses: &[Expense], range: &DateRange) -> Vec<ExpenseRow> {
    range
        .select(expenses)
        .map(|expense| ExpenseRow {
            date: expense.date,
            reason: expense.reason.clone(),
            amount: expense.amount,
            account: account_name(expense.account.as_ref()),
            category: category_name(expense.category.as_ref()),
        })
        .collect()
}

fn income_rows(incomes: &[Income], range: &DateRange) -> Vec<IncomeRow> {
    range
        .select(incomes)
        .map(|income| IncomeRow {
            date: income.date,
            reason: income.reason.clone(),
            amount: income.amount,
            account: account_name(income.account.as_ref()),
            category: income.category.as_ref().map(|category| category.name.clone()),
        })
        .collect()
}

fn transfer_rows(transfers: &[Transfer], range: &DateRange) -> Vec<TransferRow> {
    range
        .select(transfers)
        .map(|transfer| TransferRow {
            date: transfer.date,
            amount: transfer.amount,
            source: account_name(transfer.source.as_ref()),
            target: account_name(transfer.target.as_ref()),
        })
        .collect()
}

fn refuel_rows(refuels: &[Refuel], range: &DateRange) -> Vec<RefuelRow> {
    range
        .select(refuels)
        .map(|refuel| RefuelRow {
            date: refuel.date,
            car: refuel
                .car
                .as_ref()
                .map_or(UNASSIGNED, |car| car.name.as_str())
                .to_string(),
            fuel_type: refuel
                .fuel_type
                .as_ref()
                .map_or(UNASSIGNED, |fuel_type| fuel_type.name.as_str())
                .to_string(),
            distance: refuel.distance,
            consumption: refuel.consumption,
            cost: refuel.cost,
        })
        .collect()
}

fn transaction_rows(transactions: &[Transaction], range: &DateRange) -> Vec<TransactionRow> {
    range
        .select(transactions)
        .map(|transaction| TransactionRow {
            date: transaction.date,
            account: transaction
                .account
                .as_ref()
                .map_or(UNASSIGNED, |account| account.name.as_str())
                .to_string(),
            amount: transaction.amount,
            currency: transaction.currencycode.clone(),
            peer: transaction.peer.clone(),
            reason: transaction.reasonforpayment.clone(),
        })
        .collect()
}
