//! Editable records as entered by the user, before they are sent.
//!
//! Converting a draft into a `*Modify` payload validates it; a failed
//! validation never reaches the network.

use api_types::{
    accounting::{AccountModify, CategoryModify, ExpenseModify, IncomeModify, TransferModify},
    fuel::{CarModify, RefuelModify},
};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("The expense must have an account and a category")]
    MissingExpenseRefs,
    #[error("The Expense must not have an amount equal to 0")]
    ZeroExpenseAmount,
    #[error("The income must have an account")]
    MissingIncomeAccount,
    #[error("The Transfer must have a source and a target")]
    MissingTransferEnds,
    #[error("The Transfer must not have the same source and target")]
    SameTransferEnds,
    #[error("The refuel must have a car and a fuel type")]
    MissingRefuelRefs,
    #[error("The {0} must have a name")]
    EmptyName(&'static str),
    #[error("The {0} name must not be \".\" or \"..\" nor contain \"/\"")]
    ReservedName(&'static str),
    #[error("The {0} has not been saved yet")]
    MissingId(&'static str),
}

type DraftResult<T> = Result<T, DraftError>;

#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseDraft {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub reason: String,
    pub amount: f64,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
}

impl ExpenseDraft {
    /// Blank expense dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            id: None,
            date: today,
            reason: String::new(),
            amount: 0.0,
            account_id: None,
            category_id: None,
        }
    }

    pub fn for_create(&self) -> DraftResult<ExpenseModify> {
        let (Some(account_id), Some(category_id)) = (self.account_id, self.category_id) else {
            return Err(DraftError::MissingExpenseRefs);
        };
        Ok(ExpenseModify {
            date: self.date,
            reason: self.reason.trim().to_string(),
            amount: self.amount,
            account_id,
            category_id,
        })
    }

    pub fn for_update(&self) -> DraftResult<(i64, ExpenseModify)> {
        let id = self.id.ok_or(DraftError::MissingId("expense"))?;
        if self.amount == 0.0 {
            return Err(DraftError::ZeroExpenseAmount);
        }
        Ok((id, self.for_create()?))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IncomeDraft {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub reason: String,
    pub amount: f64,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
}

impl IncomeDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            id: None,
            date: today,
            reason: String::new(),
            amount: 0.0,
            account_id: None,
            category_id: None,
        }
    }

    pub fn for_create(&self) -> DraftResult<IncomeModify> {
        let account_id = self.account_id.ok_or(DraftError::MissingIncomeAccount)?;
        Ok(IncomeModify {
            date: self.date,
            reason: self.reason.trim().to_string(),
            amount: self.amount,
            account_id,
            category_id: self.category_id,
        })
    }

    pub fn for_update(&self) -> DraftResult<(i64, IncomeModify)> {
        let id = self.id.ok_or(DraftError::MissingId("income"))?;
        Ok((id, self.for_create()?))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransferDraft {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub amount: f64,
    pub source_id: Option<i64>,
    pub target_id: Option<i64>,
}

impl TransferDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            id: None,
            date: today,
            amount: 0.0,
            source_id: None,
            target_id: None,
        }
    }

    pub fn for_create(&self) -> DraftResult<TransferModify> {
        let (Some(source_id), Some(target_id)) = (self.source_id, self.target_id) else {
            return Err(DraftError::MissingTransferEnds);
        };
        if source_id == target_id {
            return Err(DraftError::SameTransferEnds);
        }
        Ok(TransferModify {
            date: self.date,
            amount: self.amount,
            source_id,
            target_id,
        })
    }

    pub fn for_update(&self) -> DraftResult<(i64, TransferModify)> {
        let id = self.id.ok_or(DraftError::MissingId("transfer"))?;
        Ok((id, self.for_create()?))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RefuelDraft {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub distance: f64,
    pub consumption: f64,
    pub cost: f64,
    pub fuel_type_id: Option<i64>,
    pub car_id: Option<i64>,
}

impl RefuelDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            id: None,
            date: today,
            distance: 0.0,
            consumption: 0.0,
            cost: 0.0,
            fuel_type_id: None,
            car_id: None,
        }
    }

    pub fn for_create(&self) -> DraftResult<RefuelModify> {
        let (Some(fuel_type_id), Some(car_id)) = (self.fuel_type_id, self.car_id) else {
            return Err(DraftError::MissingRefuelRefs);
        };
        Ok(RefuelModify {
            date: self.date,
            distance: self.distance,
            consumption: self.consumption,
            cost: self.cost,
            fuel_type_id,
            car_id,
        })
    }

    pub fn for_update(&self) -> DraftResult<(i64, RefuelModify)> {
        let id = self.id.ok_or(DraftError::MissingId("refuel"))?;
        Ok((id, self.for_create()?))
    }
}

/// Checks a name that ends up as a single URL path segment.
pub(crate) fn path_name<'a>(name: &'a str, kind: &'static str) -> DraftResult<&'a str> {
    if name.is_empty() {
        return Err(DraftError::EmptyName(kind));
    }
    if matches!(name, "." | "..") || name.contains('/') {
        return Err(DraftError::ReservedName(kind));
    }
    Ok(name)
}

fn trimmed_name(name: &str, kind: &'static str) -> DraftResult<String> {
    path_name(name.trim(), kind).map(str::to_string)
}

pub fn account(name: &str, balance: f64) -> DraftResult<AccountModify> {
    Ok(AccountModify {
        name: trimmed_name(name, "account")?,
        balance,
    })
}

pub fn category(name: &str) -> DraftResult<CategoryModify> {
    Ok(CategoryModify {
        name: trimmed_name(name, "category")?,
    })
}

pub fn car(name: &str) -> DraftResult<CarModify> {
    Ok(CarModify {
        name: trimmed_name(name, "car")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn expense_needs_account_and_category() {
        let mut draft = ExpenseDraft::new(day());
        draft.account_id = Some(1);
        assert_eq!(draft.for_create(), Err(DraftError::MissingExpenseRefs));

        draft.category_id = Some(2);
        draft.reason = "  lunch ".to_string();
        draft.amount = 9.5;
        let payload = draft.for_create().unwrap();
        assert_eq!(payload.reason, "lunch");
        assert_eq!((payload.account_id, payload.category_id), (1, 2));
    }

    #[test]
    fn expense_update_rejects_zero_amount() {
        let mut draft = ExpenseDraft::new(day());
        draft.id = Some(7);
        draft.account_id = Some(1);
        draft.category_id = Some(2);
        assert_eq!(draft.for_update(), Err(DraftError::ZeroExpenseAmount));

        draft.amount = 3.0;
        assert_eq!(draft.for_update().unwrap().0, 7);
    }

    #[test]
    fn unsaved_records_cannot_be_updated() {
        let mut draft = IncomeDraft::new(day());
        draft.account_id = Some(1);
        assert_eq!(draft.for_update(), Err(DraftError::MissingId("income")));
    }

    #[test]
    fn transfer_needs_two_distinct_ends() {
        let mut draft = TransferDraft::new(day());
        draft.source_id = Some(1);
        assert_eq!(draft.for_create(), Err(DraftError::MissingTransferEnds));
        draft.target_id = Some(1);
        assert_eq!(draft.for_create(), Err(DraftError::SameTransferEnds));
        draft.target_id = Some(2);
        assert!(draft.for_create().is_ok());
    }

    #[test]
    fn refuel_needs_car_and_fuel_type() {
        let mut draft = RefuelDraft::new(day());
        draft.car_id = Some(3);
        assert_eq!(draft.for_create(), Err(DraftError::MissingRefuelRefs));
        draft.fuel_type_id = Some(1);
        assert_eq!(draft.for_create().unwrap().car_id, 3);
    }

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(category("   "), Err(DraftError::EmptyName("category")));
        assert_eq!(account(" Giro ", 10.0).unwrap().name, "Giro");
        assert_eq!(car("Golf").unwrap().name, "Golf");
    }

    #[test]
    fn names_cannot_escape_their_path_segment() {
        assert_eq!(car(" .. "), Err(DraftError::ReservedName("car")));
        assert_eq!(account(".", 0.0), Err(DraftError::ReservedName("account")));
        assert_eq!(category("a/b"), Err(DraftError::ReservedName("category")));
        assert_eq!(path_name("", "car"), Err(DraftError::EmptyName("car")));
        assert_eq!(path_name("...", "car"), Ok("..."));
    }
}
