//! Wire types shared by the client and the dashboards.
//!
//! Read shapes embed their references (an expense carries its account and
//! category); write shapes (`*Modify`) reference them by id.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod auth {
    use super::*;

    /// Body returned by `login` and `login/refresh`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub access_token: String,
        pub token_type: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Role {
        pub name: String,
        pub priority: u8,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ReadUser {
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub username: String,
        pub role: Role,
    }

    /// Registration payload for `users`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct RestrictedUserModify {
        pub username: String,
        pub password: String,
        pub first_name: String,
        pub last_name: String,
        pub email: String,
    }

    /// Partial update of `users/me`. Absent fields are left untouched.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct MinimalModifyUser {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub first_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub last_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub email: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub password: Option<String>,
    }
}

pub mod accounting {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Account {
        #[serde(default)]
        pub id: Option<i64>,
        pub name: String,
        pub balance: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AccountModify {
        pub name: String,
        pub balance: f64,
    }

    /// Balance snapshot of an accounting account.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AccountHistory {
        #[serde(default)]
        pub id: Option<i64>,
        pub date: NaiveDate,
        pub amount: f64,
        #[serde(default)]
        pub account: Option<Account>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Category {
        #[serde(default)]
        pub id: Option<i64>,
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryModify {
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        #[serde(default)]
        pub id: Option<i64>,
        pub date: NaiveDate,
        pub reason: String,
        pub amount: f64,
        #[serde(default)]
        pub account: Option<Account>,
        #[serde(default)]
        pub category: Option<Category>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseModify {
        pub date: NaiveDate,
        pub reason: String,
        pub amount: f64,
        pub account_id: i64,
        pub category_id: i64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Income {
        #[serde(default)]
        pub id: Option<i64>,
        pub date: NaiveDate,
        pub reason: String,
        pub amount: f64,
        #[serde(default)]
        pub account: Option<Account>,
        #[serde(default)]
        pub category: Option<Category>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct IncomeModify {
        pub date: NaiveDate,
        pub reason: String,
        pub amount: f64,
        pub account_id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub category_id: Option<i64>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Transfer {
        #[serde(default)]
        pub id: Option<i64>,
        pub date: NaiveDate,
        pub amount: f64,
        #[serde(default)]
        pub source: Option<Account>,
        #[serde(default)]
        pub target: Option<Account>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransferModify {
        pub date: NaiveDate,
        pub amount: f64,
        pub source_id: i64,
        pub target_id: i64,
    }
}

pub mod fuel {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Car {
        #[serde(default)]
        pub id: Option<i64>,
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CarModify {
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FuelType {
        #[serde(default)]
        pub id: Option<i64>,
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Refuel {
        #[serde(default)]
        pub id: Option<i64>,
        pub date: NaiveDate,
        /// Kilometres driven since the previous refuel.
        pub distance: f64,
        /// Litres per 100 km.
        pub consumption: f64,
        pub cost: f64,
        #[serde(default)]
        pub fuel_type: Option<FuelType>,
        #[serde(default)]
        pub car: Option<Car>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RefuelModify {
        pub date: NaiveDate,
        pub distance: f64,
        pub consumption: f64,
        pub cost: f64,
        pub fuel_type_id: i64,
        pub car_id: i64,
    }
}

pub mod banking {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BankAccount {
        #[serde(default)]
        pub id: Option<i64>,
        pub name: String,
    }

    /// Balance of a bank account as reported on `date`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct History {
        #[serde(default)]
        pub id: Option<i64>,
        #[serde(default)]
        pub account: Option<BankAccount>,
        pub date: NaiveDate,
        pub amount: f64,
    }

    /// A booked bank statement line. Only the first block of fields is
    /// guaranteed by the backend; the statement details are optional.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Transaction {
        #[serde(default)]
        pub id: Option<i64>,
        #[serde(default)]
        pub account: Option<BankAccount>,
        pub amount: f64,
        pub currencycode: String,
        pub date: NaiveDate,
        pub peer: String,
        pub reasonforpayment: String,

        #[serde(default)]
        pub bdate: Option<NaiveDate>,
        #[serde(default)]
        pub vdate: Option<NaiveDate>,
        #[serde(default)]
        pub postingtext: Option<String>,
        #[serde(default)]
        pub customerreference: Option<String>,
        #[serde(default)]
        pub mandatereference: Option<String>,
        #[serde(default)]
        pub peeraccount: Option<String>,
        #[serde(default)]
        pub peerbic: Option<String>,
        #[serde(default)]
        pub peerid: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_without_id_deserializes() {
        let raw = r#"{
            "date": "2024-03-01",
            "reason": "groceries",
            "amount": 42.5,
            "account": {"name": "Giro", "balance": 100.0},
            "category": {"name": "Food"}
        }"#;
        let expense: accounting::Expense = serde_json::from_str(raw).unwrap();
        assert_eq!(expense.id, None);
        assert_eq!(expense.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(expense.account.unwrap().name, "Giro");
        assert_eq!(expense.category.unwrap().name, "Food");
    }

    #[test]
    fn bank_transaction_tolerates_missing_statement_details() {
        let raw = r#"{
            "amount": -12.0,
            "currencycode": "EUR",
            "date": "2024-01-15",
            "peer": "Bakery",
            "reasonforpayment": "bread",
            "account": {"name": "Sparkasse"}
        }"#;
        let tx: banking::Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.peer, "Bakery");
        assert!(tx.bdate.is_none());
        assert!(tx.peerbic.is_none());
    }

    #[test]
    fn minimal_user_update_skips_absent_fields() {
        let update = user::MinimalModifyUser {
            email: Some("a@b.c".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.c"}));
    }
}
