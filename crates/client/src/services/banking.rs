use api_types::banking::{BankAccount, History, Transaction};
use dashboard::BankingData;

use crate::{connector::Connector, error::Result};

const ACCOUNTS: &str = "banking/accounts/me";
const HISTORY: &str = "banking/history/me";
const TRANSACTIONS: &str = "banking/transactions/me";

/// Read-only view on the statements of the logged-in user.
#[derive(Debug, Clone)]
pub struct BankingService {
    connector: Connector,
}

impl BankingService {
    pub fn new(connector: Connector) -> Self {
        Self { connector }
    }

    pub async fn accounts(&self) -> Result<Vec<BankAccount>> {
        self.connector.get(ACCOUNTS).await
    }

    pub async fn history(&self) -> Result<Vec<History>> {
        self.connector.get(HISTORY).await
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        self.connector.get(TRANSACTIONS).await
    }

    pub async fn transaction(&self, id: i64) -> Result<Transaction> {
        self.connector.get(&format!("{TRANSACTIONS}/{id}")).await
    }

    pub async fn load_dashboard(&self) -> Result<BankingData> {
        let (histories, transactions) = tokio::try_join!(self.history(), self.transactions())?;
        Ok(BankingData {
            histories,
            transactions,
        })
    }
}
