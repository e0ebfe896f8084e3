use api_types::accounting::{
    Account, AccountHistory, AccountModify, Category, CategoryModify, Expense, Income, Transfer,
};
use dashboard::AccountingData;
use tokio::task::JoinSet;

use crate::{
    connector::Connector,
    drafts::{ExpenseDraft, IncomeDraft, TransferDraft, path_name},
    error::Result,
};

const ACCOUNTS: &str = "accounting/accounts";
const CATEGORIES: &str = "accounting/categories";
const EXPENSES: &str = "accounting/expenses";
const INCOMES: &str = "accounting/incomes";
const TRANSFERS: &str = "accounting/transfers";

#[derive(Debug, Clone)]
pub struct AccountingService {
    connector: Connector,
}

impl AccountingService {
    pub fn new(connector: Connector) -> Self {
        Self { connector }
    }

    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.connector.get(ACCOUNTS).await
    }

    pub async fn add_account(&self, account: &AccountModify) -> Result<Account> {
        self.connector.add(ACCOUNTS, account).await
    }

    pub async fn update_account(&self, name: &str, account: &AccountModify) -> Result<Account> {
        let name = path_name(name, "account")?;
        self.connector
            .update(&format!("{ACCOUNTS}/{name}"), account)
            .await
    }

    pub async fn delete_account(&self, name: &str) -> Result<()> {
        let name = path_name(name, "account")?;
        self.connector.delete(&format!("{ACCOUNTS}/{name}")).await
    }

    /// Balance snapshots of the account called `name`.
    pub async fn account_history(&self, name: &str) -> Result<Vec<AccountHistory>> {
        let name = path_name(name, "account")?;
        self.connector
            .get(&format!("{ACCOUNTS}/{name}/history"))
            .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.connector.get(CATEGORIES).await
    }

    pub async fn add_category(&self, category: &CategoryModify) -> Result<Category> {
        self.connector.add(CATEGORIES, category).await
    }

    pub async fn update_category(&self, id: i64, category: &CategoryModify) -> Result<Category> {
        self.connector
            .update(&format!("{CATEGORIES}/{id}"), category)
            .await
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.connector.delete(&format!("{CATEGORIES}/{id}")).await
    }

    pub async fn expenses(&self) -> Result<Vec<Expense>> {
        self.connector.get(EXPENSES).await
    }

    /// Validates the draft, then creates or updates depending on its id.
    pub async fn save_expense(&self, draft: &ExpenseDraft) -> Result<Expense> {
        match draft.id {
            None => self.connector.add(EXPENSES, &draft.for_create()?).await,
            Some(_) => {
                let (id, payload) = draft.for_update()?;
                self.connector
                    .update(&format!("{EXPENSES}/{id}"), &payload)
                    .await
            }
        }
    }

    pub async fn delete_expense(&self, id: i64) -> Result<()> {
        self.connector.delete(&format!("{EXPENSES}/{id}")).await
    }

    pub async fn incomes(&self) -> Result<Vec<Income>> {
        self.connector.get(INCOMES).await
    }

    pub async fn save_income(&self, draft: &IncomeDraft) -> Result<Income> {
        match draft.id {
            None => self.connector.add(INCOMES, &draft.for_create()?).await,
            Some(_) => {
                let (id, payload) = draft.for_update()?;
                self.connector
                    .update(&format!("{INCOMES}/{id}"), &payload)
                    .await
            }
        }
    }

    pub async fn delete_income(&self, id: i64) -> Result<()> {
        self.connector.delete(&format!("{INCOMES}/{id}")).await
    }

    pub async fn transfers(&self) -> Result<Vec<Transfer>> {
        self.connector.get(TRANSFERS).await
    }

    pub async fn save_transfer(&self, draft: &TransferDraft) -> Result<Transfer> {
        match draft.id {
            None => self.connector.add(TRANSFERS, &draft.for_create()?).await,
            Some(_) => {
                let (id, payload) = draft.for_update()?;
                self.connector
                    .update(&format!("{TRANSFERS}/{id}"), &payload)
                    .await
            }
        }
    }

    pub async fn delete_transfer(&self, id: i64) -> Result<()> {
        self.connector.delete(&format!("{TRANSFERS}/{id}")).await
    }

    /// Everything the accounting dashboard needs.
    ///
    /// The five collections load concurrently; the balance histories follow
    /// once the account names are known. The first failure fails the load.
    pub async fn load_dashboard(&self) -> Result<AccountingData> {
        let (accounts, categories, expenses, incomes, transfers) = tokio::try_join!(
            self.accounts(),
            self.categories(),
            self.expenses(),
            self.incomes(),
            self.transfers(),
        )?;

        let mut tasks = JoinSet::new();
        for account in &accounts {
            let service = self.clone();
            let name = account.name.clone();
            tasks.spawn(async move {
                let history = service.account_history(&name).await?;
                Ok::<_, crate::ClientError>((name, history))
            });
        }

        let mut histories = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (name, entries) = joined??;
            histories.extend(entries.into_iter().map(|mut entry| {
                if entry.account.is_none() {
                    entry.account = accounts.iter().find(|a| a.name == name).cloned();
                }
                entry
            }));
        }
        tracing::debug!(
            accounts = accounts.len(),
            histories = histories.len(),
            "accounting dashboard loaded"
        );

        Ok(AccountingData {
            accounts,
            categories,
            expenses,
            incomes,
            transfers,
            histories,
        })
    }
}
