use api_types::user::{MinimalModifyUser, RestrictedUserModify};
use chrono::NaiveDate;
use client::{
    AccountingService, Action, BankingService, ClientError, Connector, FuelService, SessionStore,
    UserService,
    drafts::{self, ExpenseDraft, IncomeDraft, RefuelDraft, TransferDraft},
};
use dashboard::{DateRange, Filter, Legend};
use serde::Serialize;

use crate::{
    cli::{
        AccountCommand, AccountingCommand, BankingCommand, CarCommand, CategoryCommand, Command,
        DashboardCommand, EntryArgs, EntryCommand, FilterArgs, FuelCommand, RefuelArgs,
        RefuelCommand, TransferArgs, TransferCommand,
    },
    config::AppConfig,
    error::{AppError, Result},
    export,
};

pub struct Context {
    connector: Connector,
    today: NaiveDate,
}

impl Context {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let session = SessionStore::load(&config.session_file)?;
        let connector = Connector::new(&config.base_url, session)?;
        Ok(Self {
            connector,
            today: config.today()?,
        })
    }

    pub(crate) fn accounting(&self) -> AccountingService {
        AccountingService::new(self.connector.clone())
    }

    pub(crate) fn fuel(&self) -> FuelService {
        FuelService::new(self.connector.clone())
    }

    pub(crate) fn banking(&self) -> BankingService {
        BankingService::new(self.connector.clone())
    }

    fn users(&self) -> UserService {
        UserService::new(self.connector.clone())
    }
}

pub async fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Login { username } => {
            let password = rpassword::prompt_password("Password: ")?;
            ctx.users().login(&username, &password).await?;
            tracing::info!("logged in as {username}");
            eprintln!("Logged in as {username}");
            Ok(())
        }
        Command::Logout => {
            ctx.users().logout().await?;
            eprintln!("Logged out");
            Ok(())
        }
        Command::Whoami => print_json(&ctx.users().me().await?),
        Command::Register {
            username,
            first_name,
            last_name,
            email,
        } => {
            let password = rpassword::prompt_password("Password: ")?;
            let confirm = rpassword::prompt_password("Repeat password: ")?;
            if password != confirm {
                return Err(AppError::Failed("Passwords do not match".to_string()));
            }
            let user = RestrictedUserModify {
                username,
                password,
                first_name,
                last_name,
                email,
            };
            let created = ctx
                .users()
                .register(&user)
                .await
                .map_err(failed(Action::Adding))?;
            print_json(&created)
        }
        Command::Profile {
            first_name,
            last_name,
            email,
            password,
        } => {
            let password = if password {
                Some(rpassword::prompt_password("New password: ")?)
            } else {
                None
            };
            let changes = MinimalModifyUser {
                first_name,
                last_name,
                email,
                password,
            };
            let user = ctx
                .users()
                .update(&changes)
                .await
                .map_err(failed(Action::Edit))?;
            print_json(&user)
        }
        Command::Unregister => {
            ctx.users().delete().await.map_err(failed(Action::Delete))?;
            eprintln!("User deleted");
            Ok(())
        }
        Command::Accounting(command) => accounting(ctx, command).await,
        Command::Fuel(command) => fuel(ctx, command).await,
        Command::Banking(command) => banking(ctx, command).await,
        Command::Dashboard(command) => charts(ctx, command).await,
        Command::Export { target, range } => {
            let range = DateRange::parse(range.start.as_deref(), range.end.as_deref())?;
            export::write(ctx, target, &range, std::io::stdout().lock()).await
        }
    }
}

/// Maps a failed mutation to its status line. A dead session keeps its own
/// message so the user knows to log in again.
fn failed(action: Action) -> impl FnOnce(ClientError) -> AppError {
    move |err| match err {
        ClientError::SessionExpired | ClientError::NotLoggedIn => AppError::Client(err),
        err => {
            tracing::debug!("{action} failed: {err}");
            AppError::Failed(err.status_message(action))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn accounting(ctx: &Context, command: AccountingCommand) -> Result<()> {
    let service = ctx.accounting();
    match command {
        AccountingCommand::Accounts(command) => match command {
            AccountCommand::List => print_json(&service.accounts().await?),
            AccountCommand::Add { name, balance } => {
                let account = drafts::account(&name, balance)
                    .map_err(ClientError::from)
                    .map_err(failed(Action::Adding))?;
                service
                    .add_account(&account)
                    .await
                    .map_err(failed(Action::Adding))?;
                print_json(&service.accounts().await?)
            }
            AccountCommand::Update {
                name,
                rename,
                balance,
            } => {
                let new_name = rename.as_deref().unwrap_or(&name);
                let account = drafts::account(new_name, balance)
                    .map_err(ClientError::from)
                    .map_err(failed(Action::Edit))?;
                service
                    .update_account(&name, &account)
                    .await
                    .map_err(failed(Action::Edit))?;
                print_json(&service.accounts().await?)
            }
            AccountCommand::Delete { name } => {
                service
                    .delete_account(&name)
                    .await
                    .map_err(failed(Action::Delete))?;
                print_json(&service.accounts().await?)
            }
            AccountCommand::History { name } => print_json(&service.account_history(&name).await?),
        },
        AccountingCommand::Categories(command) => match command {
            CategoryCommand::List => print_json(&service.categories().await?),
            CategoryCommand::Add { name } => {
                let category = drafts::category(&name)
                    .map_err(ClientError::from)
                    .map_err(failed(Action::Adding))?;
                service
                    .add_category(&category)
                    .await
                    .map_err(failed(Action::Adding))?;
                print_json(&service.categories().await?)
            }
            CategoryCommand::Update { id, name } => {
                let category = drafts::category(&name)
                    .map_err(ClientError::from)
                    .map_err(failed(Action::Edit))?;
                service
                    .update_category(id, &category)
                    .await
                    .map_err(failed(Action::Edit))?;
                print_json(&service.categories().await?)
            }
            CategoryCommand::Delete { id } => {
                service
                    .delete_category(id)
                    .await
                    .map_err(failed(Action::Delete))?;
                print_json(&service.categories().await?)
            }
        },
        AccountingCommand::Expenses(command) => match command {
            EntryCommand::List => print_json(&service.expenses().await?),
            EntryCommand::Add { fields } => {
                service
                    .save_expense(&expense_draft(None, fields, ctx.today))
                    .await
                    .map_err(failed(Action::Adding))?;
                print_json(&service.expenses().await?)
            }
            EntryCommand::Update { id, fields } => {
                service
                    .save_expense(&expense_draft(Some(id), fields, ctx.today))
                    .await
                    .map_err(failed(Action::Edit))?;
                print_json(&service.expenses().await?)
            }
            EntryCommand::Delete { id } => {
                service
                    .delete_expense(id)
                    .await
                    .map_err(failed(Action::Delete))?;
                print_json(&service.expenses().await?)
            }
        },
        AccountingCommand::Incomes(command) => match command {
            EntryCommand::List => print_json(&service.incomes().await?),
            EntryCommand::Add { fields } => {
                service
                    .save_income(&income_draft(None, fields, ctx.today))
                    .await
                    .map_err(failed(Action::Adding))?;
                print_json(&service.incomes().await?)
            }
            EntryCommand::Update { id, fields } => {
                service
                    .save_income(&income_draft(Some(id), fields, ctx.today))
                    .await
                    .map_err(failed(Action::Edit))?;
                print_json(&service.incomes().await?)
            }
            EntryCommand::Delete { id } => {
                service
                    .delete_income(id)
                    .await
                    .map_err(failed(Action::Delete))?;
                print_json(&service.incomes().await?)
            }
        },
        AccountingCommand::Transfers(command) => match command {
            TransferCommand::List => print_json(&service.transfers().await?),
            TransferCommand::Add { fields } => {
                service
                    .save_transfer(&transfer_draft(None, fields, ctx.today))
                    .await
                    .map_err(failed(Action::Adding))?;
                print_json(&service.transfers().await?)
            }
            TransferCommand::Update { id, fields } => {
                service
                    .save_transfer(&transfer_draft(Some(id), fields, ctx.today))
                    .await
                    .map_err(failed(Action::Edit))?;
                print_json(&service.transfers().await?)
            }
            TransferCommand::Delete { id } => {
                service
                    .delete_transfer(id)
                    .await
                    .map_err(failed(Action::Delete))?;
                print_json(&service.transfers().await?)
            }
        },
    }
}

async fn fuel(ctx: &Context, command: FuelCommand) -> Result<()> {
    let service = ctx.fuel();
    match command {
        FuelCommand::Cars(command) => match command {
            CarCommand::List => print_json(&service.cars().await?),
            CarCommand::Add { name } => {
                let car = drafts::car(&name)
                    .map_err(ClientError::from)
                    .map_err(failed(Action::Adding))?;
                service.add_car(&car).await.map_err(failed(Action::Adding))?;
                print_json(&service.cars().await?)
            }
            CarCommand::Update { name, rename } => {
                let car = drafts::car(&rename)
                    .map_err(ClientError::from)
                    .map_err(failed(Action::Edit))?;
                service
                    .update_car(&name, &car)
                    .await
                    .map_err(failed(Action::Edit))?;
                print_json(&service.cars().await?)
            }
            CarCommand::Delete { name } => {
                service
                    .delete_car(&name)
                    .await
                    .map_err(failed(Action::Delete))?;
                print_json(&service.cars().await?)
            }
        },
        FuelCommand::Types => print_json(&service.fuel_types().await?),
        FuelCommand::Refuels(command) => match command {
            RefuelCommand::List => print_json(&service.refuels().await?),
            RefuelCommand::Add { fields } => {
                service
                    .save_refuel(&refuel_draft(None, fields, ctx.today))
                    .await
                    .map_err(failed(Action::Adding))?;
                print_json(&service.refuels().await?)
            }
            RefuelCommand::Update { id, fields } => {
                service
                    .save_refuel(&refuel_draft(Some(id), fields, ctx.today))
                    .await
                    .map_err(failed(Action::Edit))?;
                print_json(&service.refuels().await?)
            }
            RefuelCommand::Delete { id } => {
                service
                    .delete_refuel(id)
                    .await
                    .map_err(failed(Action::Delete))?;
                print_json(&service.refuels().await?)
            }
        },
    }
}

async fn banking(ctx: &Context, command: BankingCommand) -> Result<()> {
    let service = ctx.banking();
    match command {
        BankingCommand::Accounts => print_json(&service.accounts().await?),
        BankingCommand::History => print_json(&service.history().await?),
        BankingCommand::Transactions { id: Some(id) } => {
            print_json(&service.transaction(id).await?)
        }
        BankingCommand::Transactions { id: None } => print_json(&service.transactions().await?),
    }
}

async fn charts(ctx: &Context, command: DashboardCommand) -> Result<()> {
    match command {
        DashboardCommand::Accounting(args) => {
            let filter = build_filter(&args, None)?;
            let data = ctx
                .accounting()
                .load_dashboard()
                .await
                .map_err(failed(Action::Loading))?;
            print_json(&dashboard::accounting(&data, &filter))
        }
        DashboardCommand::Banking(args) => {
            let filter = build_filter(&args, Some(ctx.today))?;
            let data = ctx
                .banking()
                .load_dashboard()
                .await
                .map_err(failed(Action::Loading))?;
            print_json(&dashboard::banking(&data, &filter))
        }
        DashboardCommand::Fuel(args) => {
            let filter = build_filter(&args, Some(ctx.today))?;
            let data = ctx
                .fuel()
                .load_dashboard()
                .await
                .map_err(failed(Action::Loading))?;
            print_json(&dashboard::fuel(&data, &filter, ctx.today))
        }
    }
}

/// Without any range argument, `year_of` opens the window on January 1st of
/// that year.
fn build_filter(args: &FilterArgs, year_of: Option<NaiveDate>) -> Result<Filter> {
    let range = match (&args.range.start, &args.range.end, year_of) {
        (None, None, Some(today)) => DateRange::year_to_date(today),
        (start, end, _) => DateRange::parse(start.as_deref(), end.as_deref())?,
    };
    Ok(Filter {
        range,
        legend: args.hidden.iter().cloned().collect::<Legend>(),
        categories: args.hidden_categories.iter().cloned().collect::<Legend>(),
    })
}

fn expense_draft(id: Option<i64>, fields: EntryArgs, today: NaiveDate) -> ExpenseDraft {
    ExpenseDraft {
        id,
        date: fields.date.unwrap_or(today),
        reason: fields.reason,
        amount: fields.amount,
        account_id: fields.account_id,
        category_id: fields.category_id,
    }
}

fn income_draft(id: Option<i64>, fields: EntryArgs, today: NaiveDate) -> IncomeDraft {
    IncomeDraft {
        id,
        date: fields.date.unwrap_or(today),
        reason: fields.reason,
        amount: fields.amount,
        account_id: fields.account_id,
        category_id: fields.category_id,
    }
}

fn transfer_draft(id: Option<i64>, fields: TransferArgs, today: NaiveDate) -> TransferDraft {
    TransferDraft {
        id,
        date: fields.date.unwrap_or(today),
        amount: fields.amount,
        source_id: fields.source_id,
        target_id: fields.target_id,
    }
}

fn refuel_draft(id: Option<i64>, fields: RefuelArgs, today: NaiveDate) -> RefuelDraft {
    RefuelDraft {
        id,
        date: fields.date.unwrap_or(today),
        distance: fields.distance,
        consumption: fields.consumption,
        cost: fields.cost,
        fuel_type_id: fields.fuel_type_id,
        car_id: fields.car_id,
    }
}

#[cfg(test)]
mod tests {
    use client::drafts::DraftError;

    use super::*;
    use crate::cli::RangeArgs;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn missing_date_defaults_to_today() {
        let fields = EntryArgs {
            date: None,
            reason: "lunch".to_string(),
            amount: 12.0,
            account_id: Some(1),
            category_id: Some(2),
        };
        let draft = expense_draft(None, fields, today());
        assert_eq!(draft.date, today());
        assert!(draft.for_create().is_ok());
    }

    #[test]
    fn draft_errors_surface_verbatim() {
        let err = failed(Action::Adding)(ClientError::Draft(DraftError::MissingTransferEnds));
        assert_eq!(
            err.to_string(),
            "The Transfer must have a source and a target"
        );
    }

    #[test]
    fn expired_session_is_not_swallowed() {
        let err = failed(Action::Edit)(ClientError::SessionExpired);
        assert!(matches!(
            err,
            AppError::Client(ClientError::SessionExpired)
        ));
    }

    #[test]
    fn banking_filter_defaults_to_year_to_date() {
        let args = FilterArgs {
            range: RangeArgs {
                start: None,
                end: None,
            },
            hidden: vec!["Giro".to_string()],
            hidden_categories: vec!["Giro".to_string()],
        };
        let filter = build_filter(&args, Some(today())).unwrap();
        assert_eq!(filter.range.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.range.end, None);
        assert!(!filter.legend.is_visible("Giro"));
        assert!(!filter.categories.is_visible("Giro"));

        let filter = build_filter(&args, None).unwrap();
        assert_eq!(filter.range, DateRange::default());
    }
}
