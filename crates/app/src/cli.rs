use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "homebook", version, about = "Accounting, fuel and banking from the terminal")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:4053/).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override where the session token is kept.
    #[arg(long, global = true)]
    pub session_file: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in; the password is prompted, never read from arguments.
    Login {
        #[arg(long)]
        username: String,
    },
    Logout,
    /// Show the logged-in user.
    Whoami,
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
    },
    /// Change the logged-in user's details.
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Prompt for a new password.
        #[arg(long)]
        password: bool,
    },
    /// Delete the logged-in user.
    Unregister,
    #[command(subcommand)]
    Accounting(AccountingCommand),
    #[command(subcommand)]
    Fuel(FuelCommand),
    #[command(subcommand)]
    Banking(BankingCommand),
    #[command(subcommand)]
    Dashboard(DashboardCommand),
    /// Write a collection as CSV to stdout.
    Export {
        target: ExportTarget,
        #[command(flatten)]
        range: RangeArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum AccountingCommand {
    #[command(subcommand)]
    Accounts(AccountCommand),
    #[command(subcommand)]
    Categories(CategoryCommand),
    #[command(subcommand)]
    Expenses(EntryCommand),
    #[command(subcommand)]
    Incomes(EntryCommand),
    #[command(subcommand)]
    Transfers(TransferCommand),
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    List,
    Add {
        name: String,
        #[arg(long, default_value_t = 0.0)]
        balance: f64,
    },
    Update {
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        balance: f64,
    },
    Delete {
        name: String,
    },
    /// Balance snapshots of one account.
    History {
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    List,
    Add { name: String },
    Update { id: i64, name: String },
    Delete { id: i64 },
}

/// CRUD on expenses and incomes.
#[derive(Debug, Subcommand)]
pub enum EntryCommand {
    List,
    Add {
        #[command(flatten)]
        fields: EntryArgs,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: EntryArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum TransferCommand {
    List,
    Add {
        #[command(flatten)]
        fields: TransferArgs,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: TransferArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct EntryArgs {
    /// Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    pub reason: String,
    #[arg(long, allow_negative_numbers = true)]
    pub amount: f64,
    #[arg(long)]
    pub account_id: Option<i64>,
    #[arg(long)]
    pub category_id: Option<i64>,
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub amount: f64,
    #[arg(long)]
    pub source_id: Option<i64>,
    #[arg(long)]
    pub target_id: Option<i64>,
}

#[derive(Debug, Subcommand)]
pub enum FuelCommand {
    #[command(subcommand)]
    Cars(CarCommand),
    /// List fuel types.
    Types,
    #[command(subcommand)]
    Refuels(RefuelCommand),
}

#[derive(Debug, Subcommand)]
pub enum CarCommand {
    List,
    Add { name: String },
    Update { name: String, rename: String },
    Delete { name: String },
}

#[derive(Debug, Subcommand)]
pub enum RefuelCommand {
    List,
    Add {
        #[command(flatten)]
        fields: RefuelArgs,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: RefuelArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct RefuelArgs {
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub distance: f64,
    #[arg(long)]
    pub consumption: f64,
    #[arg(long)]
    pub cost: f64,
    #[arg(long)]
    pub fuel_type_id: Option<i64>,
    #[arg(long)]
    pub car_id: Option<i64>,
}

#[derive(Debug, Subcommand)]
pub enum BankingCommand {
    Accounts,
    History,
    Transactions {
        /// Show a single transaction.
        id: Option<i64>,
    },
}

#[derive(Debug, Subcommand)]
pub enum DashboardCommand {
    Accounting(FilterArgs),
    Banking(FilterArgs),
    Fuel(FilterArgs),
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD); an empty value leaves the range open.
    #[arg(long)]
    pub start: Option<String>,
    /// Last day (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub range: RangeArgs,
    /// Accounts or cars to switch off.
    #[arg(long = "hide")]
    pub hidden: Vec<String>,
    /// Categories to switch off (accounting only).
    #[arg(long = "hide-category")]
    pub hidden_categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportTarget {
    Expenses,
    Incomes,
    Transfers,
    Refuels,
    Transactions,
}
