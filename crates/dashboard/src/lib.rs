//! Chart-ready aggregations over the raw backend collections.
//!
//! Every dashboard is a pure function of its input collections and a
//! [`Filter`]; callers recompute the whole thing whenever either changes.

pub use accounting::{AccountingCharts, AccountingData, Totals};
pub use banking::{BankingCharts, BankingData};
pub use filter::{DateRange, Dated, Filter, FilterError, Legend, LegendEntry};
pub use fuel::{FuelCharts, FuelData};
pub use series::{FlowDiagram, Link, Node, NodeKind, Point, Series, Slice};

mod accounting;
mod banking;
mod filter;
mod fuel;
mod series;

/// Name used for records whose reference (account, category, car) is missing.
pub const UNASSIGNED: &str = "Unassigned";

pub fn accounting(data: &AccountingData, filter: &Filter) -> AccountingCharts {
    accounting::build(data, filter)
}

pub fn banking(data: &BankingData, filter: &Filter) -> BankingCharts {
    banking::build(data, filter)
}

/// `today` closes the cumulative distance series when the range is open.
pub fn fuel(data: &FuelData, filter: &Filter, today: chrono::NaiveDate) -> FuelCharts {
    fuel::build(data, filter, today)
}
