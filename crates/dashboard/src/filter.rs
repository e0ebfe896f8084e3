use std::collections::BTreeSet;

use api_types::{
    accounting::{AccountHistory, Expense, Income, Transfer},
    banking::{History, Transaction},
    fuel::Refuel,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid date \"{0}\", expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Records that can be placed on a time axis.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

macro_rules! impl_dated {
    ($($ty:ty),* $(,)?) => {
        $(impl Dated for $ty {
            fn date(&self) -> NaiveDate {
                self.date
            }
        })*
    };
}

impl_dated!(Expense, Income, Transfer, AccountHistory, History, Transaction, Refuel);

/// Inclusive date window. A missing bound leaves that side open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// From January 1st of `today`'s year, open-ended.
    pub fn year_to_date(today: NaiveDate) -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(today.year(), 1, 1),
            end: None,
        }
    }

    /// Parses form input. Blank strings count as "no bound".
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, FilterError> {
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }

    /// True when both bounds are set and the start lies after the end.
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    pub fn select<'a, T: Dated>(&self, items: &'a [T]) -> impl Iterator<Item = &'a T> + 'a {
        let range = *self;
        items.iter().filter(move |item| range.contains(item.date()))
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FilterError::InvalidDate(raw.to_string())),
    }
}

/// Series switched off in a chart legend.
///
/// Hiding a name removes the matching records from every chart of the same
/// dashboard, not only from the chart whose legend was clicked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    hidden: BTreeSet<String>,
}

impl Legend {
    pub fn hide(&mut self, name: impl Into<String>) {
        self.hidden.insert(name.into());
    }

    pub fn show(&mut self, name: &str) {
        self.hidden.remove(name);
    }

    /// Flips the visibility of `name` and returns the new state.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.hidden.remove(name) {
            true
        } else {
            self.hidden.insert(name.to_string());
            false
        }
    }

    pub fn is_visible(&self, name: &str) -> bool {
        !self.hidden.contains(name)
    }

    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.hidden.iter().map(String::as_str)
    }

    /// Legend rows for `names`, sorted and deduplicated.
    pub(crate) fn entries<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<LegendEntry> {
        names
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|name| LegendEntry {
                name: name.to_string(),
                visible: self.is_visible(name),
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Legend {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            hidden: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub visible: bool,
}

/// Date window plus the legends of a dashboard.
///
/// `legend` switches series off (accounts, bank accounts, cars).
/// `categories` is a separate legend so that a category and an account with
/// the same name toggle independently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    pub range: DateRange,
    pub legend: Legend,
    pub categories: Legend,
}

impl Filter {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn bounds_are_inclusive() {
        let range = DateRange::new(Some(d(2024, 1, 1)), Some(d(2024, 1, 31)));
        assert!(range.contains(d(2024, 1, 1)));
        assert!(range.contains(d(2024, 1, 31)));
        assert!(!range.contains(d(2023, 12, 31)));
        assert!(!range.contains(d(2024, 2, 1)));
    }

    #[test]
    fn missing_bounds_are_open() {
        let range = DateRange::default();
        assert!(range.contains(d(1970, 1, 1)));
        assert!(range.contains(d(2999, 12, 31)));
    }

    #[test]
    fn blank_input_parses_as_open_bound() {
        let range = DateRange::parse(Some(""), Some("2024-06-30")).unwrap();
        assert_eq!(range, DateRange::new(None, Some(d(2024, 6, 30))));
        assert_eq!(
            DateRange::parse(Some("30.06.2024"), None),
            Err(FilterError::InvalidDate("30.06.2024".to_string()))
        );
    }

    #[test]
    fn year_to_date_starts_on_january_first() {
        let range = DateRange::year_to_date(d(2025, 8, 17));
        assert_eq!(range.start, Some(d(2025, 1, 1)));
        assert_eq!(range.end, None);
    }

    #[test]
    fn toggle_flips_visibility() {
        let mut legend = Legend::default();
        assert!(!legend.toggle("Giro"));
        assert!(!legend.is_visible("Giro"));
        assert!(legend.toggle("Giro"));
        assert!(legend.is_visible("Giro"));
    }

    #[test]
    fn entries_keep_hidden_names() {
        let legend: Legend = ["Cash"].into_iter().collect();
        let entries = legend.entries(["Giro", "Cash", "Giro"]);
        assert_eq!(
            entries,
            vec![
                LegendEntry {
                    name: "Cash".to_string(),
                    visible: false
                },
                LegendEntry {
                    name: "Giro".to_string(),
                    visible: true
                },
            ]
        );
    }
}
