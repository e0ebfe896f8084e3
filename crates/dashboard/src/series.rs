use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::DateRange;

/// One slice of a pie chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Slice {
    pub name: String,
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub date: NaiveDate,
    pub value: f64,
}

/// A named line of a time chart. Points ascend by date, one per day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

/// Column of a flow chart. An income category, an account and an expense
/// category may share a name and still be distinct nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    IncomeCategory,
    Account,
    ExpenseCategory,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
}

impl Node {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Link {
    pub source: Node,
    pub target: Node,
    pub value: f64,
}

/// Nodes and weighted edges of a sankey-style flow chart. Nodes are ordered
/// by column, then by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FlowDiagram {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// Sums `(name, value)` pairs per name, ordered by name.
pub(crate) fn totals<'a>(entries: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<Slice> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for (name, value) in entries {
        *sums.entry(name).or_default() += value;
    }
    sums.into_iter()
        .map(|(name, value)| Slice {
            name: name.to_string(),
            value,
        })
        .collect()
}

pub(crate) type NodeRef<'a> = (NodeKind, &'a str);

/// Sums edges per node pair. Only an edge from a node to itself is dropped.
pub(crate) fn flow_diagram<'a>(
    edges: impl IntoIterator<Item = (NodeRef<'a>, NodeRef<'a>, f64)>,
) -> FlowDiagram {
    let mut sums: BTreeMap<(NodeRef<'a>, NodeRef<'a>), f64> = BTreeMap::new();
    for (source, target, value) in edges {
        if source == target {
            continue;
        }
        *sums.entry((source, target)).or_default() += value;
    }

    let to_node = |(kind, name): NodeRef<'_>| Node::new(kind, name);
    let nodes: BTreeSet<NodeRef<'a>> = sums.keys().flat_map(|(s, t)| [*s, *t]).collect();
    FlowDiagram {
        nodes: nodes.into_iter().map(to_node).collect(),
        links: sums
            .into_iter()
            .map(|((source, target), value)| Link {
                source: to_node(source),
                target: to_node(target),
                value,
            })
            .collect(),
    }
}

/// A balance snapshot of one account.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BalanceEntry<'a> {
    pub account: &'a str,
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub amount: f64,
}

/// Daily balance step-series per account within `range`.
///
/// Snapshots on the same day collapse to the one with the highest id (input
/// order breaks ties). If an account has no snapshot exactly on the range
/// start, its last balance before the start opens the series on that day.
/// With a closed range the last balance is also repeated on the end day. An
/// inverted range yields nothing.
pub(crate) fn balance_series<'a>(
    entries: impl IntoIterator<Item = BalanceEntry<'a>>,
    range: &DateRange,
) -> Vec<Series> {
    if range.is_inverted() {
        return Vec::new();
    }

    let mut by_account: BTreeMap<&str, Vec<BalanceEntry<'a>>> = BTreeMap::new();
    for entry in entries {
        by_account.entry(entry.account).or_default().push(entry);
    }

    by_account
        .into_iter()
        .filter_map(|(account, mut entries)| {
            entries.sort_by_key(|entry| (entry.date, entry.id));

            let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            let mut carried: Option<f64> = None;
            for entry in &entries {
                if range.start.is_some_and(|start| entry.date < start) {
                    carried = Some(entry.amount);
                } else if range.contains(entry.date) {
                    daily.insert(entry.date, entry.amount);
                }
            }

            if let (Some(start), Some(amount)) = (range.start, carried) {
                daily.entry(start).or_insert(amount);
            }
            if let Some(end) = range.end {
                if let Some(last) = daily.values().next_back().copied() {
                    daily.entry(end).or_insert(last);
                }
            }

            if daily.is_empty() {
                return None;
            }
            Some(Series {
                name: account.to_string(),
                points: into_points(daily),
            })
        })
        .collect()
}

pub(crate) fn into_points(daily: BTreeMap<NaiveDate, f64>) -> Vec<Point> {
    daily
        .into_iter()
        .map(|(date, value)| Point { date, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn entry(account: &str, id: i64, date: NaiveDate, amount: f64) -> BalanceEntry<'_> {
        BalanceEntry {
            account,
            id: Some(id),
            date,
            amount,
        }
    }

    fn values(series: &Series) -> Vec<(NaiveDate, f64)> {
        series.points.iter().map(|p| (p.date, p.value)).collect()
    }

    #[test]
    fn totals_sum_per_name_in_name_order() {
        let slices = totals([("Food", 10.0), ("Car", 5.0), ("Food", 2.5)]);
        assert_eq!(
            slices,
            vec![
                Slice {
                    name: "Car".to_string(),
                    value: 5.0
                },
                Slice {
                    name: "Food".to_string(),
                    value: 12.5
                },
            ]
        );
    }

    const ACCOUNT: NodeKind = NodeKind::Account;

    #[test]
    fn flows_merge_pairs_and_drop_self_links() {
        let diagram = flow_diagram([
            ((ACCOUNT, "Giro"), (ACCOUNT, "Savings"), 100.0),
            ((ACCOUNT, "Giro"), (ACCOUNT, "Savings"), 50.0),
            ((ACCOUNT, "Giro"), (ACCOUNT, "Giro"), 10.0),
            ((NodeKind::IncomeCategory, "Salary"), (ACCOUNT, "Giro"), 2000.0),
        ]);
        assert_eq!(
            diagram.nodes,
            vec![
                Node::new(NodeKind::IncomeCategory, "Salary"),
                Node::new(ACCOUNT, "Giro"),
                Node::new(ACCOUNT, "Savings"),
            ]
        );
        assert_eq!(diagram.links.len(), 2);
        assert_eq!(diagram.links[1].source, Node::new(ACCOUNT, "Giro"));
        assert_eq!(diagram.links[1].value, 150.0);
    }

    #[test]
    fn same_name_in_different_columns_stays_apart() {
        let diagram = flow_diagram([
            ((NodeKind::IncomeCategory, "Other"), (ACCOUNT, "Giro"), 100.0),
            ((ACCOUNT, "Giro"), (NodeKind::ExpenseCategory, "Other"), 40.0),
            ((ACCOUNT, "Cash"), (NodeKind::ExpenseCategory, "Cash"), 25.0),
        ]);
        assert_eq!(diagram.nodes.len(), 5);
        assert_eq!(diagram.links.len(), 3);

        let outflow: f64 = diagram
            .links
            .iter()
            .filter(|link| link.target.kind == NodeKind::ExpenseCategory)
            .map(|link| link.value)
            .sum();
        assert_eq!(outflow, 65.0);
        // every link moves one column to the right, so there is no cycle
        assert!(
            diagram
                .links
                .iter()
                .all(|link| link.source.kind < link.target.kind)
        );
    }

    #[test]
    fn carries_forward_last_balance_before_start() {
        let range = DateRange::new(Some(d(3, 1)), None);
        let series = balance_series(
            [
                entry("Giro", 1, d(1, 10), 100.0),
                entry("Giro", 2, d(2, 20), 250.0),
                entry("Giro", 3, d(3, 5), 300.0),
            ],
            &range,
        );
        assert_eq!(series.len(), 1);
        assert_eq!(values(&series[0]), vec![(d(3, 1), 250.0), (d(3, 5), 300.0)]);
    }

    #[test]
    fn entry_on_start_date_wins_over_carried_value() {
        let range = DateRange::new(Some(d(3, 1)), None);
        let series = balance_series(
            [
                entry("Giro", 1, d(2, 1), 100.0),
                entry("Giro", 2, d(3, 1), 120.0),
            ],
            &range,
        );
        assert_eq!(values(&series[0]), vec![(d(3, 1), 120.0)]);
    }

    #[test]
    fn same_day_snapshots_keep_the_latest() {
        let series = balance_series(
            [
                entry("Giro", 9, d(4, 2), 90.0),
                entry("Giro", 4, d(4, 2), 40.0),
            ],
            &DateRange::default(),
        );
        assert_eq!(values(&series[0]), vec![(d(4, 2), 90.0)]);
    }

    #[test]
    fn closed_range_repeats_last_balance_on_end_day() {
        let range = DateRange::new(Some(d(1, 1)), Some(d(1, 31)));
        let series = balance_series(
            [
                entry("Cash", 1, d(1, 10), 20.0),
                entry("Cash", 2, d(2, 10), 99.0),
            ],
            &range,
        );
        assert_eq!(values(&series[0]), vec![(d(1, 10), 20.0), (d(1, 31), 20.0)]);
    }

    #[test]
    fn closed_range_after_all_snapshots_is_flat() {
        let range = DateRange::new(Some(d(3, 1)), Some(d(3, 31)));
        let series = balance_series(
            [
                entry("Giro", 1, d(1, 10), 100.0),
                entry("Giro", 2, d(2, 10), 150.0),
            ],
            &range,
        );
        assert_eq!(values(&series[0]), vec![(d(3, 1), 150.0), (d(3, 31), 150.0)]);
    }

    #[test]
    fn inverted_range_has_no_series() {
        let range = DateRange::new(Some(d(3, 1)), Some(d(2, 1)));
        let series = balance_series(
            [
                entry("Giro", 1, d(1, 10), 100.0),
                entry("Giro", 2, d(2, 10), 150.0),
            ],
            &range,
        );
        assert!(series.is_empty());
    }

    #[test]
    fn accounts_without_data_in_reach_are_dropped() {
        let range = DateRange::new(Some(d(1, 1)), Some(d(1, 31)));
        let series = balance_series(
            [
                entry("Cash", 1, d(2, 10), 99.0),
                entry("Giro", 2, d(1, 3), 10.0),
            ],
            &range,
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "Giro");
    }
}
