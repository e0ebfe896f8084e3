use std::collections::BTreeMap;

use api_types::fuel::{Car, FuelType, Refuel};
use chrono::NaiveDate;
use serde::Serialize;

use crate::{Filter, LegendEntry, Series, Slice, UNASSIGNED, series};

#[derive(Clone, Debug, Default)]
pub struct FuelData {
    pub fuel_types: Vec<FuelType>,
    pub cars: Vec<Car>,
    pub refuels: Vec<Refuel>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FuelCharts {
    pub legend: Vec<LegendEntry>,
    /// Kilometres driven per car, accumulated over the window.
    pub distance: Vec<Series>,
    pub consumption: Vec<Series>,
    /// Distance-weighted consumption per car.
    pub average_consumption: Vec<Slice>,
    pub cost_by_car: Vec<Slice>,
    pub cost_by_fuel_type: Vec<Slice>,
}

fn car_name(refuel: &Refuel) -> &str {
    refuel.car.as_ref().map_or(UNASSIGNED, |car| car.name.as_str())
}

fn fuel_type_name(refuel: &Refuel) -> &str {
    refuel
        .fuel_type
        .as_ref()
        .map_or(UNASSIGNED, |fuel_type| fuel_type.name.as_str())
}

pub(crate) fn build(data: &FuelData, filter: &Filter, today: NaiveDate) -> FuelCharts {
    let legend = &filter.legend;

    let mut by_car: BTreeMap<&str, Vec<&Refuel>> = BTreeMap::new();
    for refuel in filter.range.select(&data.refuels) {
        let car = car_name(refuel);
        if legend.is_visible(car) {
            by_car.entry(car).or_default().push(refuel);
        }
    }
    for refuels in by_car.values_mut() {
        refuels.sort_by_key(|refuel| (refuel.date, refuel.id));
    }

    let closing_day = filter.range.end.unwrap_or(today);
    let distance = by_car
        .iter()
        .map(|(car, refuels)| Series {
            name: car.to_string(),
            points: series::into_points(cumulative_distance(
                refuels,
                filter.range.start,
                closing_day,
            )),
        })
        .collect();

    let consumption = by_car
        .iter()
        .map(|(car, refuels)| {
            let daily: BTreeMap<NaiveDate, f64> = refuels
                .iter()
                .map(|refuel| (refuel.date, refuel.consumption))
                .collect();
            Series {
                name: car.to_string(),
                points: series::into_points(daily),
            }
        })
        .collect();

    let average_consumption = by_car
        .iter()
        .map(|(car, refuels)| Slice {
            name: car.to_string(),
            value: weighted_consumption(refuels),
        })
        .collect();

    let visible = || by_car.values().flatten().copied();
    let cost_by_car = series::totals(visible().map(|refuel| (car_name(refuel), refuel.cost)));
    let cost_by_fuel_type =
        series::totals(visible().map(|refuel| (fuel_type_name(refuel), refuel.cost)));

    FuelCharts {
        legend: legend.entries(
            data.cars
                .iter()
                .map(|car| car.name.as_str())
                .chain(data.refuels.iter().map(car_name)),
        ),
        distance,
        consumption,
        average_consumption,
        cost_by_car,
        cost_by_fuel_type,
    }
}

/// Running total of `distance`, starting at 0 on `start` (when set) and
/// closed with the total on `closing_day` unless a later refuel exists.
fn cumulative_distance(
    refuels: &[&Refuel],
    start: Option<NaiveDate>,
    closing_day: NaiveDate,
) -> BTreeMap<NaiveDate, f64> {
    let mut daily = BTreeMap::new();
    if let Some(start) = start {
        daily.insert(start, 0.0);
    }

    let mut total = 0.0;
    for refuel in refuels {
        total += refuel.distance;
        daily.insert(refuel.date, total);
    }

    if daily.keys().next_back().is_none_or(|last| *last <= closing_day) {
        daily.insert(closing_day, total);
    }
    daily
}

fn weighted_consumption(refuels: &[&Refuel]) -> f64 {
    let distance: f64 = refuels.iter().map(|refuel| refuel.distance).sum();
    if distance > 0.0 {
        refuels
            .iter()
            .map(|refuel| refuel.consumption * refuel.distance)
            .sum::<f64>()
            / distance
    } else if refuels.is_empty() {
        0.0
    } else {
        refuels.iter().map(|refuel| refuel.consumption).sum::<f64>() / refuels.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn refuel(date: NaiveDate, distance: f64, consumption: f64) -> Refuel {
        Refuel {
            id: None,
            date,
            distance,
            consumption,
            cost: 50.0,
            fuel_type: None,
            car: None,
        }
    }

    #[test]
    fn cumulative_distance_opens_at_zero_and_closes_on_last_day() {
        let a = refuel(d(2, 1), 400.0, 6.0);
        let b = refuel(d(3, 1), 350.0, 5.5);
        let daily = cumulative_distance(&[&a, &b], Some(d(1, 1)), d(3, 31));
        let points: Vec<(NaiveDate, f64)> = daily.into_iter().collect();
        assert_eq!(
            points,
            vec![
                (d(1, 1), 0.0),
                (d(2, 1), 400.0),
                (d(3, 1), 750.0),
                (d(3, 31), 750.0)
            ]
        );
    }

    #[test]
    fn closing_day_is_skipped_when_a_refuel_is_later() {
        let a = refuel(d(5, 1), 100.0, 6.0);
        let daily = cumulative_distance(&[&a], None, d(4, 1));
        assert_eq!(daily.into_iter().collect::<Vec<_>>(), vec![(d(5, 1), 100.0)]);
    }

    #[test]
    fn consumption_average_is_weighted_by_distance() {
        let a = refuel(d(1, 1), 100.0, 4.0);
        let b = refuel(d(1, 2), 300.0, 8.0);
        assert_eq!(weighted_consumption(&[&a, &b]), 7.0);
        assert_eq!(weighted_consumption(&[]), 0.0);
    }
}
