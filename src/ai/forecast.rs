use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use super::forest::{ForestParams, RandomForestRegressor};
use crate::models::{ForecastPoint, Transaction};

pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Daily running balance: net amount per date, accumulated in date order.
pub fn daily_balances(rows: &[Transaction]) -> Vec<(NaiveDate, f64)> {
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for t in rows {
        *daily.entry(t.date).or_default() += t.amount;
    }
    let mut balance = 0.0;
    daily
        .into_iter()
        .map(|(date, net)| {
            balance += net;
            (date, balance)
        })
        .collect()
}

/// Ordinal day (0001-01-01 = 1), weekday (Monday = 0), month.
fn calendar_features(date: NaiveDate) -> Vec<f64> {
    vec![
        date.num_days_from_ce() as f64,
        date.weekday().num_days_from_monday() as f64,
        date.month() as f64,
    ]
}

/// Projects the balance for `horizon_days` days after the last recorded date.
///
/// The regressor sees only calendar position, so projections repeat weekly and
/// monthly shape rather than extending a trend.
pub fn forecast_balance(rows: &[Transaction], horizon_days: u32) -> Vec<ForecastPoint> {
    let history = daily_balances(rows);
    let Some(&(last_date, _)) = history.last() else {
        return Vec::new();
    };
    if horizon_days == 0 {
        return Vec::new();
    }

    let x: Vec<Vec<f64>> = history.iter().map(|(d, _)| calendar_features(*d)).collect();
    let y: Vec<f64> = history.iter().map(|(_, b)| *b).collect();
    let model = RandomForestRegressor::fit(&x, &y, ForestParams::default());
    debug!(days = history.len(), horizon_days, "fitted balance forecaster");

    (1..=u64::from(horizon_days))
        .map_while(|i| last_date.checked_add_days(Days::new(i)))
        .map(|date| ForecastPoint {
            date,
            predicted_balance: model.predict(&calendar_features(date)),
        })
        .collect()
}
