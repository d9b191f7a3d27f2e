//! Month-end projection from trailing delivery rates.

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// How the trailing daily value is chosen. Both strategies are in active
/// use: the last-day rate reacts to ramp-ups, the period average smooths
/// single-day spikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrailingRate {
    LastObservedDay,
    #[default]
    PeriodToDateAverage,
}

impl TrailingRate {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("period_to_date_average") => Ok(Self::PeriodToDateAverage),
            Some("last_observed_day") => Ok(Self::LastObservedDay),
            Some(_) => Err(anyhow!(
                "trailing_rate must be one of: period_to_date_average, last_observed_day"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub period_to_date_total: f64,
    pub trailing_rate: f64,
    pub remaining_days: i64,
    pub projected_total: f64,
}

/// Project the month-end total from daily observations, as of the most
/// recent observed date. Empty input projects zero.
pub fn project_month_end(daily: &[(NaiveDate, f64)], rate: TrailingRate) -> ForecastResult {
    match daily.iter().map(|(d, _)| *d).max() {
        Some(as_of) => project_month_end_as_of(daily, as_of, rate),
        None => ForecastResult {
            period_to_date_total: 0.0,
            trailing_rate: 0.0,
            remaining_days: 0,
            projected_total: 0.0,
        },
    }
}

/// Projection as it would have looked on `as_of`: only observations in that
/// month up to and including `as_of` participate, so a historical trend line
/// uses the same formula as the live number.
///
/// With nothing observed yet, or a zero total, the period-to-date total is
/// returned unprojected.
pub fn project_month_end_as_of(
    daily: &[(NaiveDate, f64)],
    as_of: NaiveDate,
    rate: TrailingRate,
) -> ForecastResult {
    let observed: Vec<(NaiveDate, f64)> = daily
        .iter()
        .filter(|(d, _)| d.year() == as_of.year() && d.month() == as_of.month() && *d <= as_of)
        .copied()
        .collect();

    let period_to_date_total: f64 = observed.iter().map(|(_, v)| v).sum();
    let remaining_days = days_in_month(as_of) - i64::from(as_of.day());
    let days_elapsed = i64::from(as_of.day());

    if days_elapsed == 0 || period_to_date_total == 0.0 {
        return ForecastResult {
            period_to_date_total,
            trailing_rate: 0.0,
            remaining_days,
            projected_total: period_to_date_total,
        };
    }

    let trailing_rate = match rate {
        TrailingRate::LastObservedDay => observed
            .iter()
            .max_by_key(|(d, _)| *d)
            .map(|(_, v)| *v)
            .unwrap_or(0.0),
        TrailingRate::PeriodToDateAverage => period_to_date_total / days_elapsed as f64,
    };

    ForecastResult {
        period_to_date_total,
        trailing_rate,
        remaining_days,
        projected_total: period_to_date_total + trailing_rate * remaining_days as f64,
    }
}

fn days_in_month(date: NaiveDate) -> i64 {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    match next_month {
        Some(next) => (next - first).num_days(),
        None => 30,
    }
}

/// Sum a record set's spend per day, ready for [`project_month_end`].
pub fn daily_spend(records: &[adlytics_core::DeliveryRecord]) -> Vec<(NaiveDate, f64)> {
    let mut by_date: std::collections::HashMap<NaiveDate, f64> = std::collections::HashMap::new();
    for record in records {
        *by_date.entry(record.date).or_insert(0.0) += record.metrics.spend;
    }
    let mut daily: Vec<(NaiveDate, f64)> = by_date.into_iter().collect();
    daily.sort_by_key(|(d, _)| *d);
    daily
}
