//! Non-overlapping rolling comparison windows.
//!
//! Windows walk backward from the dataset's most recent date, so "last 7
//! days" always ends on real data rather than on today's clock. A trailing
//! stub shorter than the period length is dropped instead of being compared
//! against full windows.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use adlytics_core::{DeliveryRecord, Metrics, RoasBasis};

use crate::error::AggregateError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingPeriod {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(flatten)]
    pub metrics: Metrics,
    pub ctr: f64,
    pub roas: f64,
    /// Source rows that landed in this window.
    pub count: usize,
}

/// Successive non-overlapping windows of `period_length_days`, most recent
/// first. Windows with no rows are dropped; so is the incomplete stub at the
/// old end of the data. Empty input yields an empty vec.
pub fn rolling_periods(
    records: &[DeliveryRecord],
    period_length_days: i64,
    basis: RoasBasis,
) -> Result<Vec<RollingPeriod>, AggregateError> {
    if period_length_days < 1 {
        return Err(AggregateError::InvalidPeriodLength(period_length_days));
    }
    let Some(most_recent) = records.iter().map(|r| r.date).max() else {
        return Ok(Vec::new());
    };
    let earliest = records
        .iter()
        .map(|r| r.date)
        .min()
        .unwrap_or(most_recent);

    let total_days = (most_recent - earliest).num_days() + 1;
    let complete_periods = total_days / period_length_days;
    if complete_periods < 1 {
        return Ok(Vec::new());
    }

    let mut sums: Vec<(Metrics, usize)> =
        vec![(Metrics::default(), 0); complete_periods as usize];
    for record in records {
        let offset = (most_recent - record.date).num_days();
        let index = (offset / period_length_days) as usize;
        if let Some((metrics, count)) = sums.get_mut(index) {
            metrics.add(&record.metrics);
            *count += 1;
        }
    }

    let mut periods = Vec::new();
    for (index, (metrics, count)) in sums.into_iter().enumerate() {
        if count == 0 {
            continue;
        }
        let period_end = most_recent - Duration::days(index as i64 * period_length_days);
        let period_start = period_end - Duration::days(period_length_days - 1);
        periods.push(RollingPeriod {
            period_start,
            period_end,
            ctr: metrics.ctr(),
            roas: metrics.roas(basis),
            metrics,
            count,
        });
    }
    Ok(periods)
}

/// Percent change against the immediately preceding period.
/// Zero baseline: 100 when anything was delivered, otherwise 0.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}

/// A window paired with its immediate predecessor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub current: RollingPeriod,
    pub previous: RollingPeriod,
    pub impressions_change_pct: f64,
    pub clicks_change_pct: f64,
    pub transactions_change_pct: f64,
    pub revenue_change_pct: f64,
    pub spend_change_pct: f64,
}

/// Pair each period with the next older one. Input order is most recent
/// first, as produced by [`rolling_periods`].
pub fn compare_adjacent(periods: &[RollingPeriod]) -> Vec<PeriodComparison> {
    periods
        .windows(2)
        .map(|pair| {
            let (current, previous) = (&pair[0], &pair[1]);
            PeriodComparison {
                impressions_change_pct: percent_change(
                    current.metrics.impressions as f64,
                    previous.metrics.impressions as f64,
                ),
                clicks_change_pct: percent_change(
                    current.metrics.clicks as f64,
                    previous.metrics.clicks as f64,
                ),
                transactions_change_pct: percent_change(
                    current.metrics.transactions as f64,
                    previous.metrics.transactions as f64,
                ),
                revenue_change_pct: percent_change(
                    current.metrics.revenue,
                    previous.metrics.revenue,
                ),
                spend_change_pct: percent_change(current.metrics.spend, previous.metrics.spend),
                current: current.clone(),
                previous: previous.clone(),
            }
        })
        .collect()
}
