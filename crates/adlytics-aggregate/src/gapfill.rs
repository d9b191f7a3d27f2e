//! Continuous daily series from sparse per-entity buckets.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::rollup::{weekday_name, Bucket, TimeKey};

/// One day in a gap-filled series.
///
/// Additive metrics are zero on filler days; ratio metrics are `None` so a
/// chart can tell "no delivery" apart from "delivered at a zero rate".
/// Weekday-aggregated points carry no underlying calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapFilledPoint {
    /// Short display label, e.g. "9/1" or a weekday name.
    pub date: String,
    pub raw_date: Option<NaiveDate>,
    pub impressions: i64,
    pub clicks: i64,
    pub transactions: i64,
    pub revenue: f64,
    pub spend: f64,
    pub ctr: Option<f64>,
    pub roas: Option<f64>,
}

/// Every day from `start` through `end` inclusive.
pub fn date_span(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        current += Duration::days(1);
    }
    days
}

/// Produce a continuous daily series over `calendar`, bounded to the span
/// the entity actually delivered in.
///
/// Only calendar dates within `[first_observed, last_observed]` are emitted;
/// a trend line must not extend before an entity started or after it
/// stopped. Missing days inside the span become filler points. Weekday
/// series (one bucket per day of week) are already dense and pass through
/// unchanged; period/month/total buckets are not a daily series and are
/// ignored.
pub fn fill_gaps(series: &[Bucket], calendar: &[NaiveDate]) -> Vec<GapFilledPoint> {
    if series.is_empty() {
        return Vec::new();
    }
    if series
        .iter()
        .any(|b| matches!(b.time, TimeKey::Weekday(_)))
    {
        return series
            .iter()
            .filter_map(|b| match b.time {
                TimeKey::Weekday(w) => Some(weekday_point(w, b)),
                _ => None,
            })
            .collect();
    }

    let mut by_date: HashMap<NaiveDate, &Bucket> = HashMap::new();
    for bucket in series {
        if let TimeKey::Date(d) = bucket.time {
            by_date.insert(d, bucket);
        }
    }
    let Some(first_observed) = by_date.keys().min().copied() else {
        return Vec::new();
    };
    let last_observed = by_date.keys().max().copied().unwrap_or(first_observed);

    let mut points = Vec::new();
    for &day in calendar {
        if day < first_observed || day > last_observed {
            continue;
        }
        match by_date.get(&day) {
            Some(bucket) => points.push(observed_point(day, bucket)),
            None => points.push(filler_point(day)),
        }
    }
    points
}

fn short_date_label(date: NaiveDate) -> String {
    date.format("%-m/%-d").to_string()
}

fn observed_point(date: NaiveDate, bucket: &Bucket) -> GapFilledPoint {
    GapFilledPoint {
        date: short_date_label(date),
        raw_date: Some(date),
        impressions: bucket.metrics.impressions,
        clicks: bucket.metrics.clicks,
        transactions: bucket.metrics.transactions,
        revenue: bucket.metrics.revenue,
        spend: bucket.metrics.spend,
        ctr: Some(bucket.ctr),
        roas: Some(bucket.roas),
    }
}

fn filler_point(date: NaiveDate) -> GapFilledPoint {
    GapFilledPoint {
        date: short_date_label(date),
        raw_date: Some(date),
        impressions: 0,
        clicks: 0,
        transactions: 0,
        revenue: 0.0,
        spend: 0.0,
        ctr: None,
        roas: None,
    }
}

fn weekday_point(weekday: chrono::Weekday, bucket: &Bucket) -> GapFilledPoint {
    GapFilledPoint {
        date: weekday_name(weekday).to_string(),
        raw_date: None,
        impressions: bucket.metrics.impressions,
        clicks: bucket.metrics.clicks,
        transactions: bucket.metrics.transactions,
        revenue: bucket.metrics.revenue,
        spend: bucket.metrics.spend,
        ctr: Some(bucket.ctr),
        roas: Some(bucket.roas),
    }
}
