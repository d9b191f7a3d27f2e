//! Grouped, time-bucketed metric rollups.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use adlytics_core::{Classifier, DeliveryRecord, Metrics, RoasBasis};

/// Group key for records that resolve to an empty agency or advertiser.
/// Keeping them in a bucket of their own preserves totals across groupings.
pub const UNATTRIBUTED: &str = "(unattributed)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    Campaign,
    Advertiser,
    Agency,
}

impl GroupBy {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("campaign") => Ok(Self::Campaign),
            Some("advertiser") => Ok(Self::Advertiser),
            Some("agency") => Ok(Self::Agency),
            Some(_) => Err(anyhow!(
                "group_by must be one of: campaign, advertiser, agency"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BucketBy {
    #[default]
    Daily,
    /// Rolling 7-day windows anchored at the dataset's most recent date.
    Weekly,
    /// Rolling 30-day windows anchored at the dataset's most recent date.
    Monthly,
    CalendarMonth,
    Weekday,
    Total,
}

impl BucketBy {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("daily") => Ok(Self::Daily),
            Some("weekly") => Ok(Self::Weekly),
            Some("monthly") => Ok(Self::Monthly),
            Some("month") | Some("calendar_month") => Ok(Self::CalendarMonth),
            Some("weekday") => Ok(Self::Weekday),
            Some("total") => Ok(Self::Total),
            Some(_) => Err(anyhow!(
                "bucket must be one of: daily, weekly, monthly, month, weekday, total"
            )),
        }
    }
}

/// Time component of a bucket key. Serializes as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeKey {
    Date(NaiveDate),
    Period { start: NaiveDate, end: NaiveDate },
    Month { year: i32, month: u32 },
    Weekday(Weekday),
    Total,
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl TimeKey {
    /// Display label: ISO date, "MM/DD/YY - MM/DD/YY", "September 2025",
    /// a weekday name, or "total".
    pub fn label(&self) -> String {
        match self {
            TimeKey::Date(d) => d.format("%Y-%m-%d").to_string(),
            TimeKey::Period { start, end } => format!(
                "{} - {}",
                start.format("%m/%d/%y"),
                end.format("%m/%d/%y")
            ),
            TimeKey::Month { year, month } => {
                let name = MONTH_NAMES
                    .get((*month as usize).saturating_sub(1))
                    .copied()
                    .unwrap_or("Unknown");
                format!("{name} {year}")
            }
            TimeKey::Weekday(w) => weekday_name(*w).to_string(),
            TimeKey::Total => "total".to_string(),
        }
    }

    /// Chronological sort key; weekday buckets order Monday first.
    fn sort_key(&self) -> (NaiveDate, u32) {
        match self {
            TimeKey::Date(d) => (*d, 0),
            TimeKey::Period { start, .. } => (*start, 0),
            TimeKey::Month { year, month } => (
                NaiveDate::from_ymd_opt(*year, *month, 1).unwrap_or_default(),
                0,
            ),
            TimeKey::Weekday(w) => (NaiveDate::default(), w.number_from_monday()),
            TimeKey::Total => (NaiveDate::MAX, 0),
        }
    }
}

impl Serialize for TimeKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.label())
    }
}

pub(crate) fn weekday_name(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One aggregated cell: a group crossed with a time bucket. Ratios are
/// derived from the summed metrics, never averaged from per-row ratios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub group_key: String,
    /// Display name for the group; keeps the first-seen casing where the
    /// grouping key is normalized.
    pub group_label: String,
    #[serde(rename = "time_key")]
    pub time: TimeKey,
    #[serde(flatten)]
    pub metrics: Metrics,
    pub ctr: f64,
    pub roas: f64,
}

/// Partition records by group and time bucket, summing metrics per cell.
///
/// Pure function of its inputs plus the classifier's memoized resolution.
/// Empty input yields an empty vec. Output is sorted by group key, then
/// chronologically.
pub fn rollup(
    records: &[DeliveryRecord],
    classifier: &Classifier,
    group_by: GroupBy,
    bucket_by: BucketBy,
    basis: RoasBasis,
) -> Vec<Bucket> {
    let Some(anchor) = records.iter().map(|r| r.date).max() else {
        return Vec::new();
    };

    let mut cells: HashMap<(String, TimeKey), (String, Metrics)> = HashMap::new();
    for record in records {
        let (key, label) = group_key(record, classifier, group_by);
        let time = match bucket_by {
            BucketBy::Daily => TimeKey::Date(record.date),
            BucketBy::Weekly => rolling_key(anchor, record.date, 7),
            BucketBy::Monthly => rolling_key(anchor, record.date, 30),
            BucketBy::CalendarMonth => TimeKey::Month {
                year: record.date.year(),
                month: record.date.month(),
            },
            BucketBy::Weekday => TimeKey::Weekday(record.date.weekday()),
            BucketBy::Total => TimeKey::Total,
        };
        let cell = cells
            .entry((key, time))
            .or_insert_with(|| (label, Metrics::default()));
        cell.1.add(&record.metrics);
    }

    let mut buckets: Vec<Bucket> = cells
        .into_iter()
        .map(|((group_key, time), (group_label, metrics))| Bucket {
            ctr: metrics.ctr(),
            roas: metrics.roas(basis),
            group_key,
            group_label,
            time,
            metrics,
        })
        .collect();
    buckets.sort_by(|a, b| {
        a.group_key
            .cmp(&b.group_key)
            .then_with(|| a.time.sort_key().cmp(&b.time.sort_key()))
    });
    buckets
}

/// The rolling window containing `date`, anchored so the most recent window
/// ends at `anchor`.
fn rolling_key(anchor: NaiveDate, date: NaiveDate, length_days: i64) -> TimeKey {
    let offset = (anchor - date).num_days();
    let index = offset / length_days;
    let end = anchor - Duration::days(index * length_days);
    let start = end - Duration::days(length_days - 1);
    TimeKey::Period { start, end }
}

fn group_key(
    record: &DeliveryRecord,
    classifier: &Classifier,
    group_by: GroupBy,
) -> (String, String) {
    match group_by {
        GroupBy::Campaign => (record.campaign_name.clone(), record.campaign_name.clone()),
        GroupBy::Agency => {
            let resolved = classifier.resolve_agency(&record.campaign_name);
            if resolved.agency.is_empty() {
                (UNATTRIBUTED.to_string(), UNATTRIBUTED.to_string())
            } else {
                (resolved.agency.clone(), resolved.agency)
            }
        }
        GroupBy::Advertiser => {
            let advertiser = classifier.resolve_advertiser(&record.campaign_name);
            if advertiser.is_empty() {
                return (UNATTRIBUTED.to_string(), UNATTRIBUTED.to_string());
            }
            // Same-named advertisers under different agencies are distinct
            // entities; casing and spacing drift is not.
            let abbreviation = classifier.resolve_agency(&record.campaign_name).abbreviation;
            let normalized = advertiser
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            (format!("{abbreviation}/{normalized}"), advertiser)
        }
    }
}
