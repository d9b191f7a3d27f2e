//! `adlytics report` assembly: one JSON document carrying every view a
//! delivery dashboard renders from the same record set.

use std::collections::BTreeMap;

use adlytics_aggregate::{
    compare_adjacent, daily_spend, date_span, derive_terms, fill_gaps, pacing, project_month_end,
    rolling_periods, rollup, Bucket, BucketBy, ForecastResult, GapFilledPoint, GroupBy,
    PacingResult, PeriodComparison, TrailingRate,
};
use adlytics_core::{Classifier, ContractTerms, DeliveryRecord, RoasBasis};
use chrono::NaiveDate;
use serde::Serialize;

/// Gap-filled daily series for one grouped entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySeries {
    pub group_key: String,
    pub group_label: String,
    pub points: Vec<GapFilledPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollingComparisons {
    /// Adjacent 7-day windows, most recent pair first.
    pub weekly: Vec<PeriodComparison>,
    /// Adjacent 30-day windows, most recent pair first.
    pub monthly: Vec<PeriodComparison>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub group_by: GroupBy,
    pub bucket: BucketBy,
    pub roas_basis: RoasBasis,
    /// Most recent delivery date in the dataset; every backward-looking
    /// figure is anchored here instead of at the wall clock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    pub buckets: Vec<Bucket>,
    pub series: Vec<EntitySeries>,
    pub rolling: RollingComparisons,
    pub spend_forecast: ForecastResult,
    pub pacing: Vec<PacingResult>,
}

pub fn build_report(
    records: &[DeliveryRecord],
    classifier: &Classifier,
    group_by: GroupBy,
    bucket_by: BucketBy,
    basis: RoasBasis,
    terms: &[ContractTerms],
) -> anyhow::Result<Report> {
    let as_of = records.iter().map(|r| r.date).max();

    let buckets = rollup(records, classifier, group_by, bucket_by, basis);
    let series = entity_series(records, classifier, group_by, basis);
    let weekly = compare_adjacent(&rolling_periods(records, 7, basis)?);
    let monthly = compare_adjacent(&rolling_periods(records, 30, basis)?);
    let spend_forecast = project_month_end(&daily_spend(records), TrailingRate::default());
    let pacing = pacing_block(records, terms, as_of)?;

    Ok(Report {
        group_by,
        bucket: bucket_by,
        roas_basis: basis,
        as_of,
        buckets,
        series,
        rolling: RollingComparisons { weekly, monthly },
        spend_forecast,
        pacing,
    })
}

/// One gap-filled daily series per entity under the requested grouping,
/// regardless of the bucket mode used for the tabular rollup.
fn entity_series(
    records: &[DeliveryRecord],
    classifier: &Classifier,
    group_by: GroupBy,
    basis: RoasBasis,
) -> Vec<EntitySeries> {
    let (Some(start), Some(end)) = (
        records.iter().map(|r| r.date).min(),
        records.iter().map(|r| r.date).max(),
    ) else {
        return Vec::new();
    };
    let calendar = date_span(start, end);

    let daily = rollup(records, classifier, group_by, BucketBy::Daily, basis);
    let mut grouped: BTreeMap<String, (String, Vec<Bucket>)> = BTreeMap::new();
    for bucket in daily {
        grouped
            .entry(bucket.group_key.clone())
            .or_insert_with(|| (bucket.group_label.clone(), Vec::new()))
            .1
            .push(bucket);
    }

    grouped
        .into_iter()
        .map(|(group_key, (group_label, buckets))| EntitySeries {
            group_key,
            group_label,
            points: fill_gaps(&buckets, &calendar),
        })
        .collect()
}

/// Pacing per campaign: explicit terms matched by name, otherwise terms
/// derived from the campaign's own delivery. Terms with no delivery at all
/// still pace (at zero actual).
fn pacing_block(
    records: &[DeliveryRecord],
    terms: &[ContractTerms],
    as_of: Option<NaiveDate>,
) -> anyhow::Result<Vec<PacingResult>> {
    // No delivery data means no anchor date to pace against.
    let Some(as_of) = as_of else {
        return Ok(Vec::new());
    };

    let mut by_campaign: BTreeMap<String, Vec<DeliveryRecord>> = BTreeMap::new();
    for record in records {
        by_campaign
            .entry(record.campaign_name.clone())
            .or_default()
            .push(record.clone());
    }

    let mut results = Vec::new();
    for (name, campaign_records) in &by_campaign {
        let campaign_terms = terms
            .iter()
            .find(|t| &t.name == name)
            .cloned()
            .or_else(|| derive_terms(name, campaign_records));
        if let Some(t) = campaign_terms {
            results.push(pacing(&t, campaign_records, as_of)?);
        }
    }
    for t in terms {
        if !by_campaign.contains_key(&t.name) {
            results.push(pacing(t, &[], as_of)?);
        }
    }
    Ok(results)
}
