//! Actual-vs-expected delivery against contract terms.

use adlytics_core::{ContractTerms, DeliveryRecord};
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AggregateError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacingResult {
    pub name: String,
    pub flight_days: i64,
    pub elapsed_days: i64,
    pub expected_to_date: f64,
    pub actual_to_date: f64,
    pub pacing_pct: f64,
}

/// Compare spend delivered by `as_of` against the linear expectation for the
/// elapsed share of the flight. Day counts include both flight endpoints.
/// Records dated outside the flight window never count toward actual.
pub fn pacing(
    terms: &ContractTerms,
    records: &[DeliveryRecord],
    as_of: NaiveDate,
) -> Result<PacingResult, AggregateError> {
    if terms.end_date < terms.start_date {
        return Err(AggregateError::InvalidFlight {
            start: terms.start_date,
            end: terms.end_date,
        });
    }

    let flight_days = (terms.end_date - terms.start_date).num_days() + 1;
    let effective = as_of.min(terms.end_date);
    let elapsed_days = if effective < terms.start_date {
        0
    } else {
        (effective - terms.start_date).num_days() + 1
    };

    let expected_to_date = terms.budget * elapsed_days as f64 / flight_days as f64;
    let actual_to_date: f64 = records
        .iter()
        .filter(|r| r.date >= terms.start_date && r.date <= effective)
        .map(|r| r.metrics.spend)
        .sum();
    let pacing_pct = if expected_to_date == 0.0 {
        0.0
    } else {
        (actual_to_date / expected_to_date) * 100.0
    };

    Ok(PacingResult {
        name: terms.name.clone(),
        flight_days,
        elapsed_days,
        expected_to_date,
        actual_to_date,
        pacing_pct,
    })
}

/// Stand-in terms for a campaign with no contract on file: the observed
/// date span as the flight, total spend as the budget, and an effective
/// CPM backed out of the delivered totals.
pub fn derive_terms(name: &str, records: &[DeliveryRecord]) -> Option<ContractTerms> {
    let start_date = records.iter().map(|r| r.date).min()?;
    let end_date = records.iter().map(|r| r.date).max()?;

    let budget: f64 = records.iter().map(|r| r.metrics.spend).sum();
    let impressions: i64 = records.iter().map(|r| r.metrics.impressions).sum();
    let cpm = if impressions == 0 {
        0.0
    } else {
        budget / impressions as f64 * 1000.0
    };

    Some(ContractTerms {
        name: name.to_string(),
        start_date,
        end_date,
        budget,
        cpm,
        impressions_goal: None,
    })
}
