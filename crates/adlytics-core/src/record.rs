//! Delivery-record and identity types shared across the workspace.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Additive delivery metrics for one campaign-day, or any summed span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub impressions: i64,
    pub clicks: i64,
    pub transactions: i64,
    pub revenue: f64,
    pub spend: f64,
}

/// Which denominator a ROAS figure is computed against.
///
/// The feed's consumers use both conventions: transaction dashboards divide
/// revenue by spend, CPM-oriented views divide revenue by delivered
/// impressions per thousand. Callers pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoasBasis {
    #[default]
    Spend,
    Impressions,
}

impl RoasBasis {
    pub fn parse(raw: Option<&str>) -> anyhow::Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("spend") => Ok(Self::Spend),
            Some("impressions") => Ok(Self::Impressions),
            Some(_) => Err(anyhow::anyhow!(
                "roas_basis must be one of: spend, impressions"
            )),
        }
    }
}

impl Metrics {
    pub fn add(&mut self, other: &Metrics) {
        self.impressions += other.impressions;
        self.clicks += other.clicks;
        self.transactions += other.transactions;
        self.revenue += other.revenue;
        self.spend += other.spend;
    }

    /// Click-through rate as a percentage, 0 when nothing was delivered.
    pub fn ctr(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.clicks as f64 / self.impressions as f64 * 100.0
        }
    }

    /// Return on ad spend against the chosen basis, 0 when the denominator
    /// is zero.
    pub fn roas(&self, basis: RoasBasis) -> f64 {
        match basis {
            RoasBasis::Spend => {
                if self.spend == 0.0 {
                    0.0
                } else {
                    self.revenue / self.spend
                }
            }
            RoasBasis::Impressions => {
                if self.impressions == 0 {
                    0.0
                } else {
                    self.revenue / self.impressions as f64 * 1000.0
                }
            }
        }
    }
}

/// One campaign-day observation from the delivery feed. The raw order name is
/// the classification key; everything structured about the campaign is derived
/// from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub date: NaiveDate,
    pub campaign_name: String,
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// Structured attribution derived from a raw order name.
///
/// Empty strings mean "unresolved". Resolution never fails; unmatched names
/// degrade to an empty identity and aggregate under an unattributed bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub agency: String,
    pub agency_abbreviation: String,
    pub advertiser: String,
    pub is_test: bool,
}

/// Flight terms for one campaign, from an insertion order or derived from
/// observed delivery when no order was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub cpm: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impressions_goal: Option<i64>,
}
