//! Delivery-feed CSV parsing.
//!
//! The feed is one row per campaign per day, plus a trailing `"Totals"`
//! summary row that is dropped on ingest. Row-level problems (malformed
//! fields, unparsable dates) skip the row and are counted; only an
//! unreadable underlying stream fails the whole pass.

use std::io;

use adlytics_core::{DeliveryRecord, Metrics};
use serde::Deserialize;

use crate::coerce::{parse_delivery_date, to_count, to_number};
use crate::error::IngestError;

/// One feed row exactly as exported, before coercion.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDeliveryRow {
    #[serde(rename = "DATE")]
    pub date: String,
    #[serde(rename = "CAMPAIGN ORDER NAME")]
    pub campaign_name: String,
    #[serde(rename = "IMPRESSIONS", default)]
    pub impressions: String,
    #[serde(rename = "CLICKS", default)]
    pub clicks: String,
    #[serde(rename = "TRANSACTIONS", default)]
    pub transactions: String,
    #[serde(rename = "REVENUE", default)]
    pub revenue: String,
    #[serde(rename = "SPEND", default)]
    pub spend: String,
}

impl RawDeliveryRow {
    fn into_record(self) -> Option<DeliveryRecord> {
        let date = parse_delivery_date(&self.date)?;
        Some(DeliveryRecord {
            date,
            campaign_name: self.campaign_name,
            metrics: Metrics {
                impressions: to_count(&self.impressions),
                clicks: to_count(&self.clicks),
                transactions: to_count(&self.transactions),
                revenue: to_number(&self.revenue),
                spend: to_number(&self.spend),
            },
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct IngestSummary {
    pub records: Vec<DeliveryRecord>,
    pub skipped_rows: usize,
}

/// Parse the whole feed from `reader`. Never fails on row content; an
/// `Err` means the input itself could not be read.
pub fn read_delivery_csv<R: io::Read>(reader: R) -> Result<IngestSummary, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut summary = IngestSummary::default();
    for (index, row) in csv_reader.deserialize::<RawDeliveryRow>().enumerate() {
        // Header occupies line 1.
        let line = index + 2;
        let raw = match row {
            Ok(raw) => raw,
            Err(error) if error.is_io_error() => return Err(error.into()),
            Err(error) => {
                tracing::warn!(line, %error, "Skipping malformed delivery row");
                summary.skipped_rows += 1;
                continue;
            }
        };
        match raw.into_record() {
            Some(record) => summary.records.push(record),
            None => {
                tracing::debug!(line, "Skipping delivery row without a usable date");
                summary.skipped_rows += 1;
            }
        }
    }

    tracing::debug!(
        rows = summary.records.len(),
        skipped = summary.skipped_rows,
        "Parsed delivery csv"
    );
    Ok(summary)
}
