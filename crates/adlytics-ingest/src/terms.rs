//! Insertion-order (contract terms) CSV parsing.

use std::io;

use adlytics_core::ContractTerms;
use serde::Deserialize;

use crate::coerce::{parse_delivery_date, to_count_opt, to_number};
use crate::error::IngestError;

#[derive(Debug, Clone, Deserialize)]
pub struct RawTermsRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "Budget", default)]
    pub budget: String,
    #[serde(rename = "CPM", default)]
    pub cpm: String,
    #[serde(rename = "Impressions Goal", default)]
    pub impressions_goal: String,
}

impl RawTermsRow {
    fn into_terms(self) -> Option<ContractTerms> {
        let start_date = parse_delivery_date(&self.start_date)?;
        let end_date = parse_delivery_date(&self.end_date)?;
        Some(ContractTerms {
            name: self.name,
            start_date,
            end_date,
            budget: to_number(&self.budget),
            cpm: to_number(&self.cpm),
            impressions_goal: to_count_opt(&self.impressions_goal),
        })
    }
}

/// Parse contract terms. Rows without both flight dates are skipped with a
/// warning; only an unreadable stream fails.
pub fn read_terms_csv<R: io::Read>(reader: R) -> Result<Vec<ContractTerms>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut terms = Vec::new();
    for (index, row) in csv_reader.deserialize::<RawTermsRow>().enumerate() {
        let line = index + 2;
        let raw = match row {
            Ok(raw) => raw,
            Err(error) if error.is_io_error() => return Err(error.into()),
            Err(error) => {
                tracing::warn!(line, %error, "Skipping malformed terms row");
                continue;
            }
        };
        let name = raw.name.clone();
        match raw.into_terms() {
            Some(parsed) => terms.push(parsed),
            None => {
                tracing::warn!(line, name = %name, "Skipping terms row without a flight window");
            }
        }
    }
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_terms_rows() {
        let input = "\
Name,Start Date,End Date,Budget,CPM,Impressions Goal
Acme Fall Push,9/1/2025,9/30/2025,\"$3,000.00\",$5.00,\"600,000\"
Acme Evergreen,2025-01-01,2025-12-31,\"$12,000.00\",$4.50,
";
        let terms = read_terms_csv(input.as_bytes()).expect("readable");
        assert_eq!(terms.len(), 2);

        let fall = &terms[0];
        assert_eq!(fall.name, "Acme Fall Push");
        assert_eq!(
            fall.start_date,
            NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid")
        );
        assert_eq!(
            fall.end_date,
            NaiveDate::from_ymd_opt(2025, 9, 30).expect("valid")
        );
        assert!((fall.budget - 3000.0).abs() < 1e-9);
        assert!((fall.cpm - 5.0).abs() < 1e-9);
        assert_eq!(fall.impressions_goal, Some(600_000));
        assert_eq!(terms[1].impressions_goal, None);
    }

    #[test]
    fn skips_rows_without_a_flight_window() {
        let input = "\
Name,Start Date,End Date,Budget,CPM
Acme Fall Push,TBD,9/30/2025,$3000,$5
Acme Evergreen,1/1/2025,12/31/2025,$12000,$4.50
";
        let terms = read_terms_csv(input.as_bytes()).expect("readable");
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].name, "Acme Evergreen");
    }

    #[test]
    fn goal_column_may_be_absent() {
        let input = "\
Name,Start Date,End Date,Budget,CPM
Acme Fall Push,9/1/2025,9/30/2025,$3000,$5
";
        let terms = read_terms_csv(input.as_bytes()).expect("readable");
        assert_eq!(terms[0].impressions_goal, None);
    }
}
