//! `adlytics classify` output: each unique order name with its resolved
//! identity.

use std::collections::BTreeSet;
use std::io;

use adlytics_core::{Classifier, DeliveryRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedName {
    pub campaign_name: String,
    pub agency: String,
    pub agency_abbreviation: String,
    pub advertiser: String,
    pub is_test: bool,
}

/// Resolve every distinct order name in `records`, sorted by name.
pub fn unique_identities(
    records: &[DeliveryRecord],
    classifier: &Classifier,
) -> Vec<ClassifiedName> {
    let names: BTreeSet<&str> = records.iter().map(|r| r.campaign_name.as_str()).collect();
    names
        .into_iter()
        .map(|name| {
            let identity = classifier.resolve(name);
            ClassifiedName {
                campaign_name: name.to_string(),
                agency: identity.agency,
                agency_abbreviation: identity.agency_abbreviation,
                advertiser: identity.advertiser,
                is_test: identity.is_test,
            }
        })
        .collect()
}

pub fn write_csv<W: io::Write>(names: &[ClassifiedName], writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for name in names {
        csv_writer.serialize(name)?;
    }
    csv_writer.flush()?;
    Ok(())
}
