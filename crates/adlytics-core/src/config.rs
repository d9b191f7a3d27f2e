//! Classification configuration: the agency abbreviation table, literal
//! patches for known-malformed order names, and the special tokens the
//! pattern rules key off.
//!
//! Everything here is data, not logic. The built-in defaults cover the
//! current trafficking conventions; a deployment can load a JSON override
//! when agencies are added or renamed, without touching the rule cascade.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A hard patch for a known-malformed order name, matched by
/// case-insensitive substring before any pattern rule runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyOverride {
    pub contains: String,
    pub abbreviation: String,
    pub agency: String,
}

/// Same idea for the advertiser side. Needed mostly for advertisers whose
/// names contain hyphens, which the hyphen-split fallback would truncate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertiserOverride {
    pub contains: String,
    pub advertiser: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Abbreviation to full agency display name.
    pub agencies: BTreeMap<String, String>,
    pub agency_overrides: Vec<AgencyOverride>,
    pub advertiser_overrides: Vec<AdvertiserOverride>,
    /// Reseller abbreviation that shows up inside the numeric ID prefix of
    /// programmatically created orders, without the standard colon grammar.
    pub reseller_abbreviation: String,
    /// Orders created by the internal test seat carry this abbreviation.
    pub test_abbreviation: String,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        let agencies = [
            ("AA", "Atlas Ads"),
            ("BW", "Bluewater Media"),
            ("CG", "Catalyst Group"),
            ("CV", "Coastal Ventures"),
            ("DM", "Dockside Media"),
            ("EV", "Evergreen Digital"),
            ("FM", "Foundry Marketing"),
            ("GR", "Granite Reach"),
            ("HL", "Highline Agency"),
            ("IW", "Ironwood Media"),
            ("KP", "Kinetic Partners"),
            ("LS", "Lakeshore Studios"),
            ("MJ", "MediaJel Direct"),
            ("NB", "Northbound Media"),
            ("OD", "Outrider Digital"),
            ("PK", "Peak Media Group"),
            ("QA", "Internal QA"),
            ("RS", "Resonant Media"),
            ("SB", "Summit Brands"),
            ("TW", "Tidewater Media"),
            ("VH", "Vantage House"),
            ("WS", "Westgate Solutions"),
        ]
        .into_iter()
        .map(|(abbr, name)| (abbr.to_string(), name.to_string()))
        .collect();

        Self {
            agencies,
            agency_overrides: vec![AgencyOverride {
                contains: "Westgate Holiday Co-Op".to_string(),
                abbreviation: "WS".to_string(),
                agency: "Westgate Solutions".to_string(),
            }],
            advertiser_overrides: vec![AdvertiserOverride {
                contains: "Bar-B-Que Junction".to_string(),
                advertiser: "Bar-B-Que Junction".to_string(),
            }],
            reseller_abbreviation: "RS".to_string(),
            test_abbreviation: "QA".to_string(),
        }
    }
}

impl ClassifyConfig {
    pub fn from_json(data: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Display name for an abbreviation. Unknown abbreviations are used
    /// verbatim rather than treated as a failure.
    pub fn agency_name(&self, abbreviation: &str) -> String {
        self.agencies
            .get(abbreviation)
            .cloned()
            .unwrap_or_else(|| abbreviation.to_string())
    }
}
