//! Ordered pattern rules for order-name classification.
//!
//! Trafficked order names follow a loose grammar that has drifted over the
//! years, e.g.:
//!
//! ```text
//! 2001567: MJ: Acme-Fall-250901
//! 2001567/2001568: MJ: Acme-Fall-250901
//! Awaiting IO: GR: Harvest Farms-Spring
//! 104577 RS 2201: Acme-Display
//! ```
//!
//! Each cascade is a flat, ordered list of named rules evaluated
//! first-match-wins, so a rule can be tested in isolation and reordering is
//! a data change rather than a control-flow rewrite. The agency and
//! advertiser cascades are independent: they parse the same string but
//! neither consults the other's result.

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::ClassifyConfig;
use crate::error::CoreError;

/// Resolved agency side of an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgencyMatch {
    pub abbreviation: String,
    pub agency: String,
}

enum Matcher {
    /// Case-insensitive substring.
    Contains(String),
    Pattern(Regex),
    /// Matches every input; used by the terminal fallback.
    Any,
}

enum AgencyExtract {
    /// Fixed pair carried by the rule itself (overrides, reseller token).
    Fixed { abbreviation: String, agency: String },
    /// Abbreviation from this capture group, display name via the table.
    Capture(usize),
}

enum AdvertiserExtract {
    Fixed(String),
    Capture(usize),
    /// Text before the first hyphen, after any colon-delimited prefix.
    HyphenSplit,
}

pub struct AgencyRule {
    name: &'static str,
    matcher: Matcher,
    extract: AgencyExtract,
}

pub struct AdvertiserRule {
    name: &'static str,
    matcher: Matcher,
    extract: AdvertiserExtract,
}

impl AgencyRule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply this one rule. `agencies` maps abbreviations to display names;
    /// unknown abbreviations pass through verbatim.
    pub fn apply(
        &self,
        order_name: &str,
        agencies: &BTreeMap<String, String>,
    ) -> Option<AgencyMatch> {
        match (&self.matcher, &self.extract) {
            (Matcher::Contains(needle), AgencyExtract::Fixed { abbreviation, agency }) => {
                if order_name.to_lowercase().contains(needle) {
                    Some(AgencyMatch {
                        abbreviation: abbreviation.clone(),
                        agency: agency.clone(),
                    })
                } else {
                    None
                }
            }
            (Matcher::Pattern(re), AgencyExtract::Fixed { abbreviation, agency }) => {
                if re.is_match(order_name) {
                    Some(AgencyMatch {
                        abbreviation: abbreviation.clone(),
                        agency: agency.clone(),
                    })
                } else {
                    None
                }
            }
            (Matcher::Pattern(re), AgencyExtract::Capture(group)) => {
                let caps = re.captures(order_name)?;
                let abbreviation = caps.get(*group)?.as_str().trim();
                if abbreviation.is_empty() {
                    return None;
                }
                let agency = agencies
                    .get(abbreviation)
                    .cloned()
                    .unwrap_or_else(|| abbreviation.to_string());
                Some(AgencyMatch {
                    abbreviation: abbreviation.to_string(),
                    agency,
                })
            }
            _ => None,
        }
    }
}

impl AdvertiserRule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, order_name: &str) -> Option<String> {
        match (&self.matcher, &self.extract) {
            (Matcher::Contains(needle), AdvertiserExtract::Fixed(advertiser)) => {
                if order_name.to_lowercase().contains(needle) {
                    Some(advertiser.clone())
                } else {
                    None
                }
            }
            (Matcher::Pattern(re), AdvertiserExtract::Capture(group)) => {
                let caps = re.captures(order_name)?;
                let advertiser = caps.get(*group)?.as_str().trim();
                if advertiser.is_empty() {
                    None
                } else {
                    Some(advertiser.to_string())
                }
            }
            (Matcher::Any, AdvertiserExtract::HyphenSplit) => {
                let head = order_name.split('-').next().unwrap_or("");
                let segment = head.rsplit(':').next().unwrap_or("").trim();
                if segment.is_empty() {
                    None
                } else {
                    Some(segment.to_string())
                }
            }
            _ => None,
        }
    }
}

/// Compiled agency and advertiser cascades for one configuration.
pub struct RuleSet {
    agencies: BTreeMap<String, String>,
    agency_rules: Vec<AgencyRule>,
    advertiser_rules: Vec<AdvertiserRule>,
}

impl RuleSet {
    pub fn compile(cfg: &ClassifyConfig) -> Result<Self, CoreError> {
        let mut agency_rules = Vec::new();

        for o in &cfg.agency_overrides {
            agency_rules.push(AgencyRule {
                name: "literal-override",
                matcher: Matcher::Contains(o.contains.to_lowercase()),
                extract: AgencyExtract::Fixed {
                    abbreviation: o.abbreviation.clone(),
                    agency: o.agency.clone(),
                },
            });
        }
        agency_rules.push(AgencyRule {
            name: "awaiting-io",
            matcher: Matcher::Pattern(Regex::new(r"^Awaiting IO:\s*([A-Za-z0-9&]+)\s*:")?),
            extract: AgencyExtract::Capture(1),
        });
        // Orders trafficked through the reseller seat embed its token in the
        // numeric ID prefix instead of using the colon grammar.
        let token = regex::escape(&cfg.reseller_abbreviation);
        agency_rules.push(AgencyRule {
            name: "reseller-id-prefix",
            matcher: Matcher::Pattern(Regex::new(&format!(r"^\d[^:]*\b{token}\b"))?),
            extract: AgencyExtract::Fixed {
                abbreviation: cfg.reseller_abbreviation.clone(),
                agency: cfg.agency_name(&cfg.reseller_abbreviation),
            },
        });
        agency_rules.push(AgencyRule {
            name: "dual-id",
            matcher: Matcher::Pattern(Regex::new(r"^\d+\s*/\s*\d+:\s*([A-Za-z0-9&]+)\s*:")?),
            extract: AgencyExtract::Capture(1),
        });
        agency_rules.push(AgencyRule {
            name: "id-spaced",
            matcher: Matcher::Pattern(Regex::new(r"^\d+:\s+([A-Za-z0-9&]+)\s*:")?),
            extract: AgencyExtract::Capture(1),
        });
        agency_rules.push(AgencyRule {
            name: "id-tight",
            matcher: Matcher::Pattern(Regex::new(r"^\d+:([A-Za-z0-9&]+)\s*:")?),
            extract: AgencyExtract::Capture(1),
        });
        agency_rules.push(AgencyRule {
            name: "before-colon",
            matcher: Matcher::Pattern(Regex::new(r"^([^:]+):")?),
            extract: AgencyExtract::Capture(1),
        });

        let mut advertiser_rules = Vec::new();

        for o in &cfg.advertiser_overrides {
            advertiser_rules.push(AdvertiserRule {
                name: "literal-override",
                matcher: Matcher::Contains(o.contains.to_lowercase()),
                extract: AdvertiserExtract::Fixed(o.advertiser.clone()),
            });
        }
        advertiser_rules.push(AdvertiserRule {
            name: "awaiting-io",
            matcher: Matcher::Pattern(Regex::new(
                r"^Awaiting IO:\s*[A-Za-z0-9&]+\s*:\s*([^-]+)",
            )?),
            extract: AdvertiserExtract::Capture(1),
        });
        advertiser_rules.push(AdvertiserRule {
            name: "id-spaced",
            matcher: Matcher::Pattern(Regex::new(
                r"^\d+(?:\s*/\s*\d+)?:\s+[A-Za-z0-9&]+\s*:\s*([^-]+)",
            )?),
            extract: AdvertiserExtract::Capture(1),
        });
        advertiser_rules.push(AdvertiserRule {
            name: "id-tight",
            matcher: Matcher::Pattern(Regex::new(
                r"^\d+(?:\s*/\s*\d+)?:[A-Za-z0-9&]+\s*:\s*([^-]+)",
            )?),
            extract: AdvertiserExtract::Capture(1),
        });
        if !cfg.agencies.is_empty() {
            let alternation = cfg
                .agencies
                .keys()
                .map(|abbr| regex::escape(abbr))
                .collect::<Vec<_>>()
                .join("|");
            advertiser_rules.push(AdvertiserRule {
                name: "abbreviation-prefix",
                matcher: Matcher::Pattern(Regex::new(&format!(
                    r"^(?:{alternation})\s*:\s*([^-]+)"
                ))?),
                extract: AdvertiserExtract::Capture(1),
            });
        }
        advertiser_rules.push(AdvertiserRule {
            name: "hyphen-split",
            matcher: Matcher::Any,
            extract: AdvertiserExtract::HyphenSplit,
        });

        Ok(Self {
            agencies: cfg.agencies.clone(),
            agency_rules,
            advertiser_rules,
        })
    }

    /// First agency rule that matches, in cascade order.
    pub fn agency(&self, order_name: &str) -> Option<(&'static str, AgencyMatch)> {
        self.agency_rules
            .iter()
            .find_map(|rule| rule.apply(order_name, &self.agencies).map(|m| (rule.name, m)))
    }

    /// First advertiser rule that matches, in cascade order.
    pub fn advertiser(&self, order_name: &str) -> Option<(&'static str, String)> {
        self.advertiser_rules
            .iter()
            .find_map(|rule| rule.apply(order_name).map(|a| (rule.name, a)))
    }

    pub fn agency_rules(&self) -> &[AgencyRule] {
        &self.agency_rules
    }

    pub fn advertiser_rules(&self) -> &[AdvertiserRule] {
        &self.advertiser_rules
    }
}
