//! Order-name identity resolution.

use tracing::debug;

use crate::cache::ClassificationCache;
use crate::config::ClassifyConfig;
use crate::error::CoreError;
use crate::record::{DeliveryRecord, Identity};
use crate::rules::{AgencyMatch, RuleSet};

/// Resolves raw order names into structured identities, memoizing every
/// result. Identity is a pure function of the name for a given
/// configuration; the cache only saves recomputation.
pub struct Classifier {
    cfg: ClassifyConfig,
    rules: RuleSet,
    cache: ClassificationCache,
}

impl Classifier {
    pub fn new(cfg: ClassifyConfig) -> Result<Self, CoreError> {
        let rules = RuleSet::compile(&cfg)?;
        Ok(Self {
            cfg,
            rules,
            cache: ClassificationCache::default(),
        })
    }

    pub fn with_defaults() -> Result<Self, CoreError> {
        Self::new(ClassifyConfig::default())
    }

    /// Full identity for an order name. Never fails; unmatched names come
    /// back with empty fields.
    pub fn resolve(&self, order_name: &str) -> Identity {
        let agency = self.resolve_agency(order_name);
        let advertiser = self.resolve_advertiser(order_name);
        let is_test = self.is_test_campaign(order_name);
        Identity {
            agency: agency.agency,
            agency_abbreviation: agency.abbreviation,
            advertiser,
            is_test,
        }
    }

    /// Agency side only, memoized.
    pub fn resolve_agency(&self, order_name: &str) -> AgencyMatch {
        if let Some(hit) = self.cache.agency(order_name) {
            return hit;
        }
        let resolved = match self.rules.agency(order_name) {
            Some((rule, m)) => {
                debug!(order_name, rule, abbreviation = %m.abbreviation, "agency resolved");
                m
            }
            None => {
                debug!(order_name, "order name matched no agency rule");
                AgencyMatch::default()
            }
        };
        self.cache.merge_agency(order_name, resolved.clone());
        resolved
    }

    /// Advertiser side only, memoized. Does not consult the agency cascade.
    pub fn resolve_advertiser(&self, order_name: &str) -> String {
        if let Some(hit) = self.cache.advertiser(order_name) {
            return hit;
        }
        let resolved = match self.rules.advertiser(order_name) {
            Some((rule, advertiser)) => {
                debug!(order_name, rule, %advertiser, "advertiser resolved");
                advertiser
            }
            None => {
                debug!(order_name, "order name matched no advertiser rule");
                String::new()
            }
        };
        self.cache.merge_advertiser(order_name, resolved.clone());
        resolved
    }

    /// True for internal test, demo, and draft orders. Keyword hits are
    /// checked first; otherwise the order is a test exactly when the agency
    /// cascade resolves it to the reserved test abbreviation.
    pub fn is_test_campaign(&self, order_name: &str) -> bool {
        let lower = order_name.to_lowercase();
        if lower.contains("test") || lower.contains("demo") || lower.contains("draft") {
            return true;
        }
        self.resolve_agency(order_name).abbreviation == self.cfg.test_abbreviation
    }

    /// Forget every memoized result.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_names(&self) -> usize {
        self.cache.len()
    }

    pub fn config(&self) -> &ClassifyConfig {
        &self.cfg
    }
}

/// Split records into (production, test) using the classifier's test rules.
pub fn partition_test(
    records: Vec<DeliveryRecord>,
    classifier: &Classifier,
) -> (Vec<DeliveryRecord>, Vec<DeliveryRecord>) {
    records
        .into_iter()
        .partition(|r| !classifier.is_test_campaign(&r.campaign_name))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::record::Metrics;

    fn classifier() -> Classifier {
        Classifier::with_defaults().expect("default classifier")
    }

    #[test]
    fn resolves_standard_order_name() {
        let c = classifier();
        let id = c.resolve("2001567: MJ: Acme-Fall-250901");
        assert_eq!(id.agency, "MediaJel Direct");
        assert_eq!(id.agency_abbreviation, "MJ");
        assert_eq!(id.advertiser, "Acme");
        assert!(!id.is_test);
    }

    #[test]
    fn empty_name_resolves_to_empty_identity() {
        let c = classifier();
        assert_eq!(c.resolve(""), Identity::default());
    }

    #[test]
    fn unmatched_name_degrades_to_empty_agency() {
        let c = classifier();
        let id = c.resolve("Acme-Fall-250901");
        assert_eq!(id.agency, "");
        assert_eq!(id.agency_abbreviation, "");
        // The hyphen-split fallback still finds the advertiser.
        assert_eq!(id.advertiser, "Acme");
    }

    #[test]
    fn resolution_is_deterministic_across_cache_states() {
        let c = classifier();
        let name = "2001567: MJ: Acme-Fall-250901";

        let cold = c.resolve(name);
        let warm = c.resolve(name);
        assert_eq!(cold, warm);

        c.clear_cache();
        assert_eq!(c.cached_names(), 0);
        assert_eq!(c.resolve(name), cold);
    }

    #[test]
    fn call_order_does_not_change_results() {
        let name = "2001567: MJ: Acme-Fall-250901";

        let agency_first = classifier();
        let a1 = agency_first.resolve_agency(name);
        let adv1 = agency_first.resolve_advertiser(name);

        let advertiser_first = classifier();
        let adv2 = advertiser_first.resolve_advertiser(name);
        let a2 = advertiser_first.resolve_agency(name);

        assert_eq!(a1, a2);
        assert_eq!(adv1, adv2);
    }

    #[test]
    fn memoizes_each_unique_name_once() {
        let c = classifier();
        c.resolve("2001567: MJ: Acme-Fall");
        c.resolve("2001567: MJ: Acme-Fall");
        c.resolve("2001568: GR: Harvest-Spring");
        assert_eq!(c.cached_names(), 2);
    }

    #[test]
    fn test_markers_in_name() {
        let c = classifier();
        assert!(c.is_test_campaign("2001567: MJ: Acme-TEST-Fall"));
        assert!(c.is_test_campaign("Demo campaign for onboarding"));
        assert!(c.is_test_campaign("2001567: MJ: Acme-draft"));
        assert!(!c.is_test_campaign("2001567: MJ: Acme-Fall"));
    }

    #[test]
    fn test_abbreviation_flags_via_agency_cascade() {
        let c = classifier();
        // No keyword in the name; only the resolved abbreviation marks it.
        assert!(c.is_test_campaign("2001567: QA: Acme-Fall"));
        let id = c.resolve("2001567: QA: Acme-Fall");
        assert!(id.is_test);
        assert_eq!(id.agency, "Internal QA");
    }

    #[test]
    fn partition_test_splits_records() {
        let c = classifier();
        let rec = |name: &str| DeliveryRecord {
            date: NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid"),
            campaign_name: name.to_string(),
            metrics: Metrics::default(),
        };
        let records = vec![
            rec("2001567: MJ: Acme-Fall"),
            rec("2001568: MJ: Acme-TEST"),
            rec("2001569: QA: Acme-Fall"),
        ];
        let (production, test) = partition_test(records, &c);
        assert_eq!(production.len(), 1);
        assert_eq!(test.len(), 2);
        assert_eq!(production[0].campaign_name, "2001567: MJ: Acme-Fall");
    }
}
