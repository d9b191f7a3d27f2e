//! Memoized classification results.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::rules::AgencyMatch;

/// A partially or fully resolved order name.
///
/// The agency and advertiser cascades run and memoize independently, so an
/// entry may hold one side before the other has ever been asked for.
/// Merging never overwrites a side that is already present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedIdentity {
    pub agency: Option<AgencyMatch>,
    pub advertiser: Option<String>,
}

/// Key-value store keyed by the exact raw order name. Pure memoization:
/// dropping every entry must never change a resolver output, only the cost
/// of recomputing it.
#[derive(Debug, Default)]
pub struct ClassificationCache {
    entries: Mutex<HashMap<String, CachedIdentity>>,
}

impl ClassificationCache {
    pub fn get(&self, order_name: &str) -> Option<CachedIdentity> {
        self.lock().get(order_name).cloned()
    }

    pub fn agency(&self, order_name: &str) -> Option<AgencyMatch> {
        self.lock().get(order_name).and_then(|e| e.agency.clone())
    }

    pub fn advertiser(&self, order_name: &str) -> Option<String> {
        self.lock().get(order_name).and_then(|e| e.advertiser.clone())
    }

    pub fn merge_agency(&self, order_name: &str, resolved: AgencyMatch) {
        let mut entries = self.lock();
        let entry = entries.entry(order_name.to_string()).or_default();
        if entry.agency.is_none() {
            entry.agency = Some(resolved);
        }
    }

    pub fn merge_advertiser(&self, order_name: &str, advertiser: String) {
        let mut entries = self.lock();
        let entry = entries.entry(order_name.to_string()).or_default();
        if entry.advertiser.is_none() {
            entry.advertiser = Some(advertiser);
        }
    }

    /// Drop every entry. The only invalidation point; used when rule tables
    /// are swapped out.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedIdentity>> {
        self.entries.lock().expect("classification cache mutex poisoned")
    }
}
