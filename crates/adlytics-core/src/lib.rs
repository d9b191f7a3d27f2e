pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod record;
pub mod rules;

pub use cache::ClassificationCache;
pub use classify::{partition_test, Classifier};
pub use config::ClassifyConfig;
pub use error::CoreError;
pub use record::{ContractTerms, DeliveryRecord, Identity, Metrics, RoasBasis};
pub use rules::{AgencyMatch, RuleSet};
