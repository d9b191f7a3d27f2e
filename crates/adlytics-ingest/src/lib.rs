pub mod coerce;
pub mod delivery;
pub mod error;
pub mod terms;

pub use coerce::{parse_delivery_date, to_count, to_number};
pub use delivery::{read_delivery_csv, IngestSummary, RawDeliveryRow};
pub use error::IngestError;
pub use terms::{read_terms_csv, RawTermsRow};
