pub mod error;
pub mod forecast;
pub mod gapfill;
pub mod pacing;
pub mod rolling;
pub mod rollup;

pub use error::AggregateError;
pub use forecast::{daily_spend, project_month_end, project_month_end_as_of, ForecastResult, TrailingRate};
pub use gapfill::{date_span, fill_gaps, GapFilledPoint};
pub use pacing::{derive_terms, pacing, PacingResult};
pub use rolling::{compare_adjacent, percent_change, rolling_periods, PeriodComparison, RollingPeriod};
pub use rollup::{rollup, Bucket, BucketBy, GroupBy, TimeKey, UNATTRIBUTED};
