use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("period length must be at least 1 day, got {0}")]
    InvalidPeriodLength(i64),
    #[error("flight end {end} is before flight start {start}")]
    InvalidFlight { start: NaiveDate, end: NaiveDate },
}
