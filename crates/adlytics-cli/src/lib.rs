pub mod classify;
pub mod export;
pub mod report;
