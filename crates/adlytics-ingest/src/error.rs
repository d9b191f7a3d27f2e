use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read csv input: {0}")]
    Read(#[from] csv::Error),
}
