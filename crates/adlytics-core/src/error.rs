use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid classification config: {0}")]
    Config(#[from] serde_json::Error),
}
