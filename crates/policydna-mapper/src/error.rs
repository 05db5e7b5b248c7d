use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapperError {
    #[error("invalid mapping rule pattern: {0}")]
    Pattern(#[from] regex::Error),
}
