use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid group code: {0:?}")]
    InvalidGroupCode(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
