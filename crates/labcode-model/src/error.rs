use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown attribute type: {0}")]
    UnknownAttributeType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
