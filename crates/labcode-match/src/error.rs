//! Configuration errors raised while compiling the engine context.
//!
//! All of these are fatal: they are reported before any record is processed.

use labcode_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("extraction rule #{index} ({attribute}) has no pattern, literals or value to derive one from")]
    MalformedExtractionRule { index: usize, attribute: String },

    #[error("extraction rule #{index} declares both inclusive and exclusive class filters")]
    ConflictingClassFilter { index: usize },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown attribute type '{0}' in configuration")]
    UnknownAttributeType(String),
}

impl From<ModelError> for ConfigError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::UnknownAttributeType(name) => ConfigError::UnknownAttributeType(name),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
