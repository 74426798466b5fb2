//! Error types for catalog and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading the catalog, unit table or configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse TOML configuration {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing column '{column}' in {path}")]
    MissingColumn { column: &'static str, path: PathBuf },

    #[error("duplicate catalog identifier '{id}' in {path}")]
    DuplicateEntry { id: String, path: PathBuf },

    #[error("catalog row {row} in {path} has no identifier")]
    MissingIdentifier { row: usize, path: PathBuf },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::CsvRead {
            path: path.into(),
            source,
        }
    }
}

/// Result type for standards loading operations.
pub type Result<T> = std::result::Result<T, StandardsError>;
