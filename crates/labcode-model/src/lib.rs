#![deny(unsafe_code)]

pub mod attribute;
pub mod catalog;
pub mod error;
pub mod issue;
pub mod judgment;
pub mod output;
pub mod record;

pub use attribute::{AttributeProfile, AttributeType};
pub use catalog::{CatalogEntry, EntryStatus};
pub use error::{ModelError, Result};
pub use issue::{IssueKind, MappingIssue};
pub use judgment::Judgment;
pub use output::RecordOutput;
pub use record::{
    InferredAttributes, InferredValue, Origin, Record, RecordInput, SuggestedEntry, Suggestion,
};
