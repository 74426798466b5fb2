#![deny(unsafe_code)]

pub mod context;
pub mod error;
pub mod extract;
pub mod index;
pub mod infer;
pub mod matcher;
pub mod pipeline;
pub mod score;
pub mod synonyms;
pub mod target;
mod utils;

pub use crate::context::ValidationContext;
pub use crate::error::{ConfigError, Result};
pub use crate::extract::{
    ClassFilter, Clue, ExtractionRule, RecordContext, RuleMatcher, RuleSelector, RuleSet,
    run_extractors,
};
pub use crate::index::{Catalog, Constraints};
pub use crate::infer::run_inference;
pub use crate::matcher::{CandidateMatcher, MatchOutcome, PartMatch};
pub use crate::pipeline::{Validator, judgment_counts};
pub use crate::score::{ScoreBreakdown, Scorer};
pub use crate::synonyms::SynonymResolver;
pub use crate::target::{SpecimenHints, TargetProfile, TargetSlot};
