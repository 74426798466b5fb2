#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod embedded;
pub mod error;
pub mod hash;
pub mod units;

pub use crate::catalog::{LoadedCatalog, load_catalog, parse_catalog};
pub use crate::config::{
    AntibodyConfig, ClassRulesConfig, EngineConfig, ExtractionRuleConfig, JudgmentConfig,
    MatchingConfig, ModifierConfig, ResolutionConfig, ScaleConfig, ScoreWeights,
    SpecimenConfig, SpecimenShorthand, SynonymClassConfig, TimeConfig,
};
pub use crate::error::{Result, StandardsError};
pub use crate::units::{TableUnitNormalizer, UnitContext, UnitNormalizer};
