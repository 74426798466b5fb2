//! Candidate matching against a target profile.
//!
//! A candidate matches when every attribute type is either accepted by the
//! target or relaxed at the current level:
//!
//! | level | relaxation                                   |
//! |-------|----------------------------------------------|
//! | > 0   | empty METHOD accepted (`METHOD-empty-ok`)     |
//! | > 1   | METHOD waived (`METHOD-match-waived`)         |
//! | > 2   | CLASS waived (`CLASS-match-waived`)           |
//!
//! COMPONENT and SYSTEM relaxations apply at every level. A urine or CSF
//! request accepts the configured mixed-specimen sentinels containing it
//! (`matched-mixed-specimen`). When the only mismatches are METHOD and/or
//! CLASS (at most two), matching retries one level up, until level
//! [`MAX_LEVEL`].

pub mod component;

use std::collections::BTreeSet;

use labcode_model::{AttributeType, CatalogEntry, Record};
use tracing::{debug, trace};

use crate::context::ValidationContext;
use crate::target::{SpecimenHints, TargetProfile, TargetSlot};
use crate::utils::is_percentage;

pub use component::{COMPONENT_HEURISTICS, ComponentHeuristic, HeuristicInput, relax_component};

pub const MAX_LEVEL: u8 = 3;
const MAX_ESCALATABLE_MISMATCHES: usize = 2;

pub const METHOD_EMPTY_OK: &str = "METHOD-empty-ok";
pub const METHOD_MATCH_WAIVED: &str = "METHOD-match-waived";
pub const CLASS_MATCH_WAIVED: &str = "CLASS-match-waived";
pub const DEFAULT_SPECIMEN: &str = "matched-with-default-specimen";
pub const UNSPECIFIED_SPECIMEN_WAIVED: &str = "specimen-xxx-match-waived";
pub const MIXED_SPECIMEN: &str = "matched-mixed-specimen";

/// Outcome of matching one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartMatch {
    Exact,
    Relaxed(&'static str),
    Mismatch,
}

/// One attribute-by-attribute pass at a fixed level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelMatch {
    pub relaxations: Vec<&'static str>,
    pub mismatches: Vec<AttributeType>,
}

/// An accepted candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub id: String,
    /// Level the candidate was finally accepted at.
    pub level: u8,
    pub relaxations: Vec<&'static str>,
}

pub struct CandidateMatcher<'a> {
    ctx: &'a ValidationContext,
    record: &'a Record,
    target: &'a TargetProfile,
    specimens: SpecimenHints,
    mixed_systems: Vec<String>,
    heuristics: HeuristicInput<'a>,
}

impl<'a> CandidateMatcher<'a> {
    pub fn new(ctx: &'a ValidationContext, record: &'a Record, target: &'a TargetProfile) -> Self {
        let matching = &ctx.config.matching;
        Self {
            ctx,
            record,
            target,
            specimens: SpecimenHints::collect(ctx, record),
            mixed_systems: target.mixed_systems(ctx),
            heuristics: HeuristicInput {
                raw_name: &record.raw_name,
                unit_is_percentage: is_percentage(&record.raw_unit),
                cell_ratio_target: target.property_in(&matching.cell_ratio_properties),
                activity_ratio_target: target.property_in(&matching.activity_ratio_properties),
            },
        }
    }

    pub fn specimens(&self) -> &SpecimenHints {
        &self.specimens
    }

    /// Ids passing the coarse filter, the assigned entry excluded.
    pub fn candidates(&self) -> BTreeSet<String> {
        let mut ids = self
            .ctx
            .catalog
            .select_by_constraints(&self.target.constraints(self.ctx));
        ids.remove(&self.record.assigned_code);
        ids
    }

    pub fn match_part(&self, attribute: AttributeType, candidate: &CatalogEntry, level: u8) -> PartMatch {
        let value = candidate.attribute(attribute);
        if self.target.accepts(attribute, value) {
            return PartMatch::Exact;
        }
        let relaxed = match attribute {
            AttributeType::Method if level > 0 && value.is_empty() => Some(METHOD_EMPTY_OK),
            AttributeType::Method if level > 1 => Some(METHOD_MATCH_WAIVED),
            AttributeType::Class if level > 2 => Some(CLASS_MATCH_WAIVED),
            AttributeType::Component => match self.target.slot(attribute) {
                TargetSlot::Values(targets) => relax_component(&self.heuristics, targets, value),
                _ => None,
            },
            AttributeType::System => {
                if self.specimens.compatible(self.ctx, value) {
                    Some(DEFAULT_SPECIMEN)
                } else if self.ctx.is_unspecified_system(value) {
                    Some(UNSPECIFIED_SPECIMEN_WAIVED)
                } else if self.mixed_systems.iter().any(|mixed| mixed == value.trim()) {
                    Some(MIXED_SPECIMEN)
                } else {
                    None
                }
            }
            _ => None,
        };
        relaxed.map_or(PartMatch::Mismatch, PartMatch::Relaxed)
    }

    pub fn match_at_level(&self, candidate: &CatalogEntry, level: u8) -> LevelMatch {
        let mut result = LevelMatch::default();
        for attribute in AttributeType::ALL {
            match self.match_part(attribute, candidate, level) {
                PartMatch::Exact => {}
                PartMatch::Relaxed(tag) => result.relaxations.push(tag),
                PartMatch::Mismatch => result.mismatches.push(attribute),
            }
        }
        result
    }

    /// Matches starting at `level`, escalating while only METHOD/CLASS fail.
    pub fn is_match(&self, candidate: &CatalogEntry, level: u8) -> Option<MatchOutcome> {
        let mut level = level.min(MAX_LEVEL);
        loop {
            let pass = self.match_at_level(candidate, level);
            if pass.mismatches.is_empty() {
                return Some(MatchOutcome {
                    id: candidate.id.clone(),
                    level,
                    relaxations: pass.relaxations,
                });
            }
            let escalatable = pass.mismatches.len() <= MAX_ESCALATABLE_MISMATCHES
                && pass
                    .mismatches
                    .iter()
                    .all(|attribute| matches!(attribute, AttributeType::Method | AttributeType::Class));
            if !escalatable || level >= MAX_LEVEL {
                trace!(candidate = %candidate.id, level, mismatches = ?pass.mismatches, "rejected");
                return None;
            }
            debug!(candidate = %candidate.id, level, mismatches = ?pass.mismatches, "escalating");
            level += 1;
        }
    }

    /// Every coarse-filtered candidate accepted from level 0, in id order.
    pub fn find_matches(&self) -> Vec<MatchOutcome> {
        self.candidates()
            .iter()
            .filter_map(|id| self.ctx.catalog.get(id))
            .filter_map(|entry| self.is_match(entry, 0))
            .collect()
    }
}
