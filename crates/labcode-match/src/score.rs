//! Best-match selection.
//!
//! Every accepted candidate gets a score:
//!
//! ```text
//! base
//!   - relaxation_penalty * relaxations^relaxation_exponent
//!   - deprecated/discouraged penalty
//!   + unspecified_system_bonus   (SYSTEM waived and candidate fits the specimen hints)
//!   + unit_match_bonus           (raw unit listed among the example units)
//!   + exact_match_bonus          (no relaxation at all)
//! ```
//!
//! Candidates are stably sorted by descending score (ties keep id order),
//! de-duplicated by id, and the head becomes the suggestion.

use std::collections::HashSet;

use labcode_model::{AttributeType, CatalogEntry, EntryStatus, Record, SuggestedEntry, Suggestion};
use tracing::trace;

use crate::context::ValidationContext;
use crate::matcher::MatchOutcome;
use crate::target::{SpecimenHints, TargetProfile};

/// Score components for one candidate, kept for debug logging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub relaxation_penalty: f64,
    pub status_penalty: f64,
    pub system_bonus: f64,
    pub unit_bonus: f64,
    pub exact_bonus: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base - self.relaxation_penalty - self.status_penalty
            + self.system_bonus
            + self.unit_bonus
            + self.exact_bonus
    }
}

pub struct Scorer<'a> {
    ctx: &'a ValidationContext,
    record: &'a Record,
    target: &'a TargetProfile,
    specimens: &'a SpecimenHints,
}

impl<'a> Scorer<'a> {
    pub fn new(
        ctx: &'a ValidationContext,
        record: &'a Record,
        target: &'a TargetProfile,
        specimens: &'a SpecimenHints,
    ) -> Self {
        Self {
            ctx,
            record,
            target,
            specimens,
        }
    }

    pub fn breakdown(&self, entry: &CatalogEntry, relaxations: usize) -> ScoreBreakdown {
        let weights = &self.ctx.config.scoring;
        let relaxation_penalty = if relaxations == 0 {
            0.0
        } else {
            weights.relaxation_penalty * (relaxations as f64).powf(weights.relaxation_exponent)
        };
        let status_penalty = match entry.status {
            EntryStatus::Deprecated => weights.deprecated_penalty,
            EntryStatus::Discouraged => weights.discouraged_penalty,
            EntryStatus::Active | EntryStatus::Other => 0.0,
        };
        let system = entry.attribute(AttributeType::System);
        let system_bonus = if self.target.system_waived() && self.specimens.compatible(self.ctx, system)
        {
            weights.unspecified_system_bonus
        } else {
            0.0
        };
        let unit = self.record.raw_unit.trim();
        let unit_bonus = if !unit.is_empty() && entry.example_units.iter().any(|example| example == unit) {
            weights.unit_match_bonus
        } else {
            0.0
        };
        let exact_bonus = if relaxations == 0 {
            weights.exact_match_bonus
        } else {
            0.0
        };
        ScoreBreakdown {
            base: weights.base,
            relaxation_penalty,
            status_penalty,
            system_bonus,
            unit_bonus,
            exact_bonus,
        }
    }

    pub fn score(&self, entry: &CatalogEntry, relaxations: usize) -> f64 {
        self.breakdown(entry, relaxations).total()
    }

    /// Scores, orders and caps the accepted candidates. `None` when nothing
    /// was accepted.
    pub fn select(&self, accepted: Vec<MatchOutcome>) -> Option<Suggestion> {
        let mut scored: Vec<SuggestedEntry> = accepted
            .into_iter()
            .filter_map(|outcome| {
                let entry = self.ctx.catalog.get(&outcome.id)?;
                let breakdown = self.breakdown(entry, outcome.relaxations.len());
                trace!(candidate = %entry.id, ?breakdown, "scored candidate");
                Some(SuggestedEntry {
                    id: entry.id.clone(),
                    display_name: entry.display_name.clone(),
                    score: breakdown.total(),
                    relaxations: outcome.relaxations.iter().map(ToString::to_string).collect(),
                })
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut seen = HashSet::new();
        scored.retain(|entry| seen.insert(entry.id.clone()));

        let mut ranked = scored.into_iter();
        let primary = ranked.next()?;
        let alternates = ranked.take(self.ctx.config.scoring.max_alternates).collect();
        Some(Suggestion {
            primary,
            alternates,
        })
    }
}

#[cfg(test)]
mod tests {
    use labcode_model::RecordInput;
    use labcode_standards::{EngineConfig, TableUnitNormalizer};

    use super::*;
    use crate::index::Catalog;

    fn entry(id: &str, status: EntryStatus) -> CatalogEntry {
        CatalogEntry::new(id, "CHEM")
            .with_attribute(AttributeType::Component, "Glucose")
            .with_attribute(AttributeType::Property, "MCnc")
            .with_attribute(AttributeType::System, "Urine")
            .with_status(status)
    }

    fn context() -> ValidationContext {
        let mut config = EngineConfig::default();
        config.scoring.max_alternates = 2;
        ValidationContext::new(
            Catalog::new([
                entry("A", EntryStatus::Active),
                entry("B", EntryStatus::Active),
                entry("C", EntryStatus::Discouraged),
                entry("D", EntryStatus::Deprecated),
                entry("E", EntryStatus::Active),
            ]),
            config,
            Box::new(TableUnitNormalizer::new()),
        )
        .unwrap()
    }

    fn outcome(id: &str, relaxations: Vec<&'static str>) -> MatchOutcome {
        MatchOutcome {
            id: id.to_string(),
            level: 0,
            relaxations,
        }
    }

    #[test]
    fn status_penalties_follow_the_weights() {
        let ctx = context();
        let record = Record::from_input(&RecordInput::new("A", "GLUCOSE", ""), ctx.catalog.get("A"));
        let target = TargetProfile::build(&ctx, &record);
        let specimens = SpecimenHints::collect(&ctx, &record);
        let scorer = Scorer::new(&ctx, &record, &target, &specimens);

        let discouraged = scorer.breakdown(ctx.catalog.get("C").unwrap(), 0);
        assert_eq!(discouraged.status_penalty, 10.0);
        assert_eq!(discouraged.total(), 90.0);
        assert_eq!(scorer.score(ctx.catalog.get("D").unwrap(), 0), 80.0);
        assert_eq!(scorer.score(ctx.catalog.get("E").unwrap(), 1), 25.0);
    }

    #[test]
    fn select_orders_dedupes_and_caps_alternates() {
        let ctx = context();
        let record = Record::from_input(&RecordInput::new("A", "GLUCOSE", ""), ctx.catalog.get("A"));
        let target = TargetProfile::build(&ctx, &record);
        let specimens = SpecimenHints::collect(&ctx, &record);
        let scorer = Scorer::new(&ctx, &record, &target, &specimens);

        let suggestion = scorer
            .select(vec![
                outcome("B", vec!["METHOD-empty-ok"]),
                outcome("B", vec![]),
                outcome("C", vec![]),
                outcome("D", vec![]),
                outcome("E", vec!["METHOD-empty-ok"]),
            ])
            .unwrap();

        assert_eq!(suggestion.primary.id, "B");
        assert_eq!(suggestion.primary.score, 100.0);
        assert!(suggestion.primary.relaxations.is_empty());
        let alternates: Vec<&str> = suggestion.alternates.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(alternates, vec!["C", "D"]);
        for alternate in &suggestion.alternates {
            assert!(alternate.score <= suggestion.primary.score);
        }
    }

    #[test]
    fn nothing_accepted_means_no_suggestion() {
        let ctx = context();
        let record = Record::from_input(&RecordInput::new("A", "GLUCOSE", ""), ctx.catalog.get("A"));
        let target = TargetProfile::build(&ctx, &record);
        let specimens = SpecimenHints::collect(&ctx, &record);

        assert!(Scorer::new(&ctx, &record, &target, &specimens).select(Vec::new()).is_none());
    }
}
