//! Per-record driver: default judgment, inference, and replacement search.

use std::collections::BTreeMap;

use labcode_model::{Judgment, Record, RecordInput, RecordOutput};
use rayon::prelude::*;
use tracing::{debug, debug_span, info};

use crate::context::ValidationContext;
use crate::infer::run_inference;
use crate::matcher::CandidateMatcher;
use crate::score::Scorer;
use crate::target::TargetProfile;

/// Advances the record's judgment, logging edges the state machine refuses.
pub(crate) fn transition(record: &mut Record, next: Judgment) -> bool {
    let from = record.judgment;
    let moved = record.judgment.advance(next);
    if !moved && from != next {
        debug!(from = from.as_str(), to = next.as_str(), "judgment transition refused");
    }
    moved
}

pub struct Validator<'a> {
    ctx: &'a ValidationContext,
}

impl<'a> Validator<'a> {
    pub fn new(ctx: &'a ValidationContext) -> Self {
        Self { ctx }
    }

    /// Processes one record and returns its full working state.
    pub fn process(&self, input: &RecordInput) -> Record {
        let span = debug_span!("record", code = %input.assigned_code.trim());
        let _guard = span.enter();

        let assigned = self.ctx.catalog.get(&input.assigned_code);
        let mut record = Record::from_input(input, assigned);
        let next = self.default_judgment(&record, assigned.is_some());
        transition(&mut record, next);
        if record.judgment.is_excluded() {
            debug!(judgment = record.judgment.as_str(), "excluded");
            return record;
        }

        run_inference(self.ctx, &mut record);
        if record.judgment == Judgment::Incorrect {
            self.resolve(&mut record);
        }
        debug!(judgment = record.judgment.as_str(), issues = record.issues.len(), "processed");
        record
    }

    pub fn validate(&self, input: &RecordInput) -> RecordOutput {
        self.process(input).to_output()
    }

    /// Processes records in parallel on the current rayon pool. Output order
    /// follows input order.
    pub fn process_batch(&self, inputs: &[RecordInput]) -> Vec<Record> {
        let records: Vec<Record> = inputs.par_iter().map(|input| self.process(input)).collect();
        let counts = judgment_counts(&records);
        info!(
            records = records.len(),
            correct = counts.get(&Judgment::Correct).copied().unwrap_or(0),
            fixed = counts.get(&Judgment::Fixed).copied().unwrap_or(0),
            unresolved = counts.get(&Judgment::Unresolved).copied().unwrap_or(0),
            excluded = counts
                .iter()
                .filter(|(judgment, _)| judgment.is_excluded())
                .map(|(_, count)| count)
                .sum::<usize>(),
            "batch validated"
        );
        records
    }

    pub fn validate_batch(&self, inputs: &[RecordInput]) -> Vec<RecordOutput> {
        self.process_batch(inputs)
            .iter()
            .map(Record::to_output)
            .collect()
    }

    fn default_judgment(&self, record: &Record, known_code: bool) -> Judgment {
        let flag = &self.ctx.config.judgment.non_quantitative_flag;
        if !known_code {
            Judgment::ExcludedInvalidCode
        } else if !record.raw_name.chars().any(char::is_alphabetic) {
            Judgment::ExcludedNonTextualName
        } else if !flag.is_empty() && record.inclusion_category.eq_ignore_ascii_case(flag) {
            Judgment::ExcludedNonQuantitative
        } else {
            Judgment::Correct
        }
    }

    fn resolve(&self, record: &mut Record) {
        let target = TargetProfile::build(self.ctx, record);
        let suggestion = {
            let matcher = CandidateMatcher::new(self.ctx, record, &target);
            let accepted = matcher.find_matches();
            debug!(accepted = accepted.len(), "candidates accepted");
            Scorer::new(self.ctx, record, &target, matcher.specimens()).select(accepted)
        };
        record.target = Some(target.render());
        match suggestion {
            Some(suggestion) => {
                debug!(suggested = %suggestion.primary.id, score = suggestion.primary.score, "fixed");
                record.suggestion = Some(suggestion);
                transition(record, Judgment::Fixed);
            }
            None => {
                transition(record, Judgment::Unresolved);
            }
        }
    }
}

/// Records per judgment.
pub fn judgment_counts<'r>(records: impl IntoIterator<Item = &'r Record>) -> BTreeMap<Judgment, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.judgment).or_insert(0) += 1;
    }
    counts
}
