//! Attribute inference.
//!
//! Each check derives clues from the record's raw name, unit or specimen
//! hint and compares them with the assigned attributes. A disagreement
//! records the clue values as inferred attributes, raises a
//! [`MappingIssue`] and moves a `CORRECT` record to `INCORRECT`.
//!
//! Checks run in a fixed order: specimen, time, scale/property, resolution
//! marker, component modifiers, antibody subtype, then the class-specific
//! rules.

mod class_rules;
mod modifier;
mod resolution;
mod scale;
mod specimen;
mod time;

use std::collections::BTreeSet;

use labcode_model::{AttributeType, IssueKind, Judgment, MappingIssue, Origin, Record};
use labcode_standards::UnitContext;
use tracing::{debug, trace};

use crate::context::ValidationContext;
use crate::pipeline::transition;
use crate::utils::is_percentage;

/// Everything derived once from the raw unit.
#[derive(Debug, Clone, Default)]
pub(crate) struct UnitClues {
    /// The raw unit plus its canonical forms under every strictness level.
    pub forms: BTreeSet<String>,
    pub implied_properties: BTreeSet<String>,
    pub is_percentage: bool,
    /// Magnification marker carried by the unit, as configured (e.g. `HPF`).
    pub marker: Option<String>,
}

impl UnitClues {
    pub fn collect(ctx: &ValidationContext, raw_unit: &str) -> Self {
        let raw_unit = raw_unit.trim();
        if raw_unit.is_empty() {
            return Self::default();
        }
        let mut forms = BTreeSet::from([raw_unit.to_string()]);
        for context in UnitContext::ALL {
            forms.extend(ctx.units.normalize(raw_unit, context));
        }
        let mut implied_properties = BTreeSet::new();
        for form in &forms {
            implied_properties.extend(ctx.units.implied_properties(form));
        }
        let marker = forms
            .iter()
            .find_map(|form| marker_suffix(form, &ctx.config.resolution.markers));
        Self {
            is_percentage: forms.iter().any(|form| is_percentage(form)),
            forms,
            implied_properties,
            marker,
        }
    }

    pub fn mentions_mol(&self) -> bool {
        self.forms
            .iter()
            .any(|form| form.to_ascii_lowercase().contains("mol"))
    }
}

/// The magnification marker `text` ends with, ignoring a closing bracket.
pub(crate) fn marker_suffix(text: &str, markers: &[String]) -> Option<String> {
    let upper = text.trim().trim_end_matches(']').to_ascii_uppercase();
    markers.iter().find_map(|marker| {
        let marker_upper = marker.to_ascii_uppercase();
        let head = upper.strip_suffix(&marker_upper)?;
        let bounded = head
            .chars()
            .last()
            .is_none_or(|c| !c.is_ascii_alphanumeric());
        bounded.then(|| marker.clone())
    })
}

/// One comparison between clue values and an assigned attribute.
pub(crate) struct Finding {
    pub kind: IssueKind,
    pub attribute: AttributeType,
    pub values: Vec<String>,
    pub origin: Origin,
    pub weight: f32,
    /// An absent assigned value is filled in silently instead of flagged.
    pub lenient: bool,
}

impl Finding {
    pub fn new(kind: IssueKind, attribute: AttributeType, values: Vec<String>, weight: f32) -> Self {
        Self {
            kind,
            attribute,
            values,
            origin: Origin::Parsed,
            weight,
            lenient: true,
        }
    }

    pub fn inferred(mut self) -> Self {
        self.origin = Origin::Inferred;
        self
    }

    pub fn strict(mut self) -> Self {
        self.lenient = false;
        self
    }
}

/// Compares clue values with the assigned attribute. Returns whether a
/// disagreement was flagged.
pub(crate) fn apply(ctx: &ValidationContext, record: &mut Record, finding: Finding) -> bool {
    let attribute = finding.attribute;
    let values: Vec<String> = finding
        .values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| {
            ctx.catalog
                .canonical_value(attribute, value)
                .unwrap_or(value)
                .to_string()
        })
        .collect();
    if values.is_empty() {
        return false;
    }
    let current = record.attribute(attribute).to_string();
    if !current.is_empty() && ctx.synonyms.overlaps(attribute, &values, [&current]) {
        trace!(%attribute, "clue consistent with assigned value");
        return false;
    }
    for value in &values {
        record.infer(attribute, value, finding.origin);
    }
    if current.is_empty() && finding.lenient {
        return false;
    }
    let shown = if current.is_empty() { "(none)" } else { current.as_str() };
    let detail = format!("{} != {shown}", values.join(","));
    flag(record, MappingIssue::new(finding.kind, attribute, detail, finding.weight))
}

/// Raises an issue and marks a correct record as incorrect.
pub(crate) fn flag(record: &mut Record, issue: MappingIssue) -> bool {
    debug!(issue = %issue, "mapping issue");
    let raised = record.raise(issue);
    transition(record, Judgment::Incorrect);
    raised
}

/// Runs every inference check against a non-excluded record.
pub fn run_inference(ctx: &ValidationContext, record: &mut Record) {
    let units = UnitClues::collect(ctx, &record.raw_unit);
    specimen::check(ctx, record);
    time::check(ctx, record);
    scale::check(ctx, record, &units);
    resolution::check(ctx, record, &units);
    modifier::check_modifiers(ctx, record);
    modifier::check_antibody_subtype(ctx, record);
    class_rules::check_creatinine_ratio(ctx, record, &units);
    class_rules::check_field_count(ctx, record, &units);
    class_rules::check_cell_marker(ctx, record, &units);
}
