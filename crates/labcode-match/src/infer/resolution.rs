use labcode_model::{AttributeType, IssueKind, MappingIssue, Record};

use super::{Finding, UnitClues, apply, flag, marker_suffix};
use crate::context::ValidationContext;
use crate::utils::strip_suffix_ignore_case;

const WEIGHT: f32 = 1.0;

/// The magnification marker of the raw unit must agree with the one carried
/// by the assigned method (or, failing that, the entry's example units).
///
/// A mismatch is always flagged. METHOD is replaced when the corrected
/// method exists in the catalog and skipped during matching otherwise.
pub(super) fn check(ctx: &ValidationContext, record: &mut Record, units: &UnitClues) {
    if record.raw_unit.is_empty() {
        return;
    }
    let markers = &ctx.config.resolution.markers;
    let method = record.attribute(AttributeType::Method).to_string();
    let method_marker = marker_suffix(&method, markers);
    let mapped_marker = method_marker.clone().or_else(|| {
        ctx.catalog.get(&record.assigned_code).and_then(|entry| {
            entry
                .example_units
                .iter()
                .find_map(|unit| marker_suffix(unit, markers))
        })
    });

    let raw_marker = units.marker.as_deref();
    if raw_marker == mapped_marker.as_deref() {
        return;
    }

    let replacement = match (method_marker.as_deref(), raw_marker) {
        (Some(old), Some(new)) => {
            strip_suffix_ignore_case(&method, old).map(|stem| format!("{stem}{new}"))
        }
        (Some(old), None) => strip_suffix_ignore_case(&method, old)
            .map(|stem| stem.trim_end_matches('.').to_string()),
        (None, Some(new)) if !method.is_empty() => Some(format!("{method}.{new}")),
        _ => None,
    }
    .filter(|candidate| ctx.catalog.contains_value(AttributeType::Method, candidate));

    match replacement {
        Some(candidate) => {
            apply(
                ctx,
                record,
                Finding::new(
                    IssueKind::ResolutionMarker,
                    AttributeType::Method,
                    vec![candidate],
                    WEIGHT,
                )
                .inferred()
                .strict(),
            );
        }
        None => {
            record.inferred.skip(AttributeType::Method);
            let detail = format!(
                "{} != {}",
                raw_marker.unwrap_or("(none)"),
                mapped_marker.as_deref().unwrap_or("(none)")
            );
            flag(
                record,
                MappingIssue::new(IssueKind::ResolutionMarker, AttributeType::Method, detail, WEIGHT),
            );
        }
    }
}
