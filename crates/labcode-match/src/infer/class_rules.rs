use labcode_model::{AttributeType, IssueKind, Record};

use super::{Finding, UnitClues, apply};
use crate::context::ValidationContext;
use crate::utils::strip_suffix_ignore_case;

const CREATININE_WEIGHT: f32 = 0.9;
const FIELD_COUNT_WEIGHT: f32 = 0.8;
const CELL_MARKER_WEIGHT: f32 = 0.8;

fn propose(
    ctx: &ValidationContext,
    record: &mut Record,
    kind: IssueKind,
    attribute: AttributeType,
    value: String,
    weight: f32,
) {
    if ctx.catalog.contains_value(attribute, &value) {
        apply(
            ctx,
            record,
            Finding::new(kind, attribute, vec![value], weight).inferred(),
        );
    }
}

/// A creatinine denominator in the unit or name calls for a `/Creatinine`
/// component and a ratio property; its absence calls for neither.
pub(super) fn check_creatinine_ratio(ctx: &ValidationContext, record: &mut Record, units: &UnitClues) {
    let rules = &ctx.config.class_rules;
    let component = record.attribute(AttributeType::Component).to_string();
    if component.is_empty() {
        return;
    }
    let in_unit = units
        .forms
        .iter()
        .any(|form| ctx.patterns.creatinine_unit.is_match(form));
    let in_name = ctx.patterns.creatinine_name.is_match(&record.raw_name);
    let stem = strip_suffix_ignore_case(&component, &rules.creatinine_suffix);

    match stem {
        None if in_unit || in_name => {
            let property = if units.implied_properties.contains(&rules.molar_ratio_property)
                || units.mentions_mol()
            {
                &rules.molar_ratio_property
            } else {
                &rules.mass_ratio_property
            };
            propose(
                ctx,
                record,
                IssueKind::CreatinineRatio,
                AttributeType::Component,
                format!("{component}{}", rules.creatinine_suffix),
                CREATININE_WEIGHT,
            );
            propose(
                ctx,
                record,
                IssueKind::CreatinineRatio,
                AttributeType::Property,
                property.clone(),
                CREATININE_WEIGHT,
            );
        }
        Some(stem) if !in_unit && !in_name && !record.raw_unit.is_empty() => {
            propose(
                ctx,
                record,
                IssueKind::CreatinineRatio,
                AttributeType::Component,
                stem.to_string(),
                CREATININE_WEIGHT,
            );
        }
        _ => {}
    }
}

/// A per-field unit implies the arbitrary-count-per-area property.
pub(super) fn check_field_count(ctx: &ValidationContext, record: &mut Record, units: &UnitClues) {
    if units.marker.is_none() {
        return;
    }
    propose(
        ctx,
        record,
        IssueKind::FieldCount,
        AttributeType::Property,
        ctx.config.class_rules.field_count_property.clone(),
        FIELD_COUNT_WEIGHT,
    );
}

/// Cell-marker panels: a percentage is a fraction per 100 cells, a count
/// unit is a number concentration without the per-100 qualifier.
pub(super) fn check_cell_marker(ctx: &ValidationContext, record: &mut Record, units: &UnitClues) {
    let rules = &ctx.config.class_rules;
    let class = record.class();
    if !rules
        .cell_marker_classes
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(class))
        || !ctx.patterns.cell_marker.is_match(&record.raw_name)
    {
        return;
    }
    let component = record.attribute(AttributeType::Component).to_string();
    if component.is_empty() {
        return;
    }
    let stem = strip_suffix_ignore_case(&component, &rules.per_100_cells_suffix);

    if units.is_percentage {
        propose(
            ctx,
            record,
            IssueKind::CellMarker,
            AttributeType::Property,
            rules.cell_fraction_property.clone(),
            CELL_MARKER_WEIGHT,
        );
        if stem.is_none() {
            propose(
                ctx,
                record,
                IssueKind::CellMarker,
                AttributeType::Component,
                format!("{component}{}", rules.per_100_cells_suffix),
                CELL_MARKER_WEIGHT,
            );
        }
    } else if units.implied_properties.contains(&rules.cell_count_property) {
        propose(
            ctx,
            record,
            IssueKind::CellMarker,
            AttributeType::Property,
            rules.cell_count_property.clone(),
            CELL_MARKER_WEIGHT,
        );
        if let Some(stem) = stem {
            propose(
                ctx,
                record,
                IssueKind::CellMarker,
                AttributeType::Component,
                stem.to_string(),
                CELL_MARKER_WEIGHT,
            );
        }
    }
}
