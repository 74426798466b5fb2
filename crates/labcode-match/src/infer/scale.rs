use std::collections::BTreeSet;

use labcode_model::{AttributeType, IssueKind, Record};

use super::{Finding, UnitClues, apply};
use crate::context::ValidationContext;

const SCALE_WEIGHT: f32 = 0.6;
const PROPERTY_WEIGHT: f32 = 0.7;

/// Scale from the presence of a unit or an interpretation marker, and
/// property from the unit.
pub(super) fn check(ctx: &ValidationContext, record: &mut Record, units: &UnitClues) {
    let scale = &ctx.config.scale;
    let interpretation = &ctx.patterns.interpretation;
    if interpretation.is_match(&record.raw_name) || interpretation.is_match(&record.raw_unit) {
        apply(
            ctx,
            record,
            Finding::new(
                IssueKind::Scale,
                AttributeType::Scale,
                vec![scale.narrative.clone()],
                SCALE_WEIGHT,
            ),
        );
        apply(
            ctx,
            record,
            Finding::new(
                IssueKind::Property,
                AttributeType::Property,
                vec![scale.narrative_property.clone()],
                SCALE_WEIGHT,
            ),
        );
        return;
    }

    if record.raw_unit.is_empty() {
        return;
    }
    apply(
        ctx,
        record,
        Finding::new(
            IssueKind::Scale,
            AttributeType::Scale,
            vec![scale.quantitative.clone()],
            SCALE_WEIGHT,
        ),
    );

    let mut properties = units.implied_properties.clone();
    if units.is_percentage {
        let allowed = ctx
            .percent_properties(record.class())
            .cloned()
            .unwrap_or_default();
        properties = properties
            .intersection(&allowed)
            .cloned()
            .collect::<BTreeSet<_>>();
    }
    if properties.is_empty() {
        return;
    }
    apply(
        ctx,
        record,
        Finding::new(
            IssueKind::Property,
            AttributeType::Property,
            properties.into_iter().collect(),
            PROPERTY_WEIGHT,
        ),
    );
}
