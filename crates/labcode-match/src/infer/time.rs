use labcode_model::{AttributeType, IssueKind, Record};

use super::{Finding, apply};
use crate::context::ValidationContext;
use crate::extract::RecordContext;
use crate::utils::strip_suffix_ignore_case;

const WEIGHT: f32 = 0.8;
const PROPERTY_WEIGHT: f32 = 0.7;

/// Duration or point-in-time clues from the unit (then the name), and the
/// concentration/rate property swap that follows from them.
pub(super) fn check(ctx: &ValidationContext, record: &mut Record) {
    let class = record.class().to_string();
    let context = RecordContext::new(&class);
    let mut values = ctx
        .rules
        .values_for(&record.raw_unit, &context, AttributeType::Time);
    if values.is_empty() {
        values = ctx
            .rules
            .values_for(&record.raw_name, &context, AttributeType::Time);
    }
    if values.is_empty() {
        return;
    }

    let time = &ctx.config.time;
    let is_point = |value: &String| {
        ctx.synonyms
            .compatible(AttributeType::Time, value, &time.point_in_time)
    };
    let has_duration = values.iter().any(|value| !is_point(value));
    let has_point = values.iter().any(is_point);

    apply(
        ctx,
        record,
        Finding::new(IssueKind::Time, AttributeType::Time, values, WEIGHT),
    );

    let property = record.attribute(AttributeType::Property);
    let swapped = if has_duration {
        strip_suffix_ignore_case(property, &time.concentration_suffix)
            .map(|stem| format!("{stem}{}", time.rate_suffix))
    } else if has_point {
        strip_suffix_ignore_case(property, &time.rate_suffix)
            .map(|stem| format!("{stem}{}", time.concentration_suffix))
    } else {
        None
    };
    if let Some(swapped) = swapped
        && !swapped.is_empty()
        && ctx.catalog.contains_value(AttributeType::Property, &swapped)
    {
        apply(
            ctx,
            record,
            Finding::new(
                IssueKind::TimeProperty,
                AttributeType::Property,
                vec![swapped],
                PROPERTY_WEIGHT,
            )
            .inferred(),
        );
    }
}
