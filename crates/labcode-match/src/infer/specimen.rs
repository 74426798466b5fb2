use labcode_model::{AttributeType, IssueKind, Record};

use super::{Finding, apply};
use crate::context::ValidationContext;
use crate::extract::RecordContext;

const WEIGHT: f32 = 0.9;

/// Specimen words in the raw name, or the class shorthand default when the
/// name carries none.
pub(super) fn check(ctx: &ValidationContext, record: &mut Record) {
    let class = record.class().to_string();
    let context = RecordContext::new(&class);
    let parsed = ctx
        .rules
        .values_for(&record.raw_name, &context, AttributeType::System);

    let finding = if parsed.is_empty() {
        let system = record.attribute(AttributeType::System);
        let Some(shorthand) = ctx.config.specimen.shorthands.iter().find(|shorthand| {
            shorthand.class.eq_ignore_ascii_case(&class)
                && shorthand.when_system.eq_ignore_ascii_case(system)
        }) else {
            return;
        };
        Finding::new(
            IssueKind::Specimen,
            AttributeType::System,
            vec![shorthand.default.clone()],
            WEIGHT,
        )
        .inferred()
    } else {
        Finding::new(IssueKind::Specimen, AttributeType::System, parsed, WEIGHT)
    };
    apply(ctx, record, finding);
}
