use labcode_model::{AttributeType, IssueKind, Record};

use super::{Finding, apply};
use crate::context::ValidationContext;
use crate::utils::{contains_word, strip_suffix_ignore_case};

const WEIGHT: f32 = 0.8;

/// Component qualifiers such as `.free` or `^peak`: the qualifier must be on
/// the component exactly when its word is in the raw name.
pub(super) fn check_modifiers(ctx: &ValidationContext, record: &mut Record) {
    for modifier in &ctx.patterns.modifiers {
        let component = record.attribute(AttributeType::Component);
        if component.is_empty() {
            return;
        }
        let suffix = modifier.suffix();
        let in_name = modifier.word.is_match(&record.raw_name);
        let stripped = strip_suffix_ignore_case(component, &suffix);

        let candidate = match (in_name, stripped) {
            (true, None) => format!("{component}{suffix}"),
            (false, Some(stem)) if modifier.config.bidirectional => stem.to_string(),
            _ => continue,
        };
        if ctx.catalog.contains_value(AttributeType::Component, &candidate) {
            apply(
                ctx,
                record,
                Finding::new(
                    IssueKind::ComponentModifier,
                    AttributeType::Component,
                    vec![candidate],
                    WEIGHT,
                )
                .inferred(),
            );
        }
    }
}

/// Immunoglobulin subtype tokens in the raw name must match the subtype
/// suffix of an antibody component.
pub(super) fn check_antibody_subtype(ctx: &ValidationContext, record: &mut Record) {
    let antibody = &ctx.config.antibody;
    let component = record.attribute(AttributeType::Component);
    if !contains_word(component, &antibody.marker) {
        return;
    }

    let named: Vec<&str> = ctx
        .patterns
        .antibody_tokens
        .iter()
        .filter(|(_, word)| word.is_match(&record.raw_name))
        .map(|(token, _)| token.as_str())
        .collect();

    let (stem, current) = split_subtype(component, &antibody.connector, &antibody.tokens);
    let joined = named.join("+");
    let candidate = match (named.is_empty(), current) {
        (false, Some(current)) if !current.eq_ignore_ascii_case(&joined) => {
            format!("{stem}{}{joined}", antibody.connector)
        }
        (false, None) => format!("{component}{}{joined}", antibody.connector),
        (true, Some(_)) => stem.to_string(),
        _ => return,
    };
    if ctx.catalog.contains_value(AttributeType::Component, &candidate) {
        apply(
            ctx,
            record,
            Finding::new(
                IssueKind::AntibodySubtype,
                AttributeType::Component,
                vec![candidate],
                WEIGHT,
            )
            .inferred(),
        );
    }
}

/// Splits `Rubella virus Ab.IgG+IgM` into the stem and the `+`-joined
/// subtype tail, when the tail consists only of known tokens.
fn split_subtype<'a>(
    component: &'a str,
    connector: &str,
    tokens: &[String],
) -> (&'a str, Option<&'a str>) {
    let Some((stem, tail)) = component.rsplit_once(connector) else {
        return (component, None);
    };
    let known = !tail.is_empty()
        && tail
            .split('+')
            .all(|part| tokens.iter().any(|token| token.eq_ignore_ascii_case(part.trim())));
    if known {
        (stem, Some(tail))
    } else {
        (component, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<String> {
        ["IgA", "IgG", "IgM"].iter().map(ToString::to_string).collect()
    }

    #[test]
    fn splits_known_subtype_tail() {
        assert_eq!(
            split_subtype("Rubella virus Ab.IgG+IgM", ".", &tokens()),
            ("Rubella virus Ab", Some("IgG+IgM"))
        );
        assert_eq!(
            split_subtype("Hepatitis B virus core Ab", ".", &tokens()),
            ("Hepatitis B virus core Ab", None)
        );
        assert_eq!(
            split_subtype("Thyroperoxidase Ab.panel", ".", &tokens()),
            ("Thyroperoxidase Ab.panel", None)
        );
    }
}
