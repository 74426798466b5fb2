//! Component equivalence heuristics.
//!
//! Each heuristic decides whether a candidate component may stand in for a
//! target component that differs only by a conventional qualifier. They are
//! tried in order and the first one that applies names the relaxation.

use crate::utils::{contains_ignore_case, strip_suffix_ignore_case};

/// What the heuristics may consult about the record.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicInput<'a> {
    pub raw_name: &'a str,
    pub unit_is_percentage: bool,
    pub cell_ratio_target: bool,
    pub activity_ratio_target: bool,
}

pub struct ComponentHeuristic {
    pub tag: &'static str,
    pub applies: fn(&HeuristicInput<'_>, &str, &str) -> bool,
}

pub const COMPONENT_HEURISTICS: [ComponentHeuristic; 6] = [
    ComponentHeuristic {
        tag: "COMPONENT-denominator-added",
        applies: denominator_added,
    },
    ComponentHeuristic {
        tag: "COMPONENT-denominator-added-crystals-dropped",
        applies: crystals_dropped,
    },
    ComponentHeuristic {
        tag: "COMPONENT-per-100-leukocytes-dropped",
        applies: per_100_leukocytes_dropped,
    },
    ComponentHeuristic {
        tag: "COMPONENT-actual-normal-dropped",
        applies: actual_normal_dropped,
    },
    ComponentHeuristic {
        tag: "COMPONENT-fragments-dropped",
        applies: fragments_dropped,
    },
    ComponentHeuristic {
        tag: "COMPONENT-nucleated-dropped",
        applies: nucleated_dropped,
    },
];

/// The first heuristic under which `candidate` stands in for any target.
pub fn relax_component<'t>(
    input: &HeuristicInput<'_>,
    targets: impl IntoIterator<Item = &'t String> + Clone,
    candidate: &str,
) -> Option<&'static str> {
    COMPONENT_HEURISTICS.iter().find_map(|heuristic| {
        targets
            .clone()
            .into_iter()
            .any(|target| (heuristic.applies)(input, target, candidate))
            .then_some(heuristic.tag)
    })
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() < prefix.len() || !text.is_char_boundary(prefix.len()) {
        return None;
    }
    let (head, tail) = text.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix).then_some(tail)
}

/// `target` extended by a `/denominator` gives `candidate`.
fn adds_denominator(target: &str, candidate: &str) -> bool {
    !target.is_empty()
        && !target.contains('/')
        && strip_prefix_ignore_case(candidate, target)
            .is_some_and(|rest| rest.len() > 1 && rest.starts_with('/'))
}

fn denominator_added(input: &HeuristicInput<'_>, target: &str, candidate: &str) -> bool {
    input.unit_is_percentage && adds_denominator(target, candidate)
}

fn crystals_dropped(input: &HeuristicInput<'_>, target: &str, candidate: &str) -> bool {
    if !input.unit_is_percentage || contains_ignore_case(input.raw_name, "crystal") {
        return false;
    }
    strip_suffix_ignore_case(target, " crystals")
        .is_some_and(|stem| adds_denominator(stem, candidate))
}

/// Equal once `qualifier` is removed from whichever side carries it, with at
/// least one side carrying it.
fn equal_without(target: &str, candidate: &str, qualifier: &str) -> bool {
    let target_stem = strip_suffix_ignore_case(target, qualifier);
    let candidate_stem = strip_suffix_ignore_case(candidate, qualifier);
    if target_stem.is_none() && candidate_stem.is_none() {
        return false;
    }
    let left = target_stem.unwrap_or(target).trim();
    let right = candidate_stem.unwrap_or(candidate).trim();
    !left.is_empty() && left.eq_ignore_ascii_case(right)
}

fn per_100_leukocytes_dropped(input: &HeuristicInput<'_>, target: &str, candidate: &str) -> bool {
    input.cell_ratio_target && equal_without(target, candidate, "/100 leukocytes")
}

fn actual_normal_dropped(input: &HeuristicInput<'_>, target: &str, candidate: &str) -> bool {
    input.activity_ratio_target && equal_without(target, candidate, " actual/Normal")
}

fn fragments_dropped(input: &HeuristicInput<'_>, target: &str, candidate: &str) -> bool {
    !contains_ignore_case(input.raw_name, "fragment")
        && (equal_without(target, candidate, ".fragments")
            || equal_without(target, candidate, " fragments"))
}

fn nucleated_dropped(input: &HeuristicInput<'_>, target: &str, candidate: &str) -> bool {
    !contains_ignore_case(input.raw_name, "nucleated") && equal_without(target, candidate, ".nucleated")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(raw_name: &str, percent: bool) -> HeuristicInput<'_> {
        HeuristicInput {
            raw_name,
            unit_is_percentage: percent,
            cell_ratio_target: true,
            activity_ratio_target: false,
        }
    }

    fn relax(input: &HeuristicInput<'_>, target: &str, candidate: &str) -> Option<&'static str> {
        let targets = [target.to_string()];
        relax_component(input, &targets, candidate)
    }

    #[test]
    fn percentage_allows_added_denominator() {
        let percent = input("NEUTROPHILS %", true);
        assert_eq!(
            relax(&percent, "Neutrophils", "Neutrophils/100 leukocytes"),
            Some("COMPONENT-denominator-added")
        );
        let count = input("NEUTROPHILS", false);
        assert_eq!(relax(&count, "Neutrophils", "Neutrophils/Leukocytes"), None);
    }

    #[test]
    fn crystals_dropped_only_when_name_lacks_the_word() {
        assert_eq!(
            relax(&input("URATE %", true), "Urate crystals", "Urate/Total"),
            Some("COMPONENT-denominator-added-crystals-dropped")
        );
        assert_eq!(
            relax(&input("URATE CRYSTALS %", true), "Urate crystals", "Urate/Total"),
            None
        );
    }

    #[test]
    fn ordered_heuristics_pick_the_first_tag() {
        let name = input("LYMPHS", false);
        assert_eq!(
            relax(&name, "Lymphocytes/100 leukocytes", "Lymphocytes"),
            Some("COMPONENT-per-100-leukocytes-dropped")
        );
        assert_eq!(
            relax(&name, "Erythrocytes", "Erythrocytes.nucleated"),
            Some("COMPONENT-nucleated-dropped")
        );
        assert_eq!(relax(&name, "Glucose", "Fructose"), None);
    }
}
