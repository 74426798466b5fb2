//! Target profiles: the attribute values a replacement entry must carry.
//!
//! For each attribute type the target takes the inferred values when any
//! exist, otherwise the assigned value; either is expanded through the
//! synonym classes. An absent assigned value becomes [`TargetSlot::Absent`].

use std::collections::{BTreeMap, BTreeSet};

use labcode_model::{AttributeType, Record};

use crate::context::ValidationContext;
use crate::extract::RecordContext;
use crate::index::Constraints;

/// Types that drive the coarse candidate filter.
pub const FILTER_TYPES: [AttributeType; 4] = [
    AttributeType::Property,
    AttributeType::Time,
    AttributeType::System,
    AttributeType::Scale,
];

static SKIP: TargetSlot = TargetSlot::Skip;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSlot {
    /// Matching ignores this attribute.
    Skip,
    /// The candidate must not carry a value.
    Absent,
    /// The candidate's value must be one of these.
    Values(BTreeSet<String>),
}

impl TargetSlot {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            TargetSlot::Skip => true,
            TargetSlot::Absent => value.trim().is_empty(),
            TargetSlot::Values(values) => values.contains(value.trim()),
        }
    }

    pub fn values(&self) -> Option<&BTreeSet<String>> {
        match self {
            TargetSlot::Values(values) => Some(values),
            _ => None,
        }
    }

    fn render(&self) -> String {
        match self {
            TargetSlot::Skip => "*".to_string(),
            TargetSlot::Absent => "-".to_string(),
            TargetSlot::Values(values) => values.iter().cloned().collect::<Vec<_>>().join("|"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProfile {
    slots: BTreeMap<AttributeType, TargetSlot>,
    system_waived: bool,
}

impl TargetProfile {
    pub fn build(ctx: &ValidationContext, record: &Record) -> Self {
        let mut slots = BTreeMap::new();
        for attribute in AttributeType::ALL {
            let slot = if record.inferred.is_skipped(attribute) {
                TargetSlot::Skip
            } else if record.inferred.contains(attribute) {
                TargetSlot::Values(ctx.synonyms.expand_all(
                    attribute,
                    record
                        .inferred
                        .get(attribute)
                        .iter()
                        .map(|inferred| inferred.value.as_str()),
                ))
            } else {
                let assigned = record.attribute(attribute);
                if assigned.is_empty() {
                    TargetSlot::Absent
                } else {
                    TargetSlot::Values(ctx.synonyms.expand(attribute, assigned))
                }
            };
            slots.insert(attribute, slot);
        }

        let system_waived = ctx.is_unspecified_system(record.attribute(AttributeType::System))
            && !record.inferred.contains(AttributeType::System);
        if system_waived {
            slots.insert(AttributeType::System, TargetSlot::Skip);
        }
        Self {
            slots,
            system_waived,
        }
    }

    pub fn slot(&self, attribute: AttributeType) -> &TargetSlot {
        self.slots.get(&attribute).unwrap_or(&SKIP)
    }

    pub fn accepts(&self, attribute: AttributeType, value: &str) -> bool {
        self.slot(attribute).accepts(value)
    }

    /// SYSTEM was skipped because the assigned entry used the unspecified
    /// sentinel and nothing better was inferred.
    pub fn system_waived(&self) -> bool {
        self.system_waived
    }

    /// Whether the PROPERTY target includes any of `properties`.
    pub fn property_in(&self, properties: &[String]) -> bool {
        self.slot(AttributeType::Property)
            .values()
            .is_some_and(|values| properties.iter().any(|property| values.contains(property)))
    }

    /// Index constraints for the coarse candidate filter.
    ///
    /// SYSTEM always admits the unspecified sentinel; urine and CSF requests
    /// also admit the matching mixed-specimen sentinels.
    pub fn constraints(&self, ctx: &ValidationContext) -> Constraints {
        let mut constraints = Constraints::new();
        for attribute in FILTER_TYPES {
            let values = match self.slot(attribute) {
                TargetSlot::Skip => None,
                TargetSlot::Absent => Some(vec![String::new()]),
                TargetSlot::Values(values) => Some(values.iter().cloned().collect::<Vec<_>>()),
            };
            let values = match (attribute, values) {
                (AttributeType::System, Some(mut values)) => {
                    values.push(ctx.config.specimen.unspecified.clone());
                    values.extend(self.mixed_systems(ctx));
                    Some(values)
                }
                (_, values) => values,
            };
            constraints.insert(attribute, values);
        }
        constraints
    }

    /// Mixed-specimen sentinels containing a requested urine or CSF
    /// equivalent, in configured order.
    pub fn mixed_systems(&self, ctx: &ValidationContext) -> Vec<String> {
        let specimen = &ctx.config.specimen;
        let Some(requested) = self.slot(AttributeType::System).values() else {
            return Vec::new();
        };
        let mut mixed = Vec::new();
        for family in [&specimen.urine_equivalents, &specimen.csf_equivalents] {
            if !ctx.synonyms.overlaps(AttributeType::System, requested, family) {
                continue;
            }
            for sentinel in &specimen.mixed {
                let admitted = family.iter().any(|member| sentinel.contains(member.as_str()));
                if admitted && !mixed.contains(sentinel) {
                    mixed.push(sentinel.clone());
                }
            }
        }
        mixed
    }

    /// `COMPONENT=Glucose; PROPERTY=MCnc; SYSTEM=Urine; ...`, with `*` for a
    /// skipped and `-` for an absent attribute.
    pub fn render(&self) -> String {
        AttributeType::ALL
            .iter()
            .map(|attribute| format!("{attribute}={}", self.slot(*attribute).render()))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Specimens the record itself points at: clues from the raw specimen
/// hint, the hint text, and the class default.
#[derive(Debug, Clone, Default)]
pub struct SpecimenHints {
    values: BTreeSet<String>,
}

impl SpecimenHints {
    pub fn collect(ctx: &ValidationContext, record: &Record) -> Self {
        let mut values = BTreeSet::new();
        let hint = record.specimen_hint.trim();
        if !hint.is_empty() {
            values.insert(hint.to_string());
            let context = RecordContext::new(record.class());
            values.extend(ctx.rules.values_for(hint, &context, AttributeType::System));
        }
        if let Some(default) = ctx.class_default_specimen(record.class()) {
            values.insert(default.to_string());
        }
        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn compatible(&self, ctx: &ValidationContext, system: &str) -> bool {
        !system.trim().is_empty()
            && ctx
                .synonyms
                .overlaps(AttributeType::System, [system], &self.values)
    }
}

#[cfg(test)]
mod tests {
    use labcode_model::{CatalogEntry, RecordInput};
    use labcode_standards::{EngineConfig, TableUnitNormalizer};

    use super::*;
    use crate::index::Catalog;

    fn context(entry: CatalogEntry) -> ValidationContext {
        let mut config = EngineConfig::default();
        config.specimen.mixed = vec!["Urine+Ser/Plas".to_string(), "Ser+CSF".to_string()];
        ValidationContext::new(
            Catalog::new([entry]),
            config,
            Box::new(TableUnitNormalizer::new()),
        )
        .unwrap()
    }

    fn urine_protein(system: &str) -> CatalogEntry {
        CatalogEntry::new("1", "CHEM")
            .with_attribute(AttributeType::Component, "Protein")
            .with_attribute(AttributeType::Property, "MCnc")
            .with_attribute(AttributeType::Time, "Pt")
            .with_attribute(AttributeType::System, system)
            .with_attribute(AttributeType::Scale, "Qn")
    }

    #[test]
    fn urine_request_admits_urine_mixed_sentinels() {
        let ctx = context(urine_protein("Urine"));
        let record = Record::from_input(&RecordInput::new("1", "PROTEIN", ""), ctx.catalog.get("1"));
        let target = TargetProfile::build(&ctx, &record);

        let constraints = target.constraints(&ctx);
        let systems = constraints[&AttributeType::System].clone().unwrap();
        assert_eq!(systems, vec!["Urine", "XXX", "Urine+Ser/Plas"]);
        assert_eq!(constraints[&AttributeType::Time], Some(vec!["Pt".to_string()]));
        assert!(!constraints.contains_key(&AttributeType::Component));
    }

    #[test]
    fn unspecified_system_is_skipped_and_rendered() {
        let ctx = context(urine_protein("XXX"));
        let record = Record::from_input(&RecordInput::new("1", "PROTEIN", ""), ctx.catalog.get("1"));
        let target = TargetProfile::build(&ctx, &record);

        assert!(target.system_waived());
        assert_eq!(target.constraints(&ctx)[&AttributeType::System], None);
        assert_eq!(
            target.render(),
            "COMPONENT=Protein; PROPERTY=MCnc; TIME=Pt; SYSTEM=*; SCALE=Qn; METHOD=-; CLASS=CHEM"
        );
    }
}
