//! Records under validation.
//!
//! A [`RecordInput`] is what the caller hands in; a [`Record`] is the working
//! state the engine mutates during a single forward pass (judgment, issues,
//! inferred attributes, suggestion). [`Record::to_output`] flattens it back
//! to strings.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeProfile, AttributeType};
use crate::catalog::CatalogEntry;
use crate::issue::MappingIssue;
use crate::judgment::Judgment;
use crate::output::RecordOutput;

/// One input row as supplied by the caller.
///
/// The attribute columns are optional: when the assigned code exists in the
/// catalog the catalog's attributes win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInput {
    #[serde(rename = "code")]
    pub assigned_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub specimen: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub property: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub scale: String,
    #[serde(default)]
    pub method: String,
}

impl RecordInput {
    pub fn new(code: impl Into<String>, name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            assigned_code: code.into(),
            name: name.into(),
            unit: unit.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_specimen(mut self, specimen: impl Into<String>) -> Self {
        self.specimen = specimen.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Attribute slots as supplied in the input row.
    pub fn supplied_profile(&self) -> AttributeProfile {
        AttributeProfile::new()
            .with(AttributeType::Class, self.class.as_str())
            .with(AttributeType::Component, self.component.as_str())
            .with(AttributeType::Property, self.property.as_str())
            .with(AttributeType::Time, self.time.as_str())
            .with(AttributeType::System, self.system.as_str())
            .with(AttributeType::Scale, self.scale.as_str())
            .with(AttributeType::Method, self.method.as_str())
    }
}

/// Where an inferred value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Read directly off the record's text by an extraction rule.
    Parsed,
    /// Derived from other clues or domain conventions.
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InferredValue {
    pub value: String,
    pub origin: Origin,
}

/// Replacement values accumulated by the inference checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredAttributes {
    values: BTreeMap<AttributeType, Vec<InferredValue>>,
    skipped: BTreeSet<AttributeType>,
}

impl InferredAttributes {
    /// Appends a value unless the same value is already recorded for the type.
    pub fn add(&mut self, attribute: AttributeType, value: &str, origin: Origin) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let list = self.values.entry(attribute).or_default();
        if list.iter().any(|existing| existing.value == value) {
            return false;
        }
        list.push(InferredValue {
            value: value.to_string(),
            origin,
        });
        true
    }

    /// Requests that matching ignore this attribute entirely.
    pub fn skip(&mut self, attribute: AttributeType) {
        self.skipped.insert(attribute);
    }

    pub fn is_skipped(&self, attribute: AttributeType) -> bool {
        self.skipped.contains(&attribute)
    }

    pub fn get(&self, attribute: AttributeType) -> &[InferredValue] {
        self.values
            .get(&attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, attribute: AttributeType) -> bool {
        !self.get(attribute).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty) && self.skipped.is_empty()
    }

    /// Renders the values of one origin as `TYPE=[v1,v2]; TYPE=[v3]`.
    pub fn render(&self, origin: Origin) -> String {
        self.values
            .iter()
            .filter_map(|(attribute, list)| {
                let picked: Vec<&str> = list
                    .iter()
                    .filter(|value| value.origin == origin)
                    .map(|value| value.value.as_str())
                    .collect();
                if picked.is_empty() {
                    None
                } else {
                    Some(format!("{attribute}=[{}]", picked.join(",")))
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// One entry proposed by the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedEntry {
    pub id: String,
    pub display_name: String,
    pub score: f64,
    pub relaxations: Vec<String>,
}

/// Primary suggestion plus ordered alternates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub primary: SuggestedEntry,
    pub alternates: Vec<SuggestedEntry>,
}

/// Working state for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub assigned_code: String,
    pub raw_name: String,
    pub raw_unit: String,
    pub specimen_hint: String,
    pub inclusion_category: String,
    /// Attributes copied from the assigned entry (class included).
    pub attributes: AttributeProfile,
    pub judgment: Judgment,
    pub issues: Vec<MappingIssue>,
    pub inferred: InferredAttributes,
    /// Rendered target profile, set once matching has run.
    pub target: Option<String>,
    pub suggestion: Option<Suggestion>,
}

impl Record {
    /// Builds the working record, copying attributes from the assigned entry
    /// when it is known.
    pub fn from_input(input: &RecordInput, assigned: Option<&CatalogEntry>) -> Self {
        let attributes = match assigned {
            Some(entry) => entry.profile.clone(),
            None => input.supplied_profile(),
        };
        Self {
            assigned_code: input.assigned_code.trim().to_string(),
            raw_name: input.name.clone(),
            raw_unit: input.unit.trim().to_string(),
            specimen_hint: input.specimen.trim().to_string(),
            inclusion_category: input.category.trim().to_string(),
            attributes,
            judgment: Judgment::Unprocessed,
            issues: Vec::new(),
            inferred: InferredAttributes::default(),
            target: None,
            suggestion: None,
        }
    }

    pub fn class(&self) -> &str {
        self.attributes.get(AttributeType::Class)
    }

    pub fn attribute(&self, attribute: AttributeType) -> &str {
        self.attributes.get(attribute)
    }

    /// Records an inferred value, dropping it when it equals the assigned value.
    pub fn infer(&mut self, attribute: AttributeType, value: &str, origin: Origin) -> bool {
        if value.trim() == self.attributes.get(attribute) {
            return false;
        }
        self.inferred.add(attribute, value, origin)
    }

    /// Adds an issue unless one with the same tag is already present.
    pub fn raise(&mut self, issue: MappingIssue) -> bool {
        let tag = issue.tag();
        if self.issues.iter().any(|existing| existing.tag() == tag) {
            return false;
        }
        self.issues.push(issue);
        true
    }

    pub fn to_output(&self) -> RecordOutput {
        RecordOutput::from_record(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueKind;

    fn record() -> Record {
        let entry = CatalogEntry::new("2345-7", "CHEM")
            .with_attribute(AttributeType::System, "Ser/Plas")
            .with_attribute(AttributeType::Component, "Glucose");
        Record::from_input(&RecordInput::new("2345-7", "GLUCOSE", "mg/dL"), Some(&entry))
    }

    #[test]
    fn attributes_come_from_catalog_entry() {
        let record = record();
        assert_eq!(record.class(), "CHEM");
        assert_eq!(record.attribute(AttributeType::System), "Ser/Plas");
    }

    #[test]
    fn infer_never_duplicates_assigned_value() {
        let mut record = record();
        assert!(!record.infer(AttributeType::System, "Ser/Plas", Origin::Parsed));
        assert!(record.infer(AttributeType::System, "Urine", Origin::Parsed));
        assert!(!record.infer(AttributeType::System, "Urine", Origin::Inferred));
        assert_eq!(record.inferred.get(AttributeType::System).len(), 1);
    }

    #[test]
    fn raise_deduplicates_by_tag() {
        let mut record = record();
        let issue = MappingIssue::new(IssueKind::Specimen, AttributeType::System, "a", 0.9);
        assert!(record.raise(issue.clone()));
        assert!(!record.raise(issue));
        assert_eq!(record.issues.len(), 1);
    }

    #[test]
    fn render_splits_by_origin() {
        let mut inferred = InferredAttributes::default();
        inferred.add(AttributeType::System, "Urine", Origin::Parsed);
        inferred.add(AttributeType::System, "Bld", Origin::Parsed);
        inferred.add(AttributeType::Property, "MRat", Origin::Inferred);
        assert_eq!(inferred.render(Origin::Parsed), "SYSTEM=[Urine,Bld]");
        assert_eq!(inferred.render(Origin::Inferred), "PROPERTY=[MRat]");
    }
}
