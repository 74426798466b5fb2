use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeType;

/// Which inference check raised an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    Specimen,
    Time,
    TimeProperty,
    Scale,
    Property,
    ResolutionMarker,
    ComponentModifier,
    AntibodySubtype,
    CreatinineRatio,
    FieldCount,
    CellMarker,
}

impl IssueKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            IssueKind::Specimen => "specimen",
            IssueKind::Time => "time",
            IssueKind::TimeProperty => "time-property",
            IssueKind::Scale => "scale",
            IssueKind::Property => "property",
            IssueKind::ResolutionMarker => "resolution-marker",
            IssueKind::ComponentModifier => "component-modifier",
            IssueKind::AntibodySubtype => "antibody-subtype",
            IssueKind::CreatinineRatio => "creatinine-ratio",
            IssueKind::FieldCount => "field-count",
            IssueKind::CellMarker => "cell-marker",
        }
    }
}

/// A disagreement between a clue and the record's assigned attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingIssue {
    pub kind: IssueKind,
    /// Attribute the disagreement concerns.
    pub attribute: AttributeType,
    /// Short description, e.g. `Urine != Ser`.
    pub detail: String,
    /// Confidence weight in (0, 1].
    pub weight: f32,
}

impl MappingIssue {
    pub fn new(
        kind: IssueKind,
        attribute: AttributeType,
        detail: impl Into<String>,
        weight: f32,
    ) -> Self {
        Self {
            kind,
            attribute,
            detail: detail.into(),
            weight: weight.clamp(f32::MIN_POSITIVE, 1.0),
        }
    }

    /// Tag used to de-duplicate issues: kind plus attribute.
    pub fn tag(&self) -> String {
        format!("{}({})", self.kind.as_str(), self.attribute)
    }
}

impl fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{:.2}]", self.tag(), self.detail, self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_tag_detail_and_weight() {
        let issue = MappingIssue::new(
            IssueKind::Specimen,
            AttributeType::System,
            "Urine != Ser",
            0.9,
        );
        assert_eq!(issue.tag(), "specimen(SYSTEM)");
        assert_eq!(issue.to_string(), "specimen(SYSTEM): Urine != Ser [0.90]");
    }

    #[test]
    fn weight_is_clamped() {
        let issue = MappingIssue::new(IssueKind::Scale, AttributeType::Scale, "", 4.0);
        assert_eq!(issue.weight, 1.0);
    }
}
