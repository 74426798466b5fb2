//! Flat, string-only view of a processed record.

use serde::{Deserialize, Serialize};

use crate::record::{Origin, Record};

const LIST_SEPARATOR: &str = "; ";

/// Output row suitable for any tabular record store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutput {
    pub code: String,
    pub name: String,
    pub unit: String,
    pub specimen: String,
    pub category: String,
    pub judgment: String,
    pub mapping_issues: String,
    pub parsed_attributes: String,
    pub inferred_attributes: String,
    pub suggested_entry: String,
    pub suggested_display_name: String,
    pub alternate_entries: String,
    pub alternate_display_names: String,
    pub target_profile: String,
    pub relaxation_reasons: String,
}

impl RecordOutput {
    pub fn from_record(record: &Record) -> Self {
        let mut output = Self {
            code: record.assigned_code.clone(),
            name: record.raw_name.clone(),
            unit: record.raw_unit.clone(),
            specimen: record.specimen_hint.clone(),
            category: record.inclusion_category.clone(),
            judgment: record.judgment.as_str().to_string(),
            mapping_issues: record
                .issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
            parsed_attributes: record.inferred.render(Origin::Parsed),
            inferred_attributes: record.inferred.render(Origin::Inferred),
            target_profile: record.target.clone().unwrap_or_default(),
            ..Self::default()
        };
        if let Some(suggestion) = &record.suggestion {
            output.suggested_entry = suggestion.primary.id.clone();
            output.suggested_display_name = suggestion.primary.display_name.clone();
            output.relaxation_reasons = suggestion.primary.relaxations.join(LIST_SEPARATOR);
            output.alternate_entries = suggestion
                .alternates
                .iter()
                .map(|entry| entry.id.as_str())
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR);
            output.alternate_display_names = suggestion
                .alternates
                .iter()
                .map(|entry| entry.display_name.as_str())
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR);
        }
        output
    }
}
