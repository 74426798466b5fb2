//! Attribute types and attribute profiles.
//!
//! A catalog entry is classified along six independent axes plus its class
//! tag. The engine treats the class tag as a seventh attribute when matching,
//! so [`AttributeType`] enumerates all seven and [`AttributeProfile`] stores
//! one (possibly empty) value per type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The closed set of attribute types recognized by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeType {
    /// The analyte being measured (e.g. "Glucose").
    Component,
    /// The kind of quantity (e.g. "MCnc" for mass concentration).
    Property,
    /// Timing of the measurement (e.g. "Pt", "24H").
    Time,
    /// Specimen or system (e.g. "Ser/Plas", "Urine").
    System,
    /// Scale type (e.g. "Qn", "Ord", "Nar").
    Scale,
    /// Method type (e.g. "Microscopy.light.HPF").
    Method,
    /// Catalog class tag (e.g. "CHEM").
    Class,
}

impl AttributeType {
    /// All seven attribute types in canonical order.
    pub const ALL: [AttributeType; 7] = [
        AttributeType::Component,
        AttributeType::Property,
        AttributeType::Time,
        AttributeType::System,
        AttributeType::Scale,
        AttributeType::Method,
        AttributeType::Class,
    ];

    /// The six attribute slots stored on a catalog entry (everything but class).
    pub const SLOTS: [AttributeType; 6] = [
        AttributeType::Component,
        AttributeType::Property,
        AttributeType::Time,
        AttributeType::System,
        AttributeType::Scale,
        AttributeType::Method,
    ];

    pub const fn index(self) -> usize {
        match self {
            AttributeType::Component => 0,
            AttributeType::Property => 1,
            AttributeType::Time => 2,
            AttributeType::System => 3,
            AttributeType::Scale => 4,
            AttributeType::Method => 5,
            AttributeType::Class => 6,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AttributeType::Component => "COMPONENT",
            AttributeType::Property => "PROPERTY",
            AttributeType::Time => "TIME",
            AttributeType::System => "SYSTEM",
            AttributeType::Scale => "SCALE",
            AttributeType::Method => "METHOD",
            AttributeType::Class => "CLASS",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = ModelError;

    /// Parses the canonical names as well as the catalog column spellings
    /// (`TIME_ASPCT`, `SCALE_TYP`, `METHOD_TYP`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COMPONENT" => Ok(AttributeType::Component),
            "PROPERTY" => Ok(AttributeType::Property),
            "TIME" | "TIME_ASPCT" => Ok(AttributeType::Time),
            "SYSTEM" => Ok(AttributeType::System),
            "SCALE" | "SCALE_TYP" => Ok(AttributeType::Scale),
            "METHOD" | "METHOD_TYP" => Ok(AttributeType::Method),
            "CLASS" => Ok(AttributeType::Class),
            _ => Err(ModelError::UnknownAttributeType(s.to_string())),
        }
    }
}

/// One value per attribute type; an empty string means the attribute is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeProfile {
    slots: [String; 7],
}

impl AttributeProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly useful in tests and loaders.
    #[must_use]
    pub fn with(mut self, attribute: AttributeType, value: impl Into<String>) -> Self {
        self.set(attribute, value);
        self
    }

    pub fn get(&self, attribute: AttributeType) -> &str {
        &self.slots[attribute.index()]
    }

    /// Stores a trimmed value for the attribute.
    pub fn set(&mut self, attribute: AttributeType, value: impl Into<String>) {
        let value: String = value.into();
        self.slots[attribute.index()] = value.trim().to_string();
    }

    pub fn is_absent(&self, attribute: AttributeType) -> bool {
        self.get(attribute).is_empty()
    }

    /// Iterates `(type, value)` pairs in canonical order, including empty values.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeType, &str)> {
        AttributeType::ALL
            .iter()
            .map(move |attribute| (*attribute, self.get(*attribute)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_column_spellings() {
        assert_eq!(
            "time_aspct".parse::<AttributeType>().unwrap(),
            AttributeType::Time
        );
        assert_eq!(
            "SCALE_TYP".parse::<AttributeType>().unwrap(),
            AttributeType::Scale
        );
        assert!("ANALYTE".parse::<AttributeType>().is_err());
    }

    #[test]
    fn index_matches_canonical_order() {
        for (position, attribute) in AttributeType::ALL.iter().enumerate() {
            assert_eq!(attribute.index(), position);
        }
    }

    #[test]
    fn profile_trims_and_reports_absence() {
        let profile = AttributeProfile::new()
            .with(AttributeType::System, "  Urine ")
            .with(AttributeType::Method, "");
        assert_eq!(profile.get(AttributeType::System), "Urine");
        assert!(profile.is_absent(AttributeType::Method));
        assert!(!profile.is_absent(AttributeType::System));
    }
}
