//! Catalog entry model.
//!
//! A catalog entry is one row of the terminology table: a stable identifier,
//! a class tag, six typed attribute slots, a display name, a lifecycle status
//! and a few example units. Entries are immutable once loaded.

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeProfile, AttributeType};

/// Lifecycle status of a catalog entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Active,
    Deprecated,
    Discouraged,
    Other,
}

impl EntryStatus {
    /// Parses a status label; anything unrecognized maps to [`EntryStatus::Other`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" | "ACTIVE" => EntryStatus::Active,
            "DEPRECATED" => EntryStatus::Deprecated,
            "DISCOURAGED" => EntryStatus::Discouraged,
            _ => EntryStatus::Other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Active => "ACTIVE",
            EntryStatus::Deprecated => "DEPRECATED",
            EntryStatus::Discouraged => "DISCOURAGED",
            EntryStatus::Other => "OTHER",
        }
    }
}

/// One terminology catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stable identifier (e.g. "2345-7").
    pub id: String,
    /// Attribute values; the class tag lives in the `Class` slot.
    pub profile: AttributeProfile,
    /// Human-readable name.
    pub display_name: String,
    pub status: EntryStatus,
    /// Example canonical units seen for this entry.
    pub example_units: Vec<String>,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, class: impl Into<String>) -> Self {
        let profile = AttributeProfile::new().with(AttributeType::Class, class);
        Self {
            id: id.into().trim().to_string(),
            profile,
            display_name: String::new(),
            status: EntryStatus::Active,
            example_units: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeType, value: impl Into<String>) -> Self {
        self.profile.set(attribute, value);
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_example_units<I, S>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.example_units = units.into_iter().map(Into::into).collect();
        self
    }

    pub fn class(&self) -> &str {
        self.profile.get(AttributeType::Class)
    }

    pub fn attribute(&self, attribute: AttributeType) -> &str {
        self.profile.get(attribute)
    }
}
