//! In-memory catalog with an inverted index per attribute type.
//!
//! For every attribute type the index maps each value (the empty string
//! included, standing for "absent") to the ids of the entries carrying it.
//! Constraint selection is set intersection across the constrained types.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use labcode_model::{AttributeType, CatalogEntry};
use tracing::warn;

/// Acceptable values per attribute type. `None` leaves a type unconstrained;
/// an empty string in the list admits entries where the attribute is absent.
pub type Constraints = BTreeMap<AttributeType, Option<Vec<String>>>;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
    index: HashMap<AttributeType, HashMap<String, BTreeSet<String>>>,
}

impl Catalog {
    /// Builds the catalog. A later entry with an already seen id replaces the
    /// earlier one.
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    fn insert(&mut self, entry: CatalogEntry) {
        if let Some(previous) = self.entries.remove(&entry.id) {
            warn!(id = %previous.id, "duplicate catalog id; keeping the later entry");
            for attribute in AttributeType::ALL {
                if let Some(ids) = self
                    .index
                    .get_mut(&attribute)
                    .and_then(|values| values.get_mut(previous.attribute(attribute)))
                {
                    ids.remove(&previous.id);
                }
            }
        }
        for attribute in AttributeType::ALL {
            self.index
                .entry(attribute)
                .or_default()
                .entry(entry.attribute(attribute).to_string())
                .or_default()
                .insert(entry.id.clone());
        }
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id.trim())
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Ids of entries whose `attribute` equals `value` exactly.
    pub fn ids_with(&self, attribute: AttributeType, value: &str) -> Option<&BTreeSet<String>> {
        self.index
            .get(&attribute)
            .and_then(|values| values.get(value))
            .filter(|ids| !ids.is_empty())
    }

    /// Whether any entry carries `value` for `attribute`.
    pub fn contains_value(&self, attribute: AttributeType, value: &str) -> bool {
        !value.is_empty() && self.ids_with(attribute, value).is_some()
    }

    /// The catalog's spelling of `value`, matched ignoring ASCII case. An
    /// exact match wins; among case variants the smallest is returned.
    pub fn canonical_value(&self, attribute: AttributeType, value: &str) -> Option<&str> {
        let value = value.trim();
        if self.contains_value(attribute, value) {
            return self
                .index
                .get(&attribute)
                .and_then(|values| values.get_key_value(value))
                .map(|(key, _)| key.as_str());
        }
        self.values(attribute)
            .into_iter()
            .find(|known| known.eq_ignore_ascii_case(value))
    }

    /// Distinct non-empty values present for an attribute type, sorted.
    pub fn values(&self, attribute: AttributeType) -> BTreeSet<&str> {
        self.index
            .get(&attribute)
            .map(|values| {
                values
                    .iter()
                    .filter(|(value, ids)| !value.is_empty() && !ids.is_empty())
                    .map(|(value, _)| value.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of entries satisfying every constrained attribute type.
    pub fn select_by_constraints(&self, constraints: &Constraints) -> BTreeSet<String> {
        let mut per_type: Vec<BTreeSet<&String>> = constraints
            .iter()
            .filter_map(|(attribute, values)| {
                values.as_ref().map(|values| {
                    values
                        .iter()
                        .filter_map(|value| self.ids_with(*attribute, value))
                        .flatten()
                        .collect()
                })
            })
            .collect();

        if per_type.is_empty() {
            return self.entries.keys().cloned().collect();
        }
        per_type.sort_by_key(BTreeSet::len);
        let (first, rest) = per_type.split_at(1);
        first[0]
            .iter()
            .filter(|id| rest.iter().all(|set| set.contains(*id)))
            .map(|id| (*id).clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, property: &str, system: &str) -> CatalogEntry {
        CatalogEntry::new(id, "CHEM")
            .with_attribute(AttributeType::Component, "Glucose")
            .with_attribute(AttributeType::Property, property)
            .with_attribute(AttributeType::System, system)
    }

    fn catalog() -> Catalog {
        Catalog::new([
            entry("1", "MCnc", "Ser/Plas"),
            entry("2", "MCnc", "Urine"),
            entry("3", "SCnc", "Urine"),
            entry("4", "MCnc", ""),
        ])
    }

    fn only(attribute: AttributeType, values: &[&str]) -> Constraints {
        let mut constraints = Constraints::new();
        constraints.insert(
            attribute,
            Some(values.iter().map(|value| value.to_string()).collect()),
        );
        constraints
    }

    #[test]
    fn intersects_constrained_types() {
        let catalog = catalog();
        let mut constraints = only(AttributeType::System, &["Urine"]);
        constraints.insert(AttributeType::Property, Some(vec!["MCnc".to_string()]));
        constraints.insert(AttributeType::Time, None);

        let ids: Vec<String> = catalog.select_by_constraints(&constraints).into_iter().collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn empty_value_selects_absent_attribute() {
        let catalog = catalog();
        let ids = catalog.select_by_constraints(&only(AttributeType::System, &["", "XXX"]));
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["4"]);
    }

    #[test]
    fn no_constraints_selects_everything() {
        assert_eq!(catalog().select_by_constraints(&Constraints::new()).len(), 4);
    }

    #[test]
    fn duplicate_id_replaces_index_entries() {
        let catalog = Catalog::new([entry("1", "MCnc", "Urine"), entry("1", "SCnc", "Urine")]);
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.contains_value(AttributeType::Property, "MCnc"));
        assert!(catalog.contains_value(AttributeType::Property, "SCnc"));
    }

    #[test]
    fn values_lists_distinct_non_empty_values() {
        let catalog = catalog();
        assert_eq!(
            catalog.values(AttributeType::System).into_iter().collect::<Vec<_>>(),
            vec!["Ser/Plas", "Urine"]
        );
    }

    #[test]
    fn canonical_value_restores_catalog_spelling() {
        let catalog = catalog();
        assert_eq!(catalog.canonical_value(AttributeType::System, "URINE"), Some("Urine"));
        assert_eq!(catalog.canonical_value(AttributeType::System, " ser/plas "), Some("Ser/Plas"));
        assert_eq!(catalog.canonical_value(AttributeType::Property, "MCnc"), Some("MCnc"));
        assert_eq!(catalog.canonical_value(AttributeType::System, "CSF"), None);
        assert_eq!(catalog.canonical_value(AttributeType::System, ""), None);
    }
}
