//! Unit normalization collaborator.
//!
//! The engine only sees [`UnitNormalizer`]: raw unit text in, canonical unit
//! forms and the properties those units imply out. [`TableUnitNormalizer`]
//! is the table-driven implementation loaded from a
//! `raw,canonical,properties` CSV.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::embedded::DEFAULT_UNIT_TABLE;
use crate::error::{Result, StandardsError};

/// How strictly a raw unit is compared against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitContext {
    pub case_sensitive: bool,
    /// Strict lookups use the unit as written; lenient lookups also ignore
    /// whitespace, brackets and the micro sign spelling.
    pub strict: bool,
}

impl UnitContext {
    pub const EXACT: UnitContext = UnitContext {
        case_sensitive: true,
        strict: true,
    };
    pub const CASELESS: UnitContext = UnitContext {
        case_sensitive: false,
        strict: true,
    };
    pub const LENIENT: UnitContext = UnitContext {
        case_sensitive: false,
        strict: false,
    };

    /// The contexts the inference engine tries, in order.
    pub const ALL: [UnitContext; 3] = [Self::EXACT, Self::CASELESS, Self::LENIENT];
}

/// Raw-unit to canonical-unit mapping, plus unit-implied properties.
pub trait UnitNormalizer: Send + Sync {
    /// Canonical forms for `unit` under `context`; empty when unknown.
    fn normalize(&self, unit: &str, context: UnitContext) -> BTreeSet<String>;

    /// Properties implied by a raw or canonical unit.
    fn implied_properties(&self, unit: &str) -> BTreeSet<String>;
}

/// Table-driven [`UnitNormalizer`].
#[derive(Debug, Clone, Default)]
pub struct TableUnitNormalizer {
    exact: BTreeMap<String, BTreeSet<String>>,
    caseless: BTreeMap<String, BTreeSet<String>>,
    lenient: BTreeMap<String, BTreeSet<String>>,
    properties: BTreeMap<String, BTreeSet<String>>,
}

impl TableUnitNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::parse(DEFAULT_UNIT_TABLE.as_bytes(), Path::new("<embedded>"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| StandardsError::io(path, source))?;
        let table = Self::parse(file, path)?;
        info!(path = %path.display(), units = table.exact.len(), "loaded unit table");
        Ok(table)
    }

    pub fn parse<R: Read>(reader: R, source: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let mut table = Self::new();
        for record in reader.records() {
            let record = record.map_err(|error| StandardsError::csv(source, error))?;
            let raw = record.get(0).unwrap_or("").trim();
            let canonical = record.get(1).unwrap_or("").trim();
            if raw.is_empty() || canonical.is_empty() {
                continue;
            }
            let properties: Vec<&str> = record
                .get(2)
                .unwrap_or("")
                .split(';')
                .map(str::trim)
                .filter(|property| !property.is_empty())
                .collect();
            table.insert(raw, canonical, &properties);
        }
        Ok(table)
    }

    /// Registers a mapping. The canonical form also maps to itself.
    pub fn insert(&mut self, raw: &str, canonical: &str, properties: &[&str]) {
        for key in [raw, canonical] {
            add(&mut self.exact, key.to_string(), canonical);
            add(&mut self.caseless, key.to_lowercase(), canonical);
            add(&mut self.lenient, lenient_key(key), canonical);
        }
        let implied = self.properties.entry(canonical.to_string()).or_default();
        implied.extend(properties.iter().map(|property| property.to_string()));
    }
}

fn add(map: &mut BTreeMap<String, BTreeSet<String>>, key: String, canonical: &str) {
    map.entry(key).or_default().insert(canonical.to_string());
}

fn lenient_key(unit: &str) -> String {
    unit.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '[' | ']'))
        .map(|c| if matches!(c, 'µ' | 'μ') { 'u' } else { c })
        .collect::<String>()
        .to_lowercase()
}

impl UnitNormalizer for TableUnitNormalizer {
    fn normalize(&self, unit: &str, context: UnitContext) -> BTreeSet<String> {
        let unit = unit.trim();
        if unit.is_empty() {
            return BTreeSet::new();
        }
        let hit = match (context.strict, context.case_sensitive) {
            (true, true) => self.exact.get(unit),
            (true, false) => self.caseless.get(&unit.to_lowercase()),
            (false, _) => self.lenient.get(&lenient_key(unit)),
        };
        hit.cloned().unwrap_or_default()
    }

    fn implied_properties(&self, unit: &str) -> BTreeSet<String> {
        let mut implied = BTreeSet::new();
        let mut canonicals = self.normalize(unit, UnitContext::EXACT);
        if canonicals.is_empty() {
            canonicals = self.normalize(unit, UnitContext::LENIENT);
        }
        for canonical in canonicals {
            if let Some(properties) = self.properties.get(&canonical) {
                implied.extend(properties.iter().cloned());
            }
        }
        implied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableUnitNormalizer {
        let mut table = TableUnitNormalizer::new();
        table.insert("mg/dl", "mg/dL", &["MCnc"]);
        table.insert("/HPF", "/[HPF]", &["Naric"]);
        table
    }

    #[test]
    fn strictness_levels() {
        let table = table();
        assert!(table.normalize("MG/DL", UnitContext::EXACT).is_empty());
        assert_eq!(
            table.normalize("MG/DL", UnitContext::CASELESS),
            BTreeSet::from(["mg/dL".to_string()])
        );
        assert_eq!(
            table.normalize(" / hpf ", UnitContext::LENIENT),
            BTreeSet::from(["/[HPF]".to_string()])
        );
    }

    #[test]
    fn canonical_maps_to_itself_and_implies_properties() {
        let table = table();
        assert_eq!(
            table.normalize("mg/dL", UnitContext::EXACT),
            BTreeSet::from(["mg/dL".to_string()])
        );
        assert_eq!(
            table.implied_properties("mg/dl"),
            BTreeSet::from(["MCnc".to_string()])
        );
        assert!(table.implied_properties("furlongs").is_empty());
    }

    #[test]
    fn embedded_table_parses() {
        let table = TableUnitNormalizer::embedded().unwrap();
        assert!(table.implied_properties("%").contains("NFr"));
        assert!(
            table
                .normalize("mg/24 HR", UnitContext::EXACT)
                .contains("mg/(24.h)")
        );
    }
}
