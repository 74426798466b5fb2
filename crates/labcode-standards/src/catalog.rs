//! CSV loader for the terminology catalog.
//!
//! The loader accepts either the short headers used by this project
//! (`id,class,component,property,time,system,scale,method,display_name,status,example_units`)
//! or the column names of the published catalog distribution
//! (`LOINC_NUM`, `TIME_ASPCT`, `SCALE_TYP`, `METHOD_TYP`, `LONG_COMMON_NAME`,
//! `EXAMPLE_UCUM_UNITS`). Matching is case-insensitive.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use labcode_model::{AttributeType, CatalogEntry, EntryStatus};
use tracing::{debug, info};

use crate::error::{Result, StandardsError};
use crate::hash::sha256_hex;

/// Entries read from one catalog file, with the file's fingerprint.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub entries: Vec<CatalogEntry>,
    pub sha256: String,
    pub source: PathBuf,
}

/// Load catalog entries from a CSV file.
pub fn load_catalog(path: &Path) -> Result<LoadedCatalog> {
    let bytes = std::fs::read(path).map_err(|source| StandardsError::io(path, source))?;
    let sha256 = sha256_hex(&bytes);
    let entries = parse_catalog(bytes.as_slice(), path)?;
    info!(
        path = %path.display(),
        entries = entries.len(),
        sha256 = %sha256,
        "loaded catalog"
    );
    Ok(LoadedCatalog {
        entries,
        sha256,
        source: path.to_path_buf(),
    })
}

/// Parse catalog entries from any reader. `source` is only used in errors.
pub fn parse_catalog<R: Read>(reader: R, source: &Path) -> Result<Vec<CatalogEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|error| StandardsError::csv(source, error))?
        .clone();

    let id_idx = required_column(&headers, "id", &["id", "loinc_num", "code"], source)?;
    let class_idx = find_column(&headers, &["class"]);
    let name_idx = find_column(&headers, &["display_name", "long_common_name", "name"]);
    let status_idx = find_column(&headers, &["status"]);
    let units_idx = find_column(&headers, &["example_units", "example_ucum_units"]);
    let slot_idx: Vec<(AttributeType, Option<usize>)> = AttributeType::SLOTS
        .iter()
        .map(|attribute| (*attribute, find_column(&headers, slot_aliases(*attribute))))
        .collect();

    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|error| StandardsError::csv(source, error))?;
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

        let id = field(Some(id_idx));
        if id.is_empty() {
            return Err(StandardsError::MissingIdentifier {
                row: row + 1,
                path: source.to_path_buf(),
            });
        }
        if !seen.insert(id.to_string()) {
            return Err(StandardsError::DuplicateEntry {
                id: id.to_string(),
                path: source.to_path_buf(),
            });
        }

        let mut entry = CatalogEntry::new(id, field(class_idx))
            .with_display_name(field(name_idx))
            .with_status(EntryStatus::parse(field(status_idx)))
            .with_example_units(split_units(field(units_idx)));
        for (attribute, idx) in &slot_idx {
            entry.profile.set(*attribute, field(*idx));
        }
        entries.push(entry);
    }
    debug!(path = %source.display(), entries = entries.len(), "parsed catalog rows");
    Ok(entries)
}

fn slot_aliases(attribute: AttributeType) -> &'static [&'static str] {
    match attribute {
        AttributeType::Component => &["component"],
        AttributeType::Property => &["property"],
        AttributeType::Time => &["time", "time_aspct"],
        AttributeType::System => &["system"],
        AttributeType::Scale => &["scale", "scale_typ"],
        AttributeType::Method => &["method", "method_typ"],
        AttributeType::Class => &["class"],
    }
}

fn split_units(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .map(String::from)
        .collect()
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.trim().trim_matches('\u{feff}');
        aliases
            .iter()
            .any(|alias| header.eq_ignore_ascii_case(alias))
    })
}

fn required_column(
    headers: &csv::StringRecord,
    column: &'static str,
    aliases: &[&str],
    source: &Path,
) -> Result<usize> {
    find_column(headers, aliases).ok_or_else(|| StandardsError::MissingColumn {
        column,
        path: source.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_published_column_names() {
        let csv = "\"LOINC_NUM\",\"COMPONENT\",\"PROPERTY\",\"TIME_ASPCT\",\"SYSTEM\",\"SCALE_TYP\",\"METHOD_TYP\",\"CLASS\",\"LONG_COMMON_NAME\",\"STATUS\",\"EXAMPLE_UCUM_UNITS\"\n\
                   \"2345-7\",\"Glucose\",\"MCnc\",\"Pt\",\"Ser/Plas\",\"Qn\",\"\",\"CHEM\",\"Glucose [Mass/volume] in Serum or Plasma\",\"ACTIVE\",\"mg/dL\"\n";
        let entries = parse_catalog(csv.as_bytes(), Path::new("inline.csv")).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.id, "2345-7");
        assert_eq!(entry.class(), "CHEM");
        assert_eq!(entry.attribute(AttributeType::Time), "Pt");
        assert_eq!(entry.example_units, vec!["mg/dL".to_string()]);
    }

    #[test]
    fn rejects_duplicate_identifiers() {
        let csv = "id,class,component\n1-1,CHEM,A\n1-1,CHEM,B\n";
        let error = parse_catalog(csv.as_bytes(), Path::new("dup.csv")).unwrap_err();
        assert!(matches!(error, StandardsError::DuplicateEntry { .. }));
    }

    #[test]
    fn rejects_missing_identifier_column() {
        let csv = "class,component\nCHEM,A\n";
        let error = parse_catalog(csv.as_bytes(), Path::new("bad.csv")).unwrap_err();
        assert!(matches!(
            error,
            StandardsError::MissingColumn { column: "id", .. }
        ));
    }
}
