use std::fs;

use labcode_model::{AttributeType, EntryStatus};
use labcode_standards::{
    EngineConfig, StandardsError, TableUnitNormalizer, UnitContext, UnitNormalizer, load_catalog,
};

const CATALOG: &str = "id,class,component,property,time,system,scale,method,display_name,status,example_units
2345-7,CHEM,Glucose,MCnc,Pt,Ser/Plas,Qn,,Glucose [Mass/volume] in Serum or Plasma,ACTIVE,mg/dL
2350-7,CHEM,Glucose,MCnc,Pt,Urine,Qn,,Glucose [Mass/volume] in Urine,ACTIVE,mg/dL
5799-2,UA,Leukocytes,Naric,Pt,Urine sed,Qn,Microscopy.light.HPF,Leukocytes [#/area] in Urine sediment by Microscopy high power field,DEPRECATED,/[HPF]; /HPF
";

#[test]
fn loads_catalog_from_disk_with_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.csv");
    fs::write(&path, CATALOG).unwrap();

    let loaded = load_catalog(&path).unwrap();
    assert_eq!(loaded.entries.len(), 3);
    assert_eq!(loaded.sha256.len(), 64);

    let sediment = &loaded.entries[2];
    assert_eq!(sediment.status, EntryStatus::Deprecated);
    assert_eq!(
        sediment.attribute(AttributeType::Method),
        "Microscopy.light.HPF"
    );
    assert_eq!(sediment.example_units, vec!["/[HPF]", "/HPF"]);
}

#[test]
fn missing_catalog_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = load_catalog(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(error, StandardsError::Io { .. }));
}

#[test]
fn loads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.toml");
    fs::write(
        &path,
        r#"
[specimen]
unspecified = "ZZZ"

[[rules]]
attribute = "SYSTEM"
value = "Urine"
literals = ["URINE"]
"#,
    )
    .unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.specimen.unspecified, "ZZZ");
    assert_eq!(config.rules.len(), 1);
    assert_eq!(config.rules[0].literals, vec!["URINE".to_string()]);
    assert!(config.synonyms.is_empty());
}

#[test]
fn loads_unit_table_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("units.csv");
    fs::write(&path, "raw,canonical,properties\nmEq/L,mmol/L,SCnc\n").unwrap();

    let table = TableUnitNormalizer::load(&path).unwrap();
    assert!(
        table
            .normalize("meq/l", UnitContext::CASELESS)
            .contains("mmol/L")
    );
    assert!(table.implied_properties("mEq/L").contains("SCnc"));
}
