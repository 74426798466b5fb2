//! End-to-end runs of the `validate` and `rules` commands on temporary files.

use std::fs;
use std::path::Path;

use labcode_cli::cli::ValidateArgs;
use labcode_cli::commands::{read_records, rules_table, run_validate};
use labcode_cli::summary::summary_table;
use labcode_model::Judgment;
use labcode_standards::EngineConfig;
use tempfile::TempDir;

const CATALOG: &str = "\
id,class,component,property,time,system,scale,method,display_name,status,example_units
2345-7,CHEM,Glucose,MCnc,Pt,Ser/Plas,Qn,,Glucose [Mass/volume] in Serum or Plasma,ACTIVE,mg/dL
2350-7,CHEM,Glucose,MCnc,Pt,Urine,Qn,,Glucose [Mass/volume] in Urine,ACTIVE,mg/dL
2093-3,CHEM,Cholesterol,MCnc,Pt,Ser/Plas,Qn,,Cholesterol [Mass/volume] in Serum or Plasma,ACTIVE,mg/dL
";

const RECORDS: &str = "\
code,name,unit,specimen,category
2345-7,URINE GLUCOSE,mg/dL,,
0000-0,GLUCOSE,mg/dL,,
2350-7,URINE GLUCOSE,mg/dL,,
2093-3,CHOLESTEROL,mg/dL,,NON_QN
";

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn args(dir: &TempDir, threads: Option<usize>) -> ValidateArgs {
    ValidateArgs {
        catalog: write(dir.path(), "catalog.csv", CATALOG),
        records: write(dir.path(), "records.csv", RECORDS),
        output: dir.path().join("out.csv"),
        config: None,
        units: None,
        threads,
    }
}

#[test]
fn validate_writes_one_row_per_record_in_input_order() {
    let dir = TempDir::new().unwrap();
    let args = args(&dir, Some(2));

    let result = run_validate(&args).unwrap();
    assert_eq!(result.records, 4);
    assert_eq!(result.counts.get(&Judgment::Fixed), Some(&1));
    assert_eq!(result.counts.get(&Judgment::Correct), Some(&1));
    assert_eq!(result.counts.get(&Judgment::ExcludedInvalidCode), Some(&1));
    assert_eq!(result.counts.get(&Judgment::ExcludedNonQuantitative), Some(&1));
    assert_eq!(result.catalog_sha256.len(), 64);

    let mut reader = csv::Reader::from_path(&args.output).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "code");
    assert!(headers.iter().any(|header| header == "suggested_entry"));
    let judgment = headers.iter().position(|header| header == "judgment").unwrap();
    let suggested = headers
        .iter()
        .position(|header| header == "suggested_entry")
        .unwrap();

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    let codes: Vec<&str> = rows.iter().map(|row| &row[0]).collect();
    assert_eq!(codes, vec!["2345-7", "0000-0", "2350-7", "2093-3"]);
    assert_eq!(&rows[0][judgment], "FIXED");
    assert_eq!(&rows[0][suggested], "2350-7");
    assert_eq!(&rows[1][judgment], "EXCLUDED_INVALID_CODE");
    assert_eq!(&rows[2][judgment], "CORRECT");
    assert_eq!(&rows[3][judgment], "EXCLUDED_NON_QUANTITATIVE");
}

#[test]
fn thread_count_does_not_change_output() {
    let single = TempDir::new().unwrap();
    let pooled = TempDir::new().unwrap();
    run_validate(&args(&single, Some(1))).unwrap();
    run_validate(&args(&pooled, None)).unwrap();

    let first = fs::read_to_string(single.path().join("out.csv")).unwrap();
    let second = fs::read_to_string(pooled.path().join("out.csv")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_catalog_fails_before_any_output() {
    let dir = TempDir::new().unwrap();
    let mut args = args(&dir, None);
    args.catalog = dir.path().join("missing.csv");

    let error = run_validate(&args).unwrap_err();
    assert!(format!("{error:#}").contains("load catalog"));
    assert!(!args.output.exists());
}

#[test]
fn malformed_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut args = args(&dir, None);
    args.config = Some(write(
        dir.path(),
        "engine.toml",
        "[[rules]]\nattribute = \"SYSTEM\"\n",
    ));

    let error = run_validate(&args).unwrap_err();
    assert!(format!("{error:#}").contains("build validation context"));
}

#[test]
fn records_with_only_a_code_column_are_accepted() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "codes.csv", "code\n2345-7\n 2350-7\n");

    let inputs = read_records(&path).unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].assigned_code, "2345-7");
    assert!(inputs[0].name.is_empty());
}

#[test]
fn summary_lists_every_judgment_and_total() {
    let dir = TempDir::new().unwrap();
    let result = run_validate(&args(&dir, None)).unwrap();

    let rendered = summary_table(&result).to_string();
    assert!(rendered.contains("FIXED"));
    assert!(rendered.contains("EXCLUDED_NON_TEXTUAL_NAME"));
    assert!(rendered.contains("TOTAL"));
}

#[test]
fn rules_table_has_one_row_per_configured_rule() {
    let config = EngineConfig::embedded().unwrap();
    let table = rules_table(&config).unwrap();
    assert_eq!(table.row_iter().count(), config.rules.len());
}
