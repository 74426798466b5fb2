use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{debug, info, info_span};

use labcode_match::{Catalog, ClassFilter, RuleSet, ValidationContext, Validator, judgment_counts};
use labcode_model::{Judgment, Record, RecordInput};
use labcode_standards::{EngineConfig, TableUnitNormalizer, load_catalog};

use crate::cli::{RulesArgs, ValidateArgs};
use crate::logging::redact_value;
use crate::summary::apply_table_style;

/// What a `validate` run produced.
#[derive(Debug, Clone)]
pub struct ValidateResult {
    pub records: usize,
    pub counts: BTreeMap<Judgment, usize>,
    pub output: PathBuf,
    pub catalog_sha256: String,
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidateResult> {
    let span = info_span!("validate", records = %args.records.display());
    let _guard = span.enter();
    let start = Instant::now();

    let loaded = load_catalog(&args.catalog)
        .with_context(|| format!("load catalog {}", args.catalog.display()))?;
    let config = load_config(args.config.as_deref())?;
    let units = match &args.units {
        Some(path) => TableUnitNormalizer::load(path)
            .with_context(|| format!("load unit table {}", path.display()))?,
        None => TableUnitNormalizer::embedded().context("load built-in unit table")?,
    };
    let ctx = ValidationContext::new(Catalog::new(loaded.entries), config, Box::new(units))
        .context("build validation context")?;

    let inputs = read_records(&args.records)?;
    info!(records = inputs.len(), "records loaded");

    let validator = Validator::new(&ctx);
    let records = match args.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("build worker pool")?
            .install(|| validator.process_batch(&inputs)),
        None => validator.process_batch(&inputs),
    };
    for record in records
        .iter()
        .filter(|record| record.judgment == Judgment::Unresolved)
    {
        debug!(
            code = %record.assigned_code,
            name = redact_value(&record.raw_name),
            unit = redact_value(&record.raw_unit),
            "no suggestion found"
        );
    }

    write_records(&args.output, &records)?;
    info!(
        output = %args.output.display(),
        duration_ms = start.elapsed().as_millis(),
        "validation complete"
    );

    Ok(ValidateResult {
        records: records.len(),
        counts: judgment_counts(&records),
        output: args.output.clone(),
        catalog_sha256: loaded.sha256,
    })
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let table = rules_table(&config)?;
    println!("{table}");
    Ok(())
}

/// One row per compiled extraction rule, in evaluation order.
pub fn rules_table(config: &EngineConfig) -> Result<Table> {
    let rules = RuleSet::compile(&config.rules).context("compile extraction rules")?;
    let mut table = Table::new();
    table.set_header(vec!["#", "Attribute", "Matches", "Value", "Classes", "Unless", "Group"]);
    apply_table_style(&mut table);
    for (index, rule) in rules.iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            rule.attribute.to_string(),
            rule.matcher.describe(),
            rule.value.clone().unwrap_or_else(|| "(matched)".to_string()),
            describe_filter(&rule.class_filter),
            rule.unless
                .as_ref()
                .map_or_else(|| "-".to_string(), |regex| regex.as_str().to_string()),
            rule.group.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    Ok(table)
}

fn describe_filter(filter: &ClassFilter) -> String {
    let join = |classes: &std::collections::BTreeSet<String>| {
        classes.iter().cloned().collect::<Vec<_>>().join(",")
    };
    match filter {
        ClassFilter::Any => "any".to_string(),
        ClassFilter::Include(classes) => join(classes),
        ClassFilter::Exclude(classes) => format!("not {}", join(classes)),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            EngineConfig::load(path).with_context(|| format!("load config {}", path.display()))
        }
        None => EngineConfig::embedded().context("load built-in config"),
    }
}

/// Reads records from a CSV with a header row. Unknown columns are ignored.
pub fn read_records(path: &Path) -> Result<Vec<RecordInput>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);
    let mut inputs = Vec::new();
    for (row, result) in reader.deserialize::<RecordInput>().enumerate() {
        let input = result.with_context(|| format!("read {} row {}", path.display(), row + 1))?;
        inputs.push(input);
    }
    Ok(inputs)
}

/// Writes the input columns followed by the judgment columns.
pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for record in records {
        writer
            .serialize(record.to_output())
            .with_context(|| format!("write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
