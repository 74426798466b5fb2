//! The read-only context shared by every record of a run.
//!
//! Built once from a catalog, an [`EngineConfig`] and a unit normalizer. All
//! patterns are compiled here so configuration mistakes surface before any
//! record is processed.

use std::collections::{BTreeMap, BTreeSet};

use labcode_model::AttributeType;
use labcode_standards::{EngineConfig, ModifierConfig, UnitNormalizer};
use regex::Regex;
use tracing::info;

use crate::error::Result;
use crate::extract::RuleSet;
use crate::index::Catalog;
use crate::synonyms::SynonymResolver;
use crate::utils::{compile_literals, compile_pattern, is_percentage};

/// A component modifier with its compiled word matcher.
#[derive(Debug, Clone)]
pub struct CompiledModifier {
    pub config: ModifierConfig,
    pub word: Regex,
}

impl CompiledModifier {
    /// Full component suffix, connector included (e.g. `.free`).
    pub fn suffix(&self) -> String {
        format!("{}{}", self.config.connector, self.config.suffix)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledPatterns {
    pub interpretation: Regex,
    pub creatinine_unit: Regex,
    pub creatinine_name: Regex,
    pub cell_marker: Regex,
    pub modifiers: Vec<CompiledModifier>,
    /// One matcher per antibody token, in configured order.
    pub antibody_tokens: Vec<(String, Regex)>,
}

impl CompiledPatterns {
    fn compile(config: &EngineConfig) -> Result<Self> {
        let creatinine = &config.class_rules.creatinine_pattern;
        let modifiers = config
            .modifiers
            .iter()
            .map(|modifier| {
                Ok(CompiledModifier {
                    word: compile_literals(std::slice::from_ref(&modifier.word))?,
                    config: modifier.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let antibody_tokens = config
            .antibody
            .tokens
            .iter()
            .map(|token| Ok((token.clone(), compile_literals(std::slice::from_ref(token))?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            interpretation: compile_pattern(&config.scale.interpretation_marker)?,
            creatinine_unit: compile_pattern(creatinine)?,
            creatinine_name: compile_pattern(&format!(
                r"/\s*(?:{creatinine})|(?:{creatinine})\w*\s+RATIO|\bRATIO\b.*(?:{creatinine})"
            ))?,
            cell_marker: compile_pattern(&config.class_rules.cell_marker_pattern)?,
            modifiers,
            antibody_tokens,
        })
    }
}

pub struct ValidationContext {
    pub catalog: Catalog,
    pub config: EngineConfig,
    pub synonyms: SynonymResolver,
    pub rules: RuleSet,
    pub units: Box<dyn UnitNormalizer>,
    pub(crate) patterns: CompiledPatterns,
    /// Class tag (uppercased) -> properties a percentage unit may imply.
    percent_properties: BTreeMap<String, BTreeSet<String>>,
}

impl ValidationContext {
    pub fn new(
        catalog: Catalog,
        config: EngineConfig,
        units: Box<dyn UnitNormalizer>,
    ) -> Result<Self> {
        let synonyms = SynonymResolver::from_config(&config.synonyms)?;
        let rules = RuleSet::compile(&config.rules)?;
        let patterns = CompiledPatterns::compile(&config)?;
        let percent_properties = percent_properties(&catalog, &config);

        info!(
            entries = catalog.len(),
            rules = rules.len(),
            synonym_classes = synonyms.class_counts().values().sum::<usize>(),
            modifiers = patterns.modifiers.len(),
            "validation context ready"
        );

        Ok(Self {
            catalog,
            config,
            synonyms,
            rules,
            units,
            patterns,
            percent_properties,
        })
    }

    /// Properties a percentage unit may imply for records of `class`.
    pub fn percent_properties(&self, class: &str) -> Option<&BTreeSet<String>> {
        self.percent_properties
            .get(&class.trim().to_ascii_uppercase())
    }

    /// Default specimen configured for a class tag, if any.
    pub fn class_default_specimen(&self, class: &str) -> Option<&str> {
        self.config
            .specimen
            .class_defaults
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(class.trim()))
            .map(|(_, specimen)| specimen.as_str())
    }

    pub fn is_unspecified_system(&self, value: &str) -> bool {
        let sentinel = &self.config.specimen.unspecified;
        !sentinel.is_empty() && value.trim().eq_ignore_ascii_case(sentinel)
    }
}

/// Per class: properties of entries whose example units include a
/// percentage, minus the configured overrides.
fn percent_properties(
    catalog: &Catalog,
    config: &EngineConfig,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut by_class: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for entry in catalog.entries() {
        let property = entry.attribute(AttributeType::Property);
        if property.is_empty() || !entry.example_units.iter().any(|unit| is_percentage(unit)) {
            continue;
        }
        by_class
            .entry(entry.class().trim().to_ascii_uppercase())
            .or_default()
            .insert(property.to_string());
    }
    for (class, excluded) in &config.scale.percent_property_overrides {
        if let Some(properties) = by_class.get_mut(&class.trim().to_ascii_uppercase()) {
            for property in excluded {
                properties.remove(property);
            }
        }
    }
    by_class
}
