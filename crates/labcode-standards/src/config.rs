//! Engine configuration.
//!
//! Everything the inference engine treats as data lives here: extraction
//! rules, synonym classes, modifier lists, specimen tables and the scoring
//! weights. The structs are plain serde types; compiling rules into
//! evaluators (and rejecting malformed ones) happens in `labcode-match`.
//!
//! Attribute types are kept as strings at this layer so that an unknown name
//! surfaces as a dedicated configuration error when the engine compiles the
//! configuration, not as a generic deserialization failure.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embedded::DEFAULT_ENGINE_CONFIG;
use crate::error::{Result, StandardsError};
use crate::hash::sha256_hex;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub judgment: JudgmentConfig,
    pub specimen: SpecimenConfig,
    pub time: TimeConfig,
    pub scale: ScaleConfig,
    pub resolution: ResolutionConfig,
    pub modifiers: Vec<ModifierConfig>,
    pub antibody: AntibodyConfig,
    pub class_rules: ClassRulesConfig,
    pub matching: MatchingConfig,
    pub scoring: ScoreWeights,
    pub synonyms: Vec<SynonymClassConfig>,
    pub rules: Vec<ExtractionRuleConfig>,
}

impl EngineConfig {
    /// The configuration shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_ENGINE_CONFIG, Path::new("<embedded>"))
    }

    /// Load a configuration file. The file replaces the embedded defaults
    /// entirely; sections it omits fall back to their `Default` values.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|source| StandardsError::io(path, source))?;
        let config = Self::from_toml_str(&text, path)?;
        info!(
            path = %path.display(),
            rules = config.rules.len(),
            synonyms = config.synonyms.len(),
            sha256 = %sha256_hex(text.as_bytes()),
            "loaded engine configuration"
        );
        Ok(config)
    }

    pub fn from_toml_str(text: &str, source: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source_error| StandardsError::Toml {
            path: source.to_path_buf(),
            source: source_error,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JudgmentConfig {
    /// Inclusion category that marks a record as explicitly non-quantitative.
    pub non_quantitative_flag: String,
}

impl Default for JudgmentConfig {
    fn default() -> Self {
        Self {
            non_quantitative_flag: "NON_QN".to_string(),
        }
    }
}

/// A class/system combination that implies a default specimen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecimenShorthand {
    pub class: String,
    pub when_system: String,
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecimenConfig {
    /// The catalog's "unspecified system" sentinel.
    pub unspecified: String,
    /// Mixed-specimen sentinels admitted alongside urine/CSF requests.
    pub mixed: Vec<String>,
    pub urine_equivalents: Vec<String>,
    pub csf_equivalents: Vec<String>,
    /// Class tag -> default specimen.
    pub class_defaults: BTreeMap<String, String>,
    pub shorthands: Vec<SpecimenShorthand>,
}

impl Default for SpecimenConfig {
    fn default() -> Self {
        Self {
            unspecified: "XXX".to_string(),
            mixed: Vec::new(),
            urine_equivalents: vec!["Urine".to_string()],
            csf_equivalents: vec!["CSF".to_string()],
            class_defaults: BTreeMap::new(),
            shorthands: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeConfig {
    pub point_in_time: String,
    pub concentration_suffix: String,
    pub rate_suffix: String,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            point_in_time: "Pt".to_string(),
            concentration_suffix: "Cnc".to_string(),
            rate_suffix: "Rat".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleConfig {
    /// Regex marking free text as an interpretation/impression.
    pub interpretation_marker: String,
    pub quantitative: String,
    pub narrative: String,
    pub narrative_property: String,
    /// Class tag -> properties never inferred from a percentage unit.
    pub percent_property_overrides: BTreeMap<String, Vec<String>>,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            interpretation_marker: r"\bINTERP".to_string(),
            quantitative: "Qn".to_string(),
            narrative: "Nar".to_string(),
            narrative_property: "Imp".to_string(),
            percent_property_overrides: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolutionConfig {
    /// Magnification markers, e.g. `HPF` and `LPF`.
    pub markers: Vec<String>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            markers: vec!["HPF".to_string(), "LPF".to_string()],
        }
    }
}

/// A connector-joined component qualifier such as `.free` or `^peak`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModifierConfig {
    /// Word looked for in the raw name.
    pub word: String,
    /// Suffix text on the component, without the connector.
    pub suffix: String,
    pub connector: String,
    /// Also propose removing the suffix when the word is absent from the name.
    #[serde(default = "default_true")]
    pub bidirectional: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AntibodyConfig {
    pub tokens: Vec<String>,
    /// Component word identifying an antibody (e.g. `Ab`).
    pub marker: String,
    pub connector: String,
}

impl Default for AntibodyConfig {
    fn default() -> Self {
        Self {
            tokens: ["IgA", "IgD", "IgE", "IgG", "IgM"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            marker: "Ab".to_string(),
            connector: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassRulesConfig {
    /// Regex detecting a creatinine denominator in a unit or name.
    pub creatinine_pattern: String,
    pub creatinine_suffix: String,
    pub mass_ratio_property: String,
    pub molar_ratio_property: String,
    pub field_count_property: String,
    pub cell_marker_classes: Vec<String>,
    pub cell_marker_pattern: String,
    pub cell_fraction_property: String,
    pub cell_count_property: String,
    pub per_100_cells_suffix: String,
}

impl Default for ClassRulesConfig {
    fn default() -> Self {
        Self {
            creatinine_pattern: r"creat".to_string(),
            creatinine_suffix: "/Creatinine".to_string(),
            mass_ratio_property: "MRto".to_string(),
            molar_ratio_property: "SRto".to_string(),
            field_count_property: "Naric".to_string(),
            cell_marker_classes: vec!["CELLMARK".to_string()],
            cell_marker_pattern: r"\bCD\d+".to_string(),
            cell_fraction_property: "NFr".to_string(),
            cell_count_property: "NCnc".to_string(),
            per_100_cells_suffix: "/100 cells".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    pub cell_ratio_properties: Vec<String>,
    pub activity_ratio_properties: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            cell_ratio_properties: vec!["NFr".to_string()],
            activity_ratio_properties: ["RelACnc", "RelCCnc", "RelMCnc", "RelTime"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Weights used by the best-match selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreWeights {
    pub base: f64,
    pub relaxation_penalty: f64,
    pub relaxation_exponent: f64,
    pub deprecated_penalty: f64,
    pub discouraged_penalty: f64,
    pub unspecified_system_bonus: f64,
    pub unit_match_bonus: f64,
    pub exact_match_bonus: f64,
    pub max_alternates: usize,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            base: 50.0,
            relaxation_penalty: 25.0,
            relaxation_exponent: 0.25,
            deprecated_penalty: 20.0,
            discouraged_penalty: 10.0,
            unspecified_system_bonus: 35.0,
            unit_match_bonus: 10.0,
            exact_match_bonus: 50.0,
            max_alternates: 5,
        }
    }
}

/// A set of interchangeable values for one attribute type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynonymClassConfig {
    pub attribute: String,
    pub values: Vec<String>,
}

/// One extraction rule as written in the configuration file.
///
/// Exactly one matcher is used: `pattern` (a regex) wins over `literals`;
/// with neither, the yielded `value` itself is matched as a literal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionRuleConfig {
    pub attribute: String,
    pub value: Option<String>,
    pub pattern: Option<String>,
    pub literals: Vec<String>,
    pub classes: Vec<String>,
    pub exclude_classes: Vec<String>,
    pub unless: Option<String>,
    pub group: Option<String>,
}
