//! Attribute extraction rules.
//!
//! A rule pairs a matcher (literal alternatives or a regex) with the
//! attribute value it yields, plus optional class filters and an `unless`
//! guard. Rules are compiled once from [`ExtractionRuleConfig`] and evaluated
//! against raw record text in configuration order.

use std::collections::BTreeSet;
use std::str::FromStr;

use labcode_model::AttributeType;
use labcode_standards::ExtractionRuleConfig;
use regex::Regex;

use crate::error::{ConfigError, Result};
use crate::utils::{compile_literals, compile_pattern, normalize_text};

#[derive(Debug, Clone)]
pub enum RuleMatcher {
    /// Word-bounded, case-insensitive literal alternatives.
    Literal {
        alternatives: Vec<String>,
        regex: Regex,
    },
    /// Case-insensitive regular expression.
    Pattern(Regex),
}

impl RuleMatcher {
    /// The text this rule would yield for `text` when no value is configured:
    /// the matched literal, the first capture group, or the whole match.
    fn find(&self, text: &str) -> Option<String> {
        let regex = match self {
            RuleMatcher::Literal { regex, .. } | RuleMatcher::Pattern(regex) => regex,
        };
        let captures = regex.captures(text)?;
        let matched = captures.get(1).or_else(|| captures.get(0))?;
        Some(matched.as_str().to_string())
    }

    pub fn describe(&self) -> String {
        match self {
            RuleMatcher::Literal { alternatives, .. } => alternatives.join("|"),
            RuleMatcher::Pattern(regex) => regex.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClassFilter {
    #[default]
    Any,
    Include(BTreeSet<String>),
    Exclude(BTreeSet<String>),
}

impl ClassFilter {
    fn uppercase(classes: &[String]) -> BTreeSet<String> {
        classes
            .iter()
            .map(|class| class.trim().to_ascii_uppercase())
            .filter(|class| !class.is_empty())
            .collect()
    }

    pub fn admits(&self, class: &str) -> bool {
        let class = class.trim().to_ascii_uppercase();
        match self {
            ClassFilter::Any => true,
            ClassFilter::Include(classes) => classes.contains(&class),
            ClassFilter::Exclude(classes) => !classes.contains(&class),
        }
    }
}

/// Record-level context a rule may consult.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordContext<'a> {
    pub class: &'a str,
}

impl<'a> RecordContext<'a> {
    pub fn new(class: &'a str) -> Self {
        Self { class }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub attribute: AttributeType,
    pub matcher: RuleMatcher,
    pub value: Option<String>,
    pub class_filter: ClassFilter,
    pub unless: Option<Regex>,
    pub group: Option<String>,
}

impl ExtractionRule {
    /// Compiles the rule at position `index` of the configuration.
    pub fn compile(index: usize, config: &ExtractionRuleConfig) -> Result<Self> {
        let attribute = AttributeType::from_str(&config.attribute)?;
        let value = config
            .value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let literals: Vec<String> = config
            .literals
            .iter()
            .map(|literal| normalize_text(literal))
            .filter(|literal| !literal.is_empty())
            .collect();

        let matcher = match (config.pattern.as_deref(), literals.is_empty(), &value) {
            (Some(pattern), _, _) => RuleMatcher::Pattern(compile_pattern(pattern)?),
            (None, false, _) => RuleMatcher::Literal {
                regex: compile_literals(&literals)?,
                alternatives: literals,
            },
            (None, true, Some(value)) => RuleMatcher::Literal {
                regex: compile_literals(std::slice::from_ref(value))?,
                alternatives: vec![value.clone()],
            },
            (None, true, None) => {
                return Err(ConfigError::MalformedExtractionRule {
                    index,
                    attribute: config.attribute.clone(),
                });
            }
        };

        let class_filter = match (config.classes.is_empty(), config.exclude_classes.is_empty()) {
            (true, true) => ClassFilter::Any,
            (false, true) => ClassFilter::Include(ClassFilter::uppercase(&config.classes)),
            (true, false) => ClassFilter::Exclude(ClassFilter::uppercase(&config.exclude_classes)),
            (false, false) => return Err(ConfigError::ConflictingClassFilter { index }),
        };

        let unless = config.unless.as_deref().map(compile_pattern).transpose()?;

        Ok(Self {
            attribute,
            matcher,
            value,
            class_filter,
            unless,
            group: config.group.clone(),
        })
    }

    /// Evaluates the rule against already normalized text.
    pub fn extract(&self, text: &str, context: &RecordContext<'_>) -> Option<String> {
        if !self.class_filter.admits(context.class) {
            return None;
        }
        if self.unless.as_ref().is_some_and(|guard| guard.is_match(text)) {
            return None;
        }
        let found = self.matcher.find(text)?;
        Some(self.value.clone().unwrap_or(found))
    }
}

/// Which rules to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSelector<'a> {
    All,
    Attribute(AttributeType),
    Group(&'a str),
}

impl RuleSelector<'_> {
    fn selects(&self, rule: &ExtractionRule) -> bool {
        match self {
            RuleSelector::All => true,
            RuleSelector::Attribute(attribute) => rule.attribute == *attribute,
            RuleSelector::Group(group) => rule.group.as_deref() == Some(*group),
        }
    }
}

/// A value yielded by one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clue {
    pub attribute: AttributeType,
    pub value: String,
    pub pattern: String,
}

/// Evaluates the selected rules in order. Each rule yields at most one clue.
pub fn run_extractors(
    text: &str,
    rules: &[ExtractionRule],
    context: &RecordContext<'_>,
    selector: RuleSelector<'_>,
) -> Vec<Clue> {
    let text = normalize_text(text);
    if text.is_empty() {
        return Vec::new();
    }
    rules
        .iter()
        .filter(|rule| selector.selects(rule))
        .filter_map(|rule| {
            rule.extract(&text, context).map(|value| Clue {
                attribute: rule.attribute,
                value,
                pattern: rule.matcher.describe(),
            })
        })
        .collect()
}

/// The compiled rule list.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<ExtractionRule>,
}

impl RuleSet {
    pub fn compile(configs: &[ExtractionRuleConfig]) -> Result<Self> {
        let rules = configs
            .iter()
            .enumerate()
            .map(|(index, config)| ExtractionRule::compile(index, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractionRule> {
        self.rules.iter()
    }

    pub fn run(
        &self,
        text: &str,
        context: &RecordContext<'_>,
        selector: RuleSelector<'_>,
    ) -> Vec<Clue> {
        run_extractors(text, &self.rules, context, selector)
    }

    /// Distinct values yielded for one attribute, in rule order.
    pub fn values_for(
        &self,
        text: &str,
        context: &RecordContext<'_>,
        attribute: AttributeType,
    ) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for clue in self.run(text, context, RuleSelector::Attribute(attribute)) {
            if !values.contains(&clue.value) {
                values.push(clue.value);
            }
        }
        values
    }
}
