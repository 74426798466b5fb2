//! Synonym classes: sets of interchangeable attribute values.
//!
//! Compatibility is one hop only. Two values are compatible when they are
//! equal (ignoring ASCII case) or share at least one class; membership is
//! never chained, so `PPP ~ Plas` and `Plas ~ Ser/Plas` do not make
//! `PPP ~ Ser/Plas`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;

use labcode_model::AttributeType;
use labcode_standards::SynonymClassConfig;

use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct SynonymResolver {
    classes: HashMap<AttributeType, Vec<BTreeSet<String>>>,
    /// (type, lowercased value) -> indices into `classes[type]`.
    membership: HashMap<(AttributeType, String), Vec<usize>>,
}

impl SynonymResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(classes: &[SynonymClassConfig]) -> Result<Self> {
        let mut resolver = Self::new();
        for class in classes {
            let attribute = AttributeType::from_str(&class.attribute)?;
            resolver.add_class(attribute, class.values.iter().map(String::as_str));
        }
        Ok(resolver)
    }

    pub fn add_class<'a>(
        &mut self,
        attribute: AttributeType,
        values: impl IntoIterator<Item = &'a str>,
    ) {
        let members: BTreeSet<String> = values
            .into_iter()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
        if members.len() < 2 {
            return;
        }
        let list = self.classes.entry(attribute).or_default();
        let index = list.len();
        for member in &members {
            self.membership
                .entry((attribute, member.to_ascii_lowercase()))
                .or_default()
                .push(index);
        }
        list.push(members);
    }

    fn class_indices(&self, attribute: AttributeType, value: &str) -> &[usize] {
        self.membership
            .get(&(attribute, value.trim().to_ascii_lowercase()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The value itself plus every member of every class containing it.
    /// Empty for an empty value.
    pub fn expand(&self, attribute: AttributeType, value: &str) -> BTreeSet<String> {
        let value = value.trim();
        let mut expanded = BTreeSet::new();
        if value.is_empty() {
            return expanded;
        }
        expanded.insert(value.to_string());
        if let Some(classes) = self.classes.get(&attribute) {
            for &index in self.class_indices(attribute, value) {
                expanded.extend(classes[index].iter().cloned());
            }
        }
        expanded
    }

    pub fn expand_all<'a>(
        &self,
        attribute: AttributeType,
        values: impl IntoIterator<Item = &'a str>,
    ) -> BTreeSet<String> {
        values
            .into_iter()
            .flat_map(|value| self.expand(attribute, value))
            .collect()
    }

    pub fn compatible(&self, attribute: AttributeType, left: &str, right: &str) -> bool {
        let (left, right) = (left.trim(), right.trim());
        if left.eq_ignore_ascii_case(right) {
            return true;
        }
        let right_classes = self.class_indices(attribute, right);
        self.class_indices(attribute, left)
            .iter()
            .any(|index| right_classes.contains(index))
    }

    /// Whether any value of `left` is compatible with any value of `right`.
    pub fn overlaps<L, R>(&self, attribute: AttributeType, left: L, right: R) -> bool
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
        R: IntoIterator + Clone,
        R::Item: AsRef<str>,
    {
        left.into_iter().any(|l| {
            right
                .clone()
                .into_iter()
                .any(|r| self.compatible(attribute, l.as_ref(), r.as_ref()))
        })
    }

    /// Class count per attribute type, for startup logging.
    pub fn class_counts(&self) -> BTreeMap<AttributeType, usize> {
        self.classes
            .iter()
            .map(|(attribute, classes)| (*attribute, classes.len()))
            .collect()
    }
}
