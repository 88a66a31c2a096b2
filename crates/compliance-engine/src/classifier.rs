//! Bucket classification as an ordered, data-driven rule table
//!
//! The first matching rule decides the bucket. Items matching no rule fall
//! into `Manufactured`. Tables can be loaded from JSON so the keyword set can
//! be iterated without touching evaluator code.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use shared_types::{Bucket, RawLineItem};
use std::fs;
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::patterns::STEEL_IRON_PATTERNS;

lazy_static! {
    static ref DEFAULT_RULES: Vec<ClassificationRule> = STEEL_IRON_PATTERNS
        .iter()
        .map(|(label, pattern)| {
            ClassificationRule::new(label, pattern, Bucket::SteelIron)
                .expect("built-in classification pattern must compile")
        })
        .collect();
}

/// One compiled `pattern -> bucket` rule
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub label: String,
    pub bucket: Bucket,
    pattern: Regex,
}

impl ClassificationRule {
    pub fn new(label: &str, pattern: &str, bucket: Bucket) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                EngineError::ReferenceData(format!("rule '{}' has invalid pattern: {}", label, e))
            })?;
        Ok(Self {
            label: label.to_string(),
            bucket,
            pattern,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// JSON shape of an externally maintained rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleTableDocument {
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    label: String,
    pattern: String,
    bucket: Bucket,
}

/// Ordered rule table; first match wins, no match is `Manufactured`
#[derive(Debug, Clone)]
pub struct BucketClassifier {
    rules: Vec<ClassificationRule>,
}

impl Default for BucketClassifier {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }
}

impl BucketClassifier {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// Parse a rule table of the form
    /// `{"rules": [{"label": "rail", "pattern": "\\brails?\\b", "bucket": "steel_iron"}]}`
    pub fn from_json_str(s: &str) -> Result<Self> {
        let document: RuleTableDocument = serde_json::from_str(s)
            .map_err(|e| EngineError::ReferenceData(format!("rule table: {}", e)))?;
        let rules = document
            .rules
            .iter()
            .map(|entry| ClassificationRule::new(&entry.label, &entry.pattern, entry.bucket))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classify a line item by its `name` and `type`
    pub fn classify(&self, item: &RawLineItem) -> Bucket {
        self.classify_text(&item.classification_text())
    }

    pub fn classify_text(&self, text: &str) -> Bucket {
        self.matching_rule(text)
            .map(|rule| rule.bucket)
            .unwrap_or(Bucket::Manufactured)
    }

    /// The first rule that matches, if any
    pub fn matching_rule(&self, text: &str) -> Option<&ClassificationRule> {
        self.rules.iter().find(|rule| rule.matches(text))
    }
}
