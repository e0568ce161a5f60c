//! Ordered rule collection loaded from a rule file

use std::fmt;
use std::path::Path;
use tracing::debug;

use super::{Rule, RuleError, parser};

/// Rules in file order.
///
/// Every rule is tried against every file; there is no first-match cutoff.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a rule set from already built rules
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parse rule file contents
    pub fn parse(content: &str) -> Result<Self, RuleError> {
        parser::parse_rules(content).map(Self::new)
    }

    /// Read and parse a rule file
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let set = Self::parse(&content)?;
        debug!("Loaded {} rules from {}", set.len(), path.display());
        Ok(set)
    }

    /// Get all rules
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append a rule; it will be tried after all existing ones
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            writeln!(f, "  [{}] {}", i + 1, rule)?;
        }
        Ok(())
    }
}
