//! Ordered noise rule groups.

use super::pattern::{CompiledPattern, PatternCompiler};
use crate::config::CleaningConfig;
use crate::error::{Error, Result};
use std::ops::Range;

/// A named noise rule group resolved to its place in the processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleGroup {
    name: String,
    position: usize,
    description: String,
    patterns: Range<usize>,
}

impl RuleGroup {
    /// Group name as written in the configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based position in the processing order.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Human description of the group.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Number of compiled patterns in the group.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if every pattern of the group was skipped (or none given).
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Immutable, ordered collection of noise rule groups.
///
/// Patterns of all groups live in one arena; each group holds the range of
/// its own patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    arena: Vec<CompiledPattern>,
    groups: Vec<RuleGroup>,
}

impl PatternSet {
    /// Resolves the processing order of `config` and compiles its groups.
    ///
    /// Fails with [`Error::MissingRuleGroup`] before compiling anything if the
    /// order names a group that is not defined.
    pub fn compile(config: &CleaningConfig, compiler: &mut PatternCompiler) -> Result<Self> {
        let order = config.resolved_order();

        if let Some(missing) = order.iter().find(|name| !config.groups.contains_key(*name)) {
            return Err(Error::MissingRuleGroup(missing.clone()));
        }

        for name in config.groups.keys() {
            if !order.contains(name) {
                log::debug!("rule group '{}' is not in the processing order, ignored", name);
            }
        }

        let mut set = PatternSet::default();
        let case_insensitive = config.settings.case_insensitive;

        for (position, name) in order.into_iter().enumerate() {
            let definition = &config.groups[&name];
            let compiled = compiler.compile_list(&name, &definition.patterns, case_insensitive)?;

            let start = set.arena.len();
            set.arena.extend(compiled);

            set.groups.push(RuleGroup {
                name,
                position,
                description: definition.description.clone(),
                patterns: start..set.arena.len(),
            });
        }

        Ok(set)
    }

    /// Rule groups in processing order.
    pub fn rule_groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    /// Compiled patterns of one group, in configuration order.
    pub fn patterns(&self, group: &RuleGroup) -> &[CompiledPattern] {
        &self.arena[group.patterns.clone()]
    }

    /// Iterates over groups with their patterns, in processing order.
    pub fn iter(&self) -> impl Iterator<Item = (&RuleGroup, &[CompiledPattern])> {
        self.groups.iter().map(move |group| (group, self.patterns(group)))
    }

    /// Total number of compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.arena.len()
    }

    /// Returns true if there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}
