//! The compiled form of a whole [`Config`].

use super::pattern::{CompiledPattern, PatternCompiler};
use super::pattern_set::PatternSet;
use crate::config::{CleaningSettings, Config, HierarchySettings};
use crate::error::{Error, Result, Warning};
use crate::process_options::ErrorMode;
use regex::Regex;

/// Heading patterns for levels H1 to H4.
#[derive(Debug, Clone, Default)]
pub struct HeadingRules {
    levels: [Vec<CompiledPattern>; 4],
}

impl HeadingRules {
    /// Patterns of one level (1-based). Out of range levels have no patterns.
    pub fn level(&self, level: u8) -> &[CompiledPattern] {
        match level {
            1..=4 => &self.levels[usize::from(level - 1)],
            _ => &[],
        }
    }

    /// Iterates over `(level, patterns)` from H1 to H4.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[CompiledPattern])> {
        self.levels
            .iter()
            .enumerate()
            .map(|(i, patterns)| (i as u8 + 1, patterns.as_slice()))
    }

    /// Returns true if no level has a pattern.
    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }
}

/// A line-break insertion rule.
#[derive(Debug, Clone)]
pub struct LineBreak {
    pub pattern: CompiledPattern,
    pub replacement: String,
}

/// Every pattern used by one run, compiled once and shared by all pages.
#[derive(Debug, Clone)]
pub struct RuleBook {
    noise: PatternSet,
    headings: HeadingRules,
    preserve: Vec<CompiledPattern>,
    movement: Vec<CompiledPattern>,
    process_number: Vec<CompiledPattern>,
    fragments: Vec<CompiledPattern>,
    line_breaks: Vec<LineBreak>,
    page_marker: Regex,
    cleaning: CleaningSettings,
    hierarchy: HierarchySettings,
    warnings: Vec<Warning>,
}

impl RuleBook {
    /// Compiles `config`.
    ///
    /// Structural problems (unknown group in the processing order, invalid
    /// page marker) always fail. Invalid individual patterns fail only in
    /// [`ErrorMode::Strict`]; otherwise they are collected in
    /// [`warnings`](Self::warnings).
    pub fn compile(config: &Config, error_mode: ErrorMode) -> Result<Self> {
        let cleaning = &config.cleaning.settings;
        let hierarchy = &config.hierarchy.settings;

        let page_marker = compile_page_marker(&cleaning.page_marker)?;

        let mut compiler = PatternCompiler::new(error_mode);
        let noise = PatternSet::compile(&config.cleaning, &mut compiler)?;

        let mut headings = HeadingRules::default();
        for (i, list) in config.hierarchy.heading_levels().into_iter().enumerate() {
            let group = format!("h{}", i + 1);
            headings.levels[i] =
                compiler.compile_list(&group, &list.patterns, hierarchy.case_insensitive)?;
        }

        let preserve = compiler.compile_list(
            "preservar",
            &config.hierarchy.preserve.patterns,
            hierarchy.case_insensitive,
        )?;
        let movement =
            compiler.compile_list("movimentacao", &config.hierarchy.movement.patterns, true)?;
        let process_number =
            compiler.compile_list("processo", &config.hierarchy.process_number.patterns, true)?;
        let fragments = compiler.compile_list(
            "fragmentos_residuais",
            &cleaning.residual_fragments,
            cleaning.case_insensitive,
        )?;

        let mut line_breaks = Vec::with_capacity(cleaning.line_breaks.len());
        for rule in &cleaning.line_breaks {
            let compiled =
                compiler.compile_list("quebras_linha", std::slice::from_ref(&rule.pattern), false)?;
            line_breaks.extend(compiled.into_iter().map(|pattern| LineBreak {
                pattern,
                replacement: rule.replacement.clone(),
            }));
        }

        let warnings = compiler.into_warnings();
        log::debug!(
            "compiled {} noise patterns in {} groups, {} skipped",
            noise.pattern_count(),
            noise.rule_groups().len(),
            warnings.len()
        );

        Ok(Self {
            noise,
            headings,
            preserve,
            movement,
            process_number,
            fragments,
            line_breaks,
            page_marker,
            cleaning: cleaning.clone(),
            hierarchy: hierarchy.clone(),
            warnings,
        })
    }

    /// Noise rule groups in processing order.
    pub fn noise(&self) -> &PatternSet {
        &self.noise
    }

    /// Heading patterns.
    pub fn headings(&self) -> &HeadingRules {
        &self.headings
    }

    /// Content protection patterns.
    pub fn preserve(&self) -> &[CompiledPattern] {
        &self.preserve
    }

    /// Movement descriptor patterns.
    pub fn movement(&self) -> &[CompiledPattern] {
        &self.movement
    }

    /// Process number patterns.
    pub fn process_number(&self) -> &[CompiledPattern] {
        &self.process_number
    }

    /// Residual fragment patterns for the fragment cleaner.
    pub fn fragments(&self) -> &[CompiledPattern] {
        &self.fragments
    }

    /// Line-break insertion rules.
    pub fn line_breaks(&self) -> &[LineBreak] {
        &self.line_breaks
    }

    /// Page marker regex; capture 1 is the printed page number.
    pub fn page_marker(&self) -> &Regex {
        &self.page_marker
    }

    /// Cleaning settings.
    pub fn cleaning(&self) -> &CleaningSettings {
        &self.cleaning
    }

    /// Hierarchy settings.
    pub fn hierarchy(&self) -> &HierarchySettings {
        &self.hierarchy
    }

    /// Patterns skipped during compilation.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

fn compile_page_marker(pattern: &str) -> Result<Regex> {
    let regex = Regex::new(pattern)
        .map_err(|e| Error::Configuration(format!("invalid page marker '{}': {}", pattern, e)))?;

    if regex.captures_len() < 2 {
        return Err(Error::Configuration(format!(
            "page marker '{}' has no capture group for the page number",
            pattern
        )));
    }

    Ok(regex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CleaningConfig, HierarchyConfig};

    #[test]
    fn test_builtin_compiles_cleanly() {
        let config = Config::builtin().unwrap();
        let rules = RuleBook::compile(&config, ErrorMode::Strict).unwrap();

        assert!(rules.warnings().is_empty(), "{:?}", rules.warnings());
        assert_eq!(rules.noise().rule_groups().len(), 8);
        assert!(rules
            .noise()
            .rule_groups()
            .iter()
            .all(|group| !group.description().is_empty()));
        assert!(!rules.headings().is_empty());
        assert!(!rules.preserve().is_empty());
        assert_eq!(rules.line_breaks().len(), 3);
        assert_eq!(rules.fragments().len(), 3);
    }

    #[test]
    fn test_heading_levels_are_one_based() {
        let hierarchy = HierarchyConfig::default()
            .with_heading(1, ["^SENTENÇA$"])
            .with_heading(3, ["^I\\s*-", "^II\\s*-"]);
        let config = Config::new(CleaningConfig::default(), hierarchy);
        let rules = RuleBook::compile(&config, ErrorMode::Lenient).unwrap();

        assert_eq!(rules.headings().level(1).len(), 1);
        assert_eq!(rules.headings().level(2).len(), 0);
        assert_eq!(rules.headings().level(3).len(), 2);
        assert!(rules.headings().level(0).is_empty());
        assert!(rules.headings().level(5).is_empty());
        let levels: Vec<u8> = rules.headings().iter().map(|(level, _)| level).collect();
        assert_eq!(levels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_movement_is_case_insensitive() {
        let config = Config::default();
        let rules = RuleBook::compile(&config, ErrorMode::Lenient).unwrap();
        assert!(rules.movement()[0].is_match("MOVIMENTAÇÃO 3: JUNTADA"));
        assert!(rules.process_number()[0].is_match("processo: 123.45"));
    }

    #[test]
    fn test_skipped_patterns_are_collected() {
        let hierarchy = HierarchyConfig::default().with_preserve(["(?<=x)y", "NARRATIVA"]);
        let config = Config::new(CleaningConfig::default(), hierarchy);
        let rules = RuleBook::compile(&config, ErrorMode::Lenient).unwrap();

        assert_eq!(rules.preserve().len(), 1);
        assert!(matches!(
            &rules.warnings()[0],
            Warning::PatternSkipped { group, .. } if group == "preservar"
        ));
    }

    #[test]
    fn test_strict_mode_rejects_bad_heading() {
        let hierarchy = HierarchyConfig::default().with_heading(2, ["[unterminated"]);
        let config = Config::new(CleaningConfig::default(), hierarchy);
        let err = RuleBook::compile(&config, ErrorMode::Strict).unwrap_err();
        assert!(matches!(err, Error::PatternCompile { ref group, .. } if group == "h2"));
    }

    #[test]
    fn test_invalid_page_marker_is_configuration_error() {
        let mut cleaning = CleaningConfig::default();
        cleaning.settings.page_marker = "--- Página ---".to_string();
        let config = Config::new(cleaning, HierarchyConfig::default());
        let err = RuleBook::compile(&config, ErrorMode::Lenient).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let mut cleaning = CleaningConfig::default();
        cleaning.settings.page_marker = "(".to_string();
        let config = Config::new(cleaning, HierarchyConfig::default());
        assert!(RuleBook::compile(&config, ErrorMode::Lenient).is_err());
    }
}
