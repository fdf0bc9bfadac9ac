//! Pattern configuration.
//!
//! Processing is driven by two TOML documents:
//!
//! - a cleaning file (`limpeza.toml`) holding named noise rule groups, the
//!   order in which they run and the fragment cleaner settings;
//! - a hierarchy file (`hierarquia.toml`) holding heading patterns for levels
//!   H1 to H4, preserve patterns, movement and process number patterns.
//!
//! Both are plain data; compilation into executable rules happens once in
//! [`RuleBook::compile`](crate::rules::RuleBook::compile).
//!
//! ```
//! use jurimd::config::CleaningConfig;
//!
//! let config = CleaningConfig::from_toml_str(r#"
//!     [configuracoes]
//!     ordem_processamento = ["paginacao"]
//!
//!     [paginacao]
//!     patterns = ['^\s*Página\s+\d+\s+de\s+\d+\s*$']
//! "#)?;
//! assert_eq!(config.resolved_order(), vec!["paginacao".to_string()]);
//! # Ok::<(), jurimd::Error>(())
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN_CLEANING: &str = include_str!("../config/limpeza.toml");
const BUILTIN_HIERARCHY: &str = include_str!("../config/hierarquia.toml");

/// Group order used when the cleaning file does not set `ordem_processamento`.
pub const DEFAULT_PROCESSING_ORDER: &[&str] = &[
    "metadados_processuais",
    "assinaturas_digitais",
    "cabecalhos_institucionais",
    "textos_margem_rotacionados",
    "rodape_institucional",
    "rodape_links",
    "paginacao",
    "separadores",
];

/// Page marker written by the extractor: `--- Página 3 ---`.
pub const DEFAULT_PAGE_MARKER: &str = r"---\s*P[áa]gina\s+(\d+)\s*---[ \t]*\n?";

/// Movement line as written by the court systems: `Movimentação 12: Recebido`.
pub const DEFAULT_MOVEMENT_PATTERN: &str =
    r"Movimenta[cç][aã]o?\s+(?P<numero>\d+)\s*:\s*(?P<tipo>[^\n]+)";

/// Process number line: `Processo: 5123456.78.2023.8.09.0051`.
pub const DEFAULT_PROCESS_PATTERN: &str = r"Processo:\s*(?P<numero>[\d.\-]+)";

/// Both configuration documents for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Noise removal configuration.
    pub cleaning: CleaningConfig,
    /// Heading, preserve and movement configuration.
    pub hierarchy: HierarchyConfig,
}

impl Config {
    /// Creates a configuration from its two parts.
    pub fn new(cleaning: CleaningConfig, hierarchy: HierarchyConfig) -> Self {
        Self {
            cleaning,
            hierarchy,
        }
    }

    /// Returns the configuration shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            cleaning: CleaningConfig::from_toml_str(BUILTIN_CLEANING)?,
            hierarchy: HierarchyConfig::from_toml_str(BUILTIN_HIERARCHY)?,
        })
    }

    /// Loads both configuration files from disk.
    pub fn from_files(cleaning: impl AsRef<Path>, hierarchy: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            cleaning: CleaningConfig::from_file(cleaning)?,
            hierarchy: HierarchyConfig::from_file(hierarchy)?,
        })
    }
}

/// Contents of the cleaning file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Free-form version string of the pattern file.
    #[serde(default)]
    pub version: Option<String>,

    /// Global settings (`[configuracoes]`).
    #[serde(default, rename = "configuracoes")]
    pub settings: CleaningSettings,

    /// Rule groups keyed by name; every other top-level table.
    #[serde(flatten)]
    pub groups: BTreeMap<String, PatternList>,
}

impl CleaningConfig {
    /// Parses a cleaning configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a cleaning configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Adds (or replaces) a rule group.
    pub fn with_group<I, S>(mut self, name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.insert(name.into(), PatternList::new(patterns));
        self
    }

    /// Sets an explicit processing order.
    pub fn with_processing_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.processing_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the group names in the order they will run.
    ///
    /// An explicit `ordem_processamento` is returned verbatim (names are not
    /// checked here). Without one, the groups named in
    /// [`DEFAULT_PROCESSING_ORDER`] come first, then the rest by name.
    pub fn resolved_order(&self) -> Vec<String> {
        if let Some(ref order) = self.settings.processing_order {
            return order.clone();
        }

        let mut order: Vec<String> = DEFAULT_PROCESSING_ORDER
            .iter()
            .filter(|name| self.groups.contains_key(**name))
            .map(|name| name.to_string())
            .collect();

        for name in self.groups.keys() {
            if !DEFAULT_PROCESSING_ORDER.contains(&name.as_str()) {
                order.push(name.clone());
            }
        }

        order
    }
}

/// The `[configuracoes]` table of the cleaning file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningSettings {
    /// Order in which rule groups are applied.
    #[serde(rename = "ordem_processamento", skip_serializing_if = "Option::is_none")]
    pub processing_order: Option<Vec<String>>,

    /// Maximum run of blank lines kept by the fragment cleaner.
    #[serde(rename = "max_linhas_vazias_consecutivas")]
    pub max_blank_lines: usize,

    /// Lines shorter than this (in chars) are dropped as fragments.
    #[serde(rename = "min_tamanho_linha_util")]
    pub min_line_length: usize,

    /// Compile noise patterns case-insensitively.
    #[serde(rename = "ignorar_maiusculas")]
    pub case_insensitive: bool,

    /// Lines matching any of these are dropped by the fragment cleaner.
    #[serde(rename = "fragmentos_residuais")]
    pub residual_fragments: Vec<String>,

    /// Rewrites applied to each page before classification.
    #[serde(rename = "quebras_linha")]
    pub line_breaks: Vec<LineBreakRule>,

    /// Regex matching the page markers inserted by the extractor.
    /// Capture group 1 must hold the page number.
    #[serde(rename = "marcador_pagina")]
    pub page_marker: String,
}

impl Default for CleaningSettings {
    fn default() -> Self {
        Self {
            processing_order: None,
            max_blank_lines: 1,
            min_line_length: 2,
            case_insensitive: true,
            residual_fragments: Vec::new(),
            line_breaks: Vec::new(),
            page_marker: DEFAULT_PAGE_MARKER.to_string(),
        }
    }
}

/// A regex rewrite that splits glued lines, e.g. `$1\n$2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreakRule {
    /// Pattern to search for (case-sensitive).
    #[serde(rename = "padrao")]
    pub pattern: String,
    /// Replacement, using `$1` style group references.
    #[serde(rename = "substituicao")]
    pub replacement: String,
}

/// A named list of patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternList {
    /// Human description of the list.
    #[serde(default, alias = "descricao")]
    pub description: String,
    /// Regex sources, in priority order.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl PatternList {
    /// Creates a pattern list without description.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: String::new(),
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    fn single(pattern: &str) -> Self {
        Self::new([pattern])
    }
}

/// Contents of the hierarchy file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Free-form version string of the pattern file.
    #[serde(default)]
    pub version: Option<String>,

    /// Global settings (`[configuracoes]`).
    #[serde(default, rename = "configuracoes")]
    pub settings: HierarchySettings,

    /// Level 1 headings: document type titles.
    #[serde(default, alias = "H1")]
    pub h1: PatternList,

    /// Level 2 headings.
    #[serde(default, alias = "H2")]
    pub h2: PatternList,

    /// Level 3 headings.
    #[serde(default, alias = "H3")]
    pub h3: PatternList,

    /// Level 4 headings: the most granular.
    #[serde(default, alias = "H4")]
    pub h4: PatternList,

    /// Content that must survive noise removal untouched.
    #[serde(default, rename = "preservar")]
    pub preserve: PatternList,

    /// Movement detection (`numero` and `tipo` captures).
    #[serde(default = "default_movement", rename = "movimentacao")]
    pub movement: PatternList,

    /// Process number detection (`numero` capture).
    #[serde(default = "default_process_number", rename = "processo")]
    pub process_number: PatternList,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            version: None,
            settings: HierarchySettings::default(),
            h1: PatternList::default(),
            h2: PatternList::default(),
            h3: PatternList::default(),
            h4: PatternList::default(),
            preserve: PatternList::default(),
            movement: default_movement(),
            process_number: default_process_number(),
        }
    }
}

fn default_movement() -> PatternList {
    PatternList::single(DEFAULT_MOVEMENT_PATTERN)
}

fn default_process_number() -> PatternList {
    PatternList::single(DEFAULT_PROCESS_PATTERN)
}

impl HierarchyConfig {
    /// Parses a hierarchy configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a hierarchy configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Sets the patterns of one heading level (1-4; other values are clamped).
    pub fn with_heading<I, S>(mut self, level: u8, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = PatternList::new(patterns);
        match level.clamp(1, 4) {
            1 => self.h1 = list,
            2 => self.h2 = list,
            3 => self.h3 = list,
            _ => self.h4 = list,
        }
        self
    }

    /// Sets the preserve patterns.
    pub fn with_preserve<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preserve = PatternList::new(patterns);
        self
    }

    /// Sets the movement patterns.
    pub fn with_movement<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.movement = PatternList::new(patterns);
        self
    }

    /// Heading pattern lists ordered H1 to H4.
    pub fn heading_levels(&self) -> [&PatternList; 4] {
        [&self.h1, &self.h2, &self.h3, &self.h4]
    }
}

/// The `[configuracoes]` table of the hierarchy file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchySettings {
    /// Lines longer than this (in chars) are never headings.
    #[serde(rename = "max_comprimento_titulo")]
    pub max_heading_length: usize,

    /// Number of leading lines searched for a movement descriptor.
    #[serde(rename = "linhas_movimentacao")]
    pub movement_scan_lines: usize,

    /// Compile heading and preserve patterns case-insensitively.
    #[serde(rename = "ignorar_maiusculas")]
    pub case_insensitive: bool,
}

impl Default for HierarchySettings {
    fn default() -> Self {
        Self {
            max_heading_length: 160,
            movement_scan_lines: 15,
            case_insensitive: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_config_parses() {
        let config = Config::builtin().unwrap();
        let order = config.cleaning.resolved_order();
        assert_eq!(order.first().map(String::as_str), Some("metadados_processuais"));
        assert!(order.iter().all(|name| config.cleaning.groups.contains_key(name)));
        assert!(!config.hierarchy.h1.patterns.is_empty());
        assert!(!config.hierarchy.preserve.patterns.is_empty());
    }

    #[test]
    fn test_groups_are_flattened() {
        let config = CleaningConfig::from_toml_str(
            r#"
            version = "5.0"

            [configuracoes]
            max_linhas_vazias_consecutivas = 2

            [separadores]
            descricao = "Linhas separadoras"
            patterns = ['^-{3,}$']
            "#,
        )
        .unwrap();

        assert_eq!(config.version.as_deref(), Some("5.0"));
        assert_eq!(config.settings.max_blank_lines, 2);
        assert_eq!(config.settings.min_line_length, 2);
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups["separadores"].description, "Linhas separadoras");
        assert_eq!(config.groups["separadores"].patterns, vec!["^-{3,}$"]);
    }

    #[test]
    fn test_resolved_order_without_explicit_order() {
        let config = CleaningConfig::default()
            .with_group("zeta", ["z"])
            .with_group("paginacao", ["p"])
            .with_group("alpha", ["a"])
            .with_group("metadados_processuais", ["m"]);

        assert_eq!(
            config.resolved_order(),
            vec!["metadados_processuais", "paginacao", "alpha", "zeta"]
        );
    }

    #[test]
    fn test_resolved_order_explicit_is_verbatim() {
        let config = CleaningConfig::default()
            .with_group("a", ["x"])
            .with_processing_order(["b", "a"]);
        assert_eq!(config.resolved_order(), vec!["b", "a"]);
    }

    #[test]
    fn test_hierarchy_defaults_detect_movement() {
        let config = HierarchyConfig::from_toml_str("[h1]\npatterns = ['^SENTENÇA$']").unwrap();
        assert_eq!(config.movement.patterns, vec![DEFAULT_MOVEMENT_PATTERN]);
        assert_eq!(config.process_number.patterns, vec![DEFAULT_PROCESS_PATTERN]);
        assert_eq!(config.settings.max_heading_length, 160);
        assert_eq!(HierarchyConfig::default().movement, config.movement);
    }

    #[test]
    fn test_heading_builder_clamps_level() {
        let config = HierarchyConfig::default()
            .with_heading(0, ["A"])
            .with_heading(9, ["D"]);
        assert_eq!(config.h1.patterns, vec!["A"]);
        assert_eq!(config.h4.patterns, vec!["D"]);
    }

    #[test]
    fn test_line_break_rules_parse() {
        let config = CleaningConfig::from_toml_str(
            r#"
            [[configuracoes.quebras_linha]]
            padrao = '([^\n])(Processo:)'
            substituicao = "$1\n$2"
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.line_breaks.len(), 1);
        assert_eq!(config.settings.line_breaks[0].replacement, "$1\n$2");
    }

    #[test]
    fn test_from_files() {
        let mut cleaning = tempfile::NamedTempFile::new().unwrap();
        writeln!(cleaning, "[paginacao]\npatterns = ['^\\d+$']").unwrap();
        let mut hierarchy = tempfile::NamedTempFile::new().unwrap();
        writeln!(hierarchy, "[preservar]\npatterns = ['NARRATIVA.*']").unwrap();

        let config = Config::from_files(cleaning.path(), hierarchy.path()).unwrap();
        assert_eq!(config.cleaning.groups["paginacao"].patterns, vec!["^\\d+$"]);
        assert_eq!(config.hierarchy.preserve.patterns, vec!["NARRATIVA.*"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CleaningConfig::from_file("/nonexistent/limpeza.toml").unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = HierarchyConfig::from_toml_str("[h1\npatterns = 1").unwrap_err();
        assert!(matches!(err, crate::Error::ConfigParse(_)));
    }
}
