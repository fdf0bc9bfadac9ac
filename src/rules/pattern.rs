//! Single compiled patterns and the lenient compiler.

use crate::error::{Error, Result, Warning};
use crate::process_options::ErrorMode;
use regex::{Regex, RegexBuilder};

/// A configured regex together with its source text.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compiles a pattern in multi-line mode (`^`/`$` match at line ends).
    pub fn new(source: &str, case_insensitive: bool) -> std::result::Result<Self, regex::Error> {
        let regex = RegexBuilder::new(source)
            .multi_line(true)
            .case_insensitive(case_insensitive)
            .build()?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the configuration.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns true if the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Compiles pattern lists, skipping (or rejecting) invalid entries.
#[derive(Debug)]
pub struct PatternCompiler {
    error_mode: ErrorMode,
    warnings: Vec<Warning>,
}

impl PatternCompiler {
    /// Creates a compiler with the given error handling.
    pub fn new(error_mode: ErrorMode) -> Self {
        Self {
            error_mode,
            warnings: Vec::new(),
        }
    }

    /// Compiles every pattern of `sources`, in order.
    ///
    /// In lenient mode an invalid pattern is logged, recorded as
    /// [`Warning::PatternSkipped`] and left out; in strict mode it aborts
    /// with [`Error::PatternCompile`].
    pub fn compile_list(
        &mut self,
        group: &str,
        sources: &[String],
        case_insensitive: bool,
    ) -> Result<Vec<CompiledPattern>> {
        let mut compiled = Vec::with_capacity(sources.len());

        for source in sources {
            match CompiledPattern::new(source, case_insensitive) {
                Ok(pattern) => compiled.push(pattern),
                Err(err) => {
                    // regex errors span several lines; keep the last one
                    let message = err
                        .to_string()
                        .lines()
                        .last()
                        .unwrap_or_default()
                        .trim()
                        .to_string();

                    if self.error_mode == ErrorMode::Strict {
                        return Err(Error::PatternCompile {
                            group: group.to_string(),
                            pattern: source.clone(),
                            message,
                        });
                    }

                    log::warn!("skipping invalid pattern in '{}': {} ({})", group, source, message);
                    self.warnings.push(Warning::PatternSkipped {
                        group: group.to_string(),
                        pattern: source.clone(),
                        message,
                    });
                }
            }
        }

        Ok(compiled)
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Consumes the compiler and returns its warnings.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_line_anchors() {
        let pattern = CompiledPattern::new(r"^Página \d+$", false).unwrap();
        assert!(pattern.is_match("texto\nPágina 3\nmais texto"));
        assert_eq!(pattern.source(), r"^Página \d+$");
    }

    #[test]
    fn test_case_insensitive_flag() {
        let sensitive = CompiledPattern::new("PODER JUDICIÁRIO", false).unwrap();
        let insensitive = CompiledPattern::new("PODER JUDICIÁRIO", true).unwrap();
        assert!(!sensitive.is_match("Poder Judiciário"));
        assert!(insensitive.is_match("Poder Judiciário"));
    }

    #[test]
    fn test_lenient_skips_invalid_pattern() {
        let mut compiler = PatternCompiler::new(ErrorMode::Lenient);
        let sources = vec!["ok".to_string(), "(unclosed".to_string(), "also ok".to_string()];
        let compiled = compiler.compile_list("grupo", &sources, true).unwrap();

        assert_eq!(compiled.len(), 2);
        assert_eq!(compiled[1].source(), "also ok");
        assert_eq!(compiler.warnings().len(), 1);
        match &compiler.warnings()[0] {
            Warning::PatternSkipped { group, pattern, .. } => {
                assert_eq!(group, "grupo");
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("unexpected warning {:?}", other),
        }
    }

    #[test]
    fn test_strict_rejects_invalid_pattern() {
        let mut compiler = PatternCompiler::new(ErrorMode::Strict);
        let sources = vec!["[a-".to_string()];
        let result = compiler.compile_list("grupo", &sources, false);
        assert!(matches!(result, Err(Error::PatternCompile { .. })));
    }

    #[test]
    fn test_lookaround_is_reported_not_fatal() {
        let mut compiler = PatternCompiler::new(ErrorMode::Lenient);
        let sources = vec![r"(?<=Processo:)\s*\d+".to_string()];
        let compiled = compiler.compile_list("metadados", &sources, true).unwrap();
        assert!(compiled.is_empty());
        assert_eq!(compiler.into_warnings().len(), 1);
    }
}
