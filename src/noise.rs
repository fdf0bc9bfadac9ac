//! Ordered noise removal.

use crate::protect::{overlaps, placeholder_spans};
use crate::rules::{CompiledPattern, PatternSet};
use serde::Serialize;

/// Removal counts for one rule group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupRemoval {
    pub group: String,
    pub matches: usize,
    pub removed_chars: usize,
}

/// A pattern whose matches touched protected content and were kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedMatch {
    pub group: String,
    pub pattern: String,
    pub count: usize,
}

/// What one run of the engine removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalReport {
    /// Per group, in processing order.
    pub groups: Vec<GroupRemoval>,
    /// Matches left in place because they overlapped a placeholder.
    pub blocked: Vec<BlockedMatch>,
}

impl RemovalReport {
    /// Total characters removed.
    pub fn removed_chars(&self) -> usize {
        self.groups.iter().map(|g| g.removed_chars).sum()
    }

    /// Total matches removed.
    pub fn matches(&self) -> usize {
        self.groups.iter().map(|g| g.matches).sum()
    }

    /// Merges the counts of `other` into `self`, group by group.
    pub fn merge(&mut self, other: &RemovalReport) {
        for removal in &other.groups {
            match self.groups.iter_mut().find(|g| g.group == removal.group) {
                Some(existing) => {
                    existing.matches += removal.matches;
                    existing.removed_chars += removal.removed_chars;
                }
                None => self.groups.push(removal.clone()),
            }
        }
        self.blocked.extend(other.blocked.iter().cloned());
    }
}

/// Applies the noise rule groups to page text.
///
/// Groups run in processing order and patterns in configuration order, each
/// against the text left by the previous one. Placeholders produced by
/// [`ContentProtector`](crate::protect::ContentProtector) are never cut.
#[derive(Debug, Clone, Copy)]
pub struct NoiseRemovalEngine<'a> {
    patterns: &'a PatternSet,
}

impl<'a> NoiseRemovalEngine<'a> {
    pub fn new(patterns: &'a PatternSet) -> Self {
        Self { patterns }
    }

    /// Removes every noise match from `text`.
    pub fn apply(&self, text: &str) -> (String, RemovalReport) {
        let mut current = text.to_string();
        let mut report = RemovalReport::default();

        for (group, patterns) in self.patterns.iter() {
            let mut removal = GroupRemoval {
                group: group.name().to_string(),
                ..Default::default()
            };

            for pattern in patterns {
                let outcome = remove_matches(&current, pattern);

                if outcome.blocked > 0 {
                    report.blocked.push(BlockedMatch {
                        group: group.name().to_string(),
                        pattern: pattern.source().to_string(),
                        count: outcome.blocked,
                    });
                }

                if let Some(text) = outcome.text {
                    removal.matches += outcome.matches;
                    removal.removed_chars += outcome.removed_chars;
                    current = text;
                }
            }

            if removal.matches > 0 {
                log::trace!(
                    "group '{}' removed {} matches ({} chars)",
                    removal.group,
                    removal.matches,
                    removal.removed_chars
                );
            }
            report.groups.push(removal);
        }

        (current, report)
    }
}

struct Outcome {
    /// `None` when nothing was removed.
    text: Option<String>,
    matches: usize,
    removed_chars: usize,
    blocked: usize,
}

fn remove_matches(text: &str, pattern: &CompiledPattern) -> Outcome {
    let protected = placeholder_spans(text);
    let mut out = String::new();
    let mut last = 0;
    let mut matches = 0;
    let mut removed_chars = 0;
    let mut blocked = 0;

    for m in pattern.regex().find_iter(text) {
        if m.is_empty() {
            continue;
        }
        let range = m.range();
        if protected.iter().any(|p| overlaps(p, &range)) {
            blocked += 1;
            continue;
        }

        out.push_str(&text[last..range.start]);
        removed_chars += m.as_str().chars().count();
        matches += 1;
        last = range.end;
    }

    let text = if matches > 0 {
        out.push_str(&text[last..]);
        Some(out)
    } else {
        None
    };

    Outcome {
        text,
        matches,
        removed_chars,
        blocked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleaningConfig;
    use crate::process_options::ErrorMode;
    use crate::protect::ContentProtector;
    use crate::rules::PatternCompiler;

    fn pattern_set(config: &CleaningConfig) -> PatternSet {
        let mut compiler = PatternCompiler::new(ErrorMode::Strict);
        PatternSet::compile(config, &mut compiler).unwrap()
    }

    #[test]
    fn test_removes_and_counts() {
        let config = CleaningConfig::default()
            .with_group("paginacao", [r"(?m)^Página \d+ de \d+$"])
            .with_group("cabecalhos", ["PODER JUDICIÁRIO"]);
        let set = pattern_set(&config);

        let (text, report) =
            NoiseRemovalEngine::new(&set).apply("PODER JUDICIÁRIO\nTexto útil\nPágina 1 de 3");

        assert_eq!(text, "\nTexto útil\n");
        assert_eq!(report.matches(), 2);
        let expected = "PODER JUDICIÁRIO".chars().count() + "Página 1 de 3".chars().count();
        assert_eq!(report.removed_chars(), expected);
        assert_eq!(report.groups.len(), 2);
        assert!(report.blocked.is_empty());
    }

    #[test]
    fn test_order_matters() {
        let line = "Assinado por TRIBUNAL DE JUSTIÇA em 01/02/2024";
        let signature = r"^Assinado por .+ em \d{2}/\d{2}/\d{4}$";
        let header = r"TRIBUNAL DE JUSTI[CÇ]A";

        let signature_first = CleaningConfig::default()
            .with_group("assinaturas", [signature])
            .with_group("cabecalhos", [header])
            .with_processing_order(["assinaturas", "cabecalhos"]);
        let header_first = signature_first
            .clone()
            .with_processing_order(["cabecalhos", "assinaturas"]);

        let (a, _) = NoiseRemovalEngine::new(&pattern_set(&signature_first)).apply(line);
        let (b, _) = NoiseRemovalEngine::new(&pattern_set(&header_first)).apply(line);

        assert_eq!(a, "");
        assert_eq!(b, "Assinado por  em 01/02/2024");
    }

    #[test]
    fn test_protected_content_survives() {
        let config = CleaningConfig::default().with_group("lixo", [r"^.*furto.*$"]);
        let set = pattern_set(&config);
        let preserve = vec![CompiledPattern::new("Art. 155", false).unwrap()];

        let protected =
            ContentProtector::new(&preserve).protect("crime de furto, Art. 155\noutro furto");
        let (text, report) = NoiseRemovalEngine::new(&set).apply(&protected.text);

        assert_eq!(report.blocked.len(), 1);
        assert_eq!(report.blocked[0].count, 1);
        assert_eq!(report.matches(), 1);
        assert!(text.contains(&protected.blocks[0].placeholder));
        assert!(!text.contains("outro furto"));
    }

    #[test]
    fn test_empty_matches_do_nothing() {
        let config = CleaningConfig::default().with_group("vazio", ["x*"]);
        let set = pattern_set(&config);
        let (text, report) = NoiseRemovalEngine::new(&set).apply("abc");
        assert_eq!(text, "abc");
        assert_eq!(report.matches(), 0);
    }

    #[test]
    fn test_merge_reports() {
        let mut total = RemovalReport::default();
        let page = RemovalReport {
            groups: vec![GroupRemoval {
                group: "a".into(),
                matches: 2,
                removed_chars: 10,
            }],
            blocked: Vec::new(),
        };
        total.merge(&page);
        total.merge(&page);
        assert_eq!(total.groups.len(), 1);
        assert_eq!(total.removed_chars(), 20);
    }
}
