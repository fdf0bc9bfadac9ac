//! Page segmentation and per-page descriptors.
//!
//! The extractor writes a marker line such as `--- Página 3 ---` at the top
//! of every page. [`PageSplitter`] cuts the text on those markers;
//! [`MovementDetector`] reads the movement descriptor printed near the top of
//! each page; [`detect_process_number`] finds the process number.

use crate::error::Warning;
use crate::model::Movement;
use crate::rules::CompiledPattern;
use regex::{Captures, Regex};

/// A page as cut from the input, before any processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// 1-based position in the input.
    pub index: usize,
    /// Number printed in the marker.
    pub number: usize,
    /// True for page 1 of a multi-page document.
    pub is_cover: bool,
    /// Trimmed page text.
    pub text: String,
}

/// Output of [`PageSplitter::split`].
#[derive(Debug, Clone, Default)]
pub struct Split {
    pub pages: Vec<RawPage>,
    pub warnings: Vec<Warning>,
}

/// Splits text on page markers.
#[derive(Debug, Clone, Copy)]
pub struct PageSplitter<'a> {
    marker: &'a Regex,
}

impl<'a> PageSplitter<'a> {
    /// Creates a splitter. Capture group 1 of `marker` is the page number.
    pub fn new(marker: &'a Regex) -> Self {
        Self { marker }
    }

    /// Splits `text` into pages.
    ///
    /// Without any marker the whole text is one page; if the caller declared
    /// more than one page this is reported as
    /// [`Warning::MissingPageMarkers`]. Non-blank text before the first marker
    /// is joined to the first page and reported as
    /// [`Warning::UnmarkedPrelude`]. Empty pages are kept.
    pub fn split(&self, text: &str, declared_pages: Option<usize>) -> Split {
        let mut warnings = Vec::new();
        let markers: Vec<(usize, usize, Option<usize>)> = self
            .marker
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let number = caps.get(1).and_then(|m| m.as_str().trim().parse().ok());
                Some((whole.start(), whole.end(), number))
            })
            .collect();

        if markers.is_empty() {
            if let Some(declared) = declared_pages.filter(|n| *n > 1) {
                log::warn!(
                    "{} pages declared but no page markers found, processing as one page",
                    declared
                );
                warnings.push(Warning::MissingPageMarkers {
                    declared_pages: declared,
                });
            }

            return Split {
                pages: vec![RawPage {
                    index: 1,
                    number: 1,
                    is_cover: false,
                    text: text.trim().to_string(),
                }],
                warnings,
            };
        }

        let total = markers.len();
        let mut pages = Vec::with_capacity(total);

        for (i, &(_, end, number)) in markers.iter().enumerate() {
            let next = markers.get(i + 1).map_or(text.len(), |m| m.0);
            let index = i + 1;
            pages.push(RawPage {
                index,
                number: number.unwrap_or(index),
                is_cover: index == 1 && total > 1,
                text: text[end..next].trim().to_string(),
            });
        }

        let prelude = text[..markers[0].0].trim();
        if !prelude.is_empty() {
            let chars = prelude.chars().count();
            log::warn!("{} chars before the first page marker, kept on page 1", chars);
            warnings.push(Warning::UnmarkedPrelude { chars });

            let first = &mut pages[0];
            first.text = if first.text.is_empty() {
                prelude.to_string()
            } else {
                format!("{}\n{}", prelude, first.text)
            };
        }

        Split { pages, warnings }
    }
}

/// Builds raw pages from texts that are already one per page.
pub fn pages_from_texts<S: AsRef<str>>(texts: &[S]) -> Vec<RawPage> {
    let total = texts.len();
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| RawPage {
            index: i + 1,
            number: i + 1,
            is_cover: i == 0 && total > 1,
            text: text.as_ref().trim().to_string(),
        })
        .collect()
}

/// Finds the movement descriptor near the top of a page.
#[derive(Debug, Clone, Copy)]
pub struct MovementDetector<'a> {
    patterns: &'a [CompiledPattern],
    scan_lines: usize,
}

impl<'a> MovementDetector<'a> {
    /// `scan_lines` is the number of leading lines searched.
    pub fn new(patterns: &'a [CompiledPattern], scan_lines: usize) -> Self {
        Self {
            patterns,
            scan_lines,
        }
    }

    /// Returns the first movement found, trying patterns in order.
    ///
    /// The number comes from the `numero` capture (or group 1), the type from
    /// `tipo` (or group 2).
    pub fn detect(&self, text: &str) -> Option<Movement> {
        let head = leading_lines(text, self.scan_lines);

        self.patterns.iter().find_map(|pattern| {
            let caps = pattern.regex().captures(head)?;
            let number = capture(&caps, "numero", 1)?;
            let kind = capture(&caps, "tipo", 2).map(str::to_string);
            Some(Movement::new(number, kind))
        })
    }
}

/// Returns the first process number matched by `patterns`.
///
/// The number comes from the `numero` capture, group 1 or the whole match.
/// Matches left empty once trailing `.` and `-` are trimmed are skipped.
pub fn detect_process_number(patterns: &[CompiledPattern], text: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern.regex().captures_iter(text).find_map(|caps| {
            let number = capture(&caps, "numero", 1)
                .or_else(|| caps.get(0).map(|m| m.as_str().trim()))?
                .trim_end_matches(['.', '-']);
            (!number.is_empty()).then(|| number.to_string())
        })
    })
}

fn capture<'t>(caps: &Captures<'t>, name: &str, index: usize) -> Option<&'t str> {
    caps.name(name)
        .or_else(|| caps.get(index))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

fn leading_lines(text: &str, count: usize) -> &str {
    match text.match_indices('\n').nth(count.saturating_sub(1)) {
        Some((pos, _)) if count > 0 => &text[..pos],
        Some(_) => "",
        None if count == 0 => "",
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MOVEMENT_PATTERN, DEFAULT_PAGE_MARKER, DEFAULT_PROCESS_PATTERN};

    fn marker() -> Regex {
        Regex::new(DEFAULT_PAGE_MARKER).unwrap()
    }

    #[test]
    fn test_split_on_markers() {
        let marker = marker();
        let text = "--- Página 1 ---\nCapa\n--- Página 2 ---\nCorpo\n\n--- Pagina 3 ---\n";
        let split = PageSplitter::new(&marker).split(text, None);

        assert!(split.warnings.is_empty());
        assert_eq!(split.pages.len(), 3);
        assert_eq!(split.pages[0].text, "Capa");
        assert!(split.pages[0].is_cover);
        assert!(!split.pages[1].is_cover);
        assert_eq!(split.pages[1].text, "Corpo");
        assert_eq!(split.pages[2].text, "");
        assert_eq!(split.pages[2].number, 3);
    }

    #[test]
    fn test_printed_number_kept() {
        let marker = marker();
        let text = "--- Página 41 ---\nA\n--- Página 42 ---\nB";
        let split = PageSplitter::new(&marker).split(text, None);
        assert_eq!(split.pages[0].index, 1);
        assert_eq!(split.pages[0].number, 41);
        assert_eq!(split.pages[1].index, 2);
        assert_eq!(split.pages[1].number, 42);
    }

    #[test]
    fn test_no_markers_is_single_page() {
        let marker = marker();
        let split = PageSplitter::new(&marker).split("  texto corrido \n", None);
        assert_eq!(split.pages.len(), 1);
        assert!(!split.pages[0].is_cover);
        assert_eq!(split.pages[0].text, "texto corrido");
        assert!(split.warnings.is_empty());

        let split = PageSplitter::new(&marker).split("texto", Some(5));
        assert_eq!(
            split.warnings,
            vec![Warning::MissingPageMarkers { declared_pages: 5 }]
        );
    }

    #[test]
    fn test_prelude_joins_first_page() {
        let marker = marker();
        let text = "Cabeçalho solto\n--- Página 1 ---\nCapa\n--- Página 2 ---\nCorpo";
        let split = PageSplitter::new(&marker).split(text, None);
        assert_eq!(split.pages[0].text, "Cabeçalho solto\nCapa");
        assert_eq!(split.warnings, vec![Warning::UnmarkedPrelude { chars: 15 }]);
    }

    #[test]
    fn test_single_marked_page_is_not_cover() {
        let marker = marker();
        let split = PageSplitter::new(&marker).split("--- Página 1 ---\nÚnica", None);
        assert_eq!(split.pages.len(), 1);
        assert!(!split.pages[0].is_cover);
    }

    #[test]
    fn test_pages_from_texts() {
        let pages = pages_from_texts(&["capa ", " corpo"]);
        assert!(pages[0].is_cover);
        assert_eq!(pages[1].text, "corpo");
        assert!(!pages_from_texts(&["só"])[0].is_cover);
    }

    #[test]
    fn test_movement_detection() {
        let patterns = vec![CompiledPattern::new(DEFAULT_MOVEMENT_PATTERN, true).unwrap()];
        let detector = MovementDetector::new(&patterns, 3);

        let movement = detector
            .detect("Processo: 123\nMovimentação 12 : Juntada de Petição\nTexto")
            .unwrap();
        assert_eq!(movement.number, "12");
        assert_eq!(movement.kind.as_deref(), Some("Juntada de Petição"));

        assert!(detector.detect("a\nb\nc\nMovimentação 1: Tardia").is_none());
        assert!(detector.detect("sem movimento").is_none());
    }

    #[test]
    fn test_movement_positional_groups() {
        let patterns = vec![CompiledPattern::new(r"Evento (\d+)", false).unwrap()];
        let movement = MovementDetector::new(&patterns, 15).detect("Evento 7").unwrap();
        assert_eq!(movement.number, "7");
        assert_eq!(movement.kind, None);
    }

    #[test]
    fn test_process_number() {
        let patterns = vec![CompiledPattern::new(DEFAULT_PROCESS_PATTERN, true).unwrap()];
        let number = detect_process_number(&patterns, "Processo: 5123456.78.2023.8.09.0051.\n");
        assert_eq!(number.as_deref(), Some("5123456.78.2023.8.09.0051"));
        assert_eq!(detect_process_number(&patterns, "nada"), None);
    }

    #[test]
    fn test_process_number_skips_punctuation_only_match() {
        let patterns = vec![CompiledPattern::new(DEFAULT_PROCESS_PATTERN, true).unwrap()];
        let text = "Processo: ---\nProcesso: 0001234-56.2024.8.09.0051";
        assert_eq!(
            detect_process_number(&patterns, text).as_deref(),
            Some("0001234-56.2024.8.09.0051")
        );
        assert_eq!(detect_process_number(&patterns, "Processo: ..."), None);
    }

    #[test]
    fn test_leading_lines() {
        assert_eq!(leading_lines("a\nb\nc", 2), "a\nb");
        assert_eq!(leading_lines("a\nb", 5), "a\nb");
        assert_eq!(leading_lines("a\nb", 0), "");
    }
}
