//! # Text Cleanup
//!
//! The non-configurable parts of the pipeline.
//!
//! ## Stages
//!
//! 1. **Input Normalization** - Unicode NFC, line endings, control and Private
//!    Use Area characters, exotic spaces
//! 2. **Line-Break Rules** - split glued lines with the configured rewrites
//! 3. **Fragment Cleaning** - whitespace collapse, residual fragment removal,
//!    blank line limiting

use crate::config::CleaningSettings;
use crate::process_options::ProcessOptions;
use crate::protect::{contains_placeholder, is_reserved};
use crate::rules::{CompiledPattern, LineBreak};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Fragment cleaner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Maximum run of consecutive blank lines kept.
    pub max_blank_lines: usize,
    /// Lines shorter than this (in chars) are dropped.
    pub min_line_length: usize,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            max_blank_lines: 1,
            min_line_length: 2,
        }
    }
}

impl CleanupOptions {
    /// Options that keep every line with some alphanumeric content.
    pub fn minimal() -> Self {
        Self {
            max_blank_lines: 2,
            min_line_length: 1,
        }
    }

    /// Options that remove every blank line.
    pub fn aggressive() -> Self {
        Self {
            max_blank_lines: 0,
            min_line_length: 3,
        }
    }
}

impl From<&CleaningSettings> for CleanupOptions {
    fn from(settings: &CleaningSettings) -> Self {
        Self {
            max_blank_lines: settings.max_blank_lines,
            min_line_length: settings.min_line_length,
        }
    }
}

// ============================================================================
// Stage 1: Input Normalization
// ============================================================================

/// Normalizes raw extracted text.
///
/// - CRLF and lone CR become LF
/// - Unicode NFC normalization (unless disabled)
/// - Control characters, BOM, replacement character and soft hyphen removed
/// - Placeholder code points always removed; the rest of the Private Use
///   Area removed when `remove_pua` is set
/// - Ideographic, no-break and narrow spaces become a plain space
/// - Fullwidth ASCII variants become ASCII
pub fn normalize_input(input: &str, options: &ProcessOptions) -> String {
    let unified = if input.contains('\r') {
        input.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        input.to_string()
    };

    let chars: Box<dyn Iterator<Item = char> + '_> = if options.normalize_unicode {
        Box::new(unified.nfc())
    } else {
        Box::new(unified.chars())
    };

    let mut result = String::with_capacity(unified.len());

    for c in chars {
        if is_reserved(c) || is_control_char(c) {
            continue;
        }

        if options.remove_pua && is_pua_char(c) {
            continue;
        }

        if let Some(normalized) = normalize_space(c).or_else(|| normalize_fullwidth(c)) {
            result.push(normalized);
            continue;
        }

        result.push(c);
    }

    result
}

/// Check if character is a control character that should be removed
fn is_control_char(c: char) -> bool {
    if c == '\n' || c == '\t' {
        return false;
    }

    c.is_control()
        || matches!(
            c,
            '\u{FEFF}'   // BOM
            | '\u{FFFD}' // Replacement character
            | '\u{00AD}' // Soft hyphen
            | '\u{200B}' // Zero width space
        )
}

/// Check if character is in Private Use Area
fn is_pua_char(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

fn normalize_space(c: char) -> Option<char> {
    match c {
        '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{3000}' => Some(' '),
        _ => None,
    }
}

/// Normalize fullwidth characters to ASCII equivalents
fn normalize_fullwidth(c: char) -> Option<char> {
    match c {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(0x21 + (c as u32 - 0xFF01)),
        _ => None,
    }
}

// ============================================================================
// Stage 2: Line-Break Rules
// ============================================================================

/// Applies each line-break rule, in order, to the whole text.
pub fn apply_line_breaks(text: &str, rules: &[LineBreak]) -> String {
    let mut result = text.to_string();

    for rule in rules {
        if rule.pattern.is_match(&result) {
            result = rule
                .pattern
                .regex()
                .replace_all(&result, rule.replacement.as_str())
                .into_owned();
        }
    }

    result
}

// ============================================================================
// Stage 3: Fragment Cleaning
// ============================================================================

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static RE_HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,4}\s+\w").unwrap());

/// Removes the leftovers of noise removal, line by line.
///
/// Each line is trimmed and its whitespace runs collapsed to one space. A
/// line is dropped when it matches a residual fragment pattern, has no
/// alphanumeric character, or is shorter than
/// [`min_line_length`](CleanupOptions::min_line_length). Heading lines and
/// lines holding a protection placeholder are never dropped. Blank runs are
/// then limited to [`max_blank_lines`](CleanupOptions::max_blank_lines) and
/// leading/trailing blank lines removed.
///
/// Cleaning is idempotent: cleaning a cleaned text returns it unchanged.
#[derive(Debug, Clone, Copy)]
pub struct FragmentCleaner<'a> {
    fragments: &'a [CompiledPattern],
    options: CleanupOptions,
}

impl<'a> FragmentCleaner<'a> {
    pub fn new(fragments: &'a [CompiledPattern], options: CleanupOptions) -> Self {
        Self { fragments, options }
    }

    /// Cleans `text`.
    pub fn clean(&self, text: &str) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut blank_run = 0;

        for raw in text.split('\n') {
            let line = RE_WHITESPACE.replace_all(raw.trim(), " ");

            if line.is_empty() {
                blank_run += 1;
                if blank_run <= self.options.max_blank_lines {
                    lines.push(String::new());
                }
                continue;
            }

            if !self.keeps(&line) {
                continue;
            }

            blank_run = 0;
            lines.push(line.into_owned());
        }

        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        let leading = lines.iter().take_while(|l| l.is_empty()).count();

        lines[leading..].join("\n")
    }

    fn keeps(&self, line: &str) -> bool {
        if contains_placeholder(line) || is_heading_line(line) {
            return true;
        }

        if self.fragments.iter().any(|p| p.is_match(line)) {
            return false;
        }

        if !line.chars().any(char::is_alphanumeric) {
            return false;
        }

        line.chars().count() >= self.options.min_line_length
    }
}

/// Returns true for `#` to `####` followed by text.
pub fn is_heading_line(line: &str) -> bool {
    RE_HEADING_LINE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protect::placeholder;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn fragments(sources: &[&str]) -> Vec<CompiledPattern> {
        sources
            .iter()
            .map(|s| CompiledPattern::new(s, true).unwrap())
            .collect()
    }

    #[test]
    fn test_crlf_and_nfc() {
        // "e" + combining acute accent
        let input = "Deci\u{0301}\r\nsa\u{0303}o\rfim";
        let result = normalize_input(input, &ProcessOptions::default());
        assert_eq!(result, "Decí\nsão\nfim");
    }

    #[test]
    fn test_control_char_removal() {
        let input = "a\u{0000}b\u{000C}c\u{FEFF}d\u{00AD}e\tf";
        let result = normalize_input(input, &ProcessOptions::default());
        assert_eq!(result, "abcde\tf");
    }

    #[test]
    fn test_pua_removal() {
        let input = "texto\u{E000}\u{E012}\u{E001} e \u{F0A7}símbolo";
        assert_eq!(
            normalize_input(input, &ProcessOptions::default()),
            "texto e símbolo"
        );

        let mut keep_pua = ProcessOptions::default();
        keep_pua.remove_pua = false;
        // reserved code points go regardless
        assert_eq!(normalize_input(input, &keep_pua), "texto e \u{F0A7}símbolo");
    }

    #[test]
    fn test_space_normalization() {
        let input = "Art.\u{00A0}155\u{3000}CP\u{FF01}";
        assert_eq!(
            normalize_input(input, &ProcessOptions::default()),
            "Art. 155 CP!"
        );
    }

    #[test]
    fn test_normalization_can_be_disabled() {
        let input = "e\u{0301}";
        let options = ProcessOptions::default().without_normalization();
        assert_eq!(normalize_input(input, &options), "e\u{0301}");
    }

    #[test]
    fn test_line_breaks() {
        let rules = vec![LineBreak {
            pattern: CompiledPattern::new(r"([^\n])(Documento\s+Assinado)", false).unwrap(),
            replacement: "$1\n$2".to_string(),
        }];
        let result = apply_line_breaks("fim do termo.Documento Assinado por X", &rules);
        assert_eq!(result, "fim do termo.\nDocumento Assinado por X");

        // case-sensitive
        let result = apply_line_breaks("fim.documento assinado", &rules);
        assert_eq!(result, "fim.documento assinado");
    }

    #[test]
    fn test_collapse_and_drop() {
        let residual = fragments(&[r"\d{15,}"]);
        let cleaner = FragmentCleaner::new(&residual, CleanupOptions::default());
        let input = "  Texto   com\t espaços  \n\n\n\n: ---\n123456789012345678\nx\nFim do texto";

        assert_eq!(cleaner.clean(input), "Texto com espaços\n\nFim do texto");
    }

    #[test]
    fn test_headings_and_placeholders_are_kept() {
        let residual = fragments(&[r"^#"]);
        let options = CleanupOptions {
            max_blank_lines: 1,
            min_line_length: 10,
        };
        let cleaner = FragmentCleaner::new(&residual, options);
        let token = placeholder(3);
        let input = format!("# AUTO\ncurto\n{}\n##### nope", token);

        assert_eq!(cleaner.clean(&input), format!("# AUTO\n{}", token));
    }

    #[test]
    fn test_trims_blank_edges() {
        let cleaner = FragmentCleaner::new(&[], CleanupOptions::default());
        assert_eq!(cleaner.clean("\n\n   \nTexto\n\n"), "Texto");
        assert_eq!(cleaner.clean(""), "");
        assert_eq!(cleaner.clean("...\n---"), "");
    }

    #[test]
    fn test_max_blank_lines_zero() {
        let cleaner = FragmentCleaner::new(&[], CleanupOptions::aggressive());
        assert_eq!(cleaner.clean("Primeira\n\n\nSegunda"), "Primeira\nSegunda");
    }

    #[test]
    fn test_minimal_keeps_single_chars() {
        let cleaner = FragmentCleaner::new(&[], CleanupOptions::minimal());
        assert_eq!(cleaner.clean("A\n\n\n\nB"), "A\n\n\nB");
    }

    #[test]
    fn test_is_heading_line() {
        assert!(is_heading_line("# SENTENÇA"));
        assert!(is_heading_line("#### 1.1 Fatos"));
        assert!(!is_heading_line("##### cinco"));
        assert!(!is_heading_line("#sem espaço"));
    }

    #[test]
    fn test_idempotent_on_random_input() {
        let pieces = [
            "Texto útil",
            "",
            "   ",
            "x",
            "## DOS FATOS",
            "-----",
            "12345678901234567890",
            "  Réu   preso  ",
            "\t",
            ": 99999",
            "Art. 155",
        ];
        let residual = fragments(&[r"\d{15,}", r"^\s*:\s*\d{5,}"]);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..300 {
            let options = CleanupOptions {
                max_blank_lines: rng.gen_range(0..3),
                min_line_length: rng.gen_range(1..4),
            };
            let cleaner = FragmentCleaner::new(&residual, options);
            let len = rng.gen_range(0..20);
            let input = (0..len)
                .map(|_| pieces[rng.gen_range(0..pieces.len())])
                .collect::<Vec<_>>()
                .join("\n");

            let once = cleaner.clean(&input);
            assert_eq!(cleaner.clean(&once), once, "input: {:?}", input);
        }
    }
}
