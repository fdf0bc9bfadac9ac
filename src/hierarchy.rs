//! Heading classification.

use crate::model::{HeadingLevel, HeadingMarker};
use crate::rules::HeadingRules;
use regex::Regex;
use std::sync::LazyLock;

static RE_EXISTING_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}\s+").unwrap());

/// Marks heading lines with Markdown prefixes.
///
/// A line is tried against H1 patterns first, then H2, H3 and H4; inside a
/// level the first configured pattern wins. Matching runs on the trimmed line
/// with any existing `#` prefix removed, and lines longer than
/// `max_heading_length` chars are never headings. Lines that match nothing
/// are left byte for byte.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyClassifier<'a> {
    rules: &'a HeadingRules,
    max_heading_length: usize,
}

impl<'a> HierarchyClassifier<'a> {
    pub fn new(rules: &'a HeadingRules, max_heading_length: usize) -> Self {
        Self {
            rules,
            max_heading_length,
        }
    }

    /// Classifies a single line. Returns the level, pattern index and the
    /// heading text without prefix.
    pub fn classify_line<'t>(&self, line: &'t str) -> Option<(HeadingLevel, usize, &'t str)> {
        let trimmed = line.trim();
        let body = match RE_EXISTING_PREFIX.find(trimmed) {
            Some(prefix) => &trimmed[prefix.end()..],
            None => trimmed,
        };

        if body.is_empty() || body.chars().count() > self.max_heading_length {
            return None;
        }

        for (level, patterns) in self.rules.iter() {
            if let Some(rule) = patterns.iter().position(|p| p.is_match(body)) {
                let level = HeadingLevel::from_u8(level)?;
                return Some((level, rule, body));
            }
        }

        None
    }

    /// Rewrites every heading line of `text` and returns the markers found.
    pub fn classify(&self, text: &str) -> (String, Vec<HeadingMarker>) {
        if self.rules.is_empty() {
            return (text.to_string(), Vec::new());
        }

        let mut markers = Vec::new();
        let mut lines = Vec::new();

        for (position, line) in text.split('\n').enumerate() {
            match self.classify_line(line) {
                Some((level, rule, body)) => {
                    lines.push(format!("{} {}", level.prefix(), body));
                    markers.push(HeadingMarker {
                        level,
                        text: body.to_string(),
                        line: position,
                        rule,
                    });
                }
                None => lines.push(line.to_string()),
            }
        }

        if !markers.is_empty() {
            log::trace!("marked {} headings", markers.len());
        }

        (lines.join("\n"), markers)
    }
}

/// Points each marker at its heading line in `text`, after later stages have
/// removed or merged lines around it.
///
/// Markers are matched in order against lines carrying the same prefix and,
/// whitespace collapsed, the same text. Markers whose line no longer exists
/// are dropped.
pub fn relocate_headings(markers: Vec<HeadingMarker>, text: &str) -> Vec<HeadingMarker> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut next = 0;
    let mut relocated = Vec::with_capacity(markers.len());

    for mut marker in markers {
        let wanted = collapse_whitespace(&marker.text);
        let found = lines[next.min(lines.len())..].iter().position(|line| {
            line.trim()
                .strip_prefix(marker.level.prefix())
                .and_then(|rest| rest.strip_prefix(' '))
                .is_some_and(|body| collapse_whitespace(body) == wanted)
        });

        match found {
            Some(offset) => {
                marker.line = next + offset;
                next = marker.line + 1;
                relocated.push(marker);
            }
            None => log::trace!("heading '{}' removed by cleanup", marker.text),
        }
    }

    relocated
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
