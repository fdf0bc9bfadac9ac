//! Document structure, metadata and statistics.

use super::{HeadingMarker, Page};
use crate::error::Warning;
use crate::noise::RemovalReport;
use serde::Serialize;

/// A processed document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,
    /// Pages in input order
    pub pages: Vec<Page>,
    /// Final Markdown
    pub content: String,
    /// Length accounting
    pub statistics: Statistics,
    /// Per-group noise removal counts
    pub removal: RemovalReport,
    /// Recoverable anomalies met while processing
    pub warnings: Vec<Warning>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns an iterator over every heading, page by page.
    pub fn headings(&self) -> impl Iterator<Item = (&Page, &HeadingMarker)> {
        self.pages
            .iter()
            .flat_map(|page| page.headings.iter().map(move |heading| (page, heading)))
    }

    /// Returns true if anything was recorded in [`warnings`](Self::warnings).
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the whole document (pages, statistics, warnings) as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// First process number found in the input
    pub process_number: Option<String>,
    /// Number of pages
    pub page_count: usize,
    /// Whether page 1 was treated as a cover page
    pub cover_exempt: bool,
}

/// Length accounting for a run. All lengths are in chars.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    /// Length of the raw input.
    pub original_length: usize,
    /// Chars removed by noise patterns, over all pages.
    pub noise_removed: usize,
    /// Net reduction: original minus final length, never negative.
    pub removed_length: usize,
    /// `removed_length` as a percentage of `original_length`.
    pub removed_percentage: f64,
    /// Length of the final Markdown.
    pub final_length: usize,
    /// Non-blank lines of the final Markdown.
    pub line_count: usize,
    /// Whitespace separated words of the final Markdown.
    pub word_count: usize,
    /// Number of pages.
    pub page_count: usize,
}

impl Statistics {
    /// Computes statistics from the raw input length and the final Markdown.
    pub fn compute(
        original_length: usize,
        content: &str,
        noise_removed: usize,
        page_count: usize,
    ) -> Self {
        let final_length = content.chars().count();
        let removed_length = original_length.saturating_sub(final_length);
        let removed_percentage = if original_length == 0 {
            0.0
        } else {
            removed_length as f64 / original_length as f64 * 100.0
        };

        Self {
            original_length,
            noise_removed,
            removed_length,
            removed_percentage,
            final_length,
            line_count: content.lines().filter(|l| !l.trim().is_empty()).count(),
            word_count: content.split_whitespace().count(),
            page_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics() {
        let stats = Statistics::compute(10, "abc de\n\nf", 3, 1);
        assert_eq!(stats.original_length, 10);
        assert_eq!(stats.final_length, 9);
        assert_eq!(stats.removed_length, 1);
        assert!((stats.removed_percentage - 10.0).abs() < 1e-9);
        assert_eq!(stats.line_count, 2);
        assert_eq!(stats.word_count, 3);
        assert_eq!(stats.noise_removed, 3);
    }

    #[test]
    fn test_statistics_empty_input() {
        let stats = Statistics::compute(0, "*Página sem conteúdo útil*", 0, 1);
        assert_eq!(stats.removed_length, 0);
        assert_eq!(stats.removed_percentage, 0.0);
    }

    #[test]
    fn test_statistics_count_chars() {
        let stats = Statistics::compute(3, "ação", 0, 1);
        assert_eq!(stats.final_length, 4);
        assert_eq!(stats.removed_length, 0);
    }

    #[test]
    fn test_document_json() {
        let mut doc = Document::new();
        doc.pages.push(Page::new(1, 1, false, "Texto"));
        doc.metadata.page_count = 1;
        let json = doc.to_json();
        assert!(json.contains("\"page_count\": 1"));
        assert!(json.contains("\"is_cover\": false"));
    }
}
