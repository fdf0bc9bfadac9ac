//! Document assembly.
//!
//! [`Processor`] owns the compiled [`RuleBook`] and runs every page through
//! the per-page stages:
//!
//! 1. movement detection and line-break rules (skipped on the cover page)
//! 2. heading classification
//! 3. content protection, noise removal, fragment cleaning and restoration,
//!    after which heading markers are pointed at their final lines (skipped on
//!    the cover page)
//!
//! Pages are independent, so they run in parallel with rayon and are put
//! back in index order before rendering.

use crate::cleanup::{apply_line_breaks, normalize_input, CleanupOptions, FragmentCleaner};
use crate::config::Config;
use crate::error::{Result, Warning};
use crate::hierarchy::{relocate_headings, HierarchyClassifier};
use crate::model::{Document, Metadata, Page, Statistics};
use crate::noise::{NoiseRemovalEngine, RemovalReport};
use crate::pages::{
    detect_process_number, pages_from_texts, MovementDetector, PageSplitter, RawPage,
};
use crate::process_options::ProcessOptions;
use crate::protect::{restore, ContentProtector};
use crate::render::{render_markdown, RenderOptions};
use crate::rules::RuleBook;
use rayon::prelude::*;

/// Turns extracted text into a cleaned, structured [`Document`].
///
/// # Example
///
/// ```
/// use jurimd::{Config, Processor};
///
/// let processor = Processor::new(&Config::builtin()?)?;
/// let document = processor.process_text("--- Página 1 ---\nSENTENÇA\nO réu foi absolvido.")?;
/// assert_eq!(document.page_count(), 1);
/// assert!(document.content.starts_with("# SENTENÇA"));
/// # Ok::<(), jurimd::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Processor {
    rules: RuleBook,
    options: ProcessOptions,
    render_options: RenderOptions,
}

struct PageOutcome {
    page: Page,
    report: RemovalReport,
    warnings: Vec<Warning>,
}

impl Processor {
    /// Compiles `config` with default options.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_options(config, ProcessOptions::default())
    }

    /// Compiles `config` with the given options.
    pub fn with_options(config: &Config, options: ProcessOptions) -> Result<Self> {
        let rules = RuleBook::compile(config, options.error_mode)?;
        Ok(Self::from_rules(rules, options))
    }

    /// Creates a processor from an already compiled rule book.
    pub fn from_rules(rules: RuleBook, options: ProcessOptions) -> Self {
        Self {
            rules,
            options,
            render_options: RenderOptions::default(),
        }
    }

    /// Sets the rendering options.
    pub fn with_render_options(mut self, render_options: RenderOptions) -> Self {
        self.render_options = render_options;
        self
    }

    /// The compiled rules.
    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// The processing options.
    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Processes text that carries page markers.
    pub fn process_text(&self, text: &str) -> Result<Document> {
        self.process_text_with_page_count(text, None)
    }

    /// Processes text that carries page markers, with the page count reported
    /// by the extractor. A declared count above one without any marker in the
    /// text is recorded as [`Warning::MissingPageMarkers`].
    pub fn process_text_with_page_count(
        &self,
        text: &str,
        declared_pages: Option<usize>,
    ) -> Result<Document> {
        let normalized = normalize_input(text, &self.options);
        let split = PageSplitter::new(self.rules.page_marker()).split(&normalized, declared_pages);
        log::debug!("split input into {} pages", split.pages.len());

        let process_number = detect_process_number(self.rules.process_number(), &normalized);
        self.assemble(text.chars().count(), split.pages, split.warnings, process_number)
    }

    /// Processes texts that are already one per page.
    pub fn process_pages<S: AsRef<str>>(&self, pages: &[S]) -> Result<Document> {
        let original_length = pages.iter().map(|p| p.as_ref().chars().count()).sum();
        let normalized: Vec<String> = pages
            .iter()
            .map(|p| normalize_input(p.as_ref(), &self.options))
            .collect();

        let process_number = normalized
            .iter()
            .find_map(|text| detect_process_number(self.rules.process_number(), text));
        self.assemble(original_length, pages_from_texts(&normalized), Vec::new(), process_number)
    }

    fn assemble(
        &self,
        original_length: usize,
        raw_pages: Vec<RawPage>,
        split_warnings: Vec<Warning>,
        process_number: Option<String>,
    ) -> Result<Document> {
        let mut outcomes: Vec<PageOutcome> = if self.options.parallel && raw_pages.len() > 1 {
            raw_pages
                .into_par_iter()
                .map(|raw| self.process_page(raw))
                .collect()
        } else {
            raw_pages
                .into_iter()
                .map(|raw| self.process_page(raw))
                .collect()
        };
        outcomes.sort_by_key(|outcome| outcome.page.index());

        let mut document = Document::new();
        document.warnings = self.rules.warnings().to_vec();
        document.warnings.extend(split_warnings);

        for outcome in outcomes {
            document.removal.merge(&outcome.report);
            document.warnings.extend(outcome.warnings);
            document.pages.push(outcome.page);
        }

        document.metadata = Metadata {
            process_number,
            page_count: document.pages.len(),
            cover_exempt: document.pages.first().is_some_and(Page::is_cover),
        };

        document.content = render_markdown(&document, &self.render_options)?;
        document.statistics = Statistics::compute(
            original_length,
            &document.content,
            document.removal.removed_chars(),
            document.pages.len(),
        );

        log::debug!(
            "assembled {} pages, {} chars removed by noise patterns, {} warnings",
            document.pages.len(),
            document.statistics.noise_removed,
            document.warnings.len()
        );

        Ok(document)
    }

    fn process_page(&self, raw: RawPage) -> PageOutcome {
        let hierarchy = self.rules.hierarchy();
        let mut page = Page::new(raw.index, raw.number, raw.is_cover, raw.text);
        let mut warnings = Vec::new();

        if !page.is_cover() {
            let detector =
                MovementDetector::new(self.rules.movement(), hierarchy.movement_scan_lines);
            page.movement = detector.detect(&page.text);
            page.text = apply_line_breaks(&page.text, self.rules.line_breaks());
        }

        let classifier =
            HierarchyClassifier::new(self.rules.headings(), hierarchy.max_heading_length);
        let (text, headings) = classifier.classify(&page.text);
        page.text = text;
        page.headings = headings;

        if page.is_cover() {
            log::debug!("page {} is the cover page, cleaning skipped", page.index());
            return PageOutcome {
                page,
                report: RemovalReport::default(),
                warnings,
            };
        }

        let protected = ContentProtector::new(self.rules.preserve()).protect(&page.text);
        page.protected_blocks = protected.blocks.len();

        let (text, report) = NoiseRemovalEngine::new(self.rules.noise()).apply(&protected.text);
        for blocked in &report.blocked {
            log::warn!(
                "page {}: {} match(es) of '{}' in '{}' overlap protected content",
                page.index(),
                blocked.count,
                blocked.pattern,
                blocked.group
            );
            warnings.push(Warning::ProtectedOverlap {
                page: page.index(),
                group: blocked.group.clone(),
                pattern: blocked.pattern.clone(),
            });
        }
        page.removed_chars = report.removed_chars();

        let cleaner = FragmentCleaner::new(
            self.rules.fragments(),
            CleanupOptions::from(self.rules.cleaning()),
        );
        let cleaned = cleaner.clean(&text);

        let restored = restore(&cleaned, &protected.blocks);
        for block in restored.lost {
            log::warn!("page {}: protected block {} lost, re-appended", page.index(), block);
            warnings.push(Warning::PlaceholderLost {
                page: page.index(),
                block,
            });
        }
        page.text = restored.text;
        page.headings = relocate_headings(std::mem::take(&mut page.headings), &page.text);

        log::trace!(
            "page {}: {} -> {} chars",
            page.index(),
            page.original_length,
            page.text.chars().count()
        );

        PageOutcome {
            page,
            report,
            warnings,
        }
    }
}
