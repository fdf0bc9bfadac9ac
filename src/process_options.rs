//! Processing options for the cleanup pipeline.

/// Options for controlling how a document is processed.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// How to handle patterns that fail to compile.
    pub error_mode: ErrorMode,

    /// Whether to process pages in parallel.
    pub parallel: bool,

    /// Whether to apply Unicode NFC normalization to the input.
    pub normalize_unicode: bool,

    /// Whether to strip Private Use Area characters from the input.
    pub remove_pua: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            parallel: true,
            normalize_unicode: true,
            remove_pua: true,
        }
    }
}

impl ProcessOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets lenient error handling (skip invalid patterns).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Sets strict error handling (fail on any invalid pattern).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Disables parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Disables Unicode normalization of the input.
    pub fn without_normalization(mut self) -> Self {
        self.normalize_unicode = false;
        self
    }

    /// Returns true if invalid patterns should be skipped.
    pub fn is_lenient(&self) -> bool {
        matches!(self.error_mode, ErrorMode::Lenient)
    }
}

/// How to handle invalid patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first pattern that does not compile.
    Strict,
    /// Skip invalid patterns, record a warning and continue.
    #[default]
    Lenient,
}
