//! Rendering options for Markdown output.

/// Options for Markdown rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Whether to include metadata as YAML frontmatter.
    pub include_frontmatter: bool,

    /// When to write a header block above each page.
    pub page_headers: PageHeaders,

    /// Width of the `=` delimiter lines around page headers.
    /// Default: 60
    pub delimiter_width: usize,

    /// Text written for a page with no content left.
    pub empty_page_text: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: false,
            page_headers: PageHeaders::Auto,
            delimiter_width: 60,
            empty_page_text: "*Página sem conteúdo útil*".to_string(),
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables YAML frontmatter output.
    pub fn with_frontmatter(mut self) -> Self {
        self.include_frontmatter = true;
        self
    }

    /// Sets when page headers are written.
    pub fn with_page_headers(mut self, page_headers: PageHeaders) -> Self {
        self.page_headers = page_headers;
        self
    }

    /// Sets the text used for empty pages.
    pub fn with_empty_page_text(mut self, text: impl Into<String>) -> Self {
        self.empty_page_text = text.into();
        self
    }
}

/// When to write page header blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageHeaders {
    /// Only for documents with more than one page.
    #[default]
    Auto,
    /// Always, even for a single page.
    Always,
    /// Never.
    Never,
}

impl PageHeaders {
    /// Returns true if headers are written for a document of `page_count` pages.
    pub fn applies_to(self, page_count: usize) -> bool {
        match self {
            Self::Auto => page_count > 1,
            Self::Always => true,
            Self::Never => false,
        }
    }
}
