//! Markdown renderer implementation.

use super::RenderOptions;
use crate::error::Result;
use crate::model::{Document, Page};

/// Markdown renderer.
#[derive(Debug)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Creates a new renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders a document to Markdown string.
    ///
    /// Uses the document's pages and metadata; the `content` field is
    /// ignored.
    pub fn render(&self, document: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.include_frontmatter {
            self.render_frontmatter(document, &mut output);
        }

        let with_headers = self.options.page_headers.applies_to(document.pages.len());
        let pages: Vec<String> = document
            .pages
            .iter()
            .map(|page| self.render_page(page, with_headers))
            .collect();
        output.push_str(&pages.join("\n\n"));

        Ok(output.trim().to_string())
    }

    /// Renders YAML frontmatter.
    fn render_frontmatter(&self, document: &Document, output: &mut String) {
        output.push_str("---\n");

        if let Some(ref number) = document.metadata.process_number {
            output.push_str(&format!("processo: \"{}\"\n", escape_yaml(number)));
        }
        output.push_str(&format!("paginas: {}\n", document.metadata.page_count));
        if document.metadata.cover_exempt {
            output.push_str("capa_preservada: true\n");
        }

        output.push_str("---\n\n");
    }

    /// Renders one page, with its header block if requested.
    fn render_page(&self, page: &Page, with_header: bool) -> String {
        let body = if page.is_empty() {
            self.options.empty_page_text.as_str()
        } else {
            page.text.trim_matches('\n')
        };

        if !with_header {
            return body.to_string();
        }

        let delimiter = "=".repeat(self.options.delimiter_width);
        format!(
            "{}\n{}\n{}\n\n{}",
            delimiter,
            page_title(page),
            delimiter,
            body
        )
    }
}

/// `PÁGINA 3 | MOVIMENTAÇÃO 12 (Juntada)`
pub fn page_title(page: &Page) -> String {
    match &page.movement {
        Some(movement) => format!("PÁGINA {} | {}", page.number, movement),
        None => format!("PÁGINA {}", page.number),
    }
}

fn escape_yaml(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
