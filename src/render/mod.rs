//! Markdown rendering for processed documents.

mod markdown;
mod options;

pub use markdown::{page_title, MarkdownRenderer};
pub use options::{PageHeaders, RenderOptions};

use crate::error::Result;
use crate::model::Document;
use std::io::Write;
use std::path::Path;

/// Renders the pages of `document` to Markdown.
pub fn render_markdown(document: &Document, options: &RenderOptions) -> Result<String> {
    MarkdownRenderer::new(options.clone()).render(document)
}

/// Renders `document` and writes it to `path`, creating missing parent
/// directories.
pub fn render_to_file(
    document: &Document,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<()> {
    let path = path.as_ref();
    let markdown = render_markdown(document, options)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, markdown)?;
    Ok(())
}

/// Renders `document` into `writer`, ending with a newline.
pub fn render_to_writer<W: Write>(
    document: &Document,
    writer: &mut W,
    options: &RenderOptions,
) -> Result<()> {
    let markdown = render_markdown(document, options)?;
    writeln!(writer, "{}", markdown)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Page;

    fn two_pages() -> Document {
        let mut doc = Document::new();
        doc.pages.push(Page::new(1, 1, true, "Capa"));
        doc.pages.push(Page::new(2, 2, false, ""));
        doc.metadata.page_count = 2;
        doc
    }

    #[test]
    fn test_render_to_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saida").join("autos_texto-limpo.md");
        let options = RenderOptions::default().with_empty_page_text("(vazia)");

        render_to_file(&two_pages(), &path, &options).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_markdown(&two_pages(), &options).unwrap());
        assert!(written.ends_with("(vazia)"));
    }

    #[test]
    fn test_render_to_writer() {
        let mut buffer = Vec::new();
        let options = RenderOptions::default().with_page_headers(PageHeaders::Never);

        render_to_writer(&two_pages(), &mut buffer, &options).unwrap();

        let written = String::from_utf8(buffer).unwrap();
        assert_eq!(written, "Capa\n\n*Página sem conteúdo útil*\n");
    }
}
