//! # jurimd
//!
//! Configuration-driven cleanup of text extracted from Brazilian legal PDFs
//! (court filings, police inquiries) into structured Markdown.
//!
//! ## Pipeline
//!
//! - **Normalization**: NFC, line endings, control and Private Use Area
//!   characters
//! - **Page splitting**: on the `--- Página N ---` markers written by the
//!   extractor; page 1 of a multi-page document is the cover page and is
//!   exempt from cleaning
//! - **Heading classification**: H1 to H4 from configured patterns
//! - **Noise removal**: ordered rule groups, with preserve patterns shielding
//!   legally relevant spans
//! - **Fragment cleaning** and **assembly** with per-page headers and
//!   statistics
//!
//! Every pattern comes from two TOML files (`limpeza.toml`, `hierarquia.toml`);
//! copies of both ship with the crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> jurimd::Result<()> {
//!     let document = jurimd::process_file("processo.txt")?;
//!
//!     println!("{}", document.content);
//!     println!("removed {:.1}%", document.statistics.removed_percentage);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `async`: Async API with Tokio

pub mod cleanup;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod noise;
pub mod pages;
pub mod pipeline;
pub mod process_options;
pub mod protect;
pub mod render;
pub mod rules;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use cleanup::{CleanupOptions, FragmentCleaner};
pub use config::{CleaningConfig, Config, HierarchyConfig};
pub use error::{Error, Result, Warning};
pub use hierarchy::HierarchyClassifier;
pub use model::{Document, HeadingLevel, Page, Statistics};
pub use noise::NoiseRemovalEngine;
pub use pages::PageSplitter;
pub use pipeline::Processor;
pub use process_options::{ErrorMode, ProcessOptions};
pub use protect::ContentProtector;
pub use render::{PageHeaders, RenderOptions};
pub use rules::{PatternSet, RuleBook, RuleGroup};

use std::path::Path;

/// Processes text with the built-in configuration.
///
/// # Example
///
/// ```
/// let document = jurimd::process_text("PODER JUDICIÁRIO\nDECISÃO\nDefiro o pedido.")?;
/// assert_eq!(document.content, "# DECISÃO\nDefiro o pedido.");
/// # Ok::<(), jurimd::Error>(())
/// ```
pub fn process_text(text: &str) -> Result<Document> {
    Processor::new(&Config::builtin()?)?.process_text(text)
}

/// Reads a UTF-8 text file and processes it with the built-in configuration.
pub fn process_file(path: impl AsRef<Path>) -> Result<Document> {
    let text = std::fs::read_to_string(path)?;
    process_text(&text)
}

/// Reads a UTF-8 text file and processes it with the given configuration.
pub fn process_file_with_config(path: impl AsRef<Path>, config: &Config) -> Result<Document> {
    let text = std::fs::read_to_string(path)?;
    Processor::new(config)?.process_text(&text)
}

/// Converts a text file to cleaned Markdown with the built-in configuration.
///
/// # Example
///
/// ```no_run
/// let markdown = jurimd::to_markdown("processo.txt")?;
/// std::fs::write("processo_texto-limpo.md", markdown)?;
/// # Ok::<(), jurimd::Error>(())
/// ```
pub fn to_markdown(path: impl AsRef<Path>) -> Result<String> {
    Ok(process_file(path)?.content)
}
