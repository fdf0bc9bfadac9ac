//! Async API for non-blocking document processing.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! jurimd = { version = "0.1", features = ["async"] }
//! ```

use crate::error::{Error, Result};
use crate::model::Document;
use crate::pipeline::Processor;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}

/// Asynchronously processes text with the built-in configuration.
pub async fn process_text(text: impl Into<String>) -> Result<Document> {
    let text = text.into();
    // Processing is CPU-bound, so it runs in a blocking task
    tokio::task::spawn_blocking(move || crate::process_text(&text))
        .await
        .map_err(join_error)?
}

/// Asynchronously reads and processes a text file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> jurimd::Result<()> {
/// let document = jurimd::async_api::process_file("processo.txt").await?;
/// println!("Pages: {}", document.page_count());
/// # Ok(())
/// # }
/// ```
pub async fn process_file(path: impl AsRef<Path>) -> Result<Document> {
    let text = fs::read_to_string(path).await?;
    process_text(text).await
}

/// Asynchronously processes text read from an async reader.
pub async fn process_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<Document> {
    let mut text = String::new();
    reader.read_to_string(&mut text).await?;
    process_text(text).await
}

/// Asynchronously converts a text file to cleaned Markdown.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> jurimd::Result<()> {
/// let markdown = jurimd::async_api::to_markdown("processo.txt").await?;
/// tokio::fs::write("processo_texto-limpo.md", markdown).await?;
/// # Ok(())
/// # }
/// ```
pub async fn to_markdown(path: impl AsRef<Path>) -> Result<String> {
    Ok(process_file(path).await?.content)
}

/// Shares one compiled [`Processor`] across async tasks.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> jurimd::Result<()> {
/// use jurimd::async_api::AsyncProcessor;
/// use jurimd::{Config, Processor};
///
/// let processor = AsyncProcessor::new(Processor::new(&Config::builtin()?)?);
/// let document = processor.process_file("processo.txt").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AsyncProcessor {
    inner: Arc<Processor>,
}

impl AsyncProcessor {
    /// Wraps a processor.
    pub fn new(processor: Processor) -> Self {
        Self {
            inner: Arc::new(processor),
        }
    }

    /// Returns the wrapped processor.
    pub fn processor(&self) -> &Processor {
        &self.inner
    }

    /// Processes text in a blocking task.
    pub async fn process_text(&self, text: impl Into<String>) -> Result<Document> {
        let text = text.into();
        let processor = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || processor.process_text(&text))
            .await
            .map_err(join_error)?
    }

    /// Reads and processes a text file.
    pub async fn process_file(&self, path: impl AsRef<Path>) -> Result<Document> {
        let text = fs::read_to_string(path).await?;
        self.process_text(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[tokio::test]
    async fn test_process_text() {
        let document = process_text("PODER JUDICIÁRIO\nSENTENÇA").await.unwrap();
        assert_eq!(document.content, "# SENTENÇA");
    }

    #[tokio::test]
    async fn test_shared_processor() {
        let processor =
            AsyncProcessor::new(Processor::new(&Config::builtin().unwrap()).unwrap());
        let other = processor.clone();
        let a = processor.process_text("--- Página 1 ---\nCapa\n--- Página 2 ---\nCorpo");
        let b = other.process_text("Texto único");

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a.page_count(), 2);
        assert_eq!(b.content, "Texto único");
    }

    #[tokio::test]
    async fn test_process_reader() {
        let reader: &[u8] = "DESPACHO\nCite-se.".as_bytes();
        let document = process_reader(reader).await.unwrap();
        assert_eq!(document.content, "# DESPACHO\nCite-se.");
    }
}
