//! Pages and the markers found on them.

use serde::Serialize;
use std::fmt;

/// One page of the source document.
///
/// `index` and `is_cover` are fixed when the page is split off the input;
/// `text` is rewritten at each stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    index: usize,
    /// Page number printed in the page marker (equals the index when unmarked).
    pub number: usize,
    is_cover: bool,
    /// Current text of the page.
    pub text: String,
    /// Movement descriptor found at the top of the page.
    pub movement: Option<Movement>,
    /// Headings recognised on the page, in line order.
    pub headings: Vec<HeadingMarker>,
    /// Length of the page before processing, in chars.
    pub original_length: usize,
    /// Chars removed by noise removal.
    pub removed_chars: usize,
    /// Number of spans protected from noise removal.
    pub protected_blocks: usize,
}

impl Page {
    /// Creates a page from its raw text.
    pub fn new(index: usize, number: usize, is_cover: bool, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index,
            number,
            is_cover,
            original_length: text.chars().count(),
            text,
            movement: None,
            headings: Vec::new(),
            removed_chars: 0,
            protected_blocks: 0,
        }
    }

    /// 1-based position of the page in the input.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns true for the cover page, which is exempt from cleaning.
    pub fn is_cover(&self) -> bool {
        self.is_cover
    }

    /// Returns true if the page has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A procedural movement descriptor, e.g. `Movimentação 12: Juntada`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movement {
    /// Movement number as printed.
    pub number: String,
    /// Movement type, if the descriptor carries one.
    pub kind: Option<String>,
}

impl Movement {
    pub fn new(number: impl Into<String>, kind: Option<String>) -> Self {
        Self {
            number: number.into(),
            kind,
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MOVIMENTAÇÃO {}", self.number)?;
        if let Some(kind) = &self.kind {
            write!(f, " ({})", kind)?;
        }
        Ok(())
    }
}

/// Heading level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    /// All levels, most significant first.
    pub const ALL: [HeadingLevel; 4] = [Self::H1, Self::H2, Self::H3, Self::H4];

    /// Converts a 1-based level number.
    pub fn from_u8(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::H1),
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            4 => Some(Self::H4),
            _ => None,
        }
    }

    /// The 1-based level number.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
            Self::H4 => 4,
        }
    }

    /// Markdown prefix (`#` to `####`).
    pub fn prefix(self) -> &'static str {
        &"####"[..usize::from(self.as_u8())]
    }
}

/// A line recognised as a heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingMarker {
    pub level: HeadingLevel,
    /// Heading text without the Markdown prefix.
    pub text: String,
    /// 0-based line position in the final page text.
    pub line: usize,
    /// Index of the matching pattern within its level.
    pub rule: usize,
}
