//! Content protection.
//!
//! Spans matched by the preserve patterns are swapped for opaque placeholder
//! tokens before any destructive pass and swapped back afterwards. A token is
//! built from Private Use Area code points only:
//!
//! ```text
//! U+E000  <id as hex digits, each mapped to U+E010..U+E01F>  U+E001
//! ```
//!
//! It contains no whitespace, no ASCII and no alphanumeric character, so no
//! configured pattern written for legal text can match it by accident. The
//! whole reserved alphabet is stripped from the input by
//! [`normalize_input`](crate::cleanup::normalize_input), so a token can never
//! collide with source text.

use crate::rules::CompiledPattern;
use std::borrow::Cow;
use std::ops::Range;

/// Opens a placeholder.
pub const PLACEHOLDER_START: char = '\u{E000}';
/// Closes a placeholder.
pub const PLACEHOLDER_END: char = '\u{E001}';

const DIGIT_BASE: u32 = 0xE010;

/// Returns true for code points reserved for placeholders.
pub fn is_reserved(c: char) -> bool {
    matches!(c, PLACEHOLDER_START | PLACEHOLDER_END | '\u{E010}'..='\u{E01F}')
}

/// Removes every reserved code point from `text`.
pub fn strip_reserved(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_reserved) {
        Cow::Owned(text.chars().filter(|c| !is_reserved(*c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Returns true if `text` contains (part of) a placeholder.
pub fn contains_placeholder(text: &str) -> bool {
    text.contains(PLACEHOLDER_START) || text.contains(PLACEHOLDER_END)
}

/// Byte ranges of every complete placeholder in `text`, in order.
pub fn placeholder_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open = None;

    for (pos, c) in text.char_indices() {
        match c {
            PLACEHOLDER_START => open = Some(pos),
            PLACEHOLDER_END => {
                if let Some(start) = open.take() {
                    spans.push(start..pos + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    spans
}

/// Builds the placeholder token for block `id`.
pub fn placeholder(id: usize) -> String {
    let hex = format!("{:x}", id);
    let mut token = String::with_capacity(hex.len() * 3 + 6);
    token.push(PLACEHOLDER_START);
    for digit in hex.chars() {
        // to_digit(16) cannot fail on the output of {:x}
        let value = digit.to_digit(16).unwrap_or(0);
        token.extend(char::from_u32(DIGIT_BASE + value));
    }
    token.push(PLACEHOLDER_END);
    token
}

/// A span of text withheld from destructive passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedBlock {
    /// Page-local id, assigned in position order.
    pub id: usize,
    /// Token standing in for the original text.
    pub placeholder: String,
    /// The protected text.
    pub original: String,
}

/// Page text with its protected spans replaced by placeholders.
#[derive(Debug, Clone, Default)]
pub struct ProtectedText {
    pub text: String,
    pub blocks: Vec<ProtectedBlock>,
}

/// Result of [`restore`].
#[derive(Debug, Clone, Default)]
pub struct Restored {
    pub text: String,
    /// Ids of blocks whose placeholder had disappeared. Their original text
    /// was appended to the end of `text`.
    pub lost: Vec<usize>,
}

/// Replaces preserve pattern matches with placeholders.
#[derive(Debug, Clone, Copy)]
pub struct ContentProtector<'a> {
    patterns: &'a [CompiledPattern],
}

impl<'a> ContentProtector<'a> {
    pub fn new(patterns: &'a [CompiledPattern]) -> Self {
        Self { patterns }
    }

    /// Protects every non-empty, non-overlapping match.
    ///
    /// Patterns are tried in order; a match that overlaps a span accepted by
    /// an earlier pattern (or earlier in the same pattern) is ignored.
    pub fn protect(&self, text: &str) -> ProtectedText {
        let mut accepted: Vec<Range<usize>> = Vec::new();

        for pattern in self.patterns {
            for m in pattern.regex().find_iter(text) {
                if m.is_empty() {
                    continue;
                }
                let range = m.range();
                if accepted.iter().any(|a| overlaps(a, &range)) {
                    continue;
                }
                accepted.push(range);
            }
        }

        if accepted.is_empty() {
            return ProtectedText {
                text: text.to_string(),
                blocks: Vec::new(),
            };
        }

        accepted.sort_by_key(|range| range.start);

        let mut out = String::with_capacity(text.len());
        let mut blocks = Vec::with_capacity(accepted.len());
        let mut last = 0;

        for (id, range) in accepted.into_iter().enumerate() {
            let token = placeholder(id);
            out.push_str(&text[last..range.start]);
            out.push_str(&token);
            blocks.push(ProtectedBlock {
                id,
                placeholder: token,
                original: text[range.clone()].to_string(),
            });
            last = range.end;
        }
        out.push_str(&text[last..]);

        log::trace!("protected {} spans", blocks.len());

        ProtectedText { text: out, blocks }
    }
}

/// Puts the original text back in place of each placeholder.
///
/// Each placeholder is replaced once, literally. A block whose placeholder is
/// gone is appended on its own line at the end and reported in
/// [`Restored::lost`].
pub fn restore(text: &str, blocks: &[ProtectedBlock]) -> Restored {
    let mut out = text.to_string();
    let mut lost = Vec::new();

    for block in blocks {
        if out.contains(&block.placeholder) {
            out = out.replacen(&block.placeholder, &block.original, 1);
        } else {
            lost.push(block.id);
        }
    }

    for id in &lost {
        if let Some(block) = blocks.iter().find(|b| b.id == *id) {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&block.original);
        }
    }

    Restored { text: out, lost }
}

pub(crate) fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
