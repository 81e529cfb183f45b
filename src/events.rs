//! Scanner event contract.
//!
//! The engine never reads source files itself. An external scanner walks the
//! sources, recognizes documentation-comment regions, and emits an ordered
//! stream of [`ScanEvent`]s: one `BeginBlock`, zero or more `Tag`s, then one
//! `EndBlock` per region. Any iterator of events works, which keeps the engine
//! testable with synthetic streams.

use serde::Serialize;

/// A single named annotation extracted from a documentation comment.
///
/// `text` is the raw tag body exactly as the scanner emitted it — no trimming
/// happens before the tag handlers run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub text: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Scanner position at the time a block ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    /// File path the scanner is currently reading.
    pub file: String,
    /// Line number (1-based).
    pub line: usize,
}

impl SourceInfo {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One signal from the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A documentation-comment region opened. `leading_text` is the free text
    /// before the first explicit tag (may be empty).
    BeginBlock { leading_text: String },
    /// An explicit tag inside the current region, in arrival order.
    Tag { name: String, text: String },
    /// The region closed. Carries the scanner's position so the engine can
    /// stamp source locations without holding a scanner handle.
    EndBlock { source: SourceInfo },
}

impl ScanEvent {
    pub fn begin(leading_text: impl Into<String>) -> Self {
        Self::BeginBlock {
            leading_text: leading_text.into(),
        }
    }

    pub fn tag(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Tag {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn end(file: impl Into<String>, line: usize) -> Self {
        Self::EndBlock {
            source: SourceInfo::new(file, line),
        }
    }
}
