//! Non-fatal diagnostics emitted during classification.

use std::fmt;

use serde::Serialize;

use crate::events::SourceInfo;

/// A tag that fired inside a classified block but has no registered handler.
///
/// Unknown tags never abort processing; they are logged and collected so
/// callers can surface them after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The unregistered tag name.
    pub tag: String,
    /// The raw tag text.
    pub text: String,
    /// Scanner position of the enclosing block.
    pub source: SourceInfo,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown tag `@{}` {:?} at {}",
            self.tag, self.text, self.source
        )
    }
}
