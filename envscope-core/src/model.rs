//! Record types produced by a scan.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One textual reference in source code that reads an environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvRead {
    /// Variable name, exactly as written (case-sensitive)
    pub name: String,
    /// Path relative to the scan root, forward slashes
    pub file: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Raw fallback literal at the call site, empty when there is none
    #[serde(default)]
    pub default: String,
    /// Short label of the access idiom, e.g. `os.getenv`
    #[serde(default)]
    pub accessor: String,
}

impl EnvRead {
    pub fn new(
        name: impl Into<String>,
        file: impl Into<String>,
        line: usize,
        default: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            line,
            default: default.into(),
            accessor: String::new(),
        }
    }

    /// Attach the accessor label.
    pub fn with_accessor(mut self, accessor: impl Into<String>) -> Self {
        self.accessor = accessor.into();
        self
    }

    /// Whether the call site supplies a fallback value.
    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }
}

impl fmt::Display for EnvRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.name, self.file, self.line)
    }
}

/// One key defined in a configuration artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvDef {
    /// Key as written
    pub name: String,
    /// Path relative to the scan root, forward slashes
    pub file: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Value text, one layer of quotes removed (informational)
    #[serde(default)]
    pub value: String,
}

impl EnvDef {
    pub fn new(name: impl Into<String>, file: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            line,
            value: String::new(),
        }
    }

    /// Attach the defined value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

impl fmt::Display for EnvDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.name, self.file, self.line)
    }
}

/// Check that `name` is a plausible variable identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip one layer of matching surrounding quotes (`"`, `'` or `` ` ``).
pub fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if matches!(first, b'"' | b'\'' | b'`') && bytes[bytes.len() - 1] == first {
            return &text[1..text.len() - 1];
        }
    }
    text
}
