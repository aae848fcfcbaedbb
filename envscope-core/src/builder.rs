//! Builder pattern API for envscope analysis.
//!
//! Provides a fluent interface for configuring and running a scan plus
//! reconciliation:
//!
//! ```rust,ignore
//! use envscope_core::prelude::*;
//!
//! let result = Envscope::new("/path/to/project")
//!     .exclude_dirs(["fixtures"])
//!     .ignore_names(["PATH", "HOME"])
//!     .analyze()?;
//!
//! for dead in &result.dead {
//!     println!("Dead config: {}", dead);
//! }
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::warn;

use crate::config::load_config;
use crate::error::{EnvscopeError, EnvscopeResult};
use crate::model::{EnvDef, EnvRead};
use crate::reconcile::{find_dead, find_inconsistent, find_orphans};
use crate::scan::scan_with_excludes;

/// Builder for configuring an analysis run.
#[derive(Debug, Clone)]
pub struct Envscope {
    /// Root directory to scan
    root: PathBuf,

    /// Whether to merge settings from envscope.toml at the root
    use_config: bool,

    /// Custom excluded directories
    excluded_dirs: Vec<String>,

    /// Variable name patterns left out of every report
    ignored_patterns: Vec<String>,
}

impl Envscope {
    /// Create a new analysis builder for the given path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            use_config: true,
            excluded_dirs: Vec::new(),
            ignored_patterns: Vec::new(),
        }
    }

    /// Enable or disable loading envscope.toml.
    pub fn with_config(mut self, enabled: bool) -> Self {
        self.use_config = enabled;
        self
    }

    /// Add directories to exclude from scanning.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Add patterns for variable names to ignore.
    pub fn ignore_names(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Run the scan and reconciliation.
    ///
    /// Fails when the root is unusable or an ignore pattern is invalid. A
    /// malformed envscope.toml is logged and ignored.
    pub fn analyze(&self) -> EnvscopeResult<AnalysisResult> {
        for pattern in &self.ignored_patterns {
            validate_pattern(pattern).map_err(|msg| EnvscopeError::invalid_argument(msg))?;
        }

        // 1. Merge config-file settings with builder settings
        let mut excluded = self.excluded_dirs.clone();
        let mut ignored = self.ignored_patterns.clone();
        if self.use_config && self.root.is_dir() {
            match load_config(&self.root) {
                Ok(Some(cfg)) => {
                    excluded.extend(cfg.exclude.unwrap_or_default());
                    ignored.extend(cfg.ignore.unwrap_or_default());
                }
                Ok(None) => {}
                Err(e) => warn!(error = %format!("{:#}", e), "config load failed"),
            }
        }

        // 2. Scan
        let excluded_refs: Vec<&str> = excluded.iter().map(String::as_str).collect();
        let scan = scan_with_excludes(&self.root, &excluded_refs)?;

        // 3. Drop ignored names from both sides
        let reads: Vec<EnvRead> = scan
            .reads
            .into_iter()
            .filter(|r| !is_ignored(&r.name, &ignored))
            .collect();
        let defs: Vec<EnvDef> = scan
            .defs
            .into_iter()
            .filter(|d| !is_ignored(&d.name, &ignored))
            .collect();

        // 4. Reconcile
        let dead = find_dead(&reads, &defs);
        let orphans = find_orphans(&reads, &defs);
        let inconsistent = find_inconsistent(&reads);

        Ok(AnalysisResult {
            root: self.root.clone(),
            reads,
            defs,
            dead,
            orphans,
            inconsistent,
            files_scanned: scan.files_scanned,
            files_skipped: scan.files_skipped,
        })
    }
}

/// Check that an ignore pattern is an exact name, `PREFIX*` or `*SUFFIX`.
///
/// Returns a description of the problem on failure.
pub fn validate_pattern(pattern: &str) -> Result<(), String> {
    let core = pattern
        .strip_suffix('*')
        .or_else(|| pattern.strip_prefix('*'))
        .unwrap_or(pattern);
    if core.is_empty() {
        return Err(format!("ignore pattern '{}' matches nothing specific", pattern));
    }
    if core.contains('*') {
        return Err(format!(
            "ignore pattern '{}' may only have a leading or trailing '*'",
            pattern
        ));
    }
    Ok(())
}

/// Check if a variable name matches any ignore pattern.
///
/// Patterns are exact names, `PREFIX*` or `*SUFFIX`. Matching is
/// case-sensitive like every other name comparison.
pub fn is_ignored(name: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        if let Some(prefix) = pattern.strip_suffix('*') {
            name.starts_with(prefix)
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            name.ends_with(suffix)
        } else {
            name == pattern
        }
    })
}

/// Result of running an analysis.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Root path that was analyzed
    pub root: PathBuf,

    /// Every read found (after ignore filtering)
    pub reads: Vec<EnvRead>,

    /// Every definition found (after ignore filtering)
    pub defs: Vec<EnvDef>,

    /// Definitions never read
    pub dead: Vec<EnvDef>,

    /// Reads never defined
    pub orphans: Vec<EnvRead>,

    /// Names read with conflicting defaults
    pub inconsistent: IndexMap<String, Vec<EnvRead>>,

    /// Files extracted
    pub files_scanned: usize,

    /// Files skipped as unreadable, binary, oversized or malformed
    pub files_skipped: usize,
}

impl AnalysisResult {
    /// Check if any drift was found.
    pub fn has_issues(&self) -> bool {
        !self.dead.is_empty() || !self.orphans.is_empty() || !self.inconsistent.is_empty()
    }

    /// Total count of reported issues (one per inconsistent name).
    pub fn issue_count(&self) -> usize {
        self.dead.len() + self.orphans.len() + self.inconsistent.len()
    }

    /// Number of distinct variable names read.
    pub fn distinct_read_names(&self) -> usize {
        self.reads
            .iter()
            .map(|r| r.name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}
