//! envscope-core: environment variable topology analysis
//!
//! Scans a project tree for the environment variables its source code reads
//! and the variables its config files define, then reports the drift between
//! the two:
//!
//! - **Dead configs**: defined somewhere, never read
//! - **Orphan reads**: read somewhere, never defined
//! - **Inconsistent defaults**: one name read with different fallback values
//!
//! It can also emit a `.env.example` template listing every variable read.
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use envscope_core::prelude::*;
//!
//! let result = Envscope::new("/path/to/project")
//!     .ignore_names(["PATH", "HOME"])
//!     .analyze()?;
//!
//! for orphan in &result.orphans {
//!     println!("Never defined: {}", orphan);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`classify`]: File kind and source language detection
//! - [`patterns`]: Per-language read rules and default extraction
//! - [`definitions`]: Dotenv, Dockerfile and structured config parsing
//! - [`scan`]: Parallel file discovery and extraction
//! - [`reconcile`]: Dead, orphan and inconsistent-default detection
//! - [`generate`]: `.env.example` generation
//! - [`builder`]: Fluent builder API for configuration
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `yaml` (default): Read definitions from YAML manifests
//! - `full`: Enable all optional features

pub mod builder;
pub mod classify;
pub mod config;
pub mod definitions;
pub mod error;
pub mod generate;
pub mod logging;
pub mod model;
pub mod patterns;
pub mod prelude;
pub mod reconcile;
pub mod report;
pub mod scan;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{EnvscopeError, EnvscopeResult, IoResultExt, SkipReason};

// Records
pub use model::{is_identifier, unquote, EnvDef, EnvRead};

// Builder API
pub use builder::{is_ignored, validate_pattern, AnalysisResult, Envscope};

// Classification
pub use classify::{FileKind, Language};

// Extraction
pub use definitions::{extract_defs, extract_dockerfile, extract_dotenv};
pub use patterns::{extract_reads, rules_for, DefaultStyle, ReadRule};

// Configuration
pub use config::{load_config, EnvscopeConfig, OutputConfig, CONFIG_FILE};

// Reconciliation and generation
pub use generate::{generate_example, write_example};
pub use reconcile::{find_dead, find_inconsistent, find_orphans};

// Logging
pub use logging::init_structured_logging;

// Reporting
pub use report::{print_json, print_plain, render_json, render_text};

// File scanning
pub use scan::{
    gather_files, normalize_path_string, scan, scan_file, scan_with_excludes,
    FileScan, ScanFile, ScanResult, EXCLUDED_DIRS,
};

#[cfg(test)]
mod tests;
