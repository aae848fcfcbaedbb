//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use envscope_core::prelude::*;
//! ```
//!
//! Covers a typical scan-and-report run without the extraction internals.

// Core records and errors
pub use crate::error::{EnvscopeError, EnvscopeResult};
pub use crate::model::{EnvDef, EnvRead};

// Scanning
pub use crate::scan::scan;

// Drift detection
pub use crate::reconcile::{find_dead, find_inconsistent, find_orphans};

// Template generation
pub use crate::generate::generate_example;

// Configuration
pub use crate::config::{load_config, EnvscopeConfig};

// Builder API
pub use crate::builder::{AnalysisResult, Envscope};
