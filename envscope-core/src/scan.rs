//! Deterministic file discovery and extraction with efficient directory pruning.
//!
//! Performance characteristics:
//! - Early directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Per-file extraction in parallel via Rayon's indexed `par_iter`
//! - Results are merged in sorted path order, so output never depends on
//!   thread scheduling
//!
//! Resilience:
//! - Only an unusable root is an error
//! - Unreadable, oversized, binary, non-UTF-8 and malformed files are
//!   skipped with a warning and counted

use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::classify::FileKind;
use crate::definitions::extract_defs;
use crate::error::{EnvscopeError, EnvscopeResult, SkipReason};
use crate::model::{EnvDef, EnvRead};
use crate::patterns::extract_reads;

/// Directories to exclude by default: VCS metadata, dependencies, build output.
///
/// `.cargo` is scanned: `.cargo/config.toml` may define variables under `[env]`.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "vendor",
    "target",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    ".next",
    ".idea",
];

/// Maximum file size to scan (10 MB).
const MAX_FILE_SIZE: usize = 10_000_000;

/// How many leading bytes are inspected for a NUL when sniffing binaries.
const BINARY_SNIFF_LEN: usize = 8192;

/// A file selected for extraction.
#[derive(Debug, Clone)]
pub struct ScanFile {
    /// Absolute (or root-joined) path used for reading
    pub path: PathBuf,
    /// Root-relative path with forward slashes, recorded on every record
    pub relative: String,
    pub kind: FileKind,
}

/// Outcome of extracting one file.
#[derive(Debug)]
pub enum FileScan {
    Reads(Vec<EnvRead>),
    Defs(Vec<EnvDef>),
    Skipped(PathBuf, SkipReason),
}

/// Everything a scan produced.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Reads in (file path, line) order
    pub reads: Vec<EnvRead>,
    /// Definitions in (file path, line) order
    pub defs: Vec<EnvDef>,
    /// Files that were classified and extracted
    pub files_scanned: usize,
    /// Files that were classified but skipped
    pub files_skipped: usize,
}

impl ScanResult {
    /// Split into the `(reads, defs)` pair.
    pub fn into_parts(self) -> (Vec<EnvRead>, Vec<EnvDef>) {
        (self.reads, self.defs)
    }
}

/// Normalize a path string to use forward slashes consistently.
#[inline]
pub fn normalize_path_string(path: &str) -> String {
    path.replace('\\', "/")
}

/// Checks if a directory entry should be pruned (excluded from traversal).
///
/// Never prunes the root itself, even when its name is in the exclude set.
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// Fail fast unless `root` is an existing directory.
pub fn validate_root(root: &Path) -> EnvscopeResult<()> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(EnvscopeError::path(root, "not a directory")),
        Err(e) => Err(EnvscopeError::path(root, e.to_string())),
    }
}

/// Gathers every classifiable file under `root`, sorted by relative path.
///
/// Combines default exclusions with `extra_excludes` for early subtree pruning.
/// Walk errors on individual entries (permissions, broken links) are logged
/// and skipped.
pub fn gather_files(root: &Path, extra_excludes: &[&str]) -> EnvscopeResult<Vec<ScanFile>> {
    validate_root(root)?;

    let excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(extra_excludes.iter().copied())
        .collect();

    let mut files: Vec<ScanFile> = WalkDir::new(root)
        .into_iter()
        // filter_entry prunes entire subtrees before iteration
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(error = %e, "skipping unwalkable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let kind = FileKind::classify(e.path())?;
            let relative = e.path().strip_prefix(root).unwrap_or(e.path());
            Some(ScanFile {
                relative: normalize_path_string(&relative.to_string_lossy()),
                path: e.into_path(),
                kind,
            })
        })
        .collect();

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

/// Read a file as UTF-8 text, or say why it cannot be scanned.
fn read_text(path: &Path) -> Result<String, SkipReason> {
    let bytes = fs::read(path).map_err(|e| SkipReason::Unreadable(e.to_string()))?;

    if bytes.len() > MAX_FILE_SIZE {
        return Err(SkipReason::TooLarge(bytes.len()));
    }
    if bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0) {
        return Err(SkipReason::Binary);
    }
    String::from_utf8(bytes).map_err(|_| SkipReason::NotUtf8)
}

/// Extracts one file. This is the atomic unit of work for parallel processing.
pub fn scan_file(file: &ScanFile) -> FileScan {
    let content = match read_text(&file.path) {
        Ok(c) => c,
        Err(reason) => return FileScan::Skipped(file.path.clone(), reason),
    };

    match file.kind {
        FileKind::Source(lang) => FileScan::Reads(extract_reads(&content, &file.relative, lang)),
        kind => match extract_defs(&content, &file.relative, kind) {
            Ok(defs) => FileScan::Defs(defs),
            Err(reason) => FileScan::Skipped(file.path.clone(), reason),
        },
    }
}

/// Scan `root` with extra excluded directory names.
///
/// Fails with [`EnvscopeError::Path`] before reading anything when `root`
/// is missing or not a directory.
pub fn scan_with_excludes(root: &Path, extra_excludes: &[&str]) -> EnvscopeResult<ScanResult> {
    let files = gather_files(root, extra_excludes)?;
    let sources = files.iter().filter(|f| f.kind.is_source()).count();
    debug!(
        root = %root.display(),
        sources,
        configs = files.len() - sources,
        "scanning"
    );

    // Indexed par_iter: collect() preserves the sorted input order
    let outcomes: Vec<FileScan> = files.par_iter().map(scan_file).collect();

    let mut result = ScanResult::default();
    for outcome in outcomes {
        match outcome {
            FileScan::Reads(reads) => {
                result.files_scanned += 1;
                result.reads.extend(reads);
            }
            FileScan::Defs(defs) => {
                result.files_scanned += 1;
                result.defs.extend(defs);
            }
            FileScan::Skipped(path, reason) => {
                warn!(file = %path.display(), %reason, "skipping file");
                result.files_skipped += 1;
            }
        }
    }

    debug!(
        reads = result.reads.len(),
        defs = result.defs.len(),
        skipped = result.files_skipped,
        "scan complete"
    );
    Ok(result)
}

/// Scan `root` and return every read and definition, in path then line order.
pub fn scan(root: &Path) -> EnvscopeResult<(Vec<EnvRead>, Vec<EnvDef>)> {
    scan_with_excludes(root, &[]).map(ScanResult::into_parts)
}
