//! Example configuration generation from read sites.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{EnvscopeResult, IoResultExt};
use crate::model::{unquote, EnvRead};

/// Build a `KEY=value` template, one line per distinct name read.
///
/// Names are emitted in lexicographic order. The value is the first
/// non-empty default seen for that name (in `reads` order) with one layer
/// of surrounding quotes removed, or empty when no read supplies one. An
/// explicit empty literal (`""`) counts as a default and is kept.
/// Every line is newline-terminated; no reads yields an empty string.
pub fn generate_example(reads: &[EnvRead]) -> String {
    let mut chosen: BTreeMap<&str, Option<&str>> = BTreeMap::new();
    for read in reads {
        let slot = chosen.entry(read.name.as_str()).or_insert(None);
        if slot.is_none() && read.has_default() {
            *slot = Some(unquote(&read.default));
        }
    }

    chosen
        .into_iter()
        .map(|(name, value)| format!("{}={}\n", name, value.unwrap_or("")))
        .collect()
}

/// Write the template for `reads` to `path`, returning the number of
/// variables listed.
pub fn write_example(path: &Path, reads: &[EnvRead]) -> EnvscopeResult<usize> {
    fs::write(path, generate_example(reads)).with_path(path)?;
    let vars = reads.iter().map(|r| r.name.as_str()).collect::<HashSet<_>>();
    Ok(vars.len())
}
