//! Drift detection: compare what the code reads against what config defines.
//!
//! All three functions are total and pure. Names are compared exactly
//! (`Port` and `PORT` are different variables), and output order always
//! follows input order so reports stay diff-stable across runs.
//!
//! Performance characteristics:
//! - `find_dead` / `find_orphans`: O(|reads| + |defs|) with one hash set
//! - `find_inconsistent`: O(|reads|) single grouping pass

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::model::{EnvDef, EnvRead};

/// Definitions whose name is never read. Order follows `defs`.
pub fn find_dead(reads: &[EnvRead], defs: &[EnvDef]) -> Vec<EnvDef> {
    let read_names: HashSet<&str> = reads.iter().map(|r| r.name.as_str()).collect();
    defs.iter()
        .filter(|d| !read_names.contains(d.name.as_str()))
        .cloned()
        .collect()
}

/// Reads whose name is never defined. Order follows `reads`.
pub fn find_orphans(reads: &[EnvRead], defs: &[EnvDef]) -> Vec<EnvRead> {
    let defined: HashSet<&str> = defs.iter().map(|d| d.name.as_str()).collect();
    reads
        .iter()
        .filter(|r| !defined.contains(r.name.as_str()))
        .cloned()
        .collect()
}

/// Names read with two or more distinct non-empty defaults.
///
/// Each flagged name maps to *all* of its reads, including ones without a
/// default. Defaults are compared by exact string equality: `"8080"` and
/// `8080` differ, as do `"true"` and `"True"`. Names appear in first-seen
/// order, and reads within a group keep their input order.
pub fn find_inconsistent(reads: &[EnvRead]) -> IndexMap<String, Vec<EnvRead>> {
    let mut groups: IndexMap<&str, Vec<&EnvRead>> = IndexMap::new();
    for read in reads {
        groups.entry(read.name.as_str()).or_default().push(read);
    }

    groups
        .into_iter()
        .filter(|(_, group)| {
            let distinct: HashSet<&str> = group
                .iter()
                .filter(|r| r.has_default())
                .map(|r| r.default.as_str())
                .collect();
            distinct.len() >= 2
        })
        .map(|(name, group)| (name.to_string(), group.into_iter().cloned().collect()))
        .collect()
}
