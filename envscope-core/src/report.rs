//! Output formatting - plaintext and JSON.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write as _;

use crate::builder::AnalysisResult;
use crate::model::unquote;

/// Width the variable name column is padded to in text output.
const NAME_WIDTH: usize = 30;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    dead: Vec<Location<'a>>,
    orphans: Vec<Location<'a>>,
    inconsistent: IndexMap<&'a str, Vec<DefaultSite<'a>>>,
}

#[derive(Debug, Serialize)]
struct Summary {
    reads: usize,
    defs: usize,
}

#[derive(Debug, Serialize)]
struct Location<'a> {
    name: &'a str,
    file: &'a str,
    line: usize,
}

#[derive(Debug, Serialize)]
struct DefaultSite<'a> {
    default: &'a str,
    file: &'a str,
    line: usize,
}

/// Renders the human-readable report.
///
/// Sections are shown only when non-empty; a clean result prints a single
/// all-clear line after the header.
pub fn render_text(result: &AnalysisResult) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "EnvScope Scan: {}", result.root.display());
    let _ = writeln!(
        out,
        "   {} env reads in source, {} definitions in config",
        result.reads.len(),
        result.defs.len()
    );

    if !result.dead.is_empty() {
        let _ = writeln!(out, "\nDead Configs ({}):", result.dead.len());
        for d in &result.dead {
            let _ = writeln!(
                out,
                "   {:<width$}  defined {}:{}",
                d.name,
                d.file,
                d.line,
                width = NAME_WIDTH
            );
        }
    }

    if !result.orphans.is_empty() {
        let _ = writeln!(out, "\nOrphan Reads ({}):", result.orphans.len());
        for o in &result.orphans {
            let _ = writeln!(
                out,
                "   {:<width$}  read at {}:{}",
                o.name,
                o.file,
                o.line,
                width = NAME_WIDTH
            );
        }
    }

    if !result.inconsistent.is_empty() {
        let _ = writeln!(out, "\nInconsistent Defaults ({}):", result.inconsistent.len());
        for (name, refs) in &result.inconsistent {
            let vals: Vec<String> = refs
                .iter()
                .map(|r| format!("{} @{}:{}", display_default(&r.default), r.file, r.line))
                .collect();
            let _ = writeln!(out, "   {}: {}", name, vals.join(" vs "));
        }
    }

    if !result.has_issues() {
        let _ = writeln!(out, "\nAll clear - no config issues found!");
    }
    out
}

/// Quote a default for display unless it already carries its own quotes.
fn display_default(default: &str) -> String {
    if unquote(default).len() < default.len() {
        default.to_string()
    } else {
        format!("\"{}\"", default)
    }
}

/// Renders the machine-readable report as pretty-printed JSON.
pub fn render_json(result: &AnalysisResult) -> serde_json::Result<String> {
    let report = JsonReport {
        summary: Summary {
            reads: result.reads.len(),
            defs: result.defs.len(),
        },
        dead: result
            .dead
            .iter()
            .map(|d| Location {
                name: &d.name,
                file: &d.file,
                line: d.line,
            })
            .collect(),
        orphans: result
            .orphans
            .iter()
            .map(|o| Location {
                name: &o.name,
                file: &o.file,
                line: o.line,
            })
            .collect(),
        inconsistent: result
            .inconsistent
            .iter()
            .map(|(name, refs)| {
                let sites = refs
                    .iter()
                    .map(|r| DefaultSite {
                        default: &r.default,
                        file: &r.file,
                        line: r.line,
                    })
                    .collect();
                (name.as_str(), sites)
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report)
}

/// Prints the text report to stdout.
pub fn print_plain(result: &AnalysisResult) {
    print!("{}", render_text(result));
}

/// Prints the JSON report to stdout.
///
/// Falls back to a summary-only object if serialization fails.
pub fn print_json(result: &AnalysisResult) {
    match render_json(result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::warn!(error = %e, "JSON serialization failed");
            println!(
                "{{\"summary\": {{\"reads\": {}, \"defs\": {}}}}}",
                result.reads.len(),
                result.defs.len()
            );
        }
    }
}
