//! Source-code read extraction.
//!
//! Each [`Language`] owns a small ordered list of independent textual rules.
//! A rule is a regex that matches one access idiom up to and including the
//! variable name, plus a [`DefaultStyle`] telling how the call-site fallback
//! (if any) is recovered from the text that follows.
//!
//! Lines are scanned one at a time. All rules of the file's language run
//! over the line; matches are ordered left to right and overlapping matches
//! are dropped in favour of the one that starts first.
//!
//! Shell expansions only count when the name has an uppercase letter, so
//! `${f}` in a loop body is not taken for an environment read.
//!
//! Purely lexical: computed names, interpolation and aliased imports are not
//! resolved and are simply not captured.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::classify::Language;
use crate::model::{is_identifier, EnvRead};

/// How the default value of a read is recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultStyle {
    /// The idiom has no fallback
    None,
    /// Second call argument: `os.getenv("X", "d")`
    SecondArg,
    /// Literal after `||`, `??` or `?:`: `process.env.X || "d"`
    Fallback,
    /// Rust `.unwrap_or("d")` / `.unwrap_or_else(|_| "d".into())`
    UnwrapOr,
    /// Captured by the pattern itself: shell `${X:-d}`
    Inline,
}

/// A compiled read rule.
#[derive(Debug)]
pub struct ReadRule {
    /// Label recorded on each [`EnvRead`]
    pub accessor: &'static str,
    /// Must contain a `name` group; `Inline` rules also use `op` and `default`
    pub pattern: Regex,
    pub default: DefaultStyle,
}

/// Variable identifier, captured as `name`.
const ID: &str = r"(?P<name>[A-Za-z_][A-Za-z0-9_]*)";

/// Rule table: (language, accessor, pattern template, default style).
/// `{ID}` in a template is replaced by [`ID`].
const RULE_TABLE: &[(Language, &str, &str, DefaultStyle)] = &[
    // Python
    (Language::Python, "os.getenv", r#"\b(?:os\.)?getenv\(\s*["']{ID}["']"#, DefaultStyle::SecondArg),
    (Language::Python, "os.environ.get", r#"\b(?:os\.)?environ\.get\(\s*["']{ID}["']"#, DefaultStyle::SecondArg),
    (Language::Python, "os.environ[]", r#"\b(?:os\.)?environ\[\s*["']{ID}["']\s*\]"#, DefaultStyle::None),
    // JavaScript / TypeScript
    (Language::JavaScript, "process.env", r"\bprocess\.env\.{ID}", DefaultStyle::Fallback),
    (Language::JavaScript, "process.env[]", r#"\bprocess\.env\[\s*["'`]{ID}["'`]\s*\]"#, DefaultStyle::Fallback),
    (Language::JavaScript, "import.meta.env", r"\bimport\.meta\.env\.{ID}", DefaultStyle::Fallback),
    // Rust
    (Language::Rust, "env::var", r#"\b(?:std::)?env::var(?:_os)?\(\s*"{ID}"\s*\)"#, DefaultStyle::UnwrapOr),
    (Language::Rust, "env!", r#"\benv!\(\s*"{ID}""#, DefaultStyle::None),
    (Language::Rust, "option_env!", r#"\boption_env!\(\s*"{ID}""#, DefaultStyle::UnwrapOr),
    // Go
    (Language::Go, "os.Getenv", r#"\bos\.Getenv\(\s*["`]{ID}["`]\s*\)"#, DefaultStyle::None),
    (Language::Go, "os.LookupEnv", r#"\bos\.LookupEnv\(\s*["`]{ID}["`]\s*\)"#, DefaultStyle::None),
    // Ruby
    (Language::Ruby, "ENV[]", r#"\bENV\[\s*["']{ID}["']\s*\]"#, DefaultStyle::Fallback),
    (Language::Ruby, "ENV.fetch", r#"\bENV\.fetch\(\s*["']{ID}["']"#, DefaultStyle::SecondArg),
    // Java / Kotlin
    (Language::Java, "System.getenv", r#"\bSystem\.getenv\(\s*"{ID}"\s*\)"#, DefaultStyle::Fallback),
    // PHP
    (Language::Php, "getenv", r#"\bgetenv\(\s*["']{ID}["']\s*\)"#, DefaultStyle::Fallback),
    (Language::Php, "$_ENV[]", r#"\$_ENV\[\s*["']{ID}["']\s*\]"#, DefaultStyle::Fallback),
    (Language::Php, "env", r#"\benv\(\s*["']{ID}["']"#, DefaultStyle::SecondArg),
    // C#
    (Language::CSharp, "Environment.GetEnvironmentVariable", r#"\bEnvironment\.GetEnvironmentVariable\(\s*"{ID}"\s*\)"#, DefaultStyle::Fallback),
    // Shell
    (Language::Shell, "${}", r"\$\{{ID}(?:(?P<op>:?[-=+?])(?P<default>[^}]*))?\}", DefaultStyle::Inline),
];

/// Compiled rules, grouped per language in table order.
fn rule_sets() -> &'static HashMap<Language, Vec<ReadRule>> {
    static RULES: OnceLock<HashMap<Language, Vec<ReadRule>>> = OnceLock::new();
    RULES.get_or_init(|| {
        let mut sets: HashMap<Language, Vec<ReadRule>> = HashMap::new();
        for (lang, accessor, template, default) in RULE_TABLE {
            // Hardcoded patterns, covered by the tests below.
            let pattern = Regex::new(&template.replace("{ID}", ID))
                .expect("Hardcoded regex pattern is valid");
            sets.entry(*lang).or_default().push(ReadRule {
                accessor: *accessor,
                pattern,
                default: *default,
            });
        }
        sets
    })
}

/// Rules active for a language, in precedence order.
pub fn rules_for(lang: Language) -> &'static [ReadRule] {
    rule_sets().get(&lang).map(Vec::as_slice).unwrap_or(&[])
}

/// One rule match on a line, before default recovery.
struct Hit<'l> {
    start: usize,
    end: usize,
    name: &'l str,
    rule: &'static ReadRule,
    inline_default: Option<&'l str>,
}

/// Extract every read from `content`.
///
/// `file` is recorded verbatim on each record (already root-relative).
pub fn extract_reads(content: &str, file: &str, lang: Language) -> Vec<EnvRead> {
    let rules = rules_for(lang);
    let mut reads = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let hits = line_hits(line, rules);

        for (i, hit) in hits.iter().enumerate() {
            // Lowercase shell names are locals and loop variables
            if lang == Language::Shell && !hit.name.bytes().any(|b| b.is_ascii_uppercase()) {
                continue;
            }

            // Default text never reaches into the next accessor on the line
            let segment_end = hits.get(i + 1).map_or(line.len(), |next| next.start);
            let rest = &line[hit.end..segment_end];

            let default = match hit.rule.default {
                DefaultStyle::None => None,
                DefaultStyle::SecondArg => second_argument(rest),
                DefaultStyle::Fallback => fallback_literal(rest),
                DefaultStyle::UnwrapOr => unwrap_or_argument(rest),
                DefaultStyle::Inline => hit.inline_default.map(str::to_string),
            };

            reads.push(
                EnvRead::new(hit.name, file, idx + 1, default.unwrap_or_default())
                    .with_accessor(hit.rule.accessor),
            );
        }
    }

    reads
}

/// All non-overlapping rule matches on a line, left to right.
fn line_hits<'l>(line: &'l str, rules: &'static [ReadRule]) -> Vec<Hit<'l>> {
    let mut hits: Vec<Hit<'l>> = Vec::new();

    for rule in rules {
        for caps in rule.pattern.captures_iter(line) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
                continue;
            };
            let inline_default = match caps.name("op").map(|m| m.as_str()) {
                Some(op) if op.ends_with('-') || op.ends_with('=') => {
                    caps.name("default").map(|m| m.as_str().trim())
                }
                _ => None,
            };
            hits.push(Hit {
                start: whole.start(),
                end: whole.end(),
                name: name.as_str(),
                rule,
                inline_default,
            });
        }
    }

    // Earliest first; on equal start prefer the longer match
    hits.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut kept: Vec<Hit<'l>> = Vec::with_capacity(hits.len());
    for hit in hits {
        if kept.last().map_or(true, |prev| hit.start >= prev.end) {
            kept.push(hit);
        }
    }
    kept
}

/// Scan up to the first top-level `,` or `)`, honouring quotes and nested
/// brackets. Returns the consumed text.
fn scan_argument(text: &str) -> &str {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                if depth == 0 {
                    return &text[..i];
                }
                depth -= 1;
            }
            ',' if depth == 0 => return &text[..i],
            _ => {}
        }
    }
    text
}

/// The first quoted literal at the start of `text` (quotes included), or
/// the bare token up to a delimiter.
fn literal_token(text: &str) -> Option<&str> {
    let t = text.trim_start();
    let first = t.chars().next()?;

    if matches!(first, '"' | '\'' | '`') {
        let mut escaped = false;
        for (i, c) in t.char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == first {
                return Some(&t[..i + c.len_utf8()]);
            }
        }
        return None;
    }

    let end = t
        .find(|c: char| c.is_whitespace() || matches!(c, ',' | ')' | ';' | ']' | '}'))
        .unwrap_or(t.len());
    (end > 0).then(|| &t[..end])
}

/// First quoted literal anywhere in `text`, quotes included.
fn first_string_literal(text: &str) -> Option<&str> {
    let start = text.find(|c: char| matches!(c, '"' | '\'' | '`'))?;
    literal_token(&text[start..])
}

/// Second call argument, with a keyword label (`default="30"`) dropped.
fn second_argument(rest: &str) -> Option<String> {
    let after_comma = rest.trim_start().strip_prefix(',')?;
    let mut arg = scan_argument(after_comma).trim();
    if let Some((label, value)) = arg.split_once('=') {
        if is_identifier(label.trim()) && !value.starts_with('=') {
            arg = value.trim();
        }
    }
    (!arg.is_empty()).then(|| arg.to_string())
}

/// Literal after a fallback operator. Closing parens of a wrapping call
/// (`Number(process.env.X) || 3`) are skipped first.
fn fallback_literal(rest: &str) -> Option<String> {
    let r = rest.trim_start().trim_start_matches(|c: char| c == ')' || c.is_whitespace());
    ["||", "??", "?:"]
        .iter()
        .find_map(|op| r.strip_prefix(op))
        .and_then(literal_token)
        .map(str::to_string)
}

fn unwrap_or_argument(rest: &str) -> Option<String> {
    let scope = rest.split(';').next().unwrap_or(rest);

    let arg = if let Some(i) = scope.find(".unwrap_or_else(") {
        let body = scan_argument(&scope[i + ".unwrap_or_else(".len()..]).trim();
        // Drop closure parameters: `|_| "x".into()`
        match body.strip_prefix('|').and_then(|b| b.split_once('|')) {
            Some((_, expr)) => expr.trim(),
            None => body,
        }
    } else if let Some(i) = scope.find(".unwrap_or(") {
        scan_argument(&scope[i + ".unwrap_or(".len()..]).trim()
    } else {
        return None;
    };

    if arg.is_empty() {
        return None;
    }
    Some(first_string_literal(arg).unwrap_or(arg).to_string())
}
