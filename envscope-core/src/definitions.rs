//! Definition extraction from configuration artifacts.
//!
//! - Dotenv and Dockerfile: line by line.
//! - YAML / JSON / TOML: parsed with serde, keys traversed, then each key is
//!   located textually to recover its line number.
//!
//! Structured documents contain plenty of keys that are not variables
//! (`services`, `image`, `version`). A key counts as a definition when it is
//! in SCREAMING_SNAKE form, when it is the `name` of an item under an `env`
//! sequence (Kubernetes), or when it is an item of an `environment` sequence
//! (docker-compose list form).

use std::collections::HashMap;

use crate::classify::FileKind;
use crate::error::SkipReason;
use crate::model::{is_identifier, unquote, EnvDef};

/// Extract definitions from a config file of the given kind.
///
/// Returns `Err` only for structured files that fail to parse; the caller
/// treats that as a skip.
pub fn extract_defs(content: &str, file: &str, kind: FileKind) -> Result<Vec<EnvDef>, SkipReason> {
    match kind {
        FileKind::Dotenv => Ok(extract_dotenv(content, file)),
        FileKind::Dockerfile => Ok(extract_dockerfile(content, file)),
        #[cfg(feature = "yaml")]
        FileKind::Yaml => {
            let keys = yaml_keys(content)?;
            Ok(locate_keys(content, file, keys))
        }
        FileKind::Json => {
            let keys = json_keys(content)?;
            Ok(locate_keys(content, file, keys))
        }
        FileKind::Toml => {
            let keys = toml_keys(content)?;
            Ok(locate_keys(content, file, keys))
        }
        FileKind::Source(_) => Ok(Vec::new()),
    }
}

// ============================================================================
// Line-oriented formats
// ============================================================================

/// Parse `KEY=VALUE` lines. `#` comments and blank lines are ignored, an
/// optional `export ` prefix is allowed.
pub fn extract_dotenv(content: &str, file: &str) -> Vec<EnvDef> {
    let mut defs = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let trimmed = trimmed.strip_prefix("export ").map_or(trimmed, str::trim_start);

        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if !is_identifier(key) {
            continue;
        }

        defs.push(EnvDef::new(key, file, idx + 1).with_value(dotenv_value(value)));
    }

    defs
}

/// Value text with quotes removed, or with a trailing ` #comment` dropped
/// when unquoted.
fn dotenv_value(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with('"') || raw.starts_with('\'') {
        return unquote(raw).to_string();
    }
    match raw.find(" #") {
        Some(i) => raw[..i].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// Parse `ENV KEY=VALUE ...` and the legacy `ENV KEY VALUE` form.
///
/// Lines ending in `\` are joined first. Every key of a continued
/// instruction is recorded on the line holding the `ENV` keyword.
pub fn extract_dockerfile(content: &str, file: &str) -> Vec<EnvDef> {
    let mut defs = Vec::new();

    for (line_no, instruction) in logical_lines(content) {
        let trimmed = instruction.trim();
        let Some((instr, args)) = trimmed.split_once(char::is_whitespace) else {
            continue;
        };
        if !instr.eq_ignore_ascii_case("ENV") {
            continue;
        }
        let args = args.trim();

        let first = args.split_whitespace().next().unwrap_or("");
        if first.contains('=') {
            for pair in args.split_whitespace() {
                if let Some((key, value)) = pair.split_once('=') {
                    if is_identifier(key) {
                        defs.push(EnvDef::new(key, file, line_no).with_value(unquote(value)));
                    }
                }
            }
        } else if is_identifier(first) {
            let value = args[first.len()..].trim();
            defs.push(EnvDef::new(first, file, line_no).with_value(unquote(value)));
        }
    }

    defs
}

/// Join backslash-continued lines. Each entry carries the 1-based number
/// of its first physical line. Comment lines inside a continuation are
/// dropped, as Docker does.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, line) in content.lines().enumerate() {
        if pending.is_some() && line.trim_start().starts_with('#') {
            continue;
        }
        let line = line.trim_end();
        let (body, continues) = match line.strip_suffix('\\') {
            Some(body) => (body, true),
            None => (line, false),
        };

        let entry = pending.get_or_insert_with(|| (idx + 1, String::new()));
        if !entry.1.is_empty() {
            entry.1.push(' ');
        }
        entry.1.push_str(body.trim());

        if !continues {
            out.extend(pending.take());
        }
    }
    out.extend(pending);
    out
}

// ============================================================================
// Structured formats
// ============================================================================

/// A key found by traversal, before its line is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundKey {
    pub name: String,
    pub value: String,
}

impl FoundKey {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// SCREAMING_SNAKE identifier with at least one letter.
pub fn is_env_style_key(key: &str) -> bool {
    is_identifier(key)
        && key.chars().any(|c| c.is_ascii_uppercase())
        && !key.chars().any(|c| c.is_ascii_lowercase())
}

/// Split a compose-style `KEY=VALUE` (or bare `KEY`) item.
fn compose_item(item: &str) -> Option<FoundKey> {
    let (key, value) = item.split_once('=').unwrap_or((item, ""));
    let key = key.trim();
    is_identifier(key).then(|| FoundKey::new(key, value.trim()))
}

/// Format-neutral view of a parsed document, so one traversal serves every
/// structured format.
enum Node {
    Map(Vec<(String, Node)>),
    Seq(Vec<Node>),
    Scalar(String),
    Null,
}

impl Node {
    fn scalar_text(&self) -> String {
        match self {
            Node::Scalar(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn field(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Map(entries) => entries.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

fn collect_keys(node: &Node, parent_key: Option<&str>, out: &mut Vec<FoundKey>) {
    match node {
        Node::Map(entries) => {
            for (key, value) in entries {
                if is_env_style_key(key) {
                    out.push(FoundKey::new(key, value.scalar_text()));
                }
                collect_keys(value, Some(key), out);
            }
        }
        Node::Seq(items) => {
            for item in items {
                match (parent_key, item) {
                    // Kubernetes: env: [{name: X, value: Y}]
                    (Some("env"), Node::Map(_)) => {
                        if let Some(Node::Scalar(name)) = item.field("name") {
                            if is_identifier(name) {
                                let value = item.field("value").map(Node::scalar_text);
                                out.push(FoundKey::new(name, value.unwrap_or_default()));
                            }
                        }
                        collect_keys(item, None, out);
                    }
                    // docker-compose: environment: ["KEY=VALUE", "KEY"]
                    (Some("environment"), Node::Scalar(s)) => {
                        out.extend(compose_item(s));
                    }
                    _ => collect_keys(item, None, out),
                }
            }
        }
        Node::Scalar(_) | Node::Null => {}
    }
}

#[cfg(feature = "yaml")]
fn yaml_node(value: &serde_yaml::Value) -> Node {
    use serde_yaml::Value;
    match value {
        Value::Mapping(map) => Node::Map(
            map.iter()
                .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), yaml_node(v))))
                .collect(),
        ),
        Value::Sequence(items) => Node::Seq(items.iter().map(yaml_node).collect()),
        Value::String(s) => Node::Scalar(s.clone()),
        Value::Number(n) => Node::Scalar(n.to_string()),
        Value::Bool(b) => Node::Scalar(b.to_string()),
        Value::Tagged(tagged) => yaml_node(&tagged.value),
        Value::Null => Node::Null,
    }
}

/// Keys of a YAML file. Multi-document streams (`---`) are all traversed.
#[cfg(feature = "yaml")]
pub fn yaml_keys(content: &str) -> Result<Vec<FoundKey>, SkipReason> {
    use serde::Deserialize;

    let mut out = Vec::new();
    for doc in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(doc)
            .map_err(|e| SkipReason::Malformed(e.to_string()))?;
        collect_keys(&yaml_node(&value), None, &mut out);
    }
    Ok(out)
}

fn json_node(value: &serde_json::Value) -> Node {
    use serde_json::Value;
    match value {
        Value::Object(map) => Node::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), json_node(v)))
                .collect(),
        ),
        Value::Array(items) => Node::Seq(items.iter().map(json_node).collect()),
        Value::String(s) => Node::Scalar(s.clone()),
        Value::Number(n) => Node::Scalar(n.to_string()),
        Value::Bool(b) => Node::Scalar(b.to_string()),
        Value::Null => Node::Null,
    }
}

pub fn json_keys(content: &str) -> Result<Vec<FoundKey>, SkipReason> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| SkipReason::Malformed(e.to_string()))?;
    let mut out = Vec::new();
    collect_keys(&json_node(&value), None, &mut out);
    Ok(out)
}

fn toml_node(value: &toml::Value) -> Node {
    use toml::Value;
    match value {
        Value::Table(table) => Node::Map(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_node(v)))
                .collect(),
        ),
        Value::Array(items) => Node::Seq(items.iter().map(toml_node).collect()),
        Value::String(s) => Node::Scalar(s.clone()),
        Value::Integer(i) => Node::Scalar(i.to_string()),
        Value::Float(f) => Node::Scalar(f.to_string()),
        Value::Boolean(b) => Node::Scalar(b.to_string()),
        Value::Datetime(d) => Node::Scalar(d.to_string()),
    }
}

pub fn toml_keys(content: &str) -> Result<Vec<FoundKey>, SkipReason> {
    let value: toml::Value =
        toml::from_str(content).map_err(|e| SkipReason::Malformed(e.to_string()))?;
    let mut out = Vec::new();
    collect_keys(&toml_node(&value), None, &mut out);
    Ok(out)
}

/// Assign line numbers to traversed keys and order them by line.
///
/// The n-th occurrence of a name takes the n-th line mentioning that name
/// as a whole word. Keys that cannot be located fall back to line 1.
pub fn locate_keys(content: &str, file: &str, keys: Vec<FoundKey>) -> Vec<EnvDef> {
    let lines: Vec<&str> = content.lines().collect();
    let mut cursor: HashMap<String, usize> = HashMap::new();

    let mut defs: Vec<EnvDef> = keys
        .into_iter()
        .map(|key| {
            let from = cursor.get(&key.name).copied().unwrap_or(0);
            let found = lines
                .iter()
                .enumerate()
                .skip(from)
                .find(|(_, l)| contains_word(l, &key.name))
                .map(|(i, _)| i);

            let line = match found {
                Some(i) => {
                    cursor.insert(key.name.clone(), i + 1);
                    i + 1
                }
                None => 1,
            };
            EnvDef::new(key.name, file, line).with_value(key.value)
        })
        .collect();

    // Stable: equal lines keep traversal order
    defs.sort_by_key(|d| d.line);
    defs
}

/// Whether `word` occurs in `line` delimited by non-identifier characters.
fn contains_word(line: &str, word: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    line.match_indices(word).any(|(i, _)| {
        let before = line[..i].chars().next_back();
        let after = line[i + word.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}
