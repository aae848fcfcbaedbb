//! File classification by name and extension.
//!
//! Every file maps to exactly one [`FileKind`]. Source kinds carry the
//! [`Language`] whose read rules apply; config kinds select a definition
//! extractor. Files of unknown kind are never opened.

use std::path::Path;

/// Language families with a recognizable environment accessor syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    Rust,
    Go,
    Ruby,
    Java,
    Php,
    CSharp,
    Shell,
}

impl Language {
    /// Map a file extension (without dot, lowercase) to a language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext {
            "py" | "pyw" => Self::Python,
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "mts" | "cts" | "vue" | "svelte" => {
                Self::JavaScript
            }
            "rs" => Self::Rust,
            "go" => Self::Go,
            "rb" | "rake" => Self::Ruby,
            "java" | "kt" | "kts" | "scala" | "groovy" => Self::Java,
            "php" => Self::Php,
            "cs" => Self::CSharp,
            "sh" | "bash" | "zsh" => Self::Shell,
            _ => return None,
        };
        Some(lang)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Ruby => "ruby",
            Self::Java => "java",
            Self::Php => "php",
            Self::CSharp => "csharp",
            Self::Shell => "shell",
        }
    }
}

/// What a file contributes to a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Application code scanned for reads
    Source(Language),
    /// `KEY=VALUE` per line
    Dotenv,
    /// `ENV` instructions
    Dockerfile,
    /// YAML manifests (compose, Kubernetes, CI)
    #[cfg(feature = "yaml")]
    Yaml,
    Json,
    Toml,
}

impl FileKind {
    /// Classify a path by its file name. Returns `None` for files the
    /// scanner does not understand.
    pub fn classify(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;

        if is_dotenv_name(name) {
            return Some(Self::Dotenv);
        }
        if is_dockerfile_name(name) {
            return Some(Self::Dockerfile);
        }

        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            #[cfg(feature = "yaml")]
            "yml" | "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            other => Language::from_extension(other).map(Self::Source),
        }
    }

    /// Whether this kind yields reads (as opposed to definitions).
    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}

/// `.env`, `.env.local`, `.env.example`, `production.env`, ...
fn is_dotenv_name(name: &str) -> bool {
    name == ".env" || name.starts_with(".env.") || (name.ends_with(".env") && name.len() > 4)
}

/// `Dockerfile`, `dockerfile`, `Dockerfile.prod`, `api.dockerfile`, ...
fn is_dockerfile_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "dockerfile" || lower.starts_with("dockerfile.") || lower.ends_with(".dockerfile")
}
