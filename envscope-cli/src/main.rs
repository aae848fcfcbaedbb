//! envscope CLI - environment variable topology analyzer.
//!
//! Subcommands:
//! - `scan`: report dead configs, orphan reads and inconsistent defaults
//! - `generate`: emit a `.env.example` template from every variable read
//!
//! Exit codes are CI-friendly: 0 clean, 1 drift found, 2 operational error.

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::error;

use envscope_core::{
    generate_example, init_structured_logging, load_config, print_json, print_plain,
    write_example, Envscope, EnvscopeError,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Environment variable topology analyzer")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a project for env var drift
    Scan {
        /// Path to the project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Report format (defaults to [output] format in envscope.toml, then text)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Extra directory names to skip
        #[arg(long, num_args = 1..)]
        exclude: Vec<String>,

        /// Variable names or patterns (PREFIX*, *SUFFIX) to ignore
        #[arg(long, num_args = 1..)]
        ignore: Vec<String>,

        /// Do not read envscope.toml
        #[arg(long)]
        no_config: bool,
    },

    /// Generate a .env.example from the variables the code reads
    Generate {
        /// Path to the project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Write the template to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Extra directory names to skip
        #[arg(long, num_args = 1..)]
        exclude: Vec<String>,

        /// Do not read envscope.toml
        #[arg(long)]
        no_config: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Picks the report format: explicit flag, then config file, then text.
///
/// An invalid config is reported by the builder and falls back to text here.
fn resolve_format(flag: Option<Format>, root: &Path, use_config: bool) -> Format {
    if let Some(format) = flag {
        return format;
    }
    if !use_config {
        return Format::Text;
    }

    let configured = load_config(root)
        .ok()
        .flatten()
        .and_then(|cfg| cfg.output)
        .and_then(|o| o.format);
    match configured.as_deref() {
        Some("json") => Format::Json,
        _ => Format::Text,
    }
}

/// Validates an output path for security.
///
/// Rejects empty paths, null bytes and existing directories.
fn validate_output_path(path: &Path) -> Result<&Path> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return Err(anyhow!("Output path is empty"));
    }
    // Security: Check for null bytes (path injection)
    if text.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }
    if path.is_dir() {
        return Err(anyhow!("Output path is a directory: {}", path.display()));
    }
    Ok(path)
}

fn cmd_scan(
    path: &Path,
    format: Option<Format>,
    exclude: Vec<String>,
    ignore: Vec<String>,
    use_config: bool,
) -> Result<i32> {
    let result = Envscope::new(path)
        .with_config(use_config)
        .exclude_dirs(exclude)
        .ignore_names(ignore)
        .analyze()
        .with_context(|| format!("Failed to scan: {}", path.display()))?;

    match resolve_format(format, path, use_config) {
        Format::Json => print_json(&result),
        Format::Text => print_plain(&result),
    }

    Ok(if result.has_issues() { 1 } else { 0 })
}

fn cmd_generate(
    path: &Path,
    output: Option<&Path>,
    exclude: Vec<String>,
    use_config: bool,
) -> Result<i32> {
    let result = Envscope::new(path)
        .with_config(use_config)
        .exclude_dirs(exclude)
        .analyze()
        .with_context(|| format!("Failed to scan: {}", path.display()))?;

    match output {
        Some(file) => {
            let safe_path = validate_output_path(file)?;
            let vars = write_example(safe_path, &result.reads)?;
            println!("Written to {} ({} vars)", safe_path.display(), vars);
        }
        None => print!("{}", generate_example(&result.reads)),
    }
    Ok(0)
}

/// Dispatches a parsed command line and returns the process exit code.
fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(0)
        }
        Some(Command::Scan {
            path,
            format,
            exclude,
            ignore,
            no_config,
        }) => cmd_scan(&path, format, exclude, ignore, !no_config),
        Some(Command::Generate {
            path,
            output,
            exclude,
            no_config,
        }) => cmd_generate(&path, output.as_deref(), exclude, !no_config),
    }
}

fn main() {
    // Global panic guard: report and exit with the operational-error code
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] envscope internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    let code = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| run(cli))) {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            if let Some(path) = e.downcast_ref::<EnvscopeError>().and_then(EnvscopeError::path_ref) {
                error!(path = %path.display(), "envscope failed");
            }
            eprintln!("[ERROR] {:#}", e);
            2
        }
        Err(_) => 2,
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir()
            .join("envscope_cli_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir).ok();
        }
        fs::create_dir_all(&temp_dir).unwrap();
        temp_dir
    }

    fn run_args(args: &[&str]) -> Result<i32> {
        let cli = Cli::try_parse_from(std::iter::once("envscope").chain(args.iter().copied()))
            .expect("arguments should parse");
        run(cli)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_flags() {
        let cli = Cli::try_parse_from([
            "envscope", "scan", "proj", "-f", "json", "--exclude", "fixtures", "tmp", "--ignore",
            "PATH", "--no-config",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Scan {
                path,
                format,
                exclude,
                ignore,
                no_config,
            }) => {
                assert_eq!(path, PathBuf::from("proj"));
                assert_eq!(format, Some(Format::Json));
                assert_eq!(exclude, vec!["fixtures", "tmp"]);
                assert_eq!(ignore, vec!["PATH"]);
                assert!(no_config);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["envscope", "generate"]).unwrap();
        match cli.command {
            Some(Command::Generate { path, output, .. }) => {
                assert_eq!(path, PathBuf::from("."));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["envscope"]).unwrap().command.is_none());
        assert!(Cli::try_parse_from(["envscope", "scan", "-f", "xml"]).is_err());
    }

    #[test]
    fn test_no_subcommand_exits_zero() {
        assert_eq!(run_args(&[]).unwrap(), 0);
    }

    #[test]
    fn test_scan_exit_codes() {
        let clean = create_temp_dir("clean");
        create_file(&clean.join(".env"), "PORT=1\n");
        create_file(&clean.join("app.py"), "import os\nos.getenv('PORT')\n");
        assert_eq!(run_args(&["scan", clean.to_str().unwrap()]).unwrap(), 0);

        let drift = create_temp_dir("drift");
        create_file(&drift.join("app.py"), "import os\nos.getenv('MISSING')\n");
        assert_eq!(
            run_args(&["scan", drift.to_str().unwrap(), "-f", "json"]).unwrap(),
            1
        );
        assert_eq!(
            run_args(&["scan", drift.to_str().unwrap(), "--ignore", "MISSING"]).unwrap(),
            0
        );

        fs::remove_dir_all(&clean).ok();
        fs::remove_dir_all(&drift).ok();
    }

    #[test]
    fn test_scan_bad_ignore_pattern_is_error() {
        let dir = create_temp_dir("badignore");
        let err = run_args(&["scan", dir.to_str().unwrap(), "--ignore", "A*B"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EnvscopeError>(),
            Some(EnvscopeError::InvalidArgument { .. })
        ));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_scan_bad_root_is_error() {
        assert!(run_args(&["scan", "/nonexistent/envscope/cli"]).is_err());
        assert!(run_args(&["generate", "/nonexistent/envscope/cli"]).is_err());
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = create_temp_dir("generate");
        create_file(
            &dir.join("app.js"),
            "const p = process.env.PORT || 3000;\nconst h = process.env.HOST;\n",
        );
        let out = dir.join("out/.env.example");
        fs::create_dir_all(out.parent().unwrap()).unwrap();

        let code = run_args(&[
            "generate",
            dir.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "HOST=\nPORT=3000\n");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_generate_to_directory_is_error() {
        let dir = create_temp_dir("gendir");
        create_file(&dir.join("app.py"), "import os\nos.getenv('A')\n");
        let result = run_args(&["generate", dir.to_str().unwrap(), "-o", dir.to_str().unwrap()]);
        assert!(result.is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resolve_format_precedence() {
        let dir = create_temp_dir("format");
        assert_eq!(resolve_format(None, &dir, true), Format::Text);

        create_file(&dir.join("envscope.toml"), "[output]\nformat = \"json\"\n");
        assert_eq!(resolve_format(None, &dir, true), Format::Json);
        assert_eq!(resolve_format(None, &dir, false), Format::Text);
        assert_eq!(resolve_format(Some(Format::Text), &dir, true), Format::Text);

        // Invalid config falls back to text
        create_file(&dir.join("envscope.toml"), "[output]\nformat = \"yaml\"\n");
        assert_eq!(resolve_format(None, &dir, true), Format::Text);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_output_path() {
        assert!(validate_output_path(Path::new("")).is_err());
        assert!(validate_output_path(Path::new(".env.example")).is_ok());
        assert!(validate_output_path(&std::env::temp_dir()).is_err());
    }
}
