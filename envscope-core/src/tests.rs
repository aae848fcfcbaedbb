//! End-to-end test suite for envscope-core.

use crate::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_file(file: &Path, content: &str) {
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

fn setup_temp_project() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("envscope_tests")
        .join(format!("{}_{}", timestamp, id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// A small polyglot project with one of each drift kind.
fn write_mixed_project(root: &Path) {
    write_file(
        &root.join(".env"),
        "# local settings\nPORT=8080\nDATABASE_URL=postgres://localhost/app\nLEGACY=1\n",
    );
    write_file(
        &root.join("Dockerfile"),
        "FROM node:20\nENV NODE_ENV=production\nCMD [\"node\", \"index.js\"]\n",
    );
    write_file(
        &root.join("scripts/run.sh"),
        "#!/bin/sh\nexec node web/index.js --env ${NODE_ENV:-dev}\n",
    );
    write_file(
        &root.join("src/app.py"),
        "import os\n\nPORT = os.getenv(\"PORT\", \"8080\")\nDB = os.environ[\"DATABASE_URL\"]\n",
    );
    write_file(
        &root.join("web/index.js"),
        "const port = process.env.PORT || 3000;\nconst key = process.env.API_KEY;\n",
    );
}

fn read_names(reads: &[EnvRead]) -> Vec<&str> {
    reads.iter().map(|r| r.name.as_str()).collect()
}

fn def_names(defs: &[EnvDef]) -> Vec<&str> {
    defs.iter().map(|d| d.name.as_str()).collect()
}

// Core Test 1: polyglot tree with dead, orphan and inconsistent findings
#[test]
fn test_mixed_project_drift() {
    let root = setup_temp_project();
    write_mixed_project(&root);

    let result = Envscope::new(&root).with_config(false).analyze().unwrap();

    assert_eq!(result.files_scanned, 5);
    assert_eq!(result.files_skipped, 0);
    assert_eq!(def_names(&result.dead), vec!["LEGACY"]);
    assert_eq!(read_names(&result.orphans), vec!["API_KEY"]);

    let port = &result.inconsistent["PORT"];
    assert_eq!(result.inconsistent.len(), 1);
    assert_eq!(port.len(), 2);
    assert_eq!(port[0].file, "src/app.py");
    assert_eq!(port[0].line, 3);
    assert_eq!(port[0].default, "\"8080\"");
    assert_eq!(port[1].file, "web/index.js");
    assert_eq!(port[1].default, "3000");

    fs::remove_dir_all(&root).ok();
}

// Core Test 2: records come back in path then line order
#[test]
fn test_scan_order_is_path_then_line() {
    let root = setup_temp_project();
    write_mixed_project(&root);

    let (reads, defs) = scan(&root).unwrap();

    let read_sites: Vec<(&str, usize)> = reads.iter().map(|r| (r.file.as_str(), r.line)).collect();
    assert_eq!(
        read_sites,
        vec![
            ("scripts/run.sh", 2),
            ("src/app.py", 3),
            ("src/app.py", 4),
            ("web/index.js", 1),
            ("web/index.js", 2),
        ]
    );

    let def_sites: Vec<(&str, &str, usize)> = defs
        .iter()
        .map(|d| (d.name.as_str(), d.file.as_str(), d.line))
        .collect();
    assert_eq!(
        def_sites,
        vec![
            ("PORT", ".env", 2),
            ("DATABASE_URL", ".env", 3),
            ("LEGACY", ".env", 4),
            ("NODE_ENV", "Dockerfile", 2),
        ]
    );

    fs::remove_dir_all(&root).ok();
}

// Core Test 3: missing root fails before anything is read
#[test]
fn test_nonexistent_root_is_path_error() {
    let err = scan(Path::new("/nonexistent")).unwrap_err();
    assert!(matches!(err, EnvscopeError::Path { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_file_root_is_path_error() {
    let root = setup_temp_project();
    let file = root.join("app.py");
    write_file(&file, "import os\n");

    let err = scan(&file).unwrap_err();
    assert!(matches!(err, EnvscopeError::Path { .. }));

    fs::remove_dir_all(&root).ok();
}

// Core Test 4: template generation over a scanned tree
#[test]
fn test_generate_from_scanned_tree() {
    let root = setup_temp_project();
    write_mixed_project(&root);

    let (reads, _) = scan(&root).unwrap();
    assert_eq!(
        generate_example(&reads),
        "API_KEY=\nDATABASE_URL=\nNODE_ENV=dev\nPORT=8080\n"
    );

    fs::remove_dir_all(&root).ok();
}

// Core Test 5: two runs over an unchanged tree render identical reports
#[test]
fn test_analysis_is_idempotent() {
    let root = setup_temp_project();
    write_mixed_project(&root);
    for i in 0..20 {
        write_file(
            &root.join(format!("svc/m{:02}.py", i)),
            &format!("import os\nV = os.getenv(\"VAR_{}\", \"{}\")\n", i % 4, i),
        );
    }

    let first = Envscope::new(&root).with_config(false).analyze().unwrap();
    let second = Envscope::new(&root).with_config(false).analyze().unwrap();

    assert_eq!(render_json(&first).unwrap(), render_json(&second).unwrap());
    assert_eq!(render_text(&first), render_text(&second));
    assert_eq!(first.reads, second.reads);

    fs::remove_dir_all(&root).ok();
}

// Core Test 6: default excluded directories are pruned
#[test]
fn test_default_excluded_dirs_pruned() {
    let root = setup_temp_project();
    write_file(&root.join("app.js"), "const a = process.env.APP_MODE;\n");
    write_file(&root.join("node_modules/pkg/index.js"), "process.env.SECRET_FROM_DEP\n");
    write_file(&root.join(".git/hooks/pre-commit.sh"), "echo ${GIT_HOOK_VAR}\n");
    write_file(&root.join("target/debug/.env"), "BUILD_ONLY=1\n");
    write_file(&root.join(".venv/lib/site.py"), "os.getenv('VENV_VAR')\n");

    let (reads, defs) = scan(&root).unwrap();
    assert_eq!(read_names(&reads), vec!["APP_MODE"]);
    assert!(defs.is_empty());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_custom_excluded_dirs_pruned() {
    let root = setup_temp_project();
    write_file(&root.join("src/main.go"), "h := os.Getenv(\"HOST\")\n");
    write_file(&root.join("fixtures/sample.env"), "FIXTURE_ONLY=1\n");

    let with = Envscope::new(&root).with_config(false).analyze().unwrap();
    assert_eq!(def_names(&with.dead), vec!["FIXTURE_ONLY"]);

    let without = Envscope::new(&root)
        .with_config(false)
        .exclude_dirs(["fixtures"])
        .analyze()
        .unwrap();
    assert!(without.defs.is_empty());
    assert_eq!(read_names(&without.orphans), vec!["HOST"]);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_root_named_like_excluded_dir_is_scanned() {
    let root = setup_temp_project().join("build");
    write_file(&root.join("run.sh"), "echo ${OUT_DIR}\n");

    let (reads, _) = scan(&root).unwrap();
    assert_eq!(read_names(&reads), vec!["OUT_DIR"]);

    fs::remove_dir_all(root.parent().unwrap()).ok();
}

// Core Test 7: ignored names vanish from every report
#[test]
fn test_ignore_filter_applies_everywhere() {
    let root = setup_temp_project();
    write_mixed_project(&root);

    let result = Envscope::new(&root)
        .with_config(false)
        .ignore_names(["LEGACY", "API_*", "PORT"])
        .analyze()
        .unwrap();

    assert!(!result.has_issues());
    assert!(result.reads.iter().all(|r| r.name != "PORT" && r.name != "API_KEY"));
    assert!(result.defs.iter().all(|d| d.name != "LEGACY" && d.name != "PORT"));
    assert!(render_text(&result).contains("All clear - no config issues found!"));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_config_file_settings_are_applied() {
    let root = setup_temp_project();
    write_mixed_project(&root);
    write_file(
        &root.join("envscope.toml"),
        "exclude = [\"web\"]\nignore = [\"LEGACY\"]\n\n[output]\nformat = \"json\"\n",
    );

    let result = Envscope::new(&root).analyze().unwrap();
    // web/ is pruned, so API_KEY is gone and PORT has a single default
    assert!(result.orphans.is_empty());
    assert!(result.inconsistent.is_empty());
    assert!(result.dead.is_empty());
    // the config file itself holds no env-style keys
    assert_eq!(result.files_scanned, 5);

    fs::remove_dir_all(&root).ok();
}

// Core Test 8: bad files are skipped and counted, never fatal
#[test]
fn test_bad_files_are_skipped() {
    let root = setup_temp_project();
    write_file(&root.join("ok.py"), "import os\nos.getenv('GOOD')\n");
    fs::write(root.join("blob.py"), b"os.getenv('BAD')\x00\x01\x02").unwrap();
    fs::write(root.join("latin.rb"), b"ENV['LATIN'] # caf\xe9\n").unwrap();
    write_file(&root.join("broken.json"), "{ \"API_URL\": ");

    let result = Envscope::new(&root).with_config(false).analyze().unwrap();
    assert_eq!(result.files_scanned, 1);
    assert_eq!(result.files_skipped, 3);
    assert_eq!(read_names(&result.reads), vec!["GOOD"]);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_unclassified_files_are_ignored() {
    let root = setup_temp_project();
    write_file(&root.join("README.md"), "Set `os.getenv(\"DOC_VAR\")` to configure.\n");
    write_file(&root.join("notes.txt"), "PORT=1\n");
    write_file(&root.join("Makefile"), "run:\n\tPORT=1 ./app\n");

    let result = Envscope::new(&root).with_config(false).analyze().unwrap();
    assert_eq!(result.files_scanned, 0);
    assert!(result.reads.is_empty());
    assert!(result.defs.is_empty());

    fs::remove_dir_all(&root).ok();
}

// Core Test 9: empty project is clean
#[test]
fn test_empty_project_all_clear() {
    let root = setup_temp_project();

    let result = Envscope::new(&root).analyze().unwrap();
    assert!(!result.has_issues());
    assert_eq!(result.issue_count(), 0);
    assert_eq!(generate_example(&result.reads), "");

    let json: serde_json::Value = serde_json::from_str(&render_json(&result).unwrap()).unwrap();
    assert_eq!(json["summary"]["reads"], 0);
    assert_eq!(json["summary"]["defs"], 0);

    fs::remove_dir_all(&root).ok();
}

// Core Test 10: structured manifests count as definitions
#[cfg(feature = "yaml")]
#[test]
fn test_compose_and_kubernetes_definitions() {
    let root = setup_temp_project();
    write_file(
        &root.join("docker-compose.yml"),
        "services:\n  api:\n    environment:\n      - REDIS_URL=redis://cache\n      - WORKERS\n",
    );
    write_file(
        &root.join("k8s/deploy.yaml"),
        "spec:\n  containers:\n    - name: api\n      env:\n        - name: REDIS_URL\n          value: redis://prod\n",
    );
    write_file(
        &root.join("worker.rb"),
        "url = ENV.fetch(\"REDIS_URL\", \"redis://localhost\")\n",
    );

    let result = Envscope::new(&root).with_config(false).analyze().unwrap();
    let def_sites: Vec<(&str, &str, usize)> = result
        .defs
        .iter()
        .map(|d| (d.name.as_str(), d.file.as_str(), d.line))
        .collect();
    assert_eq!(
        def_sites,
        vec![
            ("REDIS_URL", "docker-compose.yml", 4),
            ("WORKERS", "docker-compose.yml", 5),
            ("REDIS_URL", "k8s/deploy.yaml", 5),
        ]
    );
    assert_eq!(def_names(&result.dead), vec!["WORKERS"]);
    assert!(result.orphans.is_empty());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_case_variants_never_reconcile() {
    let root = setup_temp_project();
    write_file(&root.join(".env"), "PORT=8080\n");
    write_file(&root.join("app.py"), "import os\np = os.getenv('Port')\n");

    let result = Envscope::new(&root).with_config(false).analyze().unwrap();
    assert_eq!(def_names(&result.dead), vec!["PORT"]);
    assert_eq!(read_names(&result.orphans), vec!["Port"]);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_unicode_paths() {
    let root = setup_temp_project();
    write_file(&root.join("café/app.py"), "import os\nos.getenv('BREW')\n");

    let (reads, _) = scan(&root).unwrap();
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0].file, "café/app.py");

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_many_files_parallel_merge() {
    let root = setup_temp_project();
    for i in 0..100 {
        write_file(
            &root.join(format!("pkg{}/mod{:03}.js", i % 7, i)),
            &format!("const v = process.env.VAR_{:03};\n", i),
        );
    }

    let (reads, _) = scan(&root).unwrap();
    assert_eq!(reads.len(), 100);
    let files: Vec<&str> = reads.iter().map(|r| r.file.as_str()).collect();
    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, sorted);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_keyword_default_agrees_with_positional() {
    let root = setup_temp_project();
    write_file(
        &root.join("app.py"),
        "import os\na = os.getenv(\"TIMEOUT\", default=\"30\")\nb = os.getenv(\"TIMEOUT\", \"30\")\n",
    );

    let result = Envscope::new(&root).with_config(false).analyze().unwrap();
    assert!(result.inconsistent.is_empty());
    assert_eq!(generate_example(&result.reads), "TIMEOUT=30\n");

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_cargo_env_table_and_multiline_dockerfile() {
    let root = setup_temp_project();
    write_file(&root.join(".cargo/config.toml"), "[env]\nRUST_LOG = \"info\"\n");
    write_file(
        &root.join("dockerfile"),
        "FROM rust:1\nENV APP_HOST=0.0.0.0 \\\n    APP_PORT=8080\nCMD [\"app\"]\n",
    );
    write_file(
        &root.join("src/main.rs"),
        "let l = std::env::var(\"RUST_LOG\");\nlet p = env::var(\"APP_PORT\");\n",
    );

    let result = Envscope::new(&root).with_config(false).analyze().unwrap();
    assert!(result.orphans.is_empty());
    assert_eq!(def_names(&result.dead), vec!["APP_HOST"]);

    let sites: Vec<(&str, &str, usize)> = result
        .defs
        .iter()
        .map(|d| (d.name.as_str(), d.file.as_str(), d.line))
        .collect();
    assert_eq!(
        sites,
        vec![
            ("RUST_LOG", ".cargo/config.toml", 2),
            ("APP_HOST", "dockerfile", 2),
            ("APP_PORT", "dockerfile", 2),
        ]
    );

    fs::remove_dir_all(&root).ok();
}
