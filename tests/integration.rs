use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn hix_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("hix");
    path
}

fn setup_test_env() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // Project with a pinned git root and three artifacts.
    let project = root.join("project");
    fs::create_dir_all(project.join(".git")).unwrap();

    let handoffs = project.join("handoffs");
    fs::create_dir_all(handoffs.join("alpha")).unwrap();
    fs::create_dir_all(handoffs.join("beta")).unwrap();
    fs::write(
        handoffs.join("alpha/done.yaml"),
        "---\nsession: alpha\noutcome: SUCCEEDED\nagent_id: agent-1\n---\ngoal: ship the parser\nworked:\n  - caching fix\n",
    )
    .unwrap();
    fs::write(
        handoffs.join("alpha/followup.yml"),
        "---\nsession: alpha\nstatus: partial_plus\n---\nfailed:\n  - flaky test\n",
    )
    .unwrap();
    fs::write(handoffs.join("beta/notes.md"), "# plain notes, no header\n").unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/handoffs.sqlite"

[artifacts]
dir = "handoffs"
marker = "handoffs"

[discovery]
session_logs = "{root}/logs"

[index]
enabled = true
path = ".claude/cache/artifact-index/context.db"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("hix.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path, project)
}

fn run_hix(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = hix_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run hix binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_store() {
    let (_tmp, config_path, _project) = setup_test_env();

    let (stdout, stderr, success) = run_hix(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path, _project) = setup_test_env();

    let (_, _, success1) = run_hix(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_hix(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_sweep_ingests_all_artifacts() {
    let (_tmp, config_path, project) = setup_test_env();

    run_hix(&config_path, &["init"]);
    let (stdout, stderr, success) = run_hix(
        &config_path,
        &["sweep", "--project", project.to_str().unwrap()],
    );
    assert!(success, "sweep failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Files: 3 (yaml: 2, markdown: 1)"));
    assert!(stdout.contains("Ingested: 3"));
}

#[test]
fn test_sweep_idempotent_no_duplicates() {
    let (_tmp, config_path, project) = setup_test_env();
    let project_arg = project.to_str().unwrap();

    run_hix(&config_path, &["init"]);

    let (stdout1, _, _) = run_hix(&config_path, &["sweep", "--project", project_arg]);
    assert!(stdout1.contains("Ingested: 3"));

    // Second sweep overwrites in place: still three rows, zero divergence.
    let (stdout2, _, _) = run_hix(&config_path, &["sweep", "--project", project_arg]);
    assert!(stdout2.contains("Ingested: 3"));

    let (health, _, _) = run_hix(&config_path, &["health", "--project", project_arg]);
    assert!(health.contains("Store rows: 3"));
    assert!(health.contains("Missing files: 0 | Stale files: 0"));
    assert!(health.contains("Missing sessions: 0 | Stale sessions: 0"));
}

#[test]
fn test_resweep_after_edit_keeps_store_clean() {
    let (_tmp, config_path, project) = setup_test_env();
    let project_arg = project.to_str().unwrap();

    run_hix(&config_path, &["init"]);

    // Two artifacts are already in the store, then both change on disk and
    // a third appears before the next sweep.
    fs::remove_file(project.join("handoffs/beta/notes.md")).unwrap();
    run_hix(&config_path, &["sweep", "--project", project_arg]);

    fs::write(
        project.join("handoffs/alpha/done.yaml"),
        "---\nsession: alpha\noutcome: FAILED\n---\ngoal: rewritten goal\n",
    )
    .unwrap();
    fs::write(project.join("handoffs/beta/notes.md"), "# restored notes\n").unwrap();

    let (stdout, _, _) = run_hix(&config_path, &["sweep", "--project", project_arg]);
    assert!(stdout.contains("Ingested: 3"));

    let (health, _, _) = run_hix(&config_path, &["health", "--project", project_arg]);
    assert!(health.contains("Store rows: 3"));
    assert!(health.contains("Missing files: 0 | Stale files: 0"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let (_tmp, config_path, project) = setup_test_env();
    let project_arg = project.to_str().unwrap();

    run_hix(&config_path, &["init"]);
    let (stdout, _, success) = run_hix(
        &config_path,
        &["sweep", "--project", project_arg, "--dry-run"],
    );
    assert!(success);
    assert!(stdout.contains("Ingested: 3"));
    assert!(stdout.contains("Dry run only"));

    let (health, _, _) = run_hix(&config_path, &["health", "--project", project_arg]);
    assert!(health.contains("Store rows: 0"));
    assert!(health.contains("Missing files: 3"));
}

#[test]
fn test_health_reports_stale_after_deletion() {
    let (_tmp, config_path, project) = setup_test_env();
    let project_arg = project.to_str().unwrap();

    run_hix(&config_path, &["init"]);
    run_hix(&config_path, &["sweep", "--project", project_arg]);

    fs::remove_file(project.join("handoffs/beta/notes.md")).unwrap();

    let (stdout, _, success) = run_hix(
        &config_path,
        &["health", "--project", project_arg, "--include-files"],
    );
    assert!(success);
    assert!(stdout.contains("Missing files: 0 | Stale files: 1"));
    assert!(stdout.contains("Missing sessions: 0 | Stale sessions: 1"));
    assert!(stdout.contains("notes.md"));
    assert!(stdout.contains("beta"));
}

#[test]
fn test_sweep_json_summary() {
    let (_tmp, config_path, project) = setup_test_env();

    run_hix(&config_path, &["init"]);
    let (stdout, _, success) = run_hix(
        &config_path,
        &["sweep", "--project", project.to_str().unwrap(), "--json"],
    );
    assert!(success);

    let payload: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let results = payload["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["status"], "ok");
    assert_eq!(results[0]["files"], 3);
    assert_eq!(results[0]["ingested"], 3);
    assert_eq!(results[0]["by_format"]["yaml"], 2);
    assert_eq!(results[0]["by_format"]["markdown"], 1);
}

#[test]
fn test_health_json_summary() {
    let (_tmp, config_path, project) = setup_test_env();
    let project_arg = project.to_str().unwrap();

    run_hix(&config_path, &["init"]);
    run_hix(&config_path, &["sweep", "--project", project_arg]);

    let (stdout, _, success) = run_hix(&config_path, &["health", "--project", project_arg, "--json"]);
    assert!(success);

    let payload: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let results = payload["results"].as_array().unwrap();
    assert_eq!(results[0]["disk"]["files"], 3);
    assert_eq!(results[0]["disk"]["sessions"], 2);
    assert_eq!(results[0]["store"]["rows"], 3);
    assert_eq!(results[0]["store"]["agents"]["agent-1"], 1);
    assert_eq!(results[0]["diff"]["missing_files_count"], 0);
    assert_eq!(results[0]["diff"]["stale_files_count"], 0);
}

#[test]
fn test_missing_artifacts_dir_reported() {
    let (tmp, config_path, _project) = setup_test_env();

    let bare = tmp.path().join("bare");
    fs::create_dir_all(bare.join(".git")).unwrap();

    run_hix(&config_path, &["init"]);
    let (stdout, _, success) = run_hix(
        &config_path,
        &["sweep", "--project", bare.to_str().unwrap()],
    );
    assert!(success, "missing artifacts dir must not fail the sweep");
    assert!(stdout.contains("Missing artifacts directory"));
}
