// End-to-end tests for the demo-check binary.

use std::process::{Command, Output};

fn demo_check(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_demo-check"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run demo-check")
}

fn manifest_dir() -> &'static str {
    env!("CARGO_MANIFEST_DIR")
}

#[test]
fn test_repository_passes_self_check() {
    let output = demo_check(&[manifest_dir()]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PASS"));
}

#[test]
fn test_json_report_parses() {
    let output = demo_check(&[manifest_dir(), "--json"]);
    assert_eq!(output.status.code(), Some(0));

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON report");
    assert_eq!(report["pass"], true);

    let demos = report["demos"].as_array().expect("demos array");
    let names: Vec<&str> = demos.iter().filter_map(|d| d["demo"].as_str()).collect();
    assert_eq!(
        names,
        vec!["static-analysis-pattern-demo", "static-analysis-extras-demo"]
    );
    assert!(report["summary"]["total_findings"].as_u64().unwrap_or(0) >= 12);
}

#[test]
fn test_single_demo_filter() {
    let output = demo_check(&[manifest_dir(), "--json", "--demo", "static-analysis-extras-demo"]);
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON report");
    assert_eq!(report["demos"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["summary"]["total_findings"], 3);
}

#[test]
fn test_list_prints_catalog() {
    let output = demo_check(&["--list"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("overflow-demo [AddressSanitizer]"));
    assert!(stdout.contains("-Zsanitizer=thread"));
    assert!(stdout.contains("silent division-by-zero"));
}

#[test]
fn test_list_json_for_one_demo() {
    let output = demo_check(&["--list", "--json", "--demo", "data-race-demo"]);
    assert_eq!(output.status.code(), Some(0));
    let demos: serde_json::Value = serde_json::from_slice(&output.stdout).expect("catalog json");
    assert_eq!(demos[0]["name"], "data-race-demo");
    assert_eq!(demos[0]["tool"], "thread-sanitizer");
    assert_eq!(demos[0]["expected"][0]["kind"], "data-race");
}

#[test]
fn test_missing_manifest_is_an_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let output = demo_check(&[tmp.path().to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No Cargo.toml"));
}

#[test]
fn test_project_without_demo_sources_fails() {
    let tmp = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        tmp.path().join("Cargo.toml"),
        "[package]\nname = \"empty\"\nversion = \"0.1.0\"\n",
    )
    .expect("write manifest");
    let output = demo_check(&[tmp.path().to_str().expect("utf-8 path"), "--json"]);
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report json");
    assert_eq!(report["missing_sources"].as_array().map(Vec::len), Some(6));
}

#[test]
fn test_mismatch_exits_one() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();
    std::fs::write(
        root.join("Cargo.toml"),
        "[package]\nname = \"broken\"\nversion = \"0.1.0\"\n",
    )
    .expect("write manifest");
    let bin = root.join("src/bin");
    std::fs::create_dir_all(&bin).expect("create src/bin");
    // Every routine silent: all active expectations fail.
    std::fs::write(bin.join("static_analysis_extras_demo.rs"), "fn main() {}\n")
        .expect("write demo");

    let output = demo_check(&[
        root.to_str().expect("utf-8 path"),
        "--demo",
        "static-analysis-extras-demo",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("MISMATCH"));
}

#[test]
fn test_config_can_disable_a_check() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("check.toml");
    std::fs::write(&config, "disabled-checks = [\"process_exec\"]\n").expect("write config");

    let output = demo_check(&[
        manifest_dir(),
        "--json",
        "--demo",
        "static-analysis-extras-demo",
        "--config",
        config.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report json");
    assert_eq!(report["summary"]["total_findings"], 2);
}

#[test]
fn test_unknown_demo_is_an_error() {
    let output = demo_check(&[manifest_dir(), "--demo", "nope"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown demo 'nope'"));
}

#[test]
fn test_config_exclude_skips_a_demo() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("check.toml");
    std::fs::write(&config, "exclude = [\"static_analysis_extras_demo\"]\n").expect("write config");

    let output = demo_check(&[
        manifest_dir(),
        "--json",
        "--config",
        config.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report json");
    let names: Vec<&str> = report["demos"]
        .as_array()
        .expect("demos array")
        .iter()
        .filter_map(|d| d["demo"].as_str())
        .collect();
    assert_eq!(names, vec!["static-analysis-pattern-demo"]);
    assert!(report.get("missing_sources").is_none());
}
