//! CLI integration tests
//!
//! These tests run the exactdeps binary against throwaway projects.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use support::{guava_slf4j_project, Project};

fn exactdeps() -> Command {
    Command::cargo_bin("exactdeps").expect("binary built")
}

fn analyze(project: &Project, manifest: &Path, classes: &Path) -> Command {
    let mut cmd = exactdeps();
    cmd.arg(project.path())
        .arg("--manifest")
        .arg(manifest)
        .arg("--classes")
        .arg(classes);
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    exactdeps()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--manifest"))
        .stdout(predicate::str::contains("--classes"))
        .stdout(predicate::str::contains("--check"));
}

#[test]
fn test_version() {
    exactdeps()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_requires_a_reference_source() {
    let project = Project::new();
    let (manifest, _) = guava_slf4j_project(&project);

    exactdeps()
        .arg(project.path())
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .failure();
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_writes_yaml_report() {
    let project = Project::new();
    let (manifest, classes) = guava_slf4j_project(&project);

    analyze(&project, &manifest, &classes)
        .assert()
        .success()
        .stdout(predicate::str::contains("com.google.guava:guava"))
        .stdout(predicate::str::contains("org.slf4j:slf4j-api"));

    let report = std::fs::read_to_string(project.path().join("build/reports/dependency-report.yaml"))
        .expect("report written");
    assert!(report.contains("allDependencies"), "{}", report);
    assert!(report.contains("unusedDependencies"), "{}", report);
    assert!(report.contains("- com.google.guava:guava"), "{}", report);
    assert!(report.contains("- org.slf4j:slf4j-api"), "{}", report);
}

#[test]
fn test_custom_output_path() {
    let project = Project::new();
    let (manifest, classes) = guava_slf4j_project(&project);
    let output = project.path().join("out/deps.yaml");

    analyze(&project, &manifest, &classes)
        .arg("--output")
        .arg(&output)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(output.exists());
}

#[test]
fn test_json_format() {
    let project = Project::new();
    let (manifest, classes) = guava_slf4j_project(&project);

    let output = analyze(&project, &manifest, &classes)
        .args(["--format", "json"])
        .output()
        .expect("run exactdeps");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["allDependencies"][0], "com.google.guava:guava");
    assert_eq!(json["unusedDependencies"][0], "org.slf4j:slf4j-api");
}

#[test]
fn test_dot_reports() {
    let project = Project::new();
    let (manifest, _) = guava_slf4j_project(&project);
    project.write(
        "build/deps/main.dot",
        r#"digraph "main" {
   "com.example.app.Checks"                           -> "com.google.common.base.Preconditions (guava-28.0-jre.jar)";
   "com.example.app.Service"                          -> "org.slf4j.Logger (slf4j-api-1.7.30.jar)";
}
"#,
    );

    exactdeps()
        .arg(project.path())
        .arg("--manifest")
        .arg(&manifest)
        .arg("--dot-dir")
        .arg(project.path().join("build/deps"))
        .arg("--check")
        .assert()
        .success();
}

#[test]
fn test_cache_is_relative_to_project() {
    let project = Project::new();
    let (manifest, classes) = guava_slf4j_project(&project);

    for _ in 0..2 {
        analyze(&project, &manifest, &classes)
            .args(["--cache", "build/exactdeps/artifacts.json", "--quiet"])
            .assert()
            .success();
    }

    let cache = std::fs::read_to_string(project.path().join("build/exactdeps/artifacts.json"))
        .expect("cache written under the project");
    assert!(cache.contains("guava-28.0-jre.jar"), "{}", cache);
}

// ============================================================================
// Check mode
// ============================================================================

#[test]
fn test_check_fails_on_unused() {
    let project = Project::new();
    let (manifest, classes) = guava_slf4j_project(&project);

    analyze(&project, &manifest, &classes)
        .arg("--check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unused dependency org.slf4j:slf4j-api"));
}

#[test]
fn test_check_passes_when_ignored() {
    let project = Project::new();
    let (manifest, classes) = guava_slf4j_project(&project);

    analyze(&project, &manifest, &classes)
        .args(["--check", "--ignore", "org.slf4j:slf4j-api"])
        .assert()
        .success();
}

#[test]
fn test_check_respects_config_file() {
    let project = Project::new();
    let (manifest, classes) = guava_slf4j_project(&project);
    project.write(
        ".exactdeps.yml",
        "ignore_unused:\n  - org.slf4j:slf4j-api:1.7.30\n",
    );

    analyze(&project, &manifest, &classes)
        .arg("--check")
        .assert()
        .success();
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_artifact_names_identifier() {
    let project = Project::new();
    let classes = project.compile(&[("com/example/app/Checks", support::guava_only_class())]);
    let manifest = project.write(
        "manifest.yaml",
        r#"project: app
configurations:
  - name: implementation
  - name: compileClasspath
    artifacts:
      - id: "com.acme:vanished:2.1"
        file: /nonexistent/vanished-2.1.jar
"#,
    );

    analyze(&project, &manifest, &classes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("com.acme:vanished:2.1"));
}

#[test]
fn test_explicit_unknown_configuration() {
    let project = Project::new();
    let (manifest, classes) = guava_slf4j_project(&project);

    analyze(&project, &manifest, &classes)
        .args(["--configuration", "implementation", "--configuration", "api"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration 'api'"));
}

#[test]
fn test_missing_manifest() {
    let project = Project::new();
    let classes = project.compile(&[("com/example/app/Checks", support::guava_only_class())]);

    analyze(&project, &project.path().join("nope.yaml"), &classes)
        .assert()
        .failure();
}
