//! Classification integration tests
//!
//! End-to-end runs of manifest loading, jar indexing, bytecode reference
//! extraction and classification against throwaway projects.

mod support;

use exactdeps::references::{BytecodeReferences, ClassReferences, ReferenceSource};
use exactdeps::{Config, DepError, DependencyClassifier, ReportContent, ResolutionManifest};
use std::collections::BTreeSet;
use support::{guava_slf4j_project, service_class, Project};

fn config() -> Config {
    Config {
        ignore_implicit: vec![],
        ignore_unused: vec![],
        ..Config::default()
    }
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn classify(manifest: &ResolutionManifest, source: &dyn ReferenceSource, config: &Config) -> exactdeps::DependencySets {
    DependencyClassifier::new(config)
        .classify(manifest, source)
        .expect("classification succeeds")
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_guava_used_slf4j_unused() {
    let project = Project::new();
    let (manifest_path, classes) = guava_slf4j_project(&project);
    let manifest = ResolutionManifest::load(&manifest_path).unwrap();
    let references = BytecodeReferences::analyze(&classes, true).unwrap();

    let sets = classify(&manifest, &references, &config());

    assert_eq!(sets.required, set(&["com.google.guava:guava"]));
    assert!(sets.implicit.is_empty());
    assert_eq!(sets.unused, set(&["org.slf4j:slf4j-api"]));
}

#[test]
fn test_ignored_slf4j_is_not_unused() {
    let project = Project::new();
    let (manifest_path, classes) = guava_slf4j_project(&project);
    let manifest = ResolutionManifest::load(&manifest_path).unwrap();
    let references = BytecodeReferences::analyze(&classes, true).unwrap();

    let config = Config {
        ignore_unused: vec!["org.slf4j:slf4j-api".to_string()],
        ..config()
    };
    let sets = classify(&manifest, &references, &config);

    assert_eq!(sets.required, set(&["com.google.guava:guava"]));
    assert!(sets.unused.is_empty());
}

#[test]
fn test_unindexed_class_is_dropped() {
    let project = Project::new();
    let (manifest_path, _) = guava_slf4j_project(&project);
    let manifest = ResolutionManifest::load(&manifest_path).unwrap();
    let references = ClassReferences::new(["com.foo.Bar"], ["com.foo.Bar"]);

    let sets = classify(&manifest, &references, &config());

    assert!(sets.required.is_empty());
    assert!(sets.api_required.is_empty());
    assert!(sets.implicit.is_empty());
    assert_eq!(sets.unused, set(&["com.google.guava:guava", "org.slf4j:slf4j-api"]));
}

#[test]
fn test_api_usage() {
    let project = Project::new();
    let (manifest_path, _) = guava_slf4j_project(&project);
    let classes = project.compile(&[("com/example/app/Service", service_class())]);
    let manifest = ResolutionManifest::load(&manifest_path).unwrap();
    let references = BytecodeReferences::analyze(&classes, true).unwrap();

    let sets = classify(&manifest, &references, &config());

    // The private guava field is not part of the API; the slf4j return type is
    assert_eq!(sets.required, set(&["com.google.guava:guava", "org.slf4j:slf4j-api"]));
    assert_eq!(sets.api_required, set(&["org.slf4j:slf4j-api"]));
    assert!(sets.unused.is_empty());
}

// ============================================================================
// Set arithmetic properties
// ============================================================================

/// declared {A, B}, required {A, C} gives implicit {C}
#[test]
fn test_implicit_is_required_minus_declared() {
    let project = Project::new();
    let a = project.jar("a.jar", &["a.A"]);
    let b = project.jar("b.jar", &["b.B"]);
    let c = project.jar("c.jar", &["c.C"]);
    let manifest_path = project.write(
        "manifest.yaml",
        &format!(
            r#"project: app
configurations:
  - name: implementation
    dependencies: ["g:a", "g:b"]
  - name: compileClasspath
    artifacts:
      - {{ id: "g:a:1", file: '{}' }}
      - {{ id: "g:b:1", file: '{}' }}
      - {{ id: "g:c:1", file: '{}' }}
"#,
            a.display(),
            b.display(),
            c.display()
        ),
    );
    let manifest = ResolutionManifest::load(&manifest_path).unwrap();
    let references = ClassReferences::new(["a.A", "c.C"], Vec::<String>::new());

    let config = Config {
        configurations: vec!["implementation".to_string()],
        ..config()
    };
    let sets = classify(&manifest, &references, &config);

    assert_eq!(sets.required, set(&["g:a", "g:c"]));
    assert_eq!(sets.implicit, set(&["g:c"]));
    assert_eq!(sets.unused, set(&["g:b"]));
    assert!(sets.implicit.is_subset(&sets.required));
    assert!(sets.unused.is_disjoint(&sets.required));
}

/// Only dependencies declared on the validated configuration itself can be unused
#[test]
fn test_unused_only_from_direct_declarations() {
    let project = Project::new();
    let a = project.jar("a.jar", &["a.A"]);
    let b = project.jar("b.jar", &["b.B"]);
    let manifest_path = project.write(
        "manifest.yaml",
        &format!(
            r#"project: app
configurations:
  - name: implementation
    dependencies: ["g:b"]
  - name: testImplementation
    extendsFrom: [implementation]
    dependencies: ["g:a"]
  - name: testCompileClasspath
    extendsFrom: [testImplementation]
    artifacts:
      - {{ id: "g:a:1", file: '{}' }}
      - {{ id: "g:b:1", file: '{}' }}
"#,
            a.display(),
            b.display()
        ),
    );
    let manifest = ResolutionManifest::load(&manifest_path).unwrap();
    let config = Config {
        configurations: vec!["testImplementation".to_string()],
        classpath_configuration: "testCompileClasspath".to_string(),
        ..config()
    };

    // A directly declared and unreferenced is unused
    let sets = classify(&manifest, &ClassReferences::new(["b.B"], Vec::<String>::new()), &config);
    assert_eq!(sets.unused, set(&["g:a"]));

    // B comes from the parent; it is never unused here, referenced or not
    let sets = classify(&manifest, &ClassReferences::new(["a.A"], Vec::<String>::new()), &config);
    assert!(sets.unused.is_empty());
    assert!(sets.implicit.is_empty());
}

#[test]
fn test_report_round_trip() {
    let project = Project::new();
    let (manifest_path, _) = guava_slf4j_project(&project);
    let classes = project.compile(&[("com/example/app/Service", service_class())]);
    let manifest = ResolutionManifest::load(&manifest_path).unwrap();
    let references = BytecodeReferences::analyze(&classes, false).unwrap();
    let sets = classify(&manifest, &references, &config());

    let report_path = project.path().join("build/reports/dependency-report.yaml");
    let content = ReportContent::from(&sets);
    content.save(&report_path).unwrap();
    let loaded = ReportContent::load(&report_path).unwrap();

    assert_eq!(loaded, content);
    assert_eq!(
        loaded.all_dependencies.iter().cloned().collect::<BTreeSet<_>>(),
        sets.required
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_artifact_fails_with_identifier() {
    let project = Project::new();
    let manifest_path = project.write(
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
    let manifest = ResolutionManifest::load(&manifest_path).unwrap();

    let err = DependencyClassifier::new(&config())
        .classify(&manifest, &ClassReferences::default())
        .unwrap_err();

    assert!(matches!(err, DepError::UnresolvableArtifact { .. }));
    assert!(err.to_string().contains("com.acme:vanished:2.1"));
}

/// A plain `java` project has no `api` configuration; the defaults still apply
#[test]
fn test_default_configurations_fit_plain_java_project() {
    let project = Project::new();
    let (manifest_path, classes) = guava_slf4j_project(&project);
    let manifest = ResolutionManifest::load(&manifest_path).unwrap();
    assert!(manifest.configurations.iter().all(|c| c.name != "api"));
    let references = BytecodeReferences::analyze(&classes, true).unwrap();

    let config = Config::default();
    let sets = classify(&manifest, &references, &config);

    assert_eq!(sets.required, set(&["com.google.guava:guava"]));
    assert_eq!(sets.unused, set(&["org.slf4j:slf4j-api"]));
}

#[test]
fn test_unknown_classpath_configuration() {
    let project = Project::new();
    let (manifest_path, _) = guava_slf4j_project(&project);
    let manifest = ResolutionManifest::load(&manifest_path).unwrap();
    let config = Config {
        classpath_configuration: "runtimeClasspath".to_string(),
        ..config()
    };

    let err = DependencyClassifier::new(&config)
        .classify(&manifest, &ClassReferences::default())
        .unwrap_err();
    assert!(err.to_string().contains("runtimeClasspath"));
}
