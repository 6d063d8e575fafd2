//! Reference extraction integration tests
//!
//! Exercises class-file parsing over whole outputs (directories and jars)
//! and the jdeps dot report reader.

mod support;

use exactdeps::bytecode::testing::{write_jar, ClassBuilder};
use exactdeps::bytecode::{ClassFile, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_SYNTHETIC};
use exactdeps::index::jar_classes;
use exactdeps::references::{extract, extract_api, DotReferences, ReferenceSource};
use exactdeps::DepError;
use support::Project;

fn repository_class() -> Vec<u8> {
    ClassBuilder::new("com/example/store/Repository")
        .super_class("com/example/store/BaseRepository")
        .interface("java/lang/AutoCloseable")
        .class_signature("Lcom/example/store/BaseRepository;Ljava/lang/AutoCloseable;")
        .field(ACC_PRIVATE, "pool", "Lcom/zaxxer/hikari/HikariDataSource;")
        .method_with(
            ACC_PUBLIC,
            "findAll",
            "()Ljava/util/List;",
            Some("()Ljava/util/List<Lorg/jooq/Record;>;"),
            &["org/jooq/exception/DataAccessException"],
        )
        .method(ACC_PROTECTED, "mapper", "()Lcom/fasterxml/jackson/databind/ObjectMapper;")
        .method(ACC_PRIVATE | ACC_SYNTHETIC, "lambda$findAll$0", "(Lio/micrometer/core/instrument/Timer;)V")
        .name_and_type("log", "Lorg/slf4j/Logger;")
        .build()
}

fn base_class() -> Vec<u8> {
    ClassBuilder::new("com/example/store/BaseRepository")
        .access(0x0401) // public abstract
        .build()
}

// ============================================================================
// Class file analysis
// ============================================================================

#[test]
fn test_used_classes_cover_every_reference_kind() {
    let project = Project::new();
    let classes = project.compile(&[
        ("com/example/store/Repository", repository_class()),
        ("com/example/store/BaseRepository", base_class()),
    ]);

    let used = extract(&classes).unwrap();
    for expected in [
        "com.zaxxer.hikari.HikariDataSource",
        "java.util.List",
        "org.jooq.Record",
        "com.fasterxml.jackson.databind.ObjectMapper",
        "io.micrometer.core.instrument.Timer",
        "org.slf4j.Logger",
        "java.lang.AutoCloseable",
    ] {
        assert!(used.contains(expected), "missing {} in {:?}", expected, used);
    }
    // Classes of the output itself are not references
    assert!(!used.contains("com.example.store.BaseRepository"));
    assert!(!used.contains("com.example.store.Repository"));
}

#[test]
fn test_api_classes_are_the_visible_surface() {
    let project = Project::new();
    let classes = project.compile(&[("com/example/store/Repository", repository_class())]);

    let api = extract_api(&classes).unwrap();
    for expected in [
        "com.example.store.BaseRepository",
        "java.lang.AutoCloseable",
        "java.util.List",
        "org.jooq.Record",
        "org.jooq.exception.DataAccessException",
        "com.fasterxml.jackson.databind.ObjectMapper",
    ] {
        assert!(api.contains(expected), "missing {} in {:?}", expected, api);
    }
    for hidden in [
        "com.zaxxer.hikari.HikariDataSource",
        "io.micrometer.core.instrument.Timer",
        "org.slf4j.Logger",
    ] {
        assert!(!api.contains(hidden), "{} leaked into API {:?}", hidden, api);
    }
}

#[test]
fn test_jar_output_matches_directory_output() {
    let project = Project::new();
    let bytes = repository_class();
    let classes = project.compile(&[("com/example/store/Repository", bytes.clone())]);
    let jar = project.path().join("app.jar");
    write_jar(
        &jar,
        &[
            ("com/example/store/Repository.class", &bytes[..]),
            ("META-INF/MANIFEST.MF", &b"Manifest-Version: 1.0\n"[..]),
        ],
    )
    .unwrap();

    assert_eq!(extract(&jar).unwrap(), extract(&classes).unwrap());
    assert_eq!(extract_api(&jar).unwrap(), extract_api(&classes).unwrap());
}

#[test]
fn test_module_info_has_no_references() {
    let bytes = ClassBuilder::new("module-info")
        .access(0x8000)
        .class_ref("com/google/common/base/Preconditions")
        .build();
    let class = ClassFile::parse(&bytes).unwrap();

    assert!(class.is_module_info());
    assert!(class.referenced_classes().is_empty());
    assert!(class.api_classes().is_empty());
}

#[test]
fn test_truncated_class_names_the_file() {
    let project = Project::new();
    let mut bytes = repository_class();
    bytes.truncate(bytes.len() / 2);
    let classes = project.compile(&[("com/example/store/Repository", bytes)]);

    let err = extract(&classes).unwrap_err();
    assert!(matches!(err, DepError::ClassFile { .. }));
    assert!(err.to_string().contains("Repository.class"), "{}", err);
}

// ============================================================================
// Jar listing
// ============================================================================

#[test]
fn test_jar_listing_handles_multi_release_entries() {
    let project = Project::new();
    let jar = project.path().join("jackson-core-2.15.jar");
    let stub: &[u8] = b"\xCA\xFE\xBA\xBE";
    write_jar(
        &jar,
        &[
            ("com/fasterxml/jackson/core/JsonParser.class", stub),
            ("META-INF/versions/11/com/fasterxml/jackson/core/io/BigDecimalParser.class", stub),
            ("META-INF/versions/9/module-info.class", stub),
            ("META-INF/LICENSE", stub),
        ],
    )
    .unwrap();

    let mut classes = jar_classes(&jar).unwrap();
    classes.sort();
    assert_eq!(
        classes,
        vec![
            "com.fasterxml.jackson.core.JsonParser",
            "com.fasterxml.jackson.core.io.BigDecimalParser",
        ]
    );
}

// ============================================================================
// Dot reports
// ============================================================================

#[test]
fn test_dot_reports_from_directory() {
    let project = Project::new();
    project.write(
        "build/deps/summary.dot",
        "digraph \"summary\" {\n  \"main\" -> \"guava-28.0-jre.jar\";\n}\n",
    );
    project.write(
        "build/deps/main.dot",
        r#"digraph "main" {
    // Path: build/classes/java/main
   "com.example.app.Checks"                           -> "com.google.common.base.Preconditions (guava-28.0-jre.jar)";
   "com.example.app.Checks"                           -> "java.lang.Object (java.base)";
   "com.example.app.Service"                          -> "org.slf4j.Logger (slf4j-api-1.7.30.jar)";
}
"#,
    );
    project.write(
        "build/deps/api/main.dot",
        r#"digraph "main" {
   "com.example.app.Service"                          -> "org.slf4j.Logger (slf4j-api-1.7.30.jar)";
}
"#,
    );

    let references = DotReferences::from_dir(&project.path().join("build/deps")).unwrap();

    let used: Vec<&str> = references.used_classes().iter().map(String::as_str).collect();
    assert_eq!(
        used,
        vec!["com.google.common.base.Preconditions", "java.lang.Object", "org.slf4j.Logger"]
    );
    let api: Vec<&str> = references.api_classes().iter().map(String::as_str).collect();
    assert_eq!(api, vec!["org.slf4j.Logger"]);
}

#[test]
fn test_malformed_dot_report() {
    let project = Project::new();
    project.write(
        "build/deps/main.dot",
        "digraph \"main\" {\n   \"a.A\" -> \"b.B\";\n   <<<garbage>>>\n}\n",
    );

    let err = DotReferences::from_dir(&project.path().join("build/deps")).unwrap_err();
    match &err {
        DepError::MalformedReferenceGraph { path, line, .. } => {
            assert!(path.ends_with("main.dot"));
            assert_eq!(*line, 3);
        }
        other => panic!("unexpected error: {}", other),
    }
}
