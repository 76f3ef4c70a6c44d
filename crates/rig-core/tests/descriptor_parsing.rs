use rig_core::descriptor::{Descriptor, SigningConfig, DEFAULT_DEPENDENCY_KIND, PLUGIN_KIND};
use rig_core::value::Value;
use rig_util::errors::RigError;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests/fixtures")
}

#[test]
fn test_parse_flux_app_fixture() {
    let descriptor = Descriptor::from_path(&fixtures_dir().join("flux-app.rig")).unwrap();
    assert_eq!(
        descriptor.options["android.namespace"],
        Value::from("com.wisamidris.flux")
    );
    assert_eq!(descriptor.options["android.compileSdk"], Value::Integer(35));
    assert_eq!(
        descriptor.options["android.compileOptions.isCoreLibraryDesugaringEnabled"],
        Value::Bool(true)
    );
    assert_eq!(descriptor.options["kotlinOptions.jvmTarget"], Value::from("11"));
    assert_eq!(descriptor.options["flutter.source"], Value::from("../.."));
    // Still a string here; coercion happens in validation.
    assert_eq!(
        descriptor.options["android.defaultConfig.minSdk"],
        Value::from("21")
    );

    let ids: Vec<&str> = descriptor.dependencies.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "com.android.application",
            "kotlin-android",
            "dev.flutter.flutter-gradle-plugin",
            "com.android.tools:desugar_jdk_libs",
        ]
    );
    assert_eq!(descriptor.dependencies[0].kind, PLUGIN_KIND);
    assert_eq!(descriptor.dependencies[3].kind, "coreLibraryDesugaring");
    assert_eq!(descriptor.dependencies[3].version.as_deref(), Some("2.1.4"));
    assert_eq!(
        descriptor.dependency("dev.flutter.flutter-gradle-plugin").unwrap().requires,
        vec!["com.android.application", "kotlin-android"]
    );

    let names: Vec<&str> = descriptor.variants.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["debug", "release"]);
    assert_eq!(
        descriptor.variant("release").unwrap().overrides["signingConfig"],
        Value::from("debug")
    );
}

#[test]
fn test_parse_variant_extends() {
    let descriptor = Descriptor::from_path(&fixtures_dir().join("flavored.rig")).unwrap();
    let paid = descriptor.variant("paid").unwrap();
    assert_eq!(paid.base.as_deref(), Some("release"));
    assert!(!paid.overrides.contains_key("extends"));
    assert!(descriptor.variant("base").unwrap().base.is_none());
}

#[test]
fn test_signing_configs_and_builtin_debug() {
    let descriptor = Descriptor::from_path(&fixtures_dir().join("flavored.rig")).unwrap();
    let upload = descriptor.signing_config("upload").unwrap();
    assert_eq!(upload.store_file.as_deref(), Some("keys/upload.jks"));
    assert_eq!(upload.key_alias.as_deref(), Some("upload"));
    assert_eq!(descriptor.signing_config("debug"), Some(SigningConfig::debug()));
    assert!(descriptor.signing_config("missing").is_none());
}

#[test]
fn test_malformed_fixture_reports_line() {
    let err = Descriptor::from_path(&fixtures_dir().join("malformed.rig")).unwrap_err();
    match err {
        RigError::Parse { line, message } => {
            assert_eq!(line, 5);
            assert!(message.contains("unterminated block 'android'"), "got: {message}");
        }
        other => panic!("expected a parse error, got {other}"),
    }
}

#[test]
fn test_missing_file_is_an_error() {
    let err = Descriptor::from_path(&fixtures_dir().join("does-not-exist.rig")).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
    assert!(err.to_string().contains("does-not-exist.rig"));
    match err {
        RigError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected an I/O error, got {other}"),
    }
}

#[test]
fn test_dotted_key_and_block_path_collide() {
    let input = "android.compileSdk = 34\nandroid { compileSdk = 35 }";
    let err = Descriptor::from_str(input).unwrap_err();
    assert!(err.to_string().contains("duplicate key 'android.compileSdk'"), "got: {err}");
}

#[test]
fn test_value_and_block_prefix_conflict() {
    let input = "android = \"x\"\nandroid.compileSdk = 34";
    let err = Descriptor::from_str(input).unwrap_err();
    assert!(err.to_string().contains("treats it as a block"), "got: {err}");
}

#[test]
fn test_dependency_declared_directly_is_implementation() {
    let input = r#"dependencies { "androidx.core:core-ktx" = "1.13.1" }"#;
    let descriptor = Descriptor::from_str(input).unwrap();
    assert_eq!(descriptor.dependencies[0].kind, DEFAULT_DEPENDENCY_KIND);
    assert_eq!(descriptor.dependencies[0].to_string(), "androidx.core:core-ktx 1.13.1");
}

#[test]
fn test_dependency_declared_in_two_sections_is_rejected() {
    let input = r#"
plugins { "x" = "1.0" }
dependencies { "x" = "1.0" }
"#;
    match Descriptor::from_str(input).unwrap_err() {
        RigError::Parse { line, message } => {
            assert_eq!(line, 3);
            assert!(message.contains("declared twice (first at line 2)"), "got: {message}");
        }
        other => panic!("expected a parse error, got {other}"),
    }
}

#[test]
fn test_unknown_dependency_field_is_rejected() {
    let input = r#"plugins { "x" { verison = "1.0" } }"#;
    let err = Descriptor::from_str(input).unwrap_err();
    assert!(err.to_string().contains("unknown field 'verison'"), "got: {err}");
}

#[test]
fn test_unquoted_dependency_value_is_rejected() {
    let err = Descriptor::from_str("dependencies { core = \"1.0\" }").unwrap_err();
    assert!(err.to_string().contains("configuration block"), "got: {err}");
}

#[test]
fn test_variant_must_be_block() {
    let err = Descriptor::from_str("variants { release = true }").unwrap_err();
    assert!(err.to_string().contains("must be a block"), "got: {err}");
}

#[test]
fn test_env_interpolation_from_env_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".rig.env"), "APP_NS=com.example.env\n").unwrap();
    let path = dir.path().join("build.rig");
    std::fs::write(&path, "android.namespace = \"${env:APP_NS}\"\n").unwrap();

    let descriptor = Descriptor::from_path(&path).unwrap();
    assert_eq!(
        descriptor.options["android.namespace"],
        Value::from("com.example.env")
    );
}

#[test]
fn test_env_interpolation_missing_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("build.rig");
    std::fs::write(&path, "flutter.source = \"${env:RIG_SURELY_UNSET_VAR_41}\"\n").unwrap();

    let descriptor = Descriptor::from_path(&path).unwrap();
    assert_eq!(descriptor.options["flutter.source"], Value::from(""));
}
