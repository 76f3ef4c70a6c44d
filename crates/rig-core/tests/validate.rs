use rig_core::descriptor::{Descriptor, Variant};
use rig_core::schema::{OptionSchema, OptionSpec, OptionType};
use rig_core::validate::validate;
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

fn violations(err: RigError) -> Vec<String> {
    match err {
        RigError::Validation { violations } => violations,
        other => panic!("expected a validation error, got {other}"),
    }
}

#[test]
fn test_min_and_target_sdk_validate() {
    let mut schema = OptionSchema::new();
    schema
        .insert("minSdk", OptionSpec::new(OptionType::Integer).required().at_least(1))
        .insert("targetSdk", OptionSpec::new(OptionType::Integer).required().at_least(1));
    let descriptor = Descriptor::from_str("minSdk = 21\ntargetSdk = 34").unwrap();

    let validated = validate(&descriptor, &schema).unwrap();
    assert_eq!(validated.options["minSdk"], Value::Integer(21));
    assert_eq!(validated.options["targetSdk"], Value::Integer(34));
}

#[test]
fn test_flux_app_validates_against_android_schema() {
    let descriptor = Descriptor::from_path(&fixtures_dir().join("flux-app.rig")).unwrap();
    let validated = validate(&descriptor, &OptionSchema::android()).unwrap();
    assert_eq!(
        validated.options["android.defaultConfig.minSdk"],
        Value::Integer(21)
    );
    assert_eq!(
        validated.variant("debug").unwrap().overrides["debuggable"],
        Value::Bool(true)
    );
}

#[test]
fn test_minimal_fixture_validates() {
    let descriptor = Descriptor::from_path(&fixtures_dir().join("minimal.rig")).unwrap();
    assert!(validate(&descriptor, &OptionSchema::android()).is_ok());
}

#[test]
fn test_all_violations_are_reported_together() {
    let descriptor = Descriptor::from_path(&fixtures_dir().join("invalid-options.rig")).unwrap();
    let found = violations(validate(&descriptor, &OptionSchema::android()).unwrap_err());

    let expect = [
        "missing required option 'android.namespace'",
        "option 'android.compileSdk': 0 is below the minimum 1",
        "option 'android.defaultConfig.minSdk': expected integer",
        "option 'android.compileOptions.sourceCompatibility': \"9\" is not one of",
        "variant 'release': option 'debuggable': expected bool",
        "variant 'release': unknown option 'shinkResources'",
        "dependency 'com.example:broken': invalid version constraint",
    ];
    assert_eq!(found.len(), expect.len(), "got: {found:#?}");
    for needle in expect {
        assert!(
            found.iter().any(|v| v.contains(needle)),
            "missing violation {needle:?} in {found:#?}"
        );
    }
}

#[test]
fn test_unknown_top_level_option() {
    let descriptor = Descriptor::from_str(
        "android.namespace = \"a\"\nandroid.compileSdk = 34\nandroid.minSdkk = 21",
    )
    .unwrap();
    let found = violations(validate(&descriptor, &OptionSchema::android()).unwrap_err());
    assert_eq!(found, vec!["unknown option 'android.minSdkk'"]);
}

#[test]
fn test_required_with_default_may_be_omitted() {
    let mut schema = OptionSchema::new();
    schema.insert(
        "minSdk",
        OptionSpec::new(OptionType::Integer).required().default_value(21),
    );
    assert!(validate(&Descriptor::default(), &schema).is_ok());
}

#[test]
fn test_required_option_in_variant_only_is_missing() {
    let mut schema = OptionSchema::new();
    schema.insert("minSdk", OptionSpec::new(OptionType::Integer).required());
    let mut descriptor = Descriptor::default();
    descriptor.variants.push(Variant::new("release").with("minSdk", 21));

    let found = violations(validate(&descriptor, &schema).unwrap_err());
    assert_eq!(found, vec!["missing required option 'minSdk'"]);
}

#[test]
fn test_validation_does_not_modify_input() {
    let descriptor = Descriptor::from_str(
        "android.namespace = \"a\"\nandroid.compileSdk = \"34\"",
    )
    .unwrap();
    let validated = validate(&descriptor, &OptionSchema::android()).unwrap();
    assert_eq!(descriptor.options["android.compileSdk"], Value::from("34"));
    assert_eq!(validated.options["android.compileSdk"], Value::Integer(34));
}

#[test]
fn test_validated_descriptor_validates_again() {
    let descriptor = Descriptor::from_path(&fixtures_dir().join("flux-app.rig")).unwrap();
    let schema = OptionSchema::android();
    let once = validate(&descriptor, &schema).unwrap();
    let twice = validate(&once, &schema).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_error_message_lists_each_violation() {
    let descriptor = Descriptor::from_str("a = 1\nb = 2").unwrap();
    let err = validate(&descriptor, &OptionSchema::new()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("Validation failed with 2 violation(s):"), "got: {msg}");
    assert!(msg.contains("  - unknown option 'a'"));
    assert!(msg.contains("  - unknown option 'b'"));
}

#[test]
fn test_ill_typed_default_fails_validation() {
    let mut schema = OptionSchema::new();
    schema.insert(
        "minSdk",
        OptionSpec::new(OptionType::Integer)
            .at_least(1)
            .default_value("not-a-number"),
    );
    let err = validate(&Descriptor::default(), &schema).unwrap_err();
    let found = violations(err);
    assert_eq!(found.len(), 1);
    assert!(
        found[0].starts_with("default of option 'minSdk': expected integer"),
        "got: {found:?}"
    );
}
