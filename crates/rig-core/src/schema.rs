use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use rig_util::errors::{Result, RigError};

use crate::validate;
use crate::value::Value;

/// The type an option's value is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    String,
    Integer,
    Bool,
    Version,
    List,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionType::String => "string",
            OptionType::Integer => "integer",
            OptionType::Bool => "bool",
            OptionType::Version => "version",
            OptionType::List => "list",
        })
    }
}

/// Declaration of one recognized option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    #[serde(rename = "type")]
    pub kind: OptionType,

    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Inclusive lower bound for integers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    /// Inclusive upper bound for integers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,

    /// Permitted values; empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl OptionSpec {
    pub fn new(kind: OptionType) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            min: None,
            max: None,
            allowed: Vec::new(),
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn at_least(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn allowed<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }
}

/// Mapping from dotted option name to its declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSchema {
    #[serde(default)]
    pub options: BTreeMap<String, OptionSpec>,
}

const JAVA_VERSIONS: [&str; 4] = ["1.8", "11", "17", "21"];

impl OptionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: OptionSpec) -> &mut Self {
        self.options.insert(name.into(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.options.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Options that have a default value, with that default.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.options
            .iter()
            .filter_map(|(name, spec)| spec.default.as_ref().map(|d| (name.as_str(), d)))
    }

    /// The built-in schema for an Android application module.
    pub fn android() -> Self {
        use OptionType::{Bool, Integer, String, Version};

        let mut schema = Self::new();
        schema
            .insert(
                "android.namespace",
                OptionSpec::new(String)
                    .required()
                    .describe("Package namespace for generated R and BuildConfig classes"),
            )
            .insert(
                "android.compileSdk",
                OptionSpec::new(Integer)
                    .required()
                    .at_least(1)
                    .describe("API level the module is compiled against"),
            )
            .insert(
                "android.ndkVersion",
                OptionSpec::new(Version).describe("Side-by-side NDK version"),
            )
            .insert(
                "android.compileOptions.sourceCompatibility",
                OptionSpec::new(String)
                    .default_value("11")
                    .allowed(JAVA_VERSIONS),
            )
            .insert(
                "android.compileOptions.targetCompatibility",
                OptionSpec::new(String)
                    .default_value("11")
                    .allowed(JAVA_VERSIONS),
            )
            .insert(
                "android.compileOptions.isCoreLibraryDesugaringEnabled",
                OptionSpec::new(Bool)
                    .default_value(false)
                    .describe("Enable Java 8+ API desugaring for older devices"),
            )
            .insert(
                "kotlinOptions.jvmTarget",
                OptionSpec::new(String)
                    .default_value("11")
                    .allowed(JAVA_VERSIONS),
            )
            .insert(
                "android.defaultConfig.applicationId",
                OptionSpec::new(String).describe("Application id published to the store"),
            )
            .insert(
                "android.defaultConfig.minSdk",
                OptionSpec::new(Integer).default_value(21).at_least(1),
            )
            .insert(
                "android.defaultConfig.targetSdk",
                OptionSpec::new(Integer).at_least(1),
            )
            .insert(
                "android.defaultConfig.versionCode",
                OptionSpec::new(Integer).default_value(1).at_least(1),
            )
            .insert(
                "android.defaultConfig.versionName",
                OptionSpec::new(String).default_value("1.0"),
            )
            .insert(
                "flutter.source",
                OptionSpec::new(String).describe("Path to the Flutter project root"),
            )
            .insert(
                "debuggable",
                OptionSpec::new(Bool).default_value(false),
            )
            .insert(
                "minifyEnabled",
                OptionSpec::new(Bool).default_value(false),
            )
            .insert(
                "shrinkResources",
                OptionSpec::new(Bool).default_value(false),
            )
            .insert(
                "signingConfig",
                OptionSpec::new(String).describe("Name of a declared signing config"),
            )
            .insert("applicationIdSuffix", OptionSpec::new(String))
            .insert("versionNameSuffix", OptionSpec::new(String));
        schema
    }

    /// Load a schema from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RigError::Config {
            message: format!("Failed to read schema {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a schema from TOML text.
    ///
    /// Defaults are coerced to their option's type, so `default = "21"` on an
    /// integer option is stored as `21`.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut schema: Self = toml::from_str(content).map_err(|e| RigError::Config {
            message: format!("Failed to parse schema: {e}"),
        })?;
        schema.normalize_defaults()?;
        Ok(schema)
    }

    /// Coerce every default and check it against its own option's bounds.
    pub fn normalize_defaults(&mut self) -> Result<()> {
        let mut problems = Vec::new();
        for (name, spec) in &mut self.options {
            let Some(default) = &spec.default else {
                continue;
            };
            match validate::coerce(default, spec) {
                Ok(coerced) => spec.default = Some(coerced),
                Err(e) => problems.push(format!("default of '{name}': {e}")),
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(RigError::Config {
                message: format!("Invalid schema: {}", problems.join("; ")),
            })
        }
    }

    /// Serialize the schema to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RigError::Generic {
            message: format!("Failed to serialize schema: {e}"),
        })
    }
}
