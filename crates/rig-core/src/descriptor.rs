use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use rig_util::errors::{Result, RigError};

use crate::parser::{self, Entry, EntryBody};
use crate::properties;
use crate::value::Value;

/// Top-level section declaring build plugins.
pub const PLUGINS_SECTION: &str = "plugins";
/// Top-level section declaring library dependencies, optionally grouped by configuration.
pub const DEPENDENCIES_SECTION: &str = "dependencies";
/// Top-level section declaring build variants.
pub const VARIANTS_SECTION: &str = "variants";
/// Top-level section declaring named signing configurations.
pub const SIGNING_SECTION: &str = "signingConfigs";

/// Dependency kind for entries of the `plugins` section.
pub const PLUGIN_KIND: &str = "plugin";
/// Dependency kind for ids declared directly under `dependencies`.
pub const DEFAULT_DEPENDENCY_KIND: &str = "implementation";

/// Key inside a variant block naming its base variant.
pub const EXTENDS_KEY: &str = "extends";

/// A parsed build descriptor: options, variants, dependencies and signing configs.
///
/// Options are flattened to dotted names; the other collections keep
/// declaration order, which later breaks ties when ordering the build plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptor {
    pub options: BTreeMap<String, Value>,
    pub variants: Vec<Variant>,
    pub dependencies: Vec<DependencyNode>,
    pub signing_configs: Vec<SigningConfig>,
}

/// A named configuration profile that may extend one base variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: String,
    pub base: Option<String>,
    pub overrides: BTreeMap<String, Value>,
}

impl Variant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            overrides: BTreeMap::new(),
        }
    }

    pub fn extending(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }
}

/// A plugin or library with a version constraint and its direct requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    pub id: String,
    pub version: Option<String>,
    /// Ids this node needs applied before itself, in declaration order.
    pub requires: Vec<String>,
    /// `plugin`, `implementation`, or the configuration block it was declared in.
    pub kind: String,
}

impl DependencyNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
            requires: Vec::new(),
            kind: kind.into(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn requiring<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(ids.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for DependencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{} {v}", self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// Keystore settings a variant can point at through its `signingConfig` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningConfig {
    pub name: String,
    pub store_file: Option<String>,
    pub store_password: Option<String>,
    pub key_alias: Option<String>,
    pub key_password: Option<String>,
}

impl SigningConfig {
    /// Name of the signing config that exists without being declared.
    pub const DEBUG: &'static str = "debug";

    /// The Android debug keystore every SDK install generates.
    pub fn debug() -> Self {
        Self {
            name: Self::DEBUG.to_string(),
            store_file: Some("~/.android/debug.keystore".to_string()),
            store_password: Some("android".to_string()),
            key_alias: Some("androiddebugkey".to_string()),
            key_password: Some("android".to_string()),
        }
    }

    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            store_file: None,
            store_password: None,
            key_alias: None,
            key_password: None,
        }
    }
}

impl Descriptor {
    /// Load and parse a descriptor file.
    ///
    /// Before parsing, `${env:VAR}` references are resolved using `.rig.env`
    /// (if present alongside the descriptor) and process environment variables.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RigError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {e}", path.display()),
            ))
        })?;

        let dir = path.parent().unwrap_or(Path::new("."));
        let env_vars = properties::load_env_file(&dir.join(properties::ENV_FILE_NAME))?;
        let resolved = properties::interpolate(&content, &env_vars);
        for key in &resolved.missing {
            tracing::warn!(
                "{}: ${{env:{key}}} is not set; substituting an empty string",
                path.display()
            );
        }

        Self::from_str(&resolved.text)
    }

    /// Parse descriptor text (no interpolation).
    pub fn from_str(content: &str) -> Result<Self> {
        let entries = parser::parse(content)?;
        Self::from_entries(&entries)
    }

    /// Build a descriptor from an already parsed syntax tree.
    pub fn from_entries(entries: &[Entry]) -> Result<Self> {
        let mut builder = Builder::default();
        for entry in entries {
            match (entry.quoted, entry.key.as_str()) {
                (false, PLUGINS_SECTION) => {
                    for child in section(entry)? {
                        builder.add_dependency(child, PLUGIN_KIND)?;
                    }
                }
                (false, DEPENDENCIES_SECTION) => builder.add_dependencies(section(entry)?)?,
                (false, VARIANTS_SECTION) => builder.add_variants(section(entry)?)?,
                (false, SIGNING_SECTION) => builder.add_signing_configs(section(entry)?)?,
                _ => builder.options.flatten("", entry)?,
            }
        }

        let descriptor = Descriptor {
            options: builder.options.finish()?,
            variants: builder.variants,
            dependencies: builder.dependencies,
            signing_configs: builder.signing_configs,
        };
        tracing::debug!(
            "descriptor: {} options, {} variants, {} dependencies",
            descriptor.options.len(),
            descriptor.variants.len(),
            descriptor.dependencies.len()
        );
        Ok(descriptor)
    }

    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn dependency(&self, id: &str) -> Option<&DependencyNode> {
        self.dependencies.iter().find(|d| d.id == id)
    }

    /// Look up a signing config by name, falling back to the built-in `debug` one.
    pub fn signing_config(&self, name: &str) -> Option<SigningConfig> {
        self.signing_configs
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .or_else(|| (name == SigningConfig::DEBUG).then(SigningConfig::debug))
    }
}

fn parse_err(line: usize, message: String) -> RigError {
    RigError::Parse { line, message }
}

fn section(entry: &Entry) -> Result<&[Entry]> {
    entry
        .as_block()
        .ok_or_else(|| parse_err(entry.line, format!("'{}' must be a block", entry.key)))
}

fn expect_string(entry: &Entry, what: &str) -> Result<String> {
    match entry.as_value() {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(parse_err(
            entry.line,
            format!("{what} '{}' must be a string", entry.key),
        )),
    }
}

/// Flattened option map with the line each key was declared on.
#[derive(Default)]
struct OptionSink {
    values: BTreeMap<String, Value>,
    lines: HashMap<String, usize>,
}

impl OptionSink {
    fn flatten(&mut self, prefix: &str, entry: &Entry) -> Result<()> {
        let key = if prefix.is_empty() {
            entry.key.clone()
        } else {
            format!("{prefix}.{}", entry.key)
        };
        match &entry.body {
            EntryBody::Value(value) => {
                if let Some(first) = self.lines.insert(key.clone(), entry.line) {
                    return Err(parse_err(
                        entry.line,
                        format!("duplicate key '{key}' (first declared at line {first})"),
                    ));
                }
                self.values.insert(key, value.clone());
            }
            EntryBody::Block(children) => {
                for child in children {
                    self.flatten(&key, child)?;
                }
            }
        }
        Ok(())
    }

    /// Reject a key that is both a value and the prefix of another key.
    fn finish(self) -> Result<BTreeMap<String, Value>> {
        for key in self.values.keys() {
            for (idx, _) in key.match_indices('.') {
                let parent = &key[..idx];
                if self.values.contains_key(parent) {
                    let line = self.lines.get(key).copied().unwrap_or(1);
                    return Err(parse_err(
                        line,
                        format!("'{parent}' is assigned a value but '{key}' treats it as a block"),
                    ));
                }
            }
        }
        Ok(self.values)
    }
}

#[derive(Default)]
struct Builder {
    options: OptionSink,
    variants: Vec<Variant>,
    dependencies: Vec<DependencyNode>,
    dependency_lines: HashMap<String, usize>,
    signing_configs: Vec<SigningConfig>,
}

impl Builder {
    fn add_dependencies(&mut self, entries: &[Entry]) -> Result<()> {
        for entry in entries {
            if entry.quoted {
                self.add_dependency(entry, DEFAULT_DEPENDENCY_KIND)?;
                continue;
            }
            // An unquoted key names a configuration such as `coreLibraryDesugaring`.
            let Some(children) = entry.as_block() else {
                return Err(parse_err(
                    entry.line,
                    format!(
                        "expected a quoted dependency id or a configuration block, got '{}'",
                        entry.key
                    ),
                ));
            };
            for child in children {
                if !child.quoted {
                    return Err(parse_err(
                        child.line,
                        format!(
                            "expected a quoted dependency id in '{}', got '{}'",
                            entry.key, child.key
                        ),
                    ));
                }
                self.add_dependency(child, &entry.key)?;
            }
        }
        Ok(())
    }

    fn add_dependency(&mut self, entry: &Entry, kind: &str) -> Result<()> {
        let mut node = DependencyNode::new(&entry.key, kind);
        match &entry.body {
            EntryBody::Value(Value::String(v)) => {
                if !v.is_empty() {
                    node.version = Some(v.clone());
                }
            }
            EntryBody::Value(other) => {
                return Err(parse_err(
                    entry.line,
                    format!(
                        "version of '{}' must be a string, got {}",
                        entry.key,
                        other.type_name()
                    ),
                ));
            }
            EntryBody::Block(fields) => {
                for field in fields {
                    match field.key.as_str() {
                        "version" => node.version = Some(expect_string(field, "field")?),
                        "requires" => node.requires = string_list(field)?,
                        other => {
                            return Err(parse_err(
                                field.line,
                                format!("unknown field '{other}' in dependency '{}'", entry.key),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(first) = self.dependency_lines.insert(node.id.clone(), entry.line) {
            return Err(parse_err(
                entry.line,
                format!(
                    "dependency '{}' is declared twice (first at line {first})",
                    node.id
                ),
            ));
        }
        self.dependencies.push(node);
        Ok(())
    }

    fn add_variants(&mut self, entries: &[Entry]) -> Result<()> {
        for entry in entries {
            let Some(children) = entry.as_block() else {
                return Err(parse_err(
                    entry.line,
                    format!("variant '{}' must be a block", entry.key),
                ));
            };
            let mut variant = Variant::new(&entry.key);
            let mut sink = OptionSink::default();
            for child in children {
                if !child.quoted && child.key == EXTENDS_KEY {
                    variant.base = Some(expect_string(child, "field")?);
                } else {
                    sink.flatten("", child)?;
                }
            }
            variant.overrides = sink.finish()?;
            self.variants.push(variant);
        }
        Ok(())
    }

    fn add_signing_configs(&mut self, entries: &[Entry]) -> Result<()> {
        for entry in entries {
            let Some(fields) = entry.as_block() else {
                return Err(parse_err(
                    entry.line,
                    format!("signing config '{}' must be a block", entry.key),
                ));
            };
            let mut config = SigningConfig::named(&entry.key);
            for field in fields {
                let value = Some(expect_string(field, "field")?);
                match field.key.as_str() {
                    "storeFile" => config.store_file = value,
                    "storePassword" => config.store_password = value,
                    "keyAlias" => config.key_alias = value,
                    "keyPassword" => config.key_password = value,
                    other => {
                        return Err(parse_err(
                            field.line,
                            format!("unknown field '{other}' in signing config '{}'", entry.key),
                        ));
                    }
                }
            }
            self.signing_configs.push(config);
        }
        Ok(())
    }
}

fn string_list(entry: &Entry) -> Result<Vec<String>> {
    let not_strings = || {
        parse_err(
            entry.line,
            format!("'{}' must be a string or a list of strings", entry.key),
        )
    };
    match entry.as_value() {
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::List(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(not_strings))
            .collect(),
        _ => Err(not_strings()),
    }
}
