use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rig_util::errors::{Result, RigError};
use rig_util::hash;

use crate::value::Value;

/// Serialization format of a [`ResolvedPlan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlanFormat {
    #[default]
    Json,
    Toml,
}

impl FromStr for PlanFormat {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(PlanFormat::Json),
            "toml" => Ok(PlanFormat::Toml),
            other => Err(RigError::Config {
                message: format!("unknown plan format '{other}' (expected json or toml)"),
            }),
        }
    }
}

impl fmt::Display for PlanFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlanFormat::Json => "json",
            PlanFormat::Toml => "toml",
        })
    }
}

/// The resolved, validated and ordered output handed to a build executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlan {
    /// Descriptor file name (or `<input>` for in-memory text).
    pub descriptor: String,

    /// SHA-256 of the descriptor file the plan was resolved from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_checksum: Option<String>,

    /// SHA-256 over the steps and variants, for change detection.
    pub fingerprint: String,

    /// Dependency applications in topological order.
    #[serde(default)]
    pub steps: Vec<PlanStep>,

    /// Fully merged variants, in declaration order.
    #[serde(default)]
    pub variants: Vec<VariantPlan>,
}

/// One dependency application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    /// 1-based position in the plan.
    pub order: usize,
    pub id: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantPlan {
    pub name: String,
    /// Inheritance chain, root ancestor first, ending with this variant.
    pub lineage: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_config: Option<PlanSigning>,
    pub options: BTreeMap<String, Value>,
}

/// Signing config reference as emitted; passwords are never written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSigning {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_alias: Option<String>,
}

#[derive(Serialize)]
struct Body<'a> {
    steps: &'a [PlanStep],
    variants: &'a [VariantPlan],
}

impl ResolvedPlan {
    /// Assemble a plan and compute its fingerprint.
    pub fn new(
        descriptor: impl Into<String>,
        steps: Vec<PlanStep>,
        variants: Vec<VariantPlan>,
    ) -> Result<Self> {
        let fingerprint = fingerprint(&steps, &variants)?;
        Ok(Self {
            descriptor: descriptor.into(),
            source_checksum: None,
            fingerprint,
            steps,
            variants,
        })
    }

    pub fn with_source_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.source_checksum = Some(checksum.into());
        self
    }

    pub fn variant(&self, name: &str) -> Option<&VariantPlan> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Recompute the fingerprint and compare it to the stored one.
    pub fn is_fingerprint_current(&self) -> bool {
        fingerprint(&self.steps, &self.variants)
            .map(|f| f == self.fingerprint)
            .unwrap_or(false)
    }

    pub fn render(&self, format: PlanFormat) -> Result<String> {
        match format {
            PlanFormat::Json => self.to_json_pretty(),
            PlanFormat::Toml => self.to_toml_pretty(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| RigError::Generic {
            message: format!("Failed to serialize plan as JSON: {e}"),
        })
    }

    pub fn to_toml_pretty(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RigError::Generic {
            message: format!("Failed to serialize plan as TOML: {e}"),
        })
    }

    /// Parse a previously rendered plan.
    pub fn parse(content: &str, format: PlanFormat) -> Result<Self> {
        match format {
            PlanFormat::Json => serde_json::from_str(content).map_err(|e| RigError::Generic {
                message: format!("Failed to parse JSON plan: {e}"),
            }),
            PlanFormat::Toml => toml::from_str(content).map_err(|e| RigError::Generic {
                message: format!("Failed to parse TOML plan: {e}"),
            }),
        }
    }
}

fn fingerprint(steps: &[PlanStep], variants: &[VariantPlan]) -> Result<String> {
    let body = serde_json::to_string(&Body { steps, variants }).map_err(|e| RigError::Generic {
        message: format!("Failed to serialize plan body: {e}"),
    })?;
    Ok(hash::sha256_str(&body))
}
