use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{SourceError, SourceResult};

/// Contents of a `nabla.toml` manifest.
///
/// Every section is optional; an empty manifest yields the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct NablaConfig {
    /// Package information
    #[serde(default)]
    pub package: PackageInfo,

    /// Module path (`net::http`) to the documents registered under it
    #[serde(default)]
    pub modules: FxHashMap<String, ModuleConfig>,

    /// Structural bounds enforced by the parser and resolver
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    /// Document holding the instantiations to compile
    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    #[serde(default)]
    pub description: Option<String>,
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: String::new(),
            entry_point: default_entry_point(),
            description: None,
        }
    }
}

pub fn default_entry_point() -> String {
    "main.nabla".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ModuleConfig {
    /// A module backed by one document
    Single(String),

    /// A module whose namespace is split over several documents
    Files { files: Vec<String> },
}

impl ModuleConfig {
    pub fn files(&self) -> Vec<&str> {
        match self {
            ModuleConfig::Single(file) => vec![file.as_str()],
            ModuleConfig::Files { files } => files.iter().map(String::as_str).collect(),
        }
    }
}

/// Bounds that turn pathological input into a single fatal diagnostic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Limits {
    /// Maximum nesting of expressions, use items and schema evaluation
    pub max_depth: usize,

    /// Maximum number of significant tokens in one document
    pub max_tokens: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_tokens: 1_000_000,
        }
    }
}

impl NablaConfig {
    /// Parses and validates manifest text.
    pub fn from_toml_str(text: &str) -> SourceResult<Self> {
        let config: NablaConfig = toml::from_str(text)?;
        config.validate()?;
        log::debug!(
            "loaded config for package `{}` with {} module(s)",
            config.package.name,
            config.modules.len()
        );
        Ok(config)
    }

    fn validate(&self) -> SourceResult<()> {
        if self.limits.max_depth == 0 {
            return Err(SourceError::InvalidLimit { name: "max_depth" });
        }
        if self.limits.max_tokens == 0 {
            return Err(SourceError::InvalidLimit { name: "max_tokens" });
        }
        for (path, module) in &self.modules {
            if !is_module_path(path) {
                return Err(SourceError::InvalidModulePath(path.clone()));
            }
            if module.files().is_empty() {
                return Err(SourceError::EmptyModule(path.clone()));
            }
        }
        Ok(())
    }
}

fn is_module_path(path: &str) -> bool {
    path.split("::").all(|segment| {
        let mut chars = segment.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
