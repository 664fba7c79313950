//! Configuration loading for ZAPP Atlas.
//! Reads zapp.toml from the current directory or path in ZAPP_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub ontology: OntologyConfig,
    #[serde(default)]
    pub substances: SubstanceConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Upload ceiling mirrored from the server (50 MB).
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

fn default_endpoint()        -> String { "http://localhost:5000/observation".to_string() }
fn default_max_image_bytes() -> u64    { 50 * 1024 * 1024 }

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyConfig {
    #[serde(default = "default_zfa_uri")]
    pub anatomy_uri: String,
    #[serde(default = "default_zp_uri")]
    pub phenotype_uri: String,
}

fn default_zfa_uri() -> String { "http://localhost:5000/data/zfa.json".to_string() }
fn default_zp_uri()  -> String { "http://localhost:5000/data/zp-zapp.json".to_string() }

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            anatomy_uri: default_zfa_uri(),
            phenotype_uri: default_zp_uri(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstanceConfig {
    #[serde(default = "default_catalog_uri")]
    pub catalog_uri: String,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_catalog_uri()     -> String { "http://localhost:5000/data/substances.json".to_string() }
fn default_max_suggestions() -> usize  { 10 }

impl Default for SubstanceConfig {
    fn default() -> Self {
        Self {
            catalog_uri: default_catalog_uri(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

/// Schema-generation knobs. Earlier form generations restricted duration
/// units to `{hour, min}` and concentration units to `{uM, mg/L}`; both are
/// validation narrowings here, not separate types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default = "default_duration_units")]
    pub duration_units: Vec<String>,
    #[serde(default)]
    pub restrict_concentration_units: bool,
}

fn default_duration_units() -> Vec<String> {
    vec!["minute".to_string(), "hour".to_string(), "day".to_string()]
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            duration_units: default_duration_units(),
            restrict_concentration_units: false,
        }
    }
}

impl Config {
    /// Load configuration from zapp.toml.
    /// Checks ZAPP_CONFIG env var first, then current directory.
    /// A missing file yields the defaults rather than an error; the form is
    /// fully usable without any config.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("ZAPP_CONFIG").unwrap_or_else(|_| "zapp.toml".to_string());

        if !Path::new(&path).exists() {
            tracing::debug!(%path, "no config file found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(%path, "configuration loaded");
        Ok(config)
    }
}
