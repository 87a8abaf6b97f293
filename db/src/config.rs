//! Registry configuration.
//!
//! Defines the YAML-serializable configuration that lists where schema
//! definitions live, which schemas to skip, and how validation reports.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! sources:
//!   - /etc/bitschema/schemas
//!   - schemas
//! exclude:
//!   - Experimental
//! validation:
//!   mode: collect_all
//!   max_reported_errors: 20
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use bitschema_core::ValidationMode;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loader::{RegistryBuilder, SchemaRegistry};

/// Default cap on the number of validation errors shown per schema.
pub const DEFAULT_MAX_REPORTED_ERRORS: usize = 20;

/// Validation settings.
///
/// # Examples
///
/// ```
/// # use bitschema_db::ValidationConfig;
/// # use bitschema_core::ValidationMode;
/// let v = ValidationConfig::default();
/// assert_eq!(v.mode, ValidationMode::CollectAll);
/// assert_eq!(v.max_reported_errors, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Stop at the first failing node or collect every failure.
    #[serde(default)]
    pub mode: ValidationMode,
    /// Maximum number of errors printed per schema.
    #[serde(default = "default_max_reported_errors")]
    pub max_reported_errors: usize,
}

fn default_max_reported_errors() -> usize {
    DEFAULT_MAX_REPORTED_ERRORS
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::default(),
            max_reported_errors: DEFAULT_MAX_REPORTED_ERRORS,
        }
    }
}

/// Top-level registry configuration.
///
/// Sources form a fallback chain: the first one that loads completely is
/// used. Relative source paths are resolved against the directory passed to
/// [`open_registry`](Self::open_registry), usually the config file's own
/// directory.
///
/// # Examples
///
/// ```no_run
/// use bitschema_db::RegistryConfig;
///
/// let config = RegistryConfig::load("bitschema.yml").unwrap();
/// let registry = config.open_registry(".").unwrap();
/// println!("{} schemas loaded", registry.len());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Directories or definition files, tried in order.
    pub sources: Vec<PathBuf>,
    /// Schema names to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Validation settings.
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl RegistryConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` if `schema` is in the exclusion list.
    pub fn is_excluded(&self, schema: &str) -> bool {
        self.exclude.iter().any(|s| s == schema)
    }

    /// Source paths with relative entries joined onto `base_dir`, in
    /// fallback order.
    pub fn resolved_sources(&self, base_dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let base_dir = base_dir.as_ref();
        self.sources
            .iter()
            .map(|source| {
                if source.is_relative() {
                    base_dir.join(source)
                } else {
                    source.clone()
                }
            })
            .collect()
    }

    /// Returns a builder with every source, exclusion and the validation
    /// mode applied. Relative sources are joined onto `base_dir`.
    pub fn builder(&self, base_dir: impl AsRef<Path>) -> RegistryBuilder {
        let builder = SchemaRegistry::builder()
            .validation_mode(self.validation.mode)
            .exclude(self.exclude.iter().cloned());

        self.resolved_sources(base_dir)
            .into_iter()
            .fold(builder, |builder, path| {
                if path.is_dir() {
                    builder.from_dir(path)
                } else {
                    builder.from_file(path)
                }
            })
    }

    /// Loads the registry described by this configuration.
    pub fn open_registry(&self, base_dir: impl AsRef<Path>) -> Result<SchemaRegistry> {
        self.builder(base_dir).build()
    }
}
