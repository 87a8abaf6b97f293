//! Error types for definition loading and registry operations.
//!
//! Provides a unified error type covering I/O, deserialization, schema
//! construction and validation failures.

use std::path::{Path, PathBuf};

use bitschema_core::SchemaError;
use thiserror::Error;

use crate::loader::RegistrySource;

/// Errors that can occur while loading schemas.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A definition could not be turned into a schema tree.
    #[error("schema error in '{}': {source}", .path.display())]
    Definition {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    /// A schema tree failed validation; carries every reported failure.
    #[error("invalid schema '{}': {}", .path.display(), summarize(.errors))]
    InvalidSchema {
        path: PathBuf,
        errors: Vec<SchemaError>,
    },

    /// The file extension is not a known definition format.
    #[error("unsupported definition file '{}': expected .yaml, .yml or .json", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Two definition files declare the same schema name.
    #[error("duplicate schema name '{name}' in '{}'", .path.display())]
    DuplicateSchema { name: String, path: PathBuf },

    /// The builder was given no sources to try.
    #[error("no schema sources available")]
    NoSourcesAvailable,

    /// Every configured source failed; one entry per source, in order.
    #[error("all {} schema source(s) failed: {}", .failures.len(), summarize_sources(.failures))]
    SourcesFailed { failures: Vec<SourceFailure> },
}

/// Why one source of a fallback chain could not be loaded.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: RegistrySource,
    pub error: RegistryError,
}

impl RegistryError {
    /// Validation failures carried by this error, if any.
    pub fn schema_errors(&self) -> &[SchemaError] {
        match self {
            RegistryError::InvalidSchema { errors, .. } => errors,
            RegistryError::Definition { source, .. } => std::slice::from_ref(source),
            _ => &[],
        }
    }

    /// Definition file the error is about, if it names one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            RegistryError::Definition { path, .. }
            | RegistryError::InvalidSchema { path, .. }
            | RegistryError::DuplicateSchema { path, .. }
            | RegistryError::UnsupportedFormat(path) => Some(path),
            _ => None,
        }
    }
}

fn summarize_sources(failures: &[SourceFailure]) -> String {
    match failures {
        [] => "no details".to_string(),
        [only] => format!("{}: {}", only.source, only.error),
        [first, rest @ ..] => format!(
            "{}: {} (and {} more)",
            first.source,
            first.error,
            rest.len()
        ),
    }
}

fn summarize(errors: &[SchemaError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
