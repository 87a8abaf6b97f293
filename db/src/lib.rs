//! Definition loading and registry management for bit-field schemas.
//!
//! This crate is the loader side of `bitschema-core`: it reads schema
//! definitions from YAML or JSON files, builds and validates them, and keeps
//! the validated schemas in a [`SchemaRegistry`] for shared read-only use.
//!
//! # Quick start
//!
//! ```no_run
//! use bitschema_core::ValidationMode;
//! use bitschema_db::{RegistryConfig, SchemaRegistry};
//!
//! // Load definitions from a directory
//! let registry = SchemaRegistry::from_dir("schemas/", ValidationMode::CollectAll).unwrap();
//! if let Some(schema) = registry.get("Telecom") {
//!     println!("Telecom has {} fields", schema.field_count());
//! }
//!
//! // Or follow a configuration file
//! let config = RegistryConfig::load("bitschema.yml").unwrap();
//! let registry = config.open_registry(".").unwrap();
//! ```

mod config;
mod error;
mod loader;

pub use config::{DEFAULT_MAX_REPORTED_ERRORS, RegistryConfig, ValidationConfig};
pub use error::{RegistryError, Result, SourceFailure};
pub use loader::{
    DefinitionFormat, RegistryBuilder, RegistrySource, SchemaRegistry, build_definition,
    definition_files, load_definition, read_definition,
};
