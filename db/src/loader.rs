//! Definition loading and the schema registry.
//!
//! Definition files are YAML (`.yaml`, `.yml`) or JSON (`.json`) documents
//! holding one [`SchemaDef`]. Loading builds the tree and validates it; only
//! validated schemas enter a [`SchemaRegistry`].
//!
//! # Loading patterns
//!
//! ```no_run
//! use bitschema_core::ValidationMode;
//! use bitschema_db::SchemaRegistry;
//!
//! // Load every definition file in a directory
//! let registry = SchemaRegistry::from_dir("schemas/", ValidationMode::CollectAll).unwrap();
//! assert!(registry.get("Telecom").is_some());
//!
//! // Load a single definition file
//! let registry = SchemaRegistry::from_file("telecom.yaml", ValidationMode::FailFast).unwrap();
//!
//! // Use the builder for a fallback chain
//! let registry = SchemaRegistry::builder()
//!     .from_dir("/etc/bitschema/")
//!     .from_file("telecom.yaml")
//!     .build()
//!     .unwrap();
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bitschema_core::{SchemaDef, SchemaRoot, ValidatedSchema, ValidationMode};
use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result, SourceFailure};

/// Serialization format of a definition file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Json,
}

impl DefinitionFormat {
    /// Returns the format for `path`, or `None` for unknown extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Some(DefinitionFormat::Yaml),
            Some("json") => Some(DefinitionFormat::Json),
            _ => None,
        }
    }
}

/// Parses a definition file without building or validating it.
///
/// # Errors
///
/// [`RegistryError::UnsupportedFormat`] for unknown extensions, otherwise
/// I/O or parse errors.
pub fn read_definition(path: impl AsRef<Path>) -> Result<SchemaDef> {
    let path = path.as_ref();
    let format = DefinitionFormat::from_path(path)
        .ok_or_else(|| RegistryError::UnsupportedFormat(path.to_path_buf()))?;
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let def = match format {
        DefinitionFormat::Yaml => serde_yaml::from_reader(reader)?,
        DefinitionFormat::Json => serde_json::from_reader(reader)?,
    };
    Ok(def)
}

/// Builds and validates a parsed definition. `path` is used for reporting.
pub fn build_definition(
    def: &SchemaDef,
    path: &Path,
    mode: ValidationMode,
) -> Result<ValidatedSchema> {
    let root = SchemaRoot::from_def(def).map_err(|source| RegistryError::Definition {
        path: path.to_path_buf(),
        source,
    })?;

    root.finish(mode)
        .map_err(|errors| RegistryError::InvalidSchema {
            path: path.to_path_buf(),
            errors,
        })
}

/// Reads, builds and validates one definition file.
///
/// # Examples
///
/// ```no_run
/// use bitschema_core::ValidationMode;
///
/// let schema = bitschema_db::load_definition("telecom.yaml", ValidationMode::CollectAll).unwrap();
/// println!("{} has {} fields", schema.name(), schema.field_count());
/// ```
pub fn load_definition(path: impl AsRef<Path>, mode: ValidationMode) -> Result<ValidatedSchema> {
    let path = path.as_ref();
    let def = read_definition(path)?;
    build_definition(&def, path, mode)
}

/// Lists definition files in `dir`, sorted by path. Other files are skipped.
pub fn definition_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut paths = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && DefinitionFormat::from_path(&path).is_some() {
            paths.insert(path);
        } else {
            debug!(path = %path.display(), "Skipping non-definition entry");
        }
    }
    Ok(paths.into_iter().collect())
}

/// Describes where a [`SchemaRegistry`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    /// A directory of definition files.
    Directory(PathBuf),
    /// A single definition file.
    File(PathBuf),
    /// Built in memory through [`SchemaRegistry::insert`].
    Memory,
    /// A fallback chain of sources.
    Multiple(Vec<RegistrySource>),
}

impl fmt::Display for RegistrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrySource::Directory(dir) => write!(f, "directory '{}'", dir.display()),
            RegistrySource::File(path) => write!(f, "file '{}'", path.display()),
            RegistrySource::Memory => f.write_str("memory"),
            RegistrySource::Multiple(sources) => write!(f, "{} sources", sources.len()),
        }
    }
}

/// Validated schemas indexed by name.
///
/// Schemas are stored behind [`Arc`] so lookups can hand out shared,
/// read-only handles to any number of threads.
///
/// # Examples
///
/// ```no_run
/// use bitschema_core::ValidationMode;
/// use bitschema_db::SchemaRegistry;
///
/// let registry = SchemaRegistry::from_dir("schemas/", ValidationMode::CollectAll).unwrap();
/// for name in registry.names() {
///     println!("  {}", name);
/// }
/// if let Some(schema) = registry.shared("Telecom") {
///     std::thread::spawn(move || println!("{} views", schema.view_count()));
/// }
/// ```
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<ValidatedSchema>>,
    source: RegistrySource,
}

impl SchemaRegistry {
    /// Creates an empty in-memory registry.
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
            source: RegistrySource::Memory,
        }
    }

    /// Returns a new [`RegistryBuilder`] for configuring a fallback chain.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Loads every definition file in a directory.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be read, built or validated, and
    /// with [`RegistryError::DuplicateSchema`] when two files share a name.
    pub fn from_dir(path: impl AsRef<Path>, mode: ValidationMode) -> Result<Self> {
        load_source(&RegistrySource::Directory(path.as_ref().to_path_buf()), mode, &[])
    }

    /// Loads a single definition file.
    pub fn from_file(path: impl AsRef<Path>, mode: ValidationMode) -> Result<Self> {
        load_source(&RegistrySource::File(path.as_ref().to_path_buf()), mode, &[])
    }

    /// Looks up a schema by exact name.
    pub fn get(&self, name: &str) -> Option<&ValidatedSchema> {
        self.schemas.get(name).map(Arc::as_ref)
    }

    /// Returns a shared handle to a schema.
    pub fn shared(&self, name: &str) -> Option<Arc<ValidatedSchema>> {
        self.schemas.get(name).cloned()
    }

    /// Inserts a schema under its own name, returning any schema it replaces.
    pub fn insert(&mut self, schema: ValidatedSchema) -> Option<Arc<ValidatedSchema>> {
        self.schemas
            .insert(schema.name().to_string(), Arc::new(schema))
    }

    /// Returns `true` if the registry holds a schema named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns the number of schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if the registry holds no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schema names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &RegistrySource {
        &self.source
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn load_source(
    source: &RegistrySource,
    mode: ValidationMode,
    exclude: &[String],
) -> Result<SchemaRegistry> {
    let files = match source {
        RegistrySource::Directory(dir) => definition_files(dir)?,
        RegistrySource::File(path) => vec![path.clone()],
        RegistrySource::Memory | RegistrySource::Multiple(_) => {
            return Err(RegistryError::NoSourcesAvailable);
        }
    };

    let mut schemas: HashMap<String, Arc<ValidatedSchema>> = HashMap::new();
    for path in &files {
        let def = read_definition(path)?;
        if exclude.iter().any(|name| *name == def.name) {
            info!(schema = %def.name, path = %path.display(), "Skipping excluded schema");
            continue;
        }
        if schemas.contains_key(&def.name) {
            return Err(RegistryError::DuplicateSchema {
                name: def.name,
                path: path.clone(),
            });
        }

        let schema = build_definition(&def, path, mode)?;
        debug!(
            schema = schema.name(),
            path = %path.display(),
            fields = schema.field_count(),
            "Loaded schema definition"
        );
        schemas.insert(def.name, Arc::new(schema));
    }

    Ok(SchemaRegistry {
        schemas,
        source: source.clone(),
    })
}

/// Builder for constructing a [`SchemaRegistry`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first one that loads
/// completely wins. If all fail, [`RegistryError::SourcesFailed`] carries
/// each source's error; a builder without sources returns
/// [`RegistryError::NoSourcesAvailable`].
///
/// # Example
///
/// ```no_run
/// use bitschema_core::ValidationMode;
/// use bitschema_db::SchemaRegistry;
///
/// let registry = SchemaRegistry::builder()
///     .from_dir("/opt/schemas/")
///     .from_file("/opt/telecom.yaml")
///     .validation_mode(ValidationMode::FailFast)
///     .exclude(["Experimental"])
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    sources: Vec<RegistrySource>,
    mode: ValidationMode,
    exclude: Vec<String>,
}

impl RegistryBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory of definition files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(RegistrySource::Directory(path.into()));
        self
    }

    /// Adds a single definition file as a source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(RegistrySource::File(path.into()));
        self
    }

    /// Sets how much validation output is gathered per schema.
    pub fn validation_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Schema names to skip while loading.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Attempts to load schemas from configured sources in order.
    pub fn build(self) -> Result<SchemaRegistry> {
        if self.sources.is_empty() {
            return Err(RegistryError::NoSourcesAvailable);
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match load_source(source, self.mode, &self.exclude) {
                Ok(mut registry) => {
                    info!(source = %source, schemas = registry.len(), "Loaded schema registry");
                    registry.source = RegistrySource::Multiple(self.sources.clone());
                    return Ok(registry);
                }
                Err(error) => {
                    warn!(source = %source, error = %error, "Schema source failed, trying next");
                    failures.push(SourceFailure {
                        source: source.clone(),
                        error,
                    });
                }
            }
        }

        Err(RegistryError::SourcesFailed { failures })
    }
}
