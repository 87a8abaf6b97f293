//! Node definitions for the view → record → field hierarchy.
//!
//! These are detached values: a node gains its parent only when it is handed
//! to one of the `SchemaRoot::add_*` methods, which moves it into the schema
//! arena and returns a typed handle. A moved node cannot be attached twice.

use crate::{DataType, FragmentSpec, ItemSpec};

/// Handle of a view inside its [`SchemaRoot`](crate::SchemaRoot).
///
/// Handles remember which schema issued them and are rejected by any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId {
    pub(crate) schema: u64,
    pub(crate) index: usize,
}

/// Handle of a record inside its [`SchemaRoot`](crate::SchemaRoot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    pub(crate) schema: u64,
    pub(crate) index: usize,
}

/// Handle of a field inside its [`SchemaRoot`](crate::SchemaRoot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub(crate) schema: u64,
    pub(crate) index: usize,
}

/// One message layout: a named sequence of records.
///
/// # Examples
///
/// ```
/// use bitschema_core::ViewSpec;
///
/// let view = ViewSpec::new("Billing", 96).with_description("Billing ticket");
/// assert_eq!(view.name(), "Billing");
/// assert_eq!(view.bit_length(), 96);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSpec {
    name: String,
    description: String,
    bit_length: u32,
}

impl ViewSpec {
    pub fn new(name: impl Into<String>, bit_length: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            bit_length,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }
}

/// A named group of fields with an aggregate bit length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpec {
    name: String,
    description: String,
    bit_length: u32,
}

impl RecordSpec {
    pub fn new(name: impl Into<String>, bit_length: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            bit_length,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }
}

/// A named, typed, bit-length-constrained leaf of a record.
///
/// # Examples
///
/// ```
/// use bitschema_core::{DataType, FieldSpec, FragmentSpec};
///
/// let field = FieldSpec::new("Status", DataType::BitArray, 8)
///     .with_description("Status flags")
///     .with_fragment(FragmentSpec::new(0, 3))
///     .with_fragment(FragmentSpec::new(5, 3));
/// assert_eq!(field.data_type(), DataType::BitArray);
/// assert_eq!(field.fragments().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    description: String,
    item: ItemSpec,
    fragments: Vec<FragmentSpec>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, data_type: DataType, bit_length: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            item: ItemSpec::new(data_type, bit_length),
            fragments: Vec::new(),
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a fragment.
    pub fn with_fragment(mut self, fragment: FragmentSpec) -> Self {
        self.fragments.push(fragment);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn item(&self) -> &ItemSpec {
        &self.item
    }

    pub fn data_type(&self) -> DataType {
        self.item.data_type
    }

    pub fn bit_length(&self) -> u32 {
        self.item.bit_length
    }

    pub fn fragments(&self) -> &[FragmentSpec] {
        &self.fragments
    }

    pub(crate) fn push_fragment(&mut self, fragment: FragmentSpec) {
        self.fragments.push(fragment);
    }
}
