//! Error type for schema construction and validation.
//!
//! Every failure in the core surfaces as a [`SchemaError`]. The `Display`
//! impl renders a human-readable message that names the offending node by
//! its dotted path.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::DataType;

/// Kind of schema node, used when reporting naming and aggregate problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    View,
    Record,
    Field,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::View => "view",
            NodeKind::Record => "record",
            NodeKind::Field => "field",
        })
    }
}

/// The single constraint a length failed, carrying the expected value for
/// that constraint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthViolation {
    /// Length is not a multiple of the given modulo.
    Modulo(u32),
    /// Length is below the given minimum.
    Minimum(u32),
    /// Length is above the given maximum.
    Maximum(u32),
    /// Minimum and maximum coincide and the length differs from them.
    Exact(u32),
}

impl fmt::Display for LengthViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthViolation::Modulo(m) => write!(f, "must be a multiple of {m}"),
            LengthViolation::Minimum(n) => write!(f, "must be at least {n}"),
            LengthViolation::Maximum(n) => write!(f, "must be at most {n}"),
            LengthViolation::Exact(n) => write!(f, "must equal {n}"),
        }
    }
}

/// Schema construction and validation errors.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// A field's length breaks the rule of its data type.
    #[error(
        "{data_type} field '{path}' in record '{record}' has invalid length of {length} {unit}: {violation}"
    )]
    InvalidLength {
        path: String,
        record: String,
        data_type: DataType,
        length: u32,
        unit: String,
        violation: LengthViolation,
    },

    /// A sibling with the same name is already attached to the parent.
    #[error("duplicate {kind} name '{name}' in '{parent}'")]
    DuplicateName {
        kind: NodeKind,
        name: String,
        parent: String,
    },

    /// A node was attached with an empty or whitespace-only name.
    #[error("{kind} name cannot be empty (in '{parent}')")]
    EmptyName { kind: NodeKind, parent: String },

    /// A fragment reaches past the end of its field.
    #[error("fragment [{offset}..{end}) of field '{path}' exceeds its {bit_length}-bit span")]
    FragmentOutOfBounds {
        path: String,
        offset: u32,
        end: u64,
        bit_length: u32,
    },

    /// Two fragments of the same field share at least one bit.
    #[error(
        "fragment [{offset}..{end}) of field '{path}' overlaps fragment [{other_offset}..{other_end})"
    )]
    FragmentOverlap {
        path: String,
        offset: u32,
        end: u64,
        other_offset: u32,
        other_end: u64,
    },

    /// A fragment covers no bits.
    #[error("fragment at offset {offset} of field '{path}' has zero length")]
    EmptyFragment { path: String, offset: u32 },

    /// The data type has no length rule and cannot be validated.
    #[error("field '{path}' in record '{record}' has unsupported data type {data_type}")]
    UnsupportedDataType {
        path: String,
        record: String,
        data_type: DataType,
    },

    /// An integer array declares an element width outside `1..=64`.
    #[error("field '{path}' declares invalid integer array element width of {element_bits} bits")]
    InvalidElementWidth { path: String, element_bits: u32 },

    /// An integer array definition omits its element width.
    #[error("IntegerArray field '{path}' requires element_bits")]
    MissingElementWidth { path: String },

    /// A definition sets an element width on a type without elements.
    #[error("{data_type} field '{path}' sets element_bits to {element_bits} but has no elements")]
    UnexpectedElementWidth {
        path: String,
        data_type: DataType,
        element_bits: u32,
    },

    /// A container's declared length differs from the sum of its children.
    #[error("{kind} '{path}' declares {declared} bits but its {children} add up to {actual}")]
    LengthMismatch {
        kind: NodeKind,
        path: String,
        declared: u32,
        actual: u64,
        children: &'static str,
    },

    /// Free-form message with an optional underlying cause.
    #[error("{message}")]
    Message {
        message: String,
        #[source]
        source: Option<Arc<dyn StdError + Send + Sync>>,
    },
}

impl SchemaError {
    /// Builds a free-form error from a formatted message.
    pub fn msg(message: impl Into<String>) -> Self {
        SchemaError::Message {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a free-form error that wraps an underlying cause.
    pub fn with_cause(
        message: impl Into<String>,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        SchemaError::Message {
            message: message.into(),
            source: Some(Arc::new(cause)),
        }
    }

    /// Returns the length violation if this is an [`SchemaError::InvalidLength`].
    pub fn violation(&self) -> Option<LengthViolation> {
        match self {
            SchemaError::InvalidLength { violation, .. } => Some(*violation),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
