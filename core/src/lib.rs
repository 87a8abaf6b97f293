//! Core model and validation for hierarchical bit-field schemas.
//!
//! A schema describes fixed-width, bit-packed binary records, such as the
//! message layouts of legacy mainframe and telecom wire formats:
//!
//! - [`SchemaRoot`]: named top-level container and arena of all nodes.
//! - [`ViewSpec`]: one message layout, a sequence of records.
//! - [`RecordSpec`]: a named group of fields with an aggregate bit length.
//! - [`FieldSpec`]: a named, typed leaf with a bit length ([`ItemSpec`]).
//! - [`FragmentSpec`]: a sub-range of bits inside a field.
//!
//! Every node is addressed by a dotted path such as `Cdr.Header.Kind`.
//!
//! Validation ([`SchemaRoot::validate`], [`SchemaRoot::validate_all`])
//! checks each field's length against the rule of its [`DataType`],
//! fragment bounds and overlap, and that records and views add up. A
//! successful [`SchemaRoot::finish`] yields an immutable
//! [`ValidatedSchema`] that can be shared across threads.
//!
//! # Example
//!
//! ```
//! use bitschema_core::*;
//!
//! let mut schema = SchemaRoot::new("Mainframe", "Billing formats");
//! let view = schema.add_view(ViewSpec::new("Billing", 24)).unwrap();
//! let header = schema.add_record(view, RecordSpec::new("Header", 24)).unwrap();
//! schema
//!     .add_field(header, FieldSpec::new("Paid", DataType::Boolean, 1))
//!     .unwrap();
//! schema
//!     .add_field(header, FieldSpec::new("Filler", DataType::Reserved, 7))
//!     .unwrap();
//! schema
//!     .add_field(header, FieldSpec::new("Amount", DataType::Currency, 16))
//!     .unwrap();
//!
//! let schema = schema.finish(ValidationMode::CollectAll).unwrap();
//! let amount = schema.field_by_path("Billing.Header.Amount").unwrap();
//! assert_eq!(amount.absolute_bit_offset(), 8);
//! ```

mod data_type;
mod definition;
mod error;
mod fragment;
mod item;
mod schema;
mod types;
mod validate;

pub use data_type::{DataType, MAX_INTEGER_BITS};
pub use definition::{DataTypeDef, FieldDef, FragmentDef, RecordDef, SchemaDef, ViewDef};
pub use error::{LengthViolation, NodeKind, Result, SchemaError};
pub use fragment::FragmentSpec;
pub use item::{Bound, ItemSpec, LengthRule};
pub use schema::{FieldRef, PATH_SEPARATOR, RecordRef, SchemaRoot, ValidatedSchema, ViewRef};
pub use types::{FieldId, FieldSpec, RecordId, RecordSpec, ViewId, ViewSpec};
pub use validate::{BITS, ValidationMode};
