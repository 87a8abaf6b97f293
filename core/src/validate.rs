//! Schema validation.
//!
//! Checks the rules that attaching nodes does not: each field's bit length
//! against its data type, fragment bounds and overlap, and that every record
//! and view length equals the sum of its children.
//!
//! Validation is all-or-nothing per node. [`SchemaRoot::validate`] stops at
//! the first failing node; [`SchemaRoot::validate_all`] reports one error per
//! failing node across the whole tree.
//!
//! # Examples
//!
//! ```
//! use bitschema_core::*;
//!
//! let mut schema = SchemaRoot::new("Legacy", "");
//! let view = schema.add_view(ViewSpec::new("Msg", 8)).unwrap();
//! let record = schema.add_record(view, RecordSpec::new("Head", 8)).unwrap();
//! schema
//!     .add_field(record, FieldSpec::new("Active", DataType::Boolean, 8))
//!     .unwrap();
//!
//! let errors = schema.validate_all();
//! assert_eq!(errors.len(), 1);
//! assert_eq!(
//!     errors[0].to_string(),
//!     "Boolean field 'Msg.Head.Active' in record 'Head' has invalid length of 8 bits: must equal 1"
//! );
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NodeKind, Result, SchemaError};
use crate::schema::{FieldRef, RecordRef, SchemaRoot, ValidatedSchema, ViewRef};
use crate::{DataType, LengthRule};

/// Unit label used when checking a node's own bit length.
pub const BITS: &str = "bits";

/// How many errors a validation pass gathers before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Stop at the first failing node.
    FailFast,
    /// Visit every node and report each failure.
    #[default]
    CollectAll,
}

impl<'a> FieldRef<'a> {
    /// Checks `length` against `rule`, naming this field, its data type and
    /// its record in the error.
    ///
    /// Only the first violated constraint is reported: modulo, then minimum,
    /// then maximum.
    pub fn check_length(self, length: u32, rule: LengthRule, unit: &str) -> Result<()> {
        rule.check(length)
            .map_err(|violation| SchemaError::InvalidLength {
                path: self.path(),
                record: self.record().name().to_string(),
                data_type: self.data_type(),
                length,
                unit: unit.to_string(),
                violation,
            })
    }

    /// [`check_length`](Self::check_length) applied to the field's own bit
    /// length, in bits.
    pub fn check_bit_length(self, rule: LengthRule) -> Result<()> {
        self.check_length(self.bit_length(), rule, BITS)
    }

    /// Validates the field's length for its data type, then its fragments.
    pub fn validate(self) -> Result<()> {
        let data_type = self.data_type();
        match data_type {
            DataType::IntegerArray { element_bits } if data_type.length_rule().is_none() => {
                return Err(SchemaError::InvalidElementWidth {
                    path: self.path(),
                    element_bits,
                });
            }
            _ => {}
        }

        let rule = data_type
            .length_rule()
            .ok_or_else(|| SchemaError::UnsupportedDataType {
                path: self.path(),
                record: self.record().name().to_string(),
                data_type,
            })?;
        self.check_bit_length(rule)?;
        self.validate_fragments()
    }

    fn validate_fragments(self) -> Result<()> {
        let fragments = self.fragments();
        let bit_length = self.bit_length();

        for (index, fragment) in fragments.iter().enumerate() {
            if fragment.length() == 0 {
                return Err(SchemaError::EmptyFragment {
                    path: self.path(),
                    offset: fragment.offset(),
                });
            }

            if fragment.end() > u64::from(bit_length) {
                return Err(SchemaError::FragmentOutOfBounds {
                    path: self.path(),
                    offset: fragment.offset(),
                    end: fragment.end(),
                    bit_length,
                });
            }

            if let Some(other) = fragments[..index].iter().find(|f| f.overlaps(fragment)) {
                return Err(SchemaError::FragmentOverlap {
                    path: self.path(),
                    offset: fragment.offset(),
                    end: fragment.end(),
                    other_offset: other.offset(),
                    other_end: other.end(),
                });
            }
        }

        Ok(())
    }
}

impl<'a> RecordRef<'a> {
    /// Checks that the record's fields add up to its declared length.
    pub fn validate(self) -> Result<()> {
        let actual = self.fields_bit_length();
        if actual != u64::from(self.bit_length()) {
            return Err(SchemaError::LengthMismatch {
                kind: NodeKind::Record,
                path: self.path(),
                declared: self.bit_length(),
                actual,
                children: "fields",
            });
        }
        Ok(())
    }
}

impl<'a> ViewRef<'a> {
    /// Checks that the view's records add up to its declared length.
    pub fn validate(self) -> Result<()> {
        let actual = self.records_bit_length();
        if actual != u64::from(self.bit_length()) {
            return Err(SchemaError::LengthMismatch {
                kind: NodeKind::View,
                path: self.path(),
                declared: self.bit_length(),
                actual,
                children: "records",
            });
        }
        Ok(())
    }
}

impl SchemaRoot {
    /// Validates every node, stopping at the first failure.
    pub fn validate(&self) -> Result<()> {
        match walk(self, ValidationMode::FailFast).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Validates every node and returns all failures, in tree order.
    pub fn validate_all(&self) -> Vec<SchemaError> {
        walk(self, ValidationMode::CollectAll)
    }

    /// Validates the tree and freezes it.
    ///
    /// # Errors
    ///
    /// Returns the failures found under `mode`; never empty.
    pub fn finish(
        self,
        mode: ValidationMode,
    ) -> std::result::Result<ValidatedSchema, Vec<SchemaError>> {
        let errors = walk(&self, mode);
        if errors.is_empty() {
            Ok(ValidatedSchema::new(self))
        } else {
            Err(errors)
        }
    }
}

/// Fields first, then their record, then the view, so the most specific
/// failure in a subtree is reported first.
fn walk(schema: &SchemaRoot, mode: ValidationMode) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    for view in schema.views() {
        for record in view.records() {
            for field in record.fields() {
                if let Err(err) = field.validate() {
                    errors.push(err);
                    if mode == ValidationMode::FailFast {
                        return errors;
                    }
                }
            }

            if let Err(err) = record.validate() {
                errors.push(err);
                if mode == ValidationMode::FailFast {
                    return errors;
                }
            }
        }

        if let Err(err) = view.validate() {
            errors.push(err);
            if mode == ValidationMode::FailFast {
                return errors;
            }
        }
    }

    debug!(
        schema = schema.name(),
        views = schema.view_count(),
        records = schema.record_count(),
        fields = schema.field_count(),
        errors = errors.len(),
        "Validated schema"
    );

    errors
}

#[cfg(test)]
mod tests {
    use crate::{Bound, FieldSpec, FragmentSpec, LengthViolation, RecordSpec, ViewSpec};

    use super::*;

    /// One view, one record, one field of the given type and length.
    fn single_field(data_type: DataType, bit_length: u32) -> SchemaRoot {
        let mut schema = SchemaRoot::new("Test", "");
        let view = schema.add_view(ViewSpec::new("View", bit_length)).unwrap();
        let record = schema
            .add_record(view, RecordSpec::new("Record", bit_length))
            .unwrap();
        schema
            .add_field(record, FieldSpec::new("Field", data_type, bit_length))
            .unwrap();
        schema
    }

    fn field_with_fragments(bit_length: u32, fragments: &[(u32, u32)]) -> SchemaRoot {
        let mut schema = single_field(DataType::BitArray, bit_length);
        let field = schema.field_by_path("View.Record.Field").unwrap().id();
        for &(offset, length) in fragments {
            schema
                .add_fragment(field, FragmentSpec::new(offset, length))
                .unwrap();
        }
        schema
    }

    #[test]
    fn test_check_bit_length_exact_byte() {
        let rule = LengthRule::new(8, 8, Bound::Limited(8));
        for (bits, expected) in [
            (8, None),
            (7, Some(LengthViolation::Modulo(8))),
            (9, Some(LengthViolation::Modulo(8))),
            (3, Some(LengthViolation::Modulo(8))),
        ] {
            let schema = single_field(DataType::ByteArray, bits);
            let field = schema.field_by_path("View.Record.Field").unwrap();
            let result = field.check_bit_length(rule);
            assert_eq!(result.err().and_then(|e| e.violation()), expected, "bits={bits}");
        }
    }

    #[test]
    fn test_check_length_custom_unit() {
        let schema = single_field(DataType::IntegerArray { element_bits: 8 }, 24);
        let field = schema.field_by_path("View.Record.Field").unwrap();
        let err = field
            .check_length(3, LengthRule::range(4, 16), "elements")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "IntegerArray field 'View.Record.Field' in record 'Record' has invalid length of 3 elements: must be at least 4"
        );
    }

    #[test]
    fn test_boolean_must_be_one_bit() {
        assert!(single_field(DataType::Boolean, 1).validate().is_ok());
        let err = single_field(DataType::Boolean, 2).validate().unwrap_err();
        assert_eq!(err.violation(), Some(LengthViolation::Exact(1)));
    }

    #[test]
    fn test_byte_array_multiple_of_eight() {
        assert!(single_field(DataType::ByteArray, 64).validate().is_ok());
        let err = single_field(DataType::ByteArray, 12).validate().unwrap_err();
        assert_eq!(err.violation(), Some(LengthViolation::Modulo(8)));
    }

    #[test]
    fn test_zero_type_is_unsupported() {
        let err = single_field(DataType::Zero, 8).validate().unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedDataType { .. }));
        assert_eq!(
            err.to_string(),
            "field 'View.Record.Field' in record 'Record' has unsupported data type Zero"
        );
    }

    #[test]
    fn test_integer_array_element_width() {
        let nibbles = single_field(DataType::IntegerArray { element_bits: 4 }, 12);
        assert!(nibbles.validate().is_ok());
        let err = single_field(DataType::IntegerArray { element_bits: 0 }, 12)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidElementWidth { element_bits: 0, .. }));
        let err = single_field(DataType::IntegerArray { element_bits: 5 }, 12)
            .validate()
            .unwrap_err();
        assert_eq!(err.violation(), Some(LengthViolation::Modulo(5)));
    }

    #[test]
    fn test_fragment_out_of_bounds() {
        let err = field_with_fragments(8, &[(4, 5)]).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "fragment [4..9) of field 'View.Record.Field' exceeds its 8-bit span"
        );
    }

    #[test]
    fn test_fragment_overlap() {
        let err = field_with_fragments(16, &[(0, 6), (8, 4), (5, 2)])
            .validate()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "fragment [5..7) of field 'View.Record.Field' overlaps fragment [0..6)"
        );
    }

    #[test]
    fn test_disjoint_fragments_with_gaps_pass() {
        let schema = field_with_fragments(16, &[(0, 3), (5, 3), (12, 4)]);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_zero_length_fragment_rejected() {
        let err = field_with_fragments(8, &[(2, 0)]).validate().unwrap_err();
        assert!(matches!(err, SchemaError::EmptyFragment { offset: 2, .. }));
    }

    #[test]
    fn test_record_length_mismatch() {
        let mut schema = SchemaRoot::new("Test", "");
        let view = schema.add_view(ViewSpec::new("View", 16)).unwrap();
        let record = schema.add_record(view, RecordSpec::new("Record", 16)).unwrap();
        schema
            .add_field(record, FieldSpec::new("A", DataType::Integer, 8))
            .unwrap();
        schema
            .add_field(record, FieldSpec::new("B", DataType::Integer, 4))
            .unwrap();

        let errors = schema.validate_all();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "record 'View.Record' declares 16 bits but its fields add up to 12"
        );
    }

    #[test]
    fn test_view_length_mismatch() {
        let mut schema = single_field(DataType::Integer, 8);
        let view = schema.view("View").unwrap().id();
        let extra = schema.add_record(view, RecordSpec::new("Extra", 4)).unwrap();
        schema
            .add_field(extra, FieldSpec::new("Tail", DataType::Integer, 4))
            .unwrap();

        let err = schema.validate().unwrap_err();
        assert!(matches!(
            err,
            SchemaError::LengthMismatch {
                kind: NodeKind::View,
                actual: 12,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_all_collects_every_failure() {
        let mut schema = SchemaRoot::new("Test", "");
        let view = schema.add_view(ViewSpec::new("View", 10)).unwrap();
        let record = schema.add_record(view, RecordSpec::new("Record", 10)).unwrap();
        schema
            .add_field(record, FieldSpec::new("Flag", DataType::Boolean, 2))
            .unwrap();
        schema
            .add_field(record, FieldSpec::new("Raw", DataType::ByteArray, 8))
            .unwrap();
        schema
            .add_field(record, FieldSpec::new("Unset", DataType::Zero, 0))
            .unwrap();

        let errors = schema.validate_all();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], SchemaError::InvalidLength { .. }));
        assert!(matches!(errors[1], SchemaError::UnsupportedDataType { .. }));

        let first = schema.validate().unwrap_err();
        assert_eq!(first.to_string(), errors[0].to_string());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let broken = field_with_fragments(8, &[(0, 4), (2, 4)]);
        let first: Vec<String> = broken.validate_all().iter().map(ToString::to_string).collect();
        let second: Vec<String> = broken.validate_all().iter().map(ToString::to_string).collect();
        assert_eq!(first, second);

        let valid = single_field(DataType::Integer, 32);
        assert!(valid.validate().is_ok());
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn test_finish_freezes_valid_schema() {
        let schema = single_field(DataType::Date, 16).finish(ValidationMode::FailFast).unwrap();
        assert_eq!(schema.field_count(), 1);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_finish_reports_errors() {
        let errors = single_field(DataType::Time, 8)
            .finish(ValidationMode::CollectAll)
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].violation(), Some(LengthViolation::Minimum(17)));
    }

    #[test]
    fn test_validation_mode_serde() {
        let mode: ValidationMode = serde_json::from_str("\"fail_fast\"").unwrap();
        assert_eq!(mode, ValidationMode::FailFast);
        assert_eq!(ValidationMode::default(), ValidationMode::CollectAll);
    }
}
