//! Field data types and their legal bit-length table.

use std::fmt;

use crate::item::{Bound, LengthRule};

/// Widest integer a single field or array element may hold.
pub const MAX_INTEGER_BITS: u32 = 64;

/// Semantic interpretation of a field's bits.
///
/// The set is closed; [`DataType::length_rule`] is the single table of
/// length constraints.
///
/// # Examples
///
/// ```
/// use bitschema_core::{Bound, DataType, LengthRule};
///
/// assert_eq!(DataType::Boolean.length_rule(), Some(LengthRule::exact(1)));
/// assert_eq!(
///     DataType::ByteArray.length_rule(),
///     Some(LengthRule::new(8, 8, Bound::Unbounded))
/// );
/// assert_eq!(DataType::Zero.length_rule(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Unassigned type tag; never valid in a finished schema.
    Zero,
    /// Filler bits with no meaning.
    Reserved,
    Boolean,
    Integer,
    Enumeration,
    /// Packed decimal amount, four bits per digit.
    Currency,
    Date,
    Time,
    Datetime,
    BitArray,
    ByteArray,
    /// Sequence of unsigned integers of `element_bits` each.
    IntegerArray { element_bits: u32 },
}

impl DataType {
    /// Name used in messages and definition files.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Zero => "Zero",
            DataType::Reserved => "Reserved",
            DataType::Boolean => "Boolean",
            DataType::Integer => "Integer",
            DataType::Enumeration => "Enumeration",
            DataType::Currency => "Currency",
            DataType::Date => "Date",
            DataType::Time => "Time",
            DataType::Datetime => "Datetime",
            DataType::BitArray => "BitArray",
            DataType::ByteArray => "ByteArray",
            DataType::IntegerArray { .. } => "IntegerArray",
        }
    }

    /// Legal bit-length rule, or `None` when the type cannot be validated
    /// (the `Zero` tag, or an integer array with an element width outside
    /// `1..=64`).
    pub fn length_rule(&self) -> Option<LengthRule> {
        let rule = match *self {
            DataType::Zero => return None,
            DataType::Reserved => LengthRule::new(1, 1, Bound::Unbounded),
            DataType::Boolean => LengthRule::exact(1),
            DataType::Integer => LengthRule::range(1, MAX_INTEGER_BITS),
            DataType::Enumeration => LengthRule::range(1, 32),
            DataType::Currency => LengthRule::new(4, 4, Bound::Limited(MAX_INTEGER_BITS)),
            // days since epoch
            DataType::Date => LengthRule::range(16, 32),
            // seconds of day need 17 bits
            DataType::Time => LengthRule::range(17, 32),
            DataType::Datetime => LengthRule::range(32, MAX_INTEGER_BITS),
            DataType::BitArray => LengthRule::new(1, 1, Bound::Unbounded),
            DataType::ByteArray => LengthRule::new(8, 8, Bound::Unbounded),
            DataType::IntegerArray { element_bits } => {
                if element_bits == 0 || element_bits > MAX_INTEGER_BITS {
                    return None;
                }
                LengthRule::new(element_bits, element_bits, Bound::Unbounded)
            }
        };
        Some(rule)
    }

    /// Number of elements for array types with a legal length.
    pub fn element_count(&self, bit_length: u32) -> Option<u32> {
        match *self {
            DataType::BitArray => Some(bit_length),
            DataType::ByteArray => Some(bit_length / 8),
            DataType::IntegerArray { element_bits } if element_bits > 0 => {
                Some(bit_length / element_bits)
            }
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
