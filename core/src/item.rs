//! Length rules and the state shared by every item below a record.

use crate::DataType;
use crate::error::LengthViolation;

/// Upper bound of a [`LengthRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// Lengths up to and including the value are legal.
    Limited(u32),
    /// No upper limit.
    Unbounded,
}

/// Legal-length policy: divisibility by `modulo`, then `minimum`, then
/// `maximum`.
///
/// A `modulo` of 0 or 1 imposes no divisibility constraint.
///
/// # Examples
///
/// ```
/// use bitschema_core::{Bound, LengthRule, LengthViolation};
///
/// let byte = LengthRule::new(8, 8, Bound::Limited(8));
/// assert!(byte.check(8).is_ok());
/// assert_eq!(byte.check(3), Err(LengthViolation::Modulo(8)));
/// assert_eq!(byte.check(0), Err(LengthViolation::Exact(8)));
///
/// let bytes = LengthRule::new(8, 8, Bound::Unbounded);
/// assert!(bytes.check(4096).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LengthRule {
    pub modulo: u32,
    pub minimum: u32,
    pub maximum: Bound,
}

impl LengthRule {
    pub const fn new(modulo: u32, minimum: u32, maximum: Bound) -> Self {
        Self {
            modulo,
            minimum,
            maximum,
        }
    }

    /// Rule accepting exactly `length`.
    pub const fn exact(length: u32) -> Self {
        Self::new(1, length, Bound::Limited(length))
    }

    /// Rule accepting any length in `minimum..=maximum`.
    pub const fn range(minimum: u32, maximum: u32) -> Self {
        Self::new(1, minimum, Bound::Limited(maximum))
    }

    /// Returns `true` when minimum and maximum coincide.
    pub fn is_exact(&self) -> bool {
        self.maximum == Bound::Limited(self.minimum)
    }

    /// Checks `length` against the rule, reporting only the first violated
    /// constraint in modulo, minimum, maximum order.
    pub fn check(&self, length: u32) -> Result<(), LengthViolation> {
        if self.modulo > 1 && length % self.modulo != 0 {
            return Err(LengthViolation::Modulo(self.modulo));
        }

        if length < self.minimum {
            return Err(if self.is_exact() {
                LengthViolation::Exact(self.minimum)
            } else {
                LengthViolation::Minimum(self.minimum)
            });
        }

        if let Bound::Limited(maximum) = self.maximum {
            if length > maximum {
                return Err(if self.is_exact() {
                    LengthViolation::Exact(maximum)
                } else {
                    LengthViolation::Maximum(maximum)
                });
            }
        }

        Ok(())
    }
}

/// Data type and bit length of a schema item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemSpec {
    pub(crate) data_type: DataType,
    pub(crate) bit_length: u32,
}

impl ItemSpec {
    pub fn new(data_type: DataType, bit_length: u32) -> Self {
        Self {
            data_type,
            bit_length,
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_byte_rule() {
        let rule = LengthRule::new(8, 8, Bound::Limited(8));
        assert_eq!(rule.check(8), Ok(()));
        assert_eq!(rule.check(7), Err(LengthViolation::Modulo(8)));
        assert_eq!(rule.check(9), Err(LengthViolation::Modulo(8)));
        assert_eq!(rule.check(16), Err(LengthViolation::Exact(8)));
    }

    #[test]
    fn test_modulo_reported_before_minimum() {
        let rule = LengthRule::new(8, 8, Bound::Limited(8));
        assert_eq!(rule.check(3), Err(LengthViolation::Modulo(8)));
    }

    #[test]
    fn test_range_reports_minimum_then_maximum() {
        let rule = LengthRule::range(16, 32);
        assert_eq!(rule.check(15), Err(LengthViolation::Minimum(16)));
        assert_eq!(rule.check(33), Err(LengthViolation::Maximum(32)));
        assert_eq!(rule.check(16), Ok(()));
        assert_eq!(rule.check(32), Ok(()));
    }

    #[test]
    fn test_exact_collapses_message() {
        let rule = LengthRule::exact(1);
        assert!(rule.is_exact());
        assert_eq!(rule.check(0), Err(LengthViolation::Exact(1)));
        assert_eq!(rule.check(2), Err(LengthViolation::Exact(1)));
        assert_eq!(LengthViolation::Exact(1).to_string(), "must equal 1");
    }

    #[test]
    fn test_zero_modulo_is_ignored() {
        let rule = LengthRule::new(0, 1, Bound::Unbounded);
        assert_eq!(rule.check(7), Ok(()));
        assert_eq!(rule.check(0), Err(LengthViolation::Minimum(1)));
    }

    #[test]
    fn test_unbounded_has_no_maximum() {
        let rule = LengthRule::new(8, 8, Bound::Unbounded);
        assert_eq!(rule.check(u32::MAX - 7), Ok(()));
    }
}
