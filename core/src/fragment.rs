/// Contiguous sub-range of bits inside a field's span.
///
/// Offsets are relative to the start of the owning field. Fragments of one
/// field may leave gaps but must not overlap; both rules are enforced by
/// validation, not by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentSpec {
    offset: u32,
    length: u32,
}

impl FragmentSpec {
    pub fn new(offset: u32, length: u32) -> Self {
        FragmentSpec { offset, length }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    /// One past the last bit covered, widened so it cannot overflow.
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.length)
    }

    /// Returns `true` if the two half-open ranges share a bit.
    pub fn overlaps(&self, other: &FragmentSpec) -> bool {
        u64::from(self.offset) < other.end() && u64::from(other.offset) < self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_does_not_overflow() {
        let frag = FragmentSpec::new(u32::MAX, 2);
        assert_eq!(frag.end(), u64::from(u32::MAX) + 2);
    }

    #[test]
    fn test_overlaps() {
        let a = FragmentSpec::new(0, 4);
        let b = FragmentSpec::new(4, 4);
        let c = FragmentSpec::new(3, 2);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }
}
