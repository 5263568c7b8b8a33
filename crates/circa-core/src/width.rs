//! Bus widths.

use std::fmt;

/// Number of bits carried by a component end or a bundle.
///
/// Width 0 doubles as [`BitWidth::UNKNOWN`]: wires carry no intrinsic
/// width, and a bundle whose width is never determined stays unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitWidth(u8);

impl BitWidth {
    /// Widest supported bus.
    pub const MAX: u8 = 64;

    /// Width not (yet) determined.
    pub const UNKNOWN: BitWidth = BitWidth(0);

    /// A single wire.
    pub const ONE: BitWidth = BitWidth(1);

    /// Create a width, or `None` if `bits` exceeds [`BitWidth::MAX`].
    pub const fn new(bits: u8) -> Option<Self> {
        if bits > Self::MAX {
            None
        } else {
            Some(Self(bits))
        }
    }

    /// Create a width in const contexts. Panics if `bits` exceeds
    /// [`BitWidth::MAX`].
    pub const fn bits(bits: u8) -> Self {
        assert!(bits <= Self::MAX, "bit width exceeds 64");
        Self(bits)
    }

    /// Number of bits.
    pub const fn width(self) -> u8 {
        self.0
    }

    /// Whether the width has been determined.
    pub const fn is_known(self) -> bool {
        self.0 != 0
    }

    /// Mask with the low `width` bits set.
    pub const fn mask(self) -> u64 {
        if self.0 >= 64 {
            u64::MAX
        } else {
            (1u64 << self.0) - 1
        }
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}b", self.0)
        } else {
            write!(f, "?b")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(BitWidth::UNKNOWN.mask(), 0);
        assert_eq!(BitWidth::ONE.mask(), 1);
        assert_eq!(BitWidth::bits(8).mask(), 0xff);
        assert_eq!(BitWidth::bits(64).mask(), u64::MAX);
    }

    #[test]
    fn rejects_oversized() {
        assert!(BitWidth::new(65).is_none());
        assert_eq!(BitWidth::new(64), Some(BitWidth::bits(64)));
    }

    #[test]
    fn unknown_is_not_known() {
        assert!(!BitWidth::UNKNOWN.is_known());
        assert_eq!(BitWidth::UNKNOWN.to_string(), "?b");
        assert_eq!(BitWidth::bits(4).to_string(), "4b");
    }
}
