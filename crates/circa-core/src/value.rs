//! Multi-valued logic vectors.
//!
//! A [`Value`] is an immutable vector of up to 64 bits, each of which is
//! one of four states: `0`, `1`, floating (`x`) or error (`E`). The
//! representation is three masks (error, unknown, value) normalised by
//! [`Value::create`] so that structural equality is semantic equality:
//! an error bit never also carries unknown or value bits, and an unknown
//! bit never carries a value bit.
//!
//! # Combination
//!
//! [`Value::combine`] resolves a node driven by several sources. Per bit
//! it is the join of the lattice `x < {0, 1} < E`, which makes it
//! commutative, associative and idempotent, with floating as identity.
//! [`Value::NIL`] (width 0) means "no driver" and is the identity of
//! `combine` at the value level.
//!
//! Values of different widths may be combined; the narrower value is
//! treated as floating above its width. Whether such a mismatch is a
//! problem is the caller's decision.

use std::fmt;
use std::str::FromStr;

use crate::width::BitWidth;

/// One bit of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bit {
    /// Driven low.
    Zero,
    /// Driven high.
    One,
    /// Not driven, or driven by floating sources only.
    Floating,
    /// Driven to conflicting levels, or computed from undefined inputs.
    Error,
}

impl Bit {
    /// Display character: `0`, `1`, `x` or `E`.
    pub fn as_char(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::Floating => 'x',
            Self::Error => 'E',
        }
    }
}

/// An immutable multi-bit logic value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Value {
    width: u8,
    error: u64,
    unknown: u64,
    value: u64,
}

impl Value {
    /// No driver present. Distinct from [`Value::UNKNOWN`].
    pub const NIL: Value = Value {
        width: 0,
        error: 0,
        unknown: 0,
        value: 0,
    };

    /// Single bit, low.
    pub const FALSE: Value = Value {
        width: 1,
        error: 0,
        unknown: 0,
        value: 0,
    };

    /// Single bit, high.
    pub const TRUE: Value = Value {
        width: 1,
        error: 0,
        unknown: 0,
        value: 1,
    };

    /// Single bit, floating.
    pub const UNKNOWN: Value = Value {
        width: 1,
        error: 0,
        unknown: 1,
        value: 0,
    };

    /// Single bit, error.
    pub const ERROR: Value = Value {
        width: 1,
        error: 1,
        unknown: 0,
        value: 0,
    };

    /// Build a value from raw masks, normalising them.
    ///
    /// Bits above `width` are discarded; error takes precedence over
    /// unknown, which takes precedence over the value bit.
    pub fn create(width: BitWidth, error: u64, unknown: u64, value: u64) -> Value {
        let mask = width.mask();
        let error = error & mask;
        let unknown = unknown & mask & !error;
        let value = value & mask & !error & !unknown;
        Value {
            width: width.width(),
            error,
            unknown,
            value,
        }
    }

    /// A fully defined value from its integer bits.
    pub fn from_bits(width: BitWidth, bits: u64) -> Value {
        Self::create(width, 0, 0, bits)
    }

    /// An all-floating value.
    pub fn unknown(width: BitWidth) -> Value {
        Self::create(width, 0, u64::MAX, 0)
    }

    /// An all-error value.
    pub fn error(width: BitWidth) -> Value {
        Self::create(width, u64::MAX, 0, 0)
    }

    /// `width` copies of the single-bit value `bit`.
    pub fn repeat(bit: Value, width: BitWidth) -> Value {
        match bit.bit(0) {
            Bit::One => Self::from_bits(width, u64::MAX),
            Bit::Zero => Self::from_bits(width, 0),
            Bit::Error => Self::error(width),
            Bit::Floating => Self::unknown(width),
        }
    }

    /// Assemble a value from single-bit values, least significant first.
    ///
    /// Entries are read through [`Value::bit`] at index 0, so `NIL`
    /// entries contribute a floating bit. At most 64 entries are used.
    pub fn from_bits_slice(bits: &[Value]) -> Value {
        let n = bits.len().min(BitWidth::MAX as usize);
        let (mut error, mut unknown, mut value) = (0u64, 0u64, 0u64);
        for (i, b) in bits.iter().take(n).enumerate() {
            match b.bit(0) {
                Bit::One => value |= 1 << i,
                Bit::Zero => {}
                Bit::Floating => unknown |= 1 << i,
                Bit::Error => error |= 1 << i,
            }
        }
        Self::create(BitWidth::bits(n as u8), error, unknown, value)
    }

    /// Width of this value. `NIL` has width [`BitWidth::UNKNOWN`].
    pub fn width(&self) -> BitWidth {
        BitWidth::bits(self.width)
    }

    /// Whether this is the no-driver sentinel.
    pub fn is_nil(&self) -> bool {
        self.width == 0
    }

    /// Whether every bit is `0` or `1`.
    pub fn is_fully_defined(&self) -> bool {
        self.width > 0 && self.error == 0 && self.unknown == 0
    }

    /// Whether any bit is an error.
    pub fn is_error_value(&self) -> bool {
        self.error != 0
    }

    /// Whether every bit is floating.
    pub fn is_unknown(&self) -> bool {
        self.width > 0 && self.unknown == self.width().mask()
    }

    /// Integer value, if fully defined.
    pub fn to_u64(&self) -> Option<u64> {
        self.is_fully_defined().then_some(self.value)
    }

    /// State of bit `index`. Bits beyond the width are floating.
    pub fn bit(&self, index: usize) -> Bit {
        if index >= self.width as usize {
            return Bit::Floating;
        }
        let m = 1u64 << index;
        if self.error & m != 0 {
            Bit::Error
        } else if self.unknown & m != 0 {
            Bit::Floating
        } else if self.value & m != 0 {
            Bit::One
        } else {
            Bit::Zero
        }
    }

    /// Bit `index` as a single-bit value.
    pub fn get(&self, index: usize) -> Value {
        match self.bit(index) {
            Bit::Zero => Self::FALSE,
            Bit::One => Self::TRUE,
            Bit::Floating => Self::UNKNOWN,
            Bit::Error => Self::ERROR,
        }
    }

    /// Copy of this value with bit `index` replaced by bit 0 of `bit`.
    /// Out-of-range indices leave the value unchanged.
    pub fn set(&self, index: usize, bit: Value) -> Value {
        if index >= self.width as usize {
            return *self;
        }
        let m = 1u64 << index;
        let (mut error, mut unknown, mut value) =
            (self.error & !m, self.unknown & !m, self.value & !m);
        match bit.bit(0) {
            Bit::One => value |= m,
            Bit::Zero => {}
            Bit::Floating => unknown |= m,
            Bit::Error => error |= m,
        }
        Self::create(self.width(), error, unknown, value)
    }

    /// Pad or clip to `width`. New high bits take the state of bit 0
    /// of `fill`.
    pub fn extend_width(&self, width: BitWidth, fill: Value) -> Value {
        if width.width() == self.width {
            return *self;
        }
        if width.width() < self.width {
            return Self::create(width, self.error, self.unknown, self.value);
        }
        let upper = width.mask() & !self.width().mask();
        let (error, unknown, value) = (self.error, self.unknown, self.value);
        match fill.bit(0) {
            Bit::One => Self::create(width, error, unknown, value | upper),
            Bit::Zero => Self::create(width, error, unknown, value),
            Bit::Error => Self::create(width, error | upper, unknown, value),
            Bit::Floating => Self::create(width, error, unknown | upper, value),
        }
    }

    /// Masks widened to `width` bits, with bits above this value's own
    /// width reported as floating.
    fn spread(&self, width: u8) -> (u64, u64, u64) {
        let extra = BitWidth::bits(width).mask() & !self.width().mask();
        (self.error, self.unknown | extra, self.value)
    }

    /// Resolve two drivers of the same node.
    pub fn combine(self, other: Value) -> Value {
        if self.width == 0 {
            return other;
        }
        if other.width == 0 || self == other {
            return self;
        }
        let width = self.width.max(other.width);
        let (e1, u1, v1) = self.spread(width);
        let (e2, u2, v2) = other.spread(width);
        let d1 = !(e1 | u1);
        let d2 = !(e2 | u2);
        let conflict = d1 & d2 & (v1 ^ v2);
        Self::create(
            BitWidth::bits(width),
            e1 | e2 | conflict,
            u1 & u2,
            (v1 & d1) | (v2 & d2),
        )
    }

    /// Bitwise AND. A defined `0` dominates; otherwise any undefined
    /// input bit yields an error bit.
    pub fn and(self, other: Value) -> Value {
        let width = self.width.max(other.width);
        let (e1, u1, v1) = self.spread(width);
        let (e2, u2, v2) = other.spread(width);
        let (d1, d2) = (!(e1 | u1), !(e2 | u2));
        let zeros = (d1 & !v1) | (d2 & !v2);
        let ones = d1 & v1 & d2 & v2;
        let w = BitWidth::bits(width);
        Self::create(w, w.mask() & !zeros & !ones, 0, ones)
    }

    /// Bitwise OR. A defined `1` dominates; otherwise any undefined
    /// input bit yields an error bit.
    pub fn or(self, other: Value) -> Value {
        let width = self.width.max(other.width);
        let (e1, u1, v1) = self.spread(width);
        let (e2, u2, v2) = other.spread(width);
        let (d1, d2) = (!(e1 | u1), !(e2 | u2));
        let ones = (d1 & v1) | (d2 & v2);
        let zeros = d1 & !v1 & d2 & !v2;
        let w = BitWidth::bits(width);
        Self::create(w, w.mask() & !zeros & !ones, 0, ones)
    }

    /// Bitwise XOR. Any undefined input bit yields an error bit.
    pub fn xor(self, other: Value) -> Value {
        let width = self.width.max(other.width);
        let (e1, u1, v1) = self.spread(width);
        let (e2, u2, v2) = other.spread(width);
        let defined = !(e1 | u1) & !(e2 | u2);
        let w = BitWidth::bits(width);
        Self::create(w, w.mask() & !defined, 0, v1 ^ v2)
    }

    /// Bitwise NOT. Error bits stay errors; floating bits read as `0`
    /// and come out as `1`.
    pub fn not(self) -> Value {
        Self::create(self.width(), self.error, 0, !self.value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 {
            return write!(f, "-");
        }
        for i in (0..self.width as usize).rev() {
            write!(f, "{}", self.bit(i).as_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({self})")
    }
}

/// Parses the [`Display`](fmt::Display) form: most significant bit
/// first, `0`/`1`/`x`/`E` per bit, `-` for `NIL`.
impl FromStr for Value {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(Value::NIL);
        }
        if s.is_empty() || s.len() > BitWidth::MAX as usize {
            return Err(format!("value must have 1..=64 bits, got {}", s.len()));
        }
        let mut bits = Vec::with_capacity(s.len());
        for c in s.chars().rev() {
            bits.push(match c {
                '0' => Value::FALSE,
                '1' => Value::TRUE,
                'x' | 'X' => Value::UNKNOWN,
                'E' | 'e' => Value::ERROR,
                other => return Err(format!("invalid bit character {other:?}")),
            });
        }
        Ok(Value::from_bits_slice(&bits))
    }
}
