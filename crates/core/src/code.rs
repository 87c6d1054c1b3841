//! Variable-length Huffman codes.
//!
//! A [`Code`] stores up to [`MAX_CODE_BITS`] bits MSB-first in a fixed byte
//! array. Bits past `len()` are always zero, so whole code bytes can be OR-ed
//! into an output buffer without masking.

use std::cmp::Ordering;
use std::fmt;

/// Longest representable code. A tree over 256 symbols is at most 255 deep.
pub const MAX_CODE_BITS: usize = 255;

/// Bytes needed to hold the longest code.
pub const CODE_BYTES: usize = (MAX_CODE_BITS + 7) / 8;

/// A variable-length bit code, MSB-first.
///
/// A zero-length code means "symbol absent".
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    /// Number of valid bits
    bits: u8,
    /// Code bits, MSB of byte 0 first, zero-padded
    code: [u8; CODE_BYTES],
}

impl Code {
    /// The empty code.
    pub const EMPTY: Code = Code {
        bits: 0,
        code: [0; CODE_BYTES],
    };

    /// Create an empty code.
    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Build a code from individual bits, first bit first.
    ///
    /// # Panics
    /// Panics if more than [`MAX_CODE_BITS`] bits are given.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut code = Self::new();
        for bit in bits {
            code.push_bit(bit);
        }
        code
    }

    /// Rebuild a code from its length and MSB-first bytes.
    ///
    /// Only the first `bits` bits of `bytes` are kept; padding is cleared.
    /// Returns `None` if `bytes` is shorter than `ceil(bits / 8)`.
    pub fn from_raw(bits: u8, bytes: &[u8]) -> Option<Self> {
        let byte_len = (bits as usize + 7) / 8;
        if bytes.len() < byte_len {
            return None;
        }

        let mut code = Self::new();
        code.bits = bits;
        code.code[..byte_len].copy_from_slice(&bytes[..byte_len]);
        if byte_len > 0 {
            code.code[byte_len - 1] &= last_byte_mask(code.last_byte_bits());
        }
        Some(code)
    }

    /// Append one bit at the end of the code.
    ///
    /// # Panics
    /// Panics if the code already holds [`MAX_CODE_BITS`] bits.
    pub fn push_bit(&mut self, bit: bool) {
        assert!(
            (self.bits as usize) < MAX_CODE_BITS,
            "code longer than {MAX_CODE_BITS} bits"
        );
        let index = self.bits as usize;
        if bit {
            self.code[index / 8] |= 0x80 >> (index % 8);
        }
        self.bits += 1;
    }

    /// Return a copy of this code extended by one bit.
    pub fn with_bit(mut self, bit: bool) -> Self {
        self.push_bit(bit);
        self
    }

    /// Number of bits in the code.
    pub fn len(&self) -> usize {
        self.bits as usize
    }

    /// True for the zero-length "absent" code.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Bit at `index`, counting from the first (most significant) bit.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn bit(&self, index: usize) -> bool {
        assert!(index < self.len(), "bit {index} out of range for {self:?}");
        self.code[index / 8] & (0x80 >> (index % 8)) != 0
    }

    /// Iterate over the bits, first bit first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(move |i| self.bit(i))
    }

    /// Number of bytes the code occupies: `ceil(len / 8)`.
    pub fn byte_len(&self) -> usize {
        (self.bits as usize + 7) / 8
    }

    /// Bits used in the final byte (1..=8), or 0 for the empty code.
    pub fn last_byte_bits(&self) -> usize {
        if self.bits == 0 {
            0
        } else {
            (self.bits as usize - 1) % 8 + 1
        }
    }

    /// The code bytes, zero-padded in the last byte.
    pub fn as_bytes(&self) -> &[u8] {
        &self.code[..self.byte_len()]
    }

    /// True if `self` is a bit-prefix of `other` (every code is a prefix of itself).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.bits > other.bits {
            return false;
        }
        if self.bits == 0 {
            return true;
        }

        let full = self.byte_len() - 1;
        if self.code[..full] != other.code[..full] {
            return false;
        }
        let mask = last_byte_mask(self.last_byte_bits());
        self.code[full] & mask == other.code[full] & mask
    }

    /// Lexicographic comparison of the bit strings.
    ///
    /// A proper prefix sorts before every extension of itself.
    pub fn cmp_bits(&self, other: &Code) -> Ordering {
        self.iter()
            .zip(other.iter())
            .map(|(a, b)| a.cmp(&b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| self.bits.cmp(&other.bits))
    }
}

impl Default for Code {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code[{} bits: {}]", self.bits, self)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Mask keeping the top `bits` bits of a byte (`bits` in 0..=8).
fn last_byte_mask(bits: usize) -> u8 {
    match bits {
        0 => 0,
        8 => 0xFF,
        n => !(0xFFu8 >> n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> Code {
        Code::from_bits(s.chars().map(|c| c == '1'))
    }

    #[test]
    fn test_push_bits_msb_first() {
        let c = code("1011");
        assert_eq!(c.len(), 4);
        assert_eq!(c.as_bytes(), &[0b1011_0000]);
        assert_eq!(c.to_string(), "1011");
    }

    #[test]
    fn test_multi_byte_code() {
        let c = code("1111000011");
        assert_eq!(c.byte_len(), 2);
        assert_eq!(c.last_byte_bits(), 2);
        assert_eq!(c.as_bytes(), &[0b1111_0000, 0b1100_0000]);
        assert!(c.bit(8));
        assert!(!c.bit(4));
    }

    #[test]
    fn test_last_byte_bits() {
        assert_eq!(Code::EMPTY.last_byte_bits(), 0);
        assert_eq!(code("1").last_byte_bits(), 1);
        assert_eq!(code("10101010").last_byte_bits(), 8);
        assert_eq!(code("101010101").last_byte_bits(), 1);
    }

    #[test]
    fn test_from_raw_clears_padding() {
        let c = Code::from_raw(3, &[0b1011_1111]).unwrap();
        assert_eq!(c, code("101"));
        assert_eq!(c.as_bytes(), &[0b1010_0000]);
    }

    #[test]
    fn test_from_raw_too_short() {
        assert!(Code::from_raw(9, &[0xFF]).is_none());
        assert_eq!(Code::from_raw(0, &[]), Some(Code::EMPTY));
    }

    #[test]
    fn test_is_prefix_of() {
        assert!(code("10").is_prefix_of(&code("101")));
        assert!(code("101").is_prefix_of(&code("101")));
        assert!(!code("101").is_prefix_of(&code("10")));
        assert!(!code("11").is_prefix_of(&code("101")));
        assert!(code("10110011").is_prefix_of(&code("101100111")));
        assert!(!code("10110010").is_prefix_of(&code("101100111")));
    }

    #[test]
    fn test_cmp_bits() {
        assert_eq!(code("0").cmp_bits(&code("1")), Ordering::Less);
        assert_eq!(code("10").cmp_bits(&code("100")), Ordering::Less);
        assert_eq!(code("11").cmp_bits(&code("100")), Ordering::Greater);
        assert_eq!(code("011").cmp_bits(&code("011")), Ordering::Equal);
    }

    #[test]
    fn test_max_length_code() {
        let c = Code::from_bits(std::iter::repeat(true).take(MAX_CODE_BITS));
        assert_eq!(c.len(), MAX_CODE_BITS);
        assert_eq!(c.byte_len(), CODE_BYTES);
        assert_eq!(c.as_bytes()[CODE_BYTES - 1], 0b1111_1110);
    }

    #[test]
    #[should_panic]
    fn test_overlong_code_panics() {
        let mut c = Code::from_bits(std::iter::repeat(false).take(MAX_CODE_BITS));
        c.push_bit(true);
    }
}
