//! Bit-level I/O over byte buffers.
//!
//! [`BitWriter`] and [`BitReader`] both work MSB-first: bit 0 of a stream is
//! the most significant bit of its first byte.
//!
//! # Offsets
//! A writer can start part-way into a byte. `BitWriter::with_offset(3)` seeds
//! one zero byte whose top three bits are considered occupied, so the first
//! bit written lands at bit 3. The caller later OR-merges that first byte into
//! the tail of a buffer that really owns those three bits. This is what lets
//! independently encoded segments be stitched together.
//!
//! # Padding Rules
//! - BitWriter: bits past the end of the stream are zero
//! - BitReader: padding bits are indistinguishable from data; the caller must
//!   bound the read (the decoder bounds it by symbol count)
//!
//! # Example
//! ```
//! use huffpar_core::bitio::{BitReader, BitWriter};
//! use huffpar_core::code::Code;
//!
//! let mut writer = BitWriter::new();
//! writer.push_bit(true);
//! writer.write_code(&Code::from_bits([false, true, true]));
//! let bytes = writer.finish();
//! assert_eq!(bytes, vec![0b1011_0000]);
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.peek(), Some(true));
//! reader.advance();
//! assert_eq!(reader.read_bit().unwrap(), false);
//! ```

use crate::code::Code;
use crate::error::{BitIoError, Result};

/// Writes bits MSB-first into a growing byte buffer.
///
/// # Invariants
/// - `used` is the number of occupied bits in the last byte, 0 meaning the
///   last byte (if any) is full
/// - bits past the write position are zero
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    /// Output bytes, the last one possibly partial
    bytes: Vec<u8>,
    /// Occupied bits in the last byte (0-7)
    used: u8,
}

impl BitWriter {
    /// Create a writer that starts on a fresh byte.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            used: 0,
        }
    }

    /// Create a writer whose first `offset` bits are already taken.
    ///
    /// An offset of 0 starts on a fresh byte. Otherwise a zero byte is
    /// pre-seeded and writing begins at bit `offset` of it.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidOffset` if `offset > 7`.
    pub fn with_offset(offset: u8) -> Result<Self> {
        if offset > 7 {
            return Err(BitIoError::InvalidOffset(offset).into());
        }

        let mut writer = Self::new();
        if offset != 0 {
            writer.bytes.push(0);
            writer.used = offset;
        }
        Ok(writer)
    }

    /// Append a single bit, allocating a byte only when the last one is full.
    pub fn push_bit(&mut self, bit: bool) {
        if self.used == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> self.used;
            }
        }
        self.used = (self.used + 1) % 8;
    }

    /// Append every bit of `code` in one call.
    ///
    /// When the writer is byte-aligned the code bytes are copied as-is.
    /// Otherwise each code byte is split across the boundary: its high part is
    /// OR-merged into the current partial byte and its low part starts the
    /// next one.
    pub fn write_code(&mut self, code: &Code) {
        if code.is_empty() {
            return;
        }

        let end = self.bit_len() + code.len();

        if self.used == 0 {
            self.bytes.extend_from_slice(code.as_bytes());
        } else {
            let shift = self.used;
            for &byte in code.as_bytes() {
                if let Some(last) = self.bytes.last_mut() {
                    *last |= byte >> shift;
                }
                self.bytes.push(byte << (8 - shift));
            }
            // The carry of the final code byte may be pure padding.
            self.bytes.truncate((end + 7) / 8);
        }

        self.used = (end % 8) as u8;
    }

    /// Bits occupied in the last byte (0 when aligned).
    ///
    /// For a writer created with an offset this counts the seeded bits too,
    /// so it is the offset at which a following segment must start.
    pub fn offset(&self) -> u8 {
        self.used
    }

    /// Total bits written, including any seeded offset bits.
    pub fn bit_len(&self) -> usize {
        let padding = if self.used == 0 { 0 } else { 8 - self.used as usize };
        self.bytes.len() * 8 - padding
    }

    /// Return the number of bytes written so far (the last may be partial).
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Finish writing and return the output bytes, zero-padded.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reads bits MSB-first from a byte buffer.
///
/// The position is a (byte, bit) pair that only moves forward.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source data
    data: &'a [u8],
    /// Index of the current byte
    byte: usize,
    /// Index of the current bit within `byte` (0 = MSB)
    bit: u8,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::at(data, 0)
    }

    /// Create a reader positioned `bit_offset` bits into `data`.
    ///
    /// Used by the decoder to skip the table and count header.
    pub fn at(data: &'a [u8], bit_offset: usize) -> Self {
        Self {
            data,
            byte: bit_offset / 8,
            bit: (bit_offset % 8) as u8,
        }
    }

    /// True while at least one bit remains.
    pub fn has_more(&self) -> bool {
        self.byte < self.data.len()
    }

    /// The current bit, or `None` at end of stream.
    pub fn peek(&self) -> Option<bool> {
        self.data
            .get(self.byte)
            .map(|byte| byte & (0x80 >> self.bit) != 0)
    }

    /// Move past the current bit. No-op at end of stream.
    pub fn advance(&mut self) {
        if !self.has_more() {
            return;
        }
        if self.bit == 7 {
            self.byte += 1;
            self.bit = 0;
        } else {
            self.bit += 1;
        }
    }

    /// Read the current bit and advance.
    ///
    /// # Errors
    /// Returns `BitIoError::UnexpectedEof` at end of stream.
    pub fn read_bit(&mut self) -> Result<bool> {
        let bit = self.peek().ok_or(BitIoError::UnexpectedEof)?;
        self.advance();
        Ok(bit)
    }

    /// Current absolute bit position.
    pub fn position(&self) -> usize {
        self.byte * 8 + self.bit as usize
    }

    /// Return the number of bits remaining in the buffer.
    pub fn bits_remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.position())
    }
}
