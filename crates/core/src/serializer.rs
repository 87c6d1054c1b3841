//! Bit packing of symbol sequences.
//!
//! [`TextSerializer`] appends the codes of a run of symbols to a
//! [`BitWriter`]. It can start at a non-zero bit offset so that a segment
//! encoded on its own can later be stitched onto the end of the previous
//! segment's output (see [`crate::segment::stitch`]).

use crate::bitio::BitWriter;
use crate::error::{Result, TableError};
use crate::table::EncodingTable;

/// Output of encoding one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSegment {
    /// Packed bits. With a non-zero start offset the first byte holds zeros
    /// in its top `start_offset` bits.
    pub bytes: Vec<u8>,

    /// Bit offset the segment started at (0-7)
    pub start_offset: u8,

    /// Bit offset after the last symbol: `(start_offset + bits) % 8`
    pub end_offset: u8,

    /// Number of code bits appended
    pub bits: u64,
}

/// Packs symbols into bytes using a finalized encoding table.
#[derive(Debug)]
pub struct TextSerializer<'t> {
    table: &'t EncodingTable,
    writer: BitWriter,
    start_offset: u8,
    bits: u64,
}

impl<'t> TextSerializer<'t> {
    /// Start a serializer on a fresh byte.
    pub fn new(table: &'t EncodingTable) -> Self {
        Self {
            table,
            writer: BitWriter::new(),
            start_offset: 0,
            bits: 0,
        }
    }

    /// Start a serializer whose first `offset` bits belong to the previous
    /// segment.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidOffset` if `offset > 7`.
    pub fn with_offset(table: &'t EncodingTable, offset: u8) -> Result<Self> {
        Ok(Self {
            table,
            writer: BitWriter::with_offset(offset)?,
            start_offset: offset,
            bits: 0,
        })
    }

    /// Append the code for one symbol.
    ///
    /// # Errors
    /// Returns `TableError::MissingSymbol` if the table has no code for it.
    pub fn append(&mut self, symbol: u8) -> Result<()> {
        let code = self.table.get(symbol);
        if code.is_empty() {
            return Err(TableError::MissingSymbol { symbol }.into());
        }
        self.writer.write_code(code);
        self.bits += code.len() as u64;
        Ok(())
    }

    /// Append every symbol of `text`.
    pub fn append_all(&mut self, text: &[u8]) -> Result<()> {
        text.iter().try_for_each(|&symbol| self.append(symbol))
    }

    /// Current bit offset within the last byte.
    pub fn offset(&self) -> u8 {
        self.writer.offset()
    }

    /// Finish and return the packed segment.
    pub fn finish(self) -> EncodedSegment {
        let end_offset = self.writer.offset();
        EncodedSegment {
            bytes: self.writer.finish(),
            start_offset: self.start_offset,
            end_offset,
            bits: self.bits,
        }
    }
}

/// Encode `text` starting at bit `offset`.
pub fn encode_segment(table: &EncodingTable, text: &[u8], offset: u8) -> Result<EncodedSegment> {
    let mut serializer = TextSerializer::with_offset(table, offset)?;
    serializer.append_all(text)?;
    Ok(serializer.finish())
}
