//! The encoding table and its wire format.
//!
//! An [`EncodingTable`] holds one [`Code`] per byte value. Codes are derived
//! by walking the Huffman tree depth-first, appending bit 0 when descending
//! left and bit 1 when descending right.
//!
//! # Wire Format
//!
//! ```text
//! +------------------------+
//! | count (1 byte)         |  number of records, mod 256
//! +------------------------+
//! | symbol (1 byte)        |  \
//! | bit length L (1 byte)  |   > one record per used symbol,
//! | code (ceil(L/8) bytes) |  /  ascending symbol order
//! +------------------------+
//! ```
//!
//! A table with all 256 symbols writes a count of 0. When parsing, a zero
//! count means 256 records if 256 valid records follow. Otherwise it is an
//! empty table, which is only ever followed by the header of an empty text
//! (and possibly trailing bytes).

use std::fmt;

use tracing::debug;

use crate::code::Code;
use crate::codec::COUNT_BYTES;
use crate::error::{Result, TableError};
use crate::frequency::FrequencyTable;
use crate::tree::{HuffmanTree, Node};

/// Number of entries: one per byte value.
pub const TABLE_SIZE: usize = 256;

/// Mapping from byte value to Huffman code.
///
/// # Invariants
/// - the non-empty codes are prefix-free
#[derive(Clone, PartialEq, Eq)]
pub struct EncodingTable {
    codes: [Code; TABLE_SIZE],
}

impl EncodingTable {
    /// A table with no symbols.
    pub fn empty() -> Self {
        Self {
            codes: [Code::EMPTY; TABLE_SIZE],
        }
    }

    /// Derive codes from a Huffman tree.
    ///
    /// A tree that is a single leaf gets the one-bit code `0`, so every symbol
    /// consumes at least one bit in the stream.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut table = Self::empty();
        match tree.root() {
            None => {}
            Some(Node::Leaf { symbol, .. }) => {
                table.codes[*symbol as usize] = Code::new().with_bit(false);
            }
            Some(root) => table.assign(root, Code::new()),
        }
        table
    }

    /// Build the table for a frequency table.
    pub fn from_frequencies(freqs: &FrequencyTable) -> Self {
        Self::from_tree(&HuffmanTree::from_frequencies(freqs))
    }

    /// Build the table for the bytes of `text`.
    pub fn from_bytes(text: &[u8]) -> Self {
        Self::from_frequencies(&FrequencyTable::from_bytes(text))
    }

    fn assign(&mut self, node: &Node, prefix: Code) {
        match node {
            Node::Leaf { symbol, .. } => self.codes[*symbol as usize] = prefix,
            Node::Internal { left, right, .. } => {
                self.assign(left, prefix.with_bit(false));
                self.assign(right, prefix.with_bit(true));
            }
        }
    }

    /// Code for `symbol`; empty if the symbol is absent.
    pub fn get(&self, symbol: u8) -> &Code {
        &self.codes[symbol as usize]
    }

    /// Replace the code for `symbol` without checking prefix-freedom.
    ///
    /// An empty code removes the symbol.
    pub fn set(&mut self, symbol: u8, code: Code) {
        self.codes[symbol as usize] = code;
    }

    /// True if `symbol` has a code.
    pub fn contains(&self, symbol: u8) -> bool {
        !self.codes[symbol as usize].is_empty()
    }

    /// Iterate over `(symbol, code)` for used symbols, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| !code.is_empty())
            .map(|(symbol, code)| (symbol as u8, code))
    }

    /// Number of used symbols.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True if no symbol has a code.
    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(Code::is_empty)
    }

    /// Longest code length in the table.
    pub fn max_code_len(&self) -> usize {
        self.iter().map(|(_, code)| code.len()).max().unwrap_or(0)
    }

    /// Check that no used code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        self.first_prefix_violation().is_none()
    }

    /// Sorted by bit string, a code that prefixes any other code also
    /// prefixes its immediate successor, so adjacent pairs suffice.
    fn first_prefix_violation(&self) -> Option<(u8, usize)> {
        let mut codes: Vec<(u8, &Code)> = self.iter().collect();
        codes.sort_by(|a, b| a.1.cmp_bits(b.1));
        codes
            .windows(2)
            .find(|pair| pair[0].1.is_prefix_of(pair[1].1))
            .map(|pair| (pair[0].0, pair[0].1.len()))
    }

    /// Serialized size in bytes.
    pub fn serialized_len(&self) -> usize {
        1 + self.iter().map(|(_, code)| 2 + code.byte_len()).sum::<usize>()
    }

    /// Serialize the table into a fresh buffer.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        self.serialize_into(&mut out);
        out
    }

    /// Append the serialized table to `out`.
    pub fn serialize_into(&self, out: &mut Vec<u8>) {
        // 256 wraps to 0, see module docs
        out.push(self.len() as u8);
        for (symbol, code) in self.iter() {
            out.push(symbol);
            out.push(code.len() as u8);
            out.extend_from_slice(code.as_bytes());
        }
    }

    /// Parse a table from the front of `bytes`.
    ///
    /// Returns the table and the number of bytes consumed.
    ///
    /// # Errors
    /// - `TableError::Truncated` if the buffer ends mid-record
    /// - `TableError::EmptyCode` for a zero-length record
    /// - `TableError::DuplicateSymbol` if a symbol repeats
    /// - `TableError::NotPrefixFree` if the codes are not prefix-free
    pub fn deserialize(bytes: &[u8]) -> Result<(Self, usize)> {
        let Some((&count, rest)) = bytes.split_first() else {
            return Err(TableError::Truncated {
                needed: 1,
                available: 0,
            }
            .into());
        };

        let (table, pos) = match count {
            // 256 records, unless they do not parse: then it is an empty table
            // followed by an empty text's header and trailing bytes
            0 => match Self::parse_records(bytes, TABLE_SIZE) {
                Ok(parsed) => parsed,
                Err(_) if rest.len() >= COUNT_BYTES => (Self::empty(), 1),
                Err(e) => return Err(e),
            },
            n => Self::parse_records(bytes, n as usize)?,
        };
        let records = table.len();

        debug!(
            symbols = records,
            bytes = pos,
            max_code_len = table.max_code_len(),
            "parsed encoding table"
        );
        Ok((table, pos))
    }

    /// Parse `records` records following the count byte and check that the
    /// result is prefix-free.
    fn parse_records(bytes: &[u8], records: usize) -> Result<(Self, usize)> {
        let mut table = Self::empty();
        let mut pos = 1;
        for _ in 0..records {
            let available = bytes.len() - pos;
            if available < 2 {
                return Err(TableError::Truncated {
                    needed: 2,
                    available,
                }
                .into());
            }

            let symbol = bytes[pos];
            let bits = bytes[pos + 1];
            pos += 2;

            if bits == 0 {
                return Err(TableError::EmptyCode { symbol }.into());
            }
            if table.contains(symbol) {
                return Err(TableError::DuplicateSymbol { symbol }.into());
            }

            let code = Code::from_raw(bits, &bytes[pos..]).ok_or(TableError::Truncated {
                needed: (bits as usize + 7) / 8,
                available: bytes.len() - pos,
            })?;
            pos += code.byte_len();
            table.codes[symbol as usize] = code;
        }

        if let Some((symbol, depth)) = table.first_prefix_violation() {
            return Err(TableError::NotPrefixFree { symbol, depth }.into());
        }
        Ok((table, pos))
    }
}

impl Default for EncodingTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for EncodingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl fmt::Display for EncodingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for (symbol, code) in self.iter() {
            let shown = if symbol.is_ascii_graphic() || symbol == b' ' {
                format!("'{}'", symbol as char)
            } else {
                format!("{symbol:#04x}")
            };
            writeln!(f, "  {shown} : [{} bits, code: {code}]", code.len())?;
        }
        write!(f, "]")
    }
}
