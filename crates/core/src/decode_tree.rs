//! Decoding tree and the bit-by-bit walk.
//!
//! The tree is rebuilt from an [`EncodingTable`] by partitioning the symbols
//! at each depth on the bit value at that depth, mirroring the encoder's
//! traversal. A symbol whose code ends at a depth where other symbols are
//! still being partitioned means the codes are not prefix-free.

use tracing::trace;

use crate::bitio::BitReader;
use crate::code::Code;
use crate::error::{DecodeError, Result, TableError};
use crate::table::EncodingTable;

#[derive(Debug)]
enum DecodeNode {
    Leaf(u8),
    /// A missing child is a bit pattern no code uses.
    Branch {
        zero: Option<Box<DecodeNode>>,
        one: Option<Box<DecodeNode>>,
    },
}

/// Result of walking the tree once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A complete code was read
    Symbol(u8),
    /// The bit stream ran out before reaching a leaf
    EndOfStream,
}

/// Binary tree used to decode a Huffman bit stream.
#[derive(Debug)]
pub struct DecodeTree {
    root: Option<DecodeNode>,
}

impl DecodeTree {
    /// Build the tree for the codes of `table`.
    ///
    /// # Errors
    /// Returns `TableError::NotPrefixFree` if two codes overlap.
    pub fn new(table: &EncodingTable) -> Result<Self> {
        let entries: Vec<(u8, &Code)> = table.iter().collect();
        let root = build(&entries, 0)?.map(|node| *node);
        Ok(Self { root })
    }

    /// True when the tree holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Walk from the root to the next leaf.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidCode` if the bits lead off the tree.
    pub fn next_symbol(&self, reader: &mut BitReader<'_>) -> Result<Step> {
        let Some(mut node) = self.root.as_ref() else {
            return Ok(Step::EndOfStream);
        };

        loop {
            match node {
                DecodeNode::Leaf(symbol) => return Ok(Step::Symbol(*symbol)),
                DecodeNode::Branch { zero, one } => {
                    let position = reader.position();
                    let Some(bit) = reader.peek() else {
                        return Ok(Step::EndOfStream);
                    };
                    reader.advance();

                    let child = if bit { one } else { zero };
                    node = child
                        .as_deref()
                        .ok_or(DecodeError::InvalidCode { position })?;
                }
            }
        }
    }

    /// Decode exactly `count` symbols.
    ///
    /// # Errors
    /// - `DecodeError::EmptyTable` if symbols are expected but the tree is empty
    /// - `DecodeError::TruncatedPayload` if the stream ends early
    /// - `DecodeError::InvalidCode` if the stream contains an unused code
    pub fn decode(&self, reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>> {
        if count > 0 && self.is_empty() {
            return Err(DecodeError::EmptyTable { expected: count }.into());
        }

        // every symbol takes at least one bit
        let mut out = Vec::with_capacity(count.min(reader.bits_remaining()));
        while out.len() < count {
            match self.next_symbol(reader)? {
                Step::Symbol(symbol) => out.push(symbol),
                Step::EndOfStream => {
                    return Err(DecodeError::TruncatedPayload {
                        expected: count,
                        decoded: out.len(),
                    }
                    .into());
                }
            }
        }

        trace!(
            symbols = count,
            bits_left = reader.bits_remaining(),
            "decoded payload"
        );
        Ok(out)
    }
}

fn build(entries: &[(u8, &Code)], depth: usize) -> Result<Option<Box<DecodeNode>>> {
    match entries {
        [] => return Ok(None),
        [(symbol, code)] if code.len() == depth => {
            return Ok(Some(Box::new(DecodeNode::Leaf(*symbol))));
        }
        _ => {}
    }

    let mut zero = Vec::new();
    let mut one = Vec::new();
    for &(symbol, code) in entries {
        if code.len() <= depth {
            return Err(TableError::NotPrefixFree { symbol, depth }.into());
        }
        if code.bit(depth) {
            one.push((symbol, code));
        } else {
            zero.push((symbol, code));
        }
    }

    Ok(Some(Box::new(DecodeNode::Branch {
        zero: build(&zero, depth + 1)?,
        one: build(&one, depth + 1)?,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::serializer::encode_segment;

    const EXAMPLE: &[u8] = b"this is an example of a huffman tree";

    fn code(s: &str) -> Code {
        Code::from_bits(s.chars().map(|c| c == '1'))
    }

    #[test]
    fn test_every_code_decodes_to_its_symbol() {
        let table = EncodingTable::from_bytes(EXAMPLE);
        let tree = DecodeTree::new(&table).unwrap();

        for (symbol, code) in table.iter() {
            let bytes = code.as_bytes().to_vec();
            let mut reader = BitReader::new(&bytes);
            assert_eq!(tree.next_symbol(&mut reader).unwrap(), Step::Symbol(symbol));
            assert_eq!(reader.position(), code.len());
        }
    }

    #[test]
    fn test_decode_segment() {
        let table = EncodingTable::from_bytes(EXAMPLE);
        let segment = encode_segment(&table, EXAMPLE, 0).unwrap();
        let tree = DecodeTree::new(&table).unwrap();

        let mut reader = BitReader::new(&segment.bytes);
        let decoded = tree.decode(&mut reader, EXAMPLE.len()).unwrap();
        assert_eq!(decoded, EXAMPLE);
    }

    #[test]
    fn test_single_symbol_tree() {
        let table = EncodingTable::from_bytes(b"aaaa");
        let tree = DecodeTree::new(&table).unwrap();

        let bytes = [0u8];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(tree.decode(&mut reader, 4).unwrap(), b"aaaa");
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_single_symbol_unused_branch() {
        let table = EncodingTable::from_bytes(b"aaaa");
        let tree = DecodeTree::new(&table).unwrap();

        let bytes = [0b1000_0000];
        let mut reader = BitReader::new(&bytes);
        assert!(matches!(
            tree.next_symbol(&mut reader),
            Err(Error::Decode(DecodeError::InvalidCode { position: 0 }))
        ));
    }

    #[test]
    fn test_end_of_stream_mid_walk() {
        let table = EncodingTable::from_bytes(EXAMPLE);
        let tree = DecodeTree::new(&table).unwrap();

        let mut reader = BitReader::new(&[]);
        assert_eq!(tree.next_symbol(&mut reader).unwrap(), Step::EndOfStream);
    }

    #[test]
    fn test_truncated_payload() {
        let table = EncodingTable::from_bytes(EXAMPLE);
        let segment = encode_segment(&table, EXAMPLE, 0).unwrap();
        let tree = DecodeTree::new(&table).unwrap();

        let cut = &segment.bytes[..segment.bytes.len() / 2];
        let mut reader = BitReader::new(cut);
        assert!(matches!(
            tree.decode(&mut reader, EXAMPLE.len()),
            Err(Error::Decode(DecodeError::TruncatedPayload { expected, .. }))
                if expected == EXAMPLE.len()
        ));
    }

    #[test]
    fn test_empty_tree() {
        let tree = DecodeTree::new(&EncodingTable::empty()).unwrap();
        assert!(tree.is_empty());

        let mut reader = BitReader::new(&[0xFF]);
        assert_eq!(tree.decode(&mut reader, 0).unwrap(), Vec::<u8>::new());
        assert!(matches!(
            tree.decode(&mut reader, 1),
            Err(Error::Decode(DecodeError::EmptyTable { expected: 1 }))
        ));
    }

    #[test]
    fn test_not_prefix_free() {
        let mut table = EncodingTable::empty();
        table.set(b'a', code("01"));
        table.set(b'b', code("011"));
        table.set(b'c', code("1"));

        assert!(matches!(
            DecodeTree::new(&table),
            Err(Error::Table(TableError::NotPrefixFree { symbol: b'a', depth: 2 }))
        ));
    }

    #[test]
    fn test_incomplete_code_set() {
        // Prefix-free but not full: "11" leads nowhere.
        let mut table = EncodingTable::empty();
        table.set(b'a', code("0"));
        table.set(b'b', code("10"));
        let tree = DecodeTree::new(&table).unwrap();

        let bytes = [0b0101_1000];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(tree.next_symbol(&mut reader).unwrap(), Step::Symbol(b'a'));
        assert_eq!(tree.next_symbol(&mut reader).unwrap(), Step::Symbol(b'b'));
        assert!(matches!(
            tree.next_symbol(&mut reader),
            Err(Error::Decode(DecodeError::InvalidCode { position: 4 }))
        ));
    }
}
