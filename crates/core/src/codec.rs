//! Public encode/decode entry points and the payload header.
//!
//! # Payload Format
//!
//! ```text
//! +-----------------------------+
//! | encoding table (variable)   |  see `table` module
//! +-----------------------------+
//! | symbol count (usize, native |  number of symbols, not bytes
//! | byte order)                 |
//! +-----------------------------+
//! | packed text (variable)      |  MSB-first, final byte zero-padded
//! +-----------------------------+
//! ```
//!
//! Every strategy produces the same bytes for the same input.

use std::mem::size_of;

use tracing::{debug, debug_span};

use crate::bitio::BitReader;
use crate::decode_tree::DecodeTree;
use crate::error::{DecodeError, Result};
use crate::farm::FarmEncoder;
use crate::frequency::FrequencyTable;
use crate::metrics::{timed, NoopReporter, Reporter, Stage};
use crate::parallel::ParallelEncoder;
use crate::serializer::encode_segment;
use crate::table::EncodingTable;

/// Width of the symbol-count header.
pub const COUNT_BYTES: usize = size_of::<usize>();

/// How the text is encoded. All strategies produce identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Single-threaded
    #[default]
    Sequential,
    /// Map-reduce over a [`WorkerPool`](crate::pool::WorkerPool)
    Pool { workers: usize },
    /// Map-reduce over a rayon thread pool
    Farm { workers: usize },
}

impl Strategy {
    /// Number of workers the strategy uses.
    pub fn workers(&self) -> usize {
        match *self {
            Strategy::Sequential => 1,
            Strategy::Pool { workers } | Strategy::Farm { workers } => workers,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Pool { .. } => "pool",
            Strategy::Farm { .. } => "farm",
        }
    }
}

/// Parsed payload header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// The encoding table
    pub table: EncodingTable,
    /// Number of encoded symbols
    pub symbols: usize,
    /// Byte offset of the packed text
    pub payload_offset: usize,
}

/// Encode `text` on the calling thread.
///
/// ```
/// let encoded = huffpar_core::encode(b"abracadabra").unwrap();
/// assert_eq!(huffpar_core::decode(&encoded).unwrap(), b"abracadabra");
/// ```
pub fn encode(text: &[u8]) -> Result<Vec<u8>> {
    encode_with(text, Strategy::Sequential, &mut NoopReporter)
}

/// Encode `text` with `workers` pool workers.
///
/// # Errors
/// Returns `Error::Config` if `workers` is 0, or a worker error if the
/// pipeline breaks.
pub fn encode_parallel(text: &[u8], workers: usize) -> Result<Vec<u8>> {
    encode_with(text, Strategy::Pool { workers }, &mut NoopReporter)
}

/// Encode `text` with the given strategy, reporting stage timings.
pub fn encode_with(text: &[u8], strategy: Strategy, reporter: &mut dyn Reporter) -> Result<Vec<u8>> {
    let span = debug_span!("encode", strategy = strategy.name(), bytes = text.len());
    let _guard = span.enter();

    let out = match strategy {
        Strategy::Sequential => encode_sequential(text, reporter)?,
        Strategy::Pool { workers } => ParallelEncoder::new(workers)?.encode_with(text, reporter)?,
        Strategy::Farm { workers } => FarmEncoder::new(workers)?.encode_with(text, reporter)?,
    };

    debug!(input = text.len(), output = out.len(), "encoded");
    Ok(out)
}

fn encode_sequential(text: &[u8], reporter: &mut dyn Reporter) -> Result<Vec<u8>> {
    let freqs = timed(reporter, Stage::Frequencies, || FrequencyTable::from_bytes(text));
    let table = timed(reporter, Stage::BuildTable, || {
        EncodingTable::from_frequencies(&freqs)
    });
    reporter.table_ready(table.len(), text.len() as u64);

    let mut out = timed(reporter, Stage::SerializeTable, || {
        start_output(&table, &freqs, text.len())
    });

    timed(reporter, Stage::EncodeText, || {
        let segment = encode_segment(&table, text, 0)?;
        out.extend_from_slice(&segment.bytes);
        Ok::<_, crate::Error>(())
    })?;

    Ok(out)
}

/// Allocate the output buffer and write the table and symbol count.
pub(crate) fn start_output(table: &EncodingTable, freqs: &FrequencyTable, symbols: usize) -> Vec<u8> {
    let payload = (freqs.encoded_bits(table) + 7) / 8;
    let mut out = Vec::with_capacity(table.serialized_len() + COUNT_BYTES + payload as usize);
    write_header(&mut out, table, symbols);
    out
}

/// Append the table and symbol count to `out`.
pub fn write_header(out: &mut Vec<u8>, table: &EncodingTable, symbols: usize) {
    table.serialize_into(out);
    out.extend_from_slice(&symbols.to_ne_bytes());
}

/// Parse the table and symbol count at the front of `bytes`.
///
/// # Errors
/// - table errors from [`EncodingTable::deserialize`]
/// - `DecodeError::MissingSymbolCount` if the count header is cut short
pub fn read_header(bytes: &[u8]) -> Result<Header> {
    let (table, table_len) = EncodingTable::deserialize(bytes)?;

    let end = table_len + COUNT_BYTES;
    let raw = bytes
        .get(table_len..end)
        .ok_or(DecodeError::MissingSymbolCount {
            required: end,
            actual: bytes.len(),
        })?;

    let mut count = [0u8; COUNT_BYTES];
    count.copy_from_slice(raw);

    Ok(Header {
        table,
        symbols: usize::from_ne_bytes(count),
        payload_offset: end,
    })
}

/// Decode a payload produced by any encode strategy.
pub fn decode(bytes: &[u8]) -> Result<Vec<u8>> {
    decode_with(bytes, &mut NoopReporter)
}

/// Decode a payload, reporting stage timings.
///
/// # Errors
/// Any structural problem with the payload: malformed or non-prefix-free
/// table, missing count header, truncated or invalid bit stream.
pub fn decode_with(bytes: &[u8], reporter: &mut dyn Reporter) -> Result<Vec<u8>> {
    let span = debug_span!("decode", bytes = bytes.len());
    let _guard = span.enter();

    let (header, tree) = timed(reporter, Stage::ParseTable, || {
        let header = read_header(bytes)?;
        let tree = DecodeTree::new(&header.table)?;
        Ok::<_, crate::Error>((header, tree))
    })?;
    reporter.table_ready(header.table.len(), header.symbols as u64);
    debug!(
        symbols = header.symbols,
        distinct = header.table.len(),
        payload_offset = header.payload_offset,
        "parsed header"
    );

    timed(reporter, Stage::DecodeText, || {
        let mut reader = BitReader::at(bytes, header.payload_offset * 8);
        tree.decode(&mut reader, header.symbols)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, TableError};
    use crate::metrics::Metrics;

    const EXAMPLE: &[u8] = b"this is an example of a huffman tree";

    fn count_header(n: usize) -> Vec<u8> {
        n.to_ne_bytes().to_vec()
    }

    #[test]
    fn test_encode_empty() {
        let encoded = encode(b"").unwrap();
        let mut expected = vec![0];
        expected.extend(count_header(0));
        assert_eq!(encoded, expected);
        assert_eq!(decode(&encoded).unwrap(), b"");
    }

    #[test]
    fn test_encode_single_symbol() {
        let encoded = encode(b"aaaa").unwrap();
        let mut expected = vec![1, b'a', 1, 0];
        expected.extend(count_header(4));
        expected.push(0b0000_0000);
        assert_eq!(encoded, expected);
        assert_eq!(decode(&encoded).unwrap(), b"aaaa");
    }

    #[test]
    fn test_encode_two_symbols() {
        let encoded = encode(b"ab").unwrap();
        let mut expected = vec![2, b'a', 1, 0b0000_0000, b'b', 1, 0b1000_0000];
        expected.extend(count_header(2));
        expected.push(0b0100_0000);
        assert_eq!(encoded, expected);
        assert_eq!(decode(&encoded).unwrap(), b"ab");
    }

    #[test]
    fn test_round_trip_example() {
        let encoded = encode(EXAMPLE).unwrap();
        assert!(encoded.len() < EXAMPLE.len() + 64);
        assert_eq!(decode(&encoded).unwrap(), EXAMPLE);
    }

    #[test]
    fn test_read_header() {
        let encoded = encode(EXAMPLE).unwrap();
        let header = read_header(&encoded).unwrap();
        assert_eq!(header.symbols, EXAMPLE.len());
        assert_eq!(header.table, EncodingTable::from_bytes(EXAMPLE));
        assert_eq!(header.payload_offset, header.table.serialized_len() + COUNT_BYTES);
    }

    #[test]
    fn test_missing_symbol_count() {
        let encoded = encode(EXAMPLE).unwrap();
        let table_len = EncodingTable::from_bytes(EXAMPLE).serialized_len();
        let result = decode(&encoded[..table_len + 2]);
        assert!(matches!(
            result,
            Err(Error::Decode(DecodeError::MissingSymbolCount { .. }))
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let encoded = encode(EXAMPLE).unwrap();
        let result = decode(&encoded[..encoded.len() - 3]);
        assert!(matches!(
            result,
            Err(Error::Decode(DecodeError::TruncatedPayload { .. }))
        ));
    }

    #[test]
    fn test_inflated_symbol_count() {
        let mut encoded = encode(b"ab").unwrap();
        let start = 7;
        encoded[start..start + COUNT_BYTES].copy_from_slice(&1_000_000usize.to_ne_bytes());
        assert!(matches!(
            decode(&encoded),
            Err(Error::Decode(DecodeError::TruncatedPayload { expected: 1_000_000, decoded: 8 }))
        ));
    }

    #[test]
    fn test_corrupt_table() {
        let mut encoded = encode(b"ab").unwrap();
        // give 'b' the code "0" as well
        encoded[6] = 0;
        assert!(matches!(
            decode(&encoded),
            Err(Error::Table(TableError::NotPrefixFree { .. }))
        ));
    }

    #[test]
    fn test_strategies_agree() {
        let sequential = encode(EXAMPLE).unwrap();
        for workers in [1, 2, 4, 8] {
            let pool = encode_with(EXAMPLE, Strategy::Pool { workers }, &mut NoopReporter).unwrap();
            let farm = encode_with(EXAMPLE, Strategy::Farm { workers }, &mut NoopReporter).unwrap();
            assert_eq!(pool, sequential, "pool, {workers} workers");
            assert_eq!(farm, sequential, "farm, {workers} workers");
        }
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(encode_parallel(EXAMPLE, 0), Err(Error::Config(_))));
        assert!(matches!(
            encode_with(EXAMPLE, Strategy::Farm { workers: 0 }, &mut NoopReporter),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_reporter_receives_table_info() {
        let mut metrics = Metrics::new();
        let encoded = encode_with(EXAMPLE, Strategy::Sequential, &mut metrics).unwrap();
        assert_eq!(metrics.distinct_symbols, 16);
        assert_eq!(metrics.symbols, EXAMPLE.len() as u64);

        let mut metrics = Metrics::new();
        decode_with(&encoded, &mut metrics).unwrap();
        assert_eq!(metrics.distinct_symbols, 16);
        assert_eq!(metrics.symbols, EXAMPLE.len() as u64);
    }

    #[test]
    fn test_strategy_workers() {
        assert_eq!(Strategy::Sequential.workers(), 1);
        assert_eq!(Strategy::Pool { workers: 3 }.workers(), 3);
        assert_eq!(Strategy::default(), Strategy::Sequential);
    }
}
