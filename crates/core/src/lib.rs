//! huffpar-core: byte-oriented Huffman compression with parallel encoders
//!
//! This library provides:
//! - Frequency counting, Huffman tree construction and per-symbol codes
//! - A self-describing payload: serialized table, symbol count, packed bits
//! - A sequential encoder and two parallel encoders with identical output
//! - A decoder that validates the table and the bit stream
//!
//! # Architecture
//!
//! - `bitio`: Bit-level writer and reader
//! - `code`: Variable-length bit strings
//! - `frequency`, `tree`, `table`: From text to encoding table
//! - `serializer`: Bit-packing text at an arbitrary start offset
//! - `decode_tree`: Tree walk used by the decoder
//! - `pool`: Reusable worker threads
//! - `segment`: Splitting, offsets and stitching for the parallel encoders
//! - `parallel`, `farm`: Parallel encoders over `pool` and rayon
//! - `codec`: Public entry points and the payload header
//! - `metrics`: Stage timings through a caller-supplied reporter
//!
//! # Design Principles
//!
//! - **No panics**: Malformed input yields structured errors
//! - **Deterministic**: Same text, same bytes, whatever the worker count
//! - **No globals**: Timing goes through an explicit [`Reporter`]

pub mod bitio;
pub mod code;
pub mod codec;
pub mod decode_tree;
pub mod error;
pub mod farm;
pub mod frequency;
pub mod metrics;
pub mod parallel;
pub mod pool;
pub mod segment;
pub mod serializer;
pub mod table;
pub mod tree;

// Re-export commonly used types
pub use code::Code;
pub use codec::{decode, decode_with, encode, encode_parallel, encode_with, read_header, Header, Strategy};
pub use error::{Error, Result};
pub use farm::FarmEncoder;
pub use frequency::FrequencyTable;
pub use metrics::{Metrics, NoopReporter, Reporter, Stage};
pub use parallel::ParallelEncoder;
pub use pool::WorkerPool;
pub use table::EncodingTable;
pub use tree::HuffmanTree;
