//! Error types for the huffpar codec.
//!
//! Every fallible operation returns a structured error. Encoding valid input
//! never fails on the sequential path; the parallel paths can only fail when a
//! worker dies. Decoding fails whenever the input is not a well-formed payload.

use thiserror::Error;

/// Top-level error type for all operations in the crate.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: reading/writing bits from/to byte buffers
/// - Table: encoding table construction or wire-format parsing
/// - Decode: payload header or bit stream problems
/// - Worker: failures inside the parallel pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Serialized table is malformed or not prefix-free
    #[error("encoding table error: {0}")]
    Table(#[from] TableError),

    /// Payload could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A worker of the parallel pipeline failed
    #[error("worker error: {0}")]
    Worker(#[from] WorkerError),

    /// Invalid caller-supplied option (e.g., zero workers)
    #[error("configuration error: {0}")]
    Config(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bit-level I/O errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitIoError {
    /// Attempted to read past the end of the buffer
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Starting bit offset outside 0..=7
    #[error("invalid bit offset {0}: must be in 0..=7")]
    InvalidOffset(u8),
}

/// Encoding table errors, raised while parsing the serialized table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// Buffer ends in the middle of a table record
    #[error("truncated table: need {needed} more bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// The same symbol appears in two records
    #[error("symbol {symbol:#04x} appears more than once")]
    DuplicateSymbol { symbol: u8 },

    /// A record declares a code of zero bits
    #[error("symbol {symbol:#04x} has an empty code")]
    EmptyCode { symbol: u8 },

    /// Encoding a symbol the table has no code for
    #[error("symbol {symbol:#04x} is not in the encoding table")]
    MissingSymbol { symbol: u8 },

    /// The declared codes are not prefix-free
    #[error("codes are not prefix-free: code of symbol {symbol:#04x} ends at depth {depth}")]
    NotPrefixFree { symbol: u8, depth: usize },
}

/// Payload decoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer too short to contain the symbol-count header
    #[error("missing symbol count: need {required} bytes, got {actual}")]
    MissingSymbolCount { required: usize, actual: usize },

    /// Bit stream ended before the declared number of symbols was decoded
    #[error("payload truncated: expected {expected} symbols, decoded {decoded}")]
    TruncatedPayload { expected: usize, decoded: usize },

    /// The walk reached a branch that leads to no symbol
    #[error("invalid huffman code at bit position {position}")]
    InvalidCode { position: usize },

    /// Symbols declared but the table is empty
    #[error("{expected} symbols declared but the table is empty")]
    EmptyTable { expected: usize },
}

/// Parallel pipeline errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    /// The task panicked; the worker itself survives
    #[error("task on worker {worker} panicked: {message}")]
    Panicked { worker: usize, message: String },

    /// The worker thread is gone and its result can never arrive
    #[error("worker {worker} disconnected")]
    Disconnected { worker: usize },

    /// Task submitted to a worker index the pool does not have
    #[error("worker index {index} out of range for pool of {workers}")]
    InvalidWorker { index: usize, workers: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
