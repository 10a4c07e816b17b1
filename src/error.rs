//! Error types for the huff compressor.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while compressing or restoring a file.
#[derive(Debug, Error)]
pub enum HuffError {
    /// An input, artifact or code file could not be opened.
    #[error("cannot read {path}: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A Huffman tree needs at least two distinct symbols.
    #[error("need at least 2 distinct symbols to build a code, found {0}")]
    DegenerateAlphabet(usize),

    /// The encoder was handed a symbol its code table does not know.
    #[error("symbol {0} is not in the code table")]
    UnknownSymbol(u8),

    /// Truncated bitstream, bad header or malformed code record.
    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    /// The reserved termination byte shows up in the real input.
    #[error("sentinel byte {0} appears in the input data")]
    SentinelCollision(u8),

    /// Refusing to overwrite an existing file.
    #[error("output file {0} already exists (use --force to overwrite)")]
    OutputExists(PathBuf),

    /// An output would land on top of one of the run's other files.
    #[error("{0} is both an input and an output of this run")]
    PathClash(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HuffError {
    /// Shorthand for building a CorruptStream error.
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        HuffError::CorruptStream(msg.into())
    }
}

/// A specialized Result type for huff operations.
pub type Result<T> = std::result::Result<T, HuffError>;
