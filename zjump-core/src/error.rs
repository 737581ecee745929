//! Error types for zjump operations.
//!
//! All pipeline stages report failures through the single [`ZjumpError`]
//! taxonomy. Errors surface immediately from the stage that detected them;
//! no local recovery is attempted.

use std::io;
use thiserror::Error;

/// The main error type for zjump operations.
#[derive(Debug, Error)]
pub enum ZjumpError {
    /// Invariant violation; never expected on correct input.
    #[error("unexpected state: {message}")]
    Unexpected {
        /// Description of the violated invariant.
        message: String,
    },

    /// Invalid command-line usage.
    #[error("invalid argument: {message}")]
    Argument {
        /// Description of the usage error.
        message: String,
    },

    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The Burrows-Wheeler transform failed.
    #[error("BWT error: {message}")]
    Bwt {
        /// Description of the failure.
        message: String,
    },

    /// Huffman code construction is infeasible.
    #[error("Huffman error: {message}")]
    Huffman {
        /// Description of the failure.
        message: String,
    },

    /// A bit-stream write was truncated; the output buffer is too small.
    #[error("bit writer truncated: requested {requested} bits, wrote {written}")]
    BitWriter {
        /// Number of bits the caller asked to write.
        requested: u8,
        /// Number of bits actually written.
        written: u8,
    },

    /// The compressed stream ended before all declared content was read.
    #[error("compressed stream is too short")]
    StreamTooShort,

    /// The compressed stream holds more data than its fields declare.
    #[error("compressed stream is too large")]
    StreamTooLarge,

    /// The block count field is out of range.
    #[error("invalid number of blocks: {count}")]
    NumBlocks {
        /// The offending block count.
        count: u16,
    },

    /// A block length field is out of range.
    #[error("invalid block length: {length}")]
    BlockLength {
        /// The offending length in bytes.
        length: usize,
    },

    /// The BWT primary index field is out of range.
    #[error("invalid BWT primary index: {index}")]
    BwtPrimaryIndex {
        /// The offending index.
        index: u32,
    },

    /// A serialized Huffman bit length is invalid for a present symbol.
    #[error("invalid Huffman bit length for symbol {symbol}")]
    HuffmanBitLength {
        /// The symbol whose length field is invalid.
        symbol: u16,
    },

    /// The padding-literal count field is out of range.
    #[error("invalid literals length: {length}")]
    LiteralsLength {
        /// The offending count.
        length: usize,
    },

    /// The jump-sequence count field is out of range.
    #[error("invalid number of jump sequences: {count}")]
    NumJseqs {
        /// The offending count.
        count: u16,
    },

    /// No Huffman code matched within the maximum bit length.
    #[error("no Huffman code matched near bit position {bit_position}")]
    EncodedSymbol {
        /// Bit position of the reader after the failed match.
        bit_position: usize,
    },

    /// The inverse jump-sequence transform could not rebuild the stream.
    #[error("error reconstructing stream: {message}")]
    ReconstructingStream {
        /// Description of the failure.
        message: String,
    },
}

/// Result type alias for zjump operations.
pub type Result<T> = std::result::Result<T, ZjumpError>;

impl ZjumpError {
    /// Create an unexpected-state error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Create an argument error.
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }

    /// Create a BWT error.
    pub fn bwt(message: impl Into<String>) -> Self {
        Self::Bwt {
            message: message.into(),
        }
    }

    /// Create a Huffman error.
    pub fn huffman(message: impl Into<String>) -> Self {
        Self::Huffman {
            message: message.into(),
        }
    }

    /// Create a stream-reconstruction error.
    pub fn reconstructing_stream(message: impl Into<String>) -> Self {
        Self::ReconstructingStream {
            message: message.into(),
        }
    }

    /// Stable process exit code for this error kind.
    ///
    /// The ordinals match the historical `ZjumpErrorCode` values, so scripts
    /// keyed on them keep working. Code 3 (allocation failure) is reserved:
    /// a failed allocation aborts the process instead.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Unexpected { .. } => 1,
            Self::Argument { .. } => 2,
            Self::Io(_) => 4,
            Self::Bwt { .. } => 5,
            Self::Huffman { .. } => 6,
            Self::BitWriter { .. } => 7,
            Self::StreamTooShort => 8,
            Self::StreamTooLarge => 9,
            Self::NumBlocks { .. } => 10,
            Self::BlockLength { .. } => 11,
            Self::BwtPrimaryIndex { .. } => 12,
            Self::HuffmanBitLength { .. } => 13,
            Self::LiteralsLength { .. } => 14,
            Self::NumJseqs { .. } => 15,
            Self::EncodedSymbol { .. } => 16,
            Self::ReconstructingStream { .. } => 17,
        }
    }
}
