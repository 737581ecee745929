//! zjump compression/decompression.
//!
//! This crate provides a pure Rust implementation of the zjump block
//! format. Input bytes are split into fixed-size blocks and each block runs
//! through a four-stage pipeline:
//!
//! 1. Burrows-Wheeler Transform (BWT) - block sorting for locality
//! 2. Jump-Sequence Transform (JST) - per-byte occurrence distances replace
//!    the bytes themselves, shrinking the stream pass by pass
//! 3. Run-length coding of ones (RLE-1) - jumps of one collapse into a
//!    bijective base-2 code over two run symbols
//! 4. Length-limited canonical Huffman coding - entropy stage, serialized
//!    together with its code table into a self-describing bit-packed block
//!
//! Decompression reverses each stage exactly.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::io::Read;

/// Burrows-Wheeler Transform implementation.
pub mod bwt;

mod block;
mod decode;
mod encode;
mod huffman;
mod jst;
mod rle;

pub use block::{BlockReader, BlockWriter, ZjumpBlock};
pub use decode::{BlockDecompressor, decompress, decompress_stream};
pub use encode::{BlockCompressor, compress, compress_stream};
pub use huffman::{
    EncodedSymbol, HuffmanBitLengthBuilder, HuffmanEncoding, HuffmanFrequencyBuilder,
    HuffmanReader, HuffmanWriter,
};
pub use jst::{JstOutput, JumpToken};

/// RLE-1 run symbol adding its digit weight once.
pub const RUNA_SYMBOL: u16 = 0;

/// RLE-1 run symbol adding its digit weight twice.
pub const RUNB_SYMBOL: u16 = 1;

/// Smallest symbol value encoding a jump length directly.
pub const MIN_JUMP_SYMBOL: u16 = 2;

/// Largest symbol value encoding a jump length directly.
pub const MAX_JUMP_SYMBOL: u16 = 252;

/// Adds [`MAX_JUMP_SIZE`] to the jump encoded by the following symbol.
pub const SKIP_CHUNK_SYMBOL: u16 = 253;

/// Terminates one jump sequence.
pub const END_OF_SEQUENCE_SYMBOL: u16 = 254;

/// Separates two transform passes in the symbol stream.
pub const SHRINK_STREAM_SYMBOL: u16 = 255;

/// Smallest jump length a jump symbol can encode.
pub const MIN_JUMP_SIZE: u16 = 2;

/// Largest jump length a jump symbol can encode.
pub const MAX_JUMP_SIZE: u16 = MAX_JUMP_SYMBOL - MIN_JUMP_SYMBOL + MIN_JUMP_SIZE;

/// Maximum number of input bytes per block.
pub const MAX_EXPANDED_BLOCK_SIZE: usize = 200_000;

/// Maximum size in bytes of a compressed block payload.
pub const MAX_COMPRESSED_BLOCK_SIZE: usize = 250_000;

/// Maximum number of jump sequences per block.
pub const MAX_NUM_JSEQUENCES: usize = 65_535;

/// Size of the Huffman alphabet.
pub const MAX_ENCODING_SYMBOLS: u16 = 256;

/// Maximum Huffman code length in bits.
pub const MAX_ENCODING_BIT_LENGTH: u8 = 15;

/// Read from `input` until `buf` is full or the source is exhausted.
pub(crate) fn read_full<R: Read>(input: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = input.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_layout() {
        assert_eq!(MAX_JUMP_SIZE, 252);
        assert_eq!(SKIP_CHUNK_SYMBOL, MAX_JUMP_SYMBOL + 1);
        assert_eq!(SHRINK_STREAM_SYMBOL, MAX_ENCODING_SYMBOLS - 1);
    }

    #[test]
    fn test_roundtrip_single_byte() {
        let original = b"A";
        let compressed = compress(original).unwrap();
        assert!(!compressed.is_empty());
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_roundtrip_repeated() {
        let original = b"AAAAAAAA";
        let compressed = compress(original).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_roundtrip_text() {
        let original = b"the quick brown fox jumps over the lazy dog";
        let compressed = compress(original).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original.as_slice());
    }

    #[test]
    fn test_roundtrip_empty() {
        let compressed = compress(b"").unwrap();
        assert!(compressed.is_empty());
        let decompressed = decompress(&compressed).unwrap();
        assert!(decompressed.is_empty());
    }
}
