//! zjump decoder.

use std::io::{Read, Write};

use crate::block::{BlockReader, ZjumpBlock};
use crate::jst::{self, JumpToken};
use crate::{
    END_OF_SEQUENCE_SYMBOL, MAX_COMPRESSED_BLOCK_SIZE, MAX_JUMP_SIZE, MIN_JUMP_SIZE,
    MIN_JUMP_SYMBOL, RUNA_SYMBOL, SHRINK_STREAM_SYMBOL, SKIP_CHUNK_SYMBOL, bwt, read_full, rle,
};
use zjump_core::{Result, ZjumpError};

/// Map alphabet symbols back to the raw jump stream, folding SKIP-CHUNK
/// runs into the jump that follows them.
fn decode_jseq_stream(symbols: &[u16]) -> Result<Vec<JumpToken>> {
    let mut out = Vec::with_capacity(symbols.len());
    let mut pending: u32 = 0;

    for &symbol in symbols {
        match symbol {
            SKIP_CHUNK_SYMBOL => pending += MAX_JUMP_SIZE as u32,
            END_OF_SEQUENCE_SYMBOL | SHRINK_STREAM_SYMBOL => {
                if pending != 0 {
                    return Err(ZjumpError::reconstructing_stream(
                        "skip chunk without a following jump",
                    ));
                }
                out.push(if symbol == END_OF_SEQUENCE_SYMBOL {
                    JumpToken::EndOfSequence
                } else {
                    JumpToken::ShrinkStream
                });
            }
            symbol if symbol >= MIN_JUMP_SYMBOL => {
                let jump = pending + (MIN_JUMP_SIZE + (symbol - MIN_JUMP_SYMBOL)) as u32;
                out.push(JumpToken::Jump(jump));
                pending = 0;
            }
            1 => {
                out.push(JumpToken::Jump(pending + 1));
                pending = 0;
            }
            _ => {
                debug_assert_eq!(symbol, RUNA_SYMBOL);
                // Run digits are expanded before this stage runs.
                return Err(ZjumpError::unexpected(
                    "run symbol left in the expanded jump stream",
                ));
            }
        }
    }

    if pending != 0 {
        return Err(ZjumpError::reconstructing_stream(
            "skip chunk without a following jump",
        ));
    }
    Ok(out)
}

/// Decompresses single blocks.
#[derive(Debug, Default)]
pub struct BlockDecompressor {
    block: ZjumpBlock,
}

impl BlockDecompressor {
    /// Create a block decompressor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompress one block payload.
    ///
    /// `input` must hold between 1 and [`MAX_COMPRESSED_BLOCK_SIZE`] bytes.
    pub fn decompress(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        assert!(!input.is_empty());
        assert!(input.len() <= MAX_COMPRESSED_BLOCK_SIZE);

        BlockReader::new(input).read(&mut self.block)?;

        let symbols = rle::rle1_decode(&self.block.jseq_stream, MAX_COMPRESSED_BLOCK_SIZE)?;
        let tokens = decode_jseq_stream(&symbols)?;
        let data = jst::inverse(&tokens, &self.block.jseq_literals, &self.block.padding_literals)?;

        bwt::inverse_transform(&data, self.block.bwt_primary_index)
    }
}

/// Decompress `input` into `output`.
///
/// The stream must contain exactly the declared number of blocks and
/// nothing after them. An entirely empty input is the compression of empty
/// input and yields empty output.
pub fn decompress_stream<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    let mut count_field = [0u8; 2];
    let got = read_full(input, &mut count_field)?;
    if got == 0 {
        return Ok(());
    }
    if got < count_field.len() {
        return Err(ZjumpError::StreamTooShort);
    }

    let num_blocks = u16::from_le_bytes(count_field);
    if num_blocks == 0 {
        return Err(ZjumpError::NumBlocks { count: 0 });
    }

    let mut block_decompressor = BlockDecompressor::new();
    let mut in_buf = vec![0u8; MAX_COMPRESSED_BLOCK_SIZE];

    for _ in 0..num_blocks {
        let mut length_field = [0u8; 3];
        if read_full(input, &mut length_field)? < length_field.len() {
            return Err(ZjumpError::StreamTooShort);
        }

        let length =
            u32::from_le_bytes([length_field[0], length_field[1], length_field[2], 0]) as usize;
        if length == 0 || length > MAX_COMPRESSED_BLOCK_SIZE {
            return Err(ZjumpError::BlockLength { length });
        }
        if read_full(input, &mut in_buf[..length])? < length {
            return Err(ZjumpError::StreamTooShort);
        }

        let data = block_decompressor.decompress(&in_buf[..length])?;
        output.write_all(&data)?;
    }

    let mut probe = [0u8; 1];
    if input.read(&mut probe)? != 0 {
        return Err(ZjumpError::StreamTooLarge);
    }
    output.flush()?;

    Ok(())
}

/// Decompress a byte slice into a fresh buffer.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut input = data;
    let mut output = Vec::new();
    decompress_stream(&mut input, &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress;

    #[test]
    fn test_decode_jseq_stream_symbols() {
        let symbols = [
            1,
            2,
            252,
            END_OF_SEQUENCE_SYMBOL,
            SHRINK_STREAM_SYMBOL,
            SKIP_CHUNK_SYMBOL,
            1,
            SKIP_CHUNK_SYMBOL,
            SKIP_CHUNK_SYMBOL,
            252,
            END_OF_SEQUENCE_SYMBOL,
        ];

        assert_eq!(
            decode_jseq_stream(&symbols).unwrap(),
            [
                JumpToken::Jump(1),
                JumpToken::Jump(2),
                JumpToken::Jump(252),
                JumpToken::EndOfSequence,
                JumpToken::ShrinkStream,
                JumpToken::Jump(253),
                JumpToken::Jump(756),
                JumpToken::EndOfSequence,
            ]
        );
    }

    #[test]
    fn test_decode_rejects_dangling_skip_chunk() {
        let symbols = [SKIP_CHUNK_SYMBOL, END_OF_SEQUENCE_SYMBOL];
        let err = decode_jseq_stream(&symbols).unwrap_err();
        assert!(matches!(err, ZjumpError::ReconstructingStream { .. }));

        let symbols = [2, SKIP_CHUNK_SYMBOL];
        let err = decode_jseq_stream(&symbols).unwrap_err();
        assert!(matches!(err, ZjumpError::ReconstructingStream { .. }));
    }

    #[test]
    fn test_decompress_empty_input() {
        assert!(decompress(b"").unwrap().is_empty());
    }

    #[test]
    fn test_decompress_rejects_zero_block_count() {
        let err = decompress(&[0, 0]).unwrap_err();
        assert!(matches!(err, ZjumpError::NumBlocks { count: 0 }));
    }

    #[test]
    fn test_decompress_rejects_truncated_count() {
        let err = decompress(&[1]).unwrap_err();
        assert!(matches!(err, ZjumpError::StreamTooShort));
    }

    #[test]
    fn test_decompress_rejects_zero_block_length() {
        let err = decompress(&[1, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, ZjumpError::BlockLength { length: 0 }));
    }

    #[test]
    fn test_decompress_rejects_trailing_data() {
        let mut data = compress(b"AAAAAAAA").unwrap();
        data.push(0x42);
        let err = decompress(&data).unwrap_err();
        assert!(matches!(err, ZjumpError::StreamTooLarge));
    }

    #[test]
    fn test_decompress_rejects_missing_blocks() {
        let mut data = compress(b"AAAAAAAA").unwrap();
        // Declare one more block than the stream holds.
        data[0] = 2;
        let err = decompress(&data).unwrap_err();
        assert!(matches!(err, ZjumpError::StreamTooShort));
    }
}
