//! zjump encoder.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use crate::block::{BlockWriter, ZjumpBlock};
use crate::huffman::{HuffmanEncoding, HuffmanFrequencyBuilder};
use crate::jst::{self, JumpToken};
use crate::{
    END_OF_SEQUENCE_SYMBOL, MAX_COMPRESSED_BLOCK_SIZE, MAX_ENCODING_BIT_LENGTH,
    MAX_ENCODING_SYMBOLS, MAX_EXPANDED_BLOCK_SIZE, MAX_JUMP_SIZE, MIN_JUMP_SIZE, MIN_JUMP_SYMBOL,
    SHRINK_STREAM_SYMBOL, SKIP_CHUNK_SYMBOL, bwt, read_full, rle,
};
use zjump_core::{Result, ZjumpError};

/// Map the raw jump stream onto the 256-symbol alphabet.
///
/// A jump beyond [`MAX_JUMP_SIZE`] becomes a row of SKIP-CHUNK symbols
/// followed by the symbol of its remainder; a jump of one is emitted as the
/// value 1, which the RLE-1 stage collapses.
fn encode_jseq_stream(tokens: &[JumpToken]) -> Vec<u16> {
    let mut out = Vec::with_capacity(tokens.len());

    for token in tokens {
        match *token {
            JumpToken::Jump(jump) => {
                let max_jump = MAX_JUMP_SIZE as u32;
                let skips = (jump - 1) / max_jump;
                let remainder = (jump - skips * max_jump) as u16;
                for _ in 0..skips {
                    out.push(SKIP_CHUNK_SYMBOL);
                }
                if remainder >= MIN_JUMP_SIZE {
                    out.push(MIN_JUMP_SYMBOL + (remainder - MIN_JUMP_SIZE));
                } else {
                    out.push(remainder);
                }
            }
            JumpToken::EndOfSequence => out.push(END_OF_SEQUENCE_SYMBOL),
            JumpToken::ShrinkStream => out.push(SHRINK_STREAM_SYMBOL),
        }
    }

    out
}

/// Compresses single blocks.
///
/// The block state is reused across calls, so one compressor can process a
/// whole stream block by block.
#[derive(Debug, Default)]
pub struct BlockCompressor {
    block: ZjumpBlock,
}

impl BlockCompressor {
    /// Create a block compressor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress `input` into `out`, returning the payload size in bytes.
    ///
    /// `input` must hold between 1 and [`MAX_EXPANDED_BLOCK_SIZE`] bytes.
    /// `out` is normally [`MAX_COMPRESSED_BLOCK_SIZE`] bytes; a payload
    /// outgrowing it fails with [`ZjumpError::BitWriter`].
    pub fn compress(&mut self, input: &[u8], out: &mut [u8]) -> Result<usize> {
        assert!(!input.is_empty());
        assert!(input.len() <= MAX_EXPANDED_BLOCK_SIZE);

        self.block.clear();

        let (bwt_data, primary_index) = bwt::transform(input);
        self.block.bwt_primary_index = primary_index;

        let transformed = jst::forward(&bwt_data);
        self.block.num_jseqs = transformed.literals.len() as u16;
        self.block.jseq_literals = transformed.literals;
        self.block.padding_literals = transformed.padding;

        let symbols = encode_jseq_stream(&transformed.tokens);
        self.block.jseq_stream = rle::rle1_encode(&symbols);
        self.block.huff_encoding = Some(self.build_encoding()?);

        BlockWriter::new(&self.block).write(out)
    }

    fn build_encoding(&self) -> Result<HuffmanEncoding> {
        let mut builder =
            HuffmanFrequencyBuilder::new(MAX_ENCODING_SYMBOLS, MAX_ENCODING_BIT_LENGTH);
        for &symbol in &self.block.jseq_stream {
            builder.add_frequency(symbol, 1);
        }
        builder.build()
    }
}

/// Compress `input` into `output`.
///
/// The output starts with a 16-bit little-endian block count that is only
/// known at the end, hence the `Seek` bound: the field is reserved with the
/// first block and back-patched once the input is exhausted. Empty input
/// writes nothing at all.
pub fn compress_stream<R: Read, W: Write + Seek>(input: &mut R, output: &mut W) -> Result<()> {
    let mut block_compressor = BlockCompressor::new();
    let mut in_buf = vec![0u8; MAX_EXPANDED_BLOCK_SIZE];
    let mut out_buf = vec![0u8; MAX_COMPRESSED_BLOCK_SIZE];
    let mut num_blocks: u16 = 0;
    let mut count_field_pos = None;

    loop {
        let in_size = read_full(input, &mut in_buf)?;
        if in_size == 0 {
            break;
        }
        if num_blocks == u16::MAX {
            return Err(ZjumpError::NumBlocks { count: num_blocks });
        }

        let out_size = block_compressor.compress(&in_buf[..in_size], &mut out_buf)?;

        if count_field_pos.is_none() {
            count_field_pos = Some(output.stream_position()?);
            output.write_all(&[0, 0])?;
        }
        let length_field = (out_size as u32).to_le_bytes();
        output.write_all(&length_field[..3])?;
        output.write_all(&out_buf[..out_size])?;
        num_blocks += 1;

        if in_size < MAX_EXPANDED_BLOCK_SIZE {
            break;
        }
    }

    if let Some(pos) = count_field_pos {
        let end = output.stream_position()?;
        output.seek(SeekFrom::Start(pos))?;
        output.write_all(&num_blocks.to_le_bytes())?;
        output.seek(SeekFrom::Start(end))?;
    }
    output.flush()?;

    Ok(())
}

/// Compress a byte slice into a fresh buffer.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut input = data;
    let mut output = Cursor::new(Vec::new());
    compress_stream(&mut input, &mut output)?;
    Ok(output.into_inner())
}
