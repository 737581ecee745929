//! The bit-packed block container.
//!
//! A block payload carries, in order: the BWT primary index, the
//! serialized Huffman tree, the padding literals behind a 24-bit count,
//! the jump-sequence count and literals, and finally the Huffman-coded
//! symbol stream. Symbol codes are written bit-reversed so the decoder can
//! accumulate them one bit at a time with left-shift-and-or.

use std::collections::HashMap;

use crate::huffman::{HuffmanEncoding, HuffmanReader, HuffmanWriter};
use crate::{
    END_OF_SEQUENCE_SYMBOL, MAX_ENCODING_BIT_LENGTH, MAX_ENCODING_SYMBOLS,
    MAX_EXPANDED_BLOCK_SIZE, MAX_NUM_JSEQUENCES,
};
use zjump_core::{BitStreamReader, BitStreamWriter, Result, ZjumpError};

const BWT_PRIMARY_INDEX_FIELD_BITS: u8 = 24;
const NUM_LITERALS_FIELD_BITS: u8 = 24;
const NUM_JSEQS_FIELD_BITS: u8 = 16;

/// Per-block intermediate state shared by the compress and decompress
/// pipelines. Never serialized as a whole; [`BlockWriter`] and
/// [`BlockReader`] map it onto the container format field by field.
#[derive(Debug, Default)]
pub struct ZjumpBlock {
    /// Primary index returned by the forward BWT.
    pub bwt_primary_index: u32,
    /// The block's Huffman code, built while compressing or read back
    /// while decompressing.
    pub huff_encoding: Option<HuffmanEncoding>,
    /// Number of jump sequences.
    pub num_jseqs: u16,
    /// Symbol stream over the JST alphabet.
    pub jseq_stream: Vec<u16>,
    /// One literal byte per jump sequence.
    pub jseq_literals: Vec<u8>,
    /// Stream residue no pass claimed.
    pub padding_literals: Vec<u8>,
}

impl ZjumpBlock {
    /// Create an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the block for reuse.
    pub fn clear(&mut self) {
        self.bwt_primary_index = 0;
        self.huff_encoding = None;
        self.num_jseqs = 0;
        self.jseq_stream.clear();
        self.jseq_literals.clear();
        self.padding_literals.clear();
    }
}

fn reverse_bits(bits: u16, num_bits: u8) -> u16 {
    let mut forward = bits;
    let mut reversed = 0;
    for _ in 0..num_bits {
        reversed = (reversed << 1) | (forward & 1);
        forward >>= 1;
    }
    reversed
}

/// Serializes a [`ZjumpBlock`] into a byte buffer.
pub struct BlockWriter<'a> {
    block: &'a ZjumpBlock,
}

impl<'a> BlockWriter<'a> {
    /// Create a writer for `block`.
    pub fn new(block: &'a ZjumpBlock) -> Self {
        Self { block }
    }

    /// Write the block into `out` and return the payload size in bytes.
    ///
    /// Fails with [`ZjumpError::BitWriter`] when `out` cannot hold the
    /// payload.
    pub fn write(&self, out: &mut [u8]) -> Result<usize> {
        out.fill(0);
        let mut writer = BitStreamWriter::new(out);

        self.write_bwt_metadata(&mut writer)?;
        self.write_huffman_tree(&mut writer)?;
        self.write_padding_literals(&mut writer)?;
        self.write_jump_sequences(&mut writer)?;

        Ok(writer.size_in_bytes())
    }

    fn encoding(&self) -> Result<&HuffmanEncoding> {
        self.block
            .huff_encoding
            .as_ref()
            .ok_or_else(|| ZjumpError::unexpected("block is missing its Huffman encoding"))
    }

    fn write_bwt_metadata(&self, writer: &mut BitStreamWriter<'_>) -> Result<()> {
        writer.try_append(
            self.block.bwt_primary_index as u64,
            BWT_PRIMARY_INDEX_FIELD_BITS,
        )
    }

    fn write_huffman_tree(&self, writer: &mut BitStreamWriter<'_>) -> Result<()> {
        HuffmanWriter::new(self.encoding()?).write(writer)
    }

    fn write_padding_literals(&self, writer: &mut BitStreamWriter<'_>) -> Result<()> {
        writer.try_append(
            self.block.padding_literals.len() as u64,
            NUM_LITERALS_FIELD_BITS,
        )?;
        for &literal in &self.block.padding_literals {
            writer.try_append(literal as u64, 8)?;
        }
        Ok(())
    }

    fn write_jump_sequences(&self, writer: &mut BitStreamWriter<'_>) -> Result<()> {
        let encoding = self.encoding()?;

        writer.try_append(self.block.num_jseqs as u64, NUM_JSEQS_FIELD_BITS)?;
        for &literal in &self.block.jseq_literals {
            writer.try_append(literal as u64, 8)?;
        }

        for &symbol in &self.block.jseq_stream {
            let enc = encoding.get(symbol).ok_or_else(|| {
                ZjumpError::unexpected(format!("symbol {symbol} has no Huffman code"))
            })?;
            let reversed = reverse_bits(enc.value, enc.bit_length);
            writer.try_append(reversed as u64, enc.bit_length)?;
        }

        Ok(())
    }
}

/// Deserializes a block payload into a [`ZjumpBlock`].
pub struct BlockReader<'a> {
    stream: &'a [u8],
}

impl<'a> BlockReader<'a> {
    /// Create a reader over a block payload.
    pub fn new(stream: &'a [u8]) -> Self {
        debug_assert!(!stream.is_empty());
        Self { stream }
    }

    /// Read the payload into `block`.
    pub fn read(&self, block: &mut ZjumpBlock) -> Result<()> {
        block.clear();
        let mut reader = BitStreamReader::new(self.stream);

        Self::read_bwt_metadata(&mut reader, block)?;
        Self::read_huffman_tree(&mut reader, block)?;
        Self::read_padding_literals(&mut reader, block)?;
        Self::read_jump_sequences(&mut reader, block)?;

        Ok(())
    }

    fn read_bwt_metadata(reader: &mut BitStreamReader<'_>, block: &mut ZjumpBlock) -> Result<()> {
        let index = reader.try_read_next(BWT_PRIMARY_INDEX_FIELD_BITS)? as u32;
        if index as usize > MAX_EXPANDED_BLOCK_SIZE {
            return Err(ZjumpError::BwtPrimaryIndex { index });
        }
        block.bwt_primary_index = index;
        Ok(())
    }

    fn read_huffman_tree(reader: &mut BitStreamReader<'_>, block: &mut ZjumpBlock) -> Result<()> {
        let huff_reader = HuffmanReader::new(MAX_ENCODING_SYMBOLS, MAX_ENCODING_BIT_LENGTH);
        block.huff_encoding = Some(huff_reader.read(reader)?);
        Ok(())
    }

    fn read_padding_literals(
        reader: &mut BitStreamReader<'_>,
        block: &mut ZjumpBlock,
    ) -> Result<()> {
        let length = reader.try_read_next(NUM_LITERALS_FIELD_BITS)? as usize;
        if length > MAX_EXPANDED_BLOCK_SIZE {
            return Err(ZjumpError::LiteralsLength { length });
        }

        block.padding_literals.reserve(length);
        for _ in 0..length {
            block.padding_literals.push(reader.try_read_next(8)? as u8);
        }
        Ok(())
    }

    fn read_jump_sequences(reader: &mut BitStreamReader<'_>, block: &mut ZjumpBlock) -> Result<()> {
        let count = reader.try_read_next(NUM_JSEQS_FIELD_BITS)? as u16;
        if count as usize > MAX_NUM_JSEQUENCES {
            return Err(ZjumpError::NumJseqs { count });
        }
        block.num_jseqs = count;

        block.jseq_literals.reserve(count as usize);
        for _ in 0..count {
            block.jseq_literals.push(reader.try_read_next(8)? as u8);
        }

        Self::read_jseq_stream(reader, block)
    }

    fn read_jseq_stream(reader: &mut BitStreamReader<'_>, block: &mut ZjumpBlock) -> Result<()> {
        let encoding = block
            .huff_encoding
            .as_ref()
            .ok_or_else(|| ZjumpError::unexpected("block is missing its Huffman encoding"))?;

        // (bit_length, accumulated value) -> symbol
        let mut codes: HashMap<u32, u16> = HashMap::new();
        for symbol in 0..encoding.max_symbols() {
            if let Some(enc) = encoding.get(symbol) {
                codes.insert(enc.bit_length as u32 | ((enc.value as u32) << 8), symbol);
            }
        }

        for _ in 0..block.num_jseqs {
            loop {
                let symbol = Self::read_encoded_symbol(reader, &codes)?;
                block.jseq_stream.push(symbol);
                if symbol == END_OF_SEQUENCE_SYMBOL {
                    break;
                }
            }
        }

        Ok(())
    }

    fn read_encoded_symbol(
        reader: &mut BitStreamReader<'_>,
        codes: &HashMap<u32, u16>,
    ) -> Result<u16> {
        let mut value = 0u16;
        let mut bit_length = 0u8;

        while bit_length < MAX_ENCODING_BIT_LENGTH {
            let bit = reader.try_read_next(1)?;
            value = (value << 1) | bit as u16;
            bit_length += 1;

            if let Some(&symbol) = codes.get(&(bit_length as u32 | ((value as u32) << 8))) {
                return Ok(symbol);
            }
        }

        Err(ZjumpError::EncodedSymbol {
            bit_position: reader.next_pos(),
        })
    }
}
