//! Length-limited canonical Huffman coding.
//!
//! The encoder builds a Huffman tree over symbol frequencies, limits every
//! code to a maximum bit length by rebalancing the Kraft budget, and
//! assigns canonical code values from the sorted `(length, symbol)` order.
//! Because the codes are canonical, only the bit lengths travel in the
//! block; [`HuffmanWriter`] and [`HuffmanReader`] serialize them together
//! with one of four symbol-presence layouts, whichever is smallest for the
//! tree at hand.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use zjump_core::{BitStreamReader, BitStreamWriter, Result, ZjumpError};

/// One symbol of a Huffman encoding.
///
/// A `bit_length` of zero means the symbol is absent from the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedSymbol {
    /// The source symbol.
    pub symbol: u16,
    /// Code length in bits; zero for an absent symbol.
    pub bit_length: u8,
    /// Canonical code value.
    pub value: u16,
}

impl EncodedSymbol {
    fn absent(symbol: u16) -> Self {
        Self {
            symbol,
            bit_length: 0,
            value: 0,
        }
    }
}

/// A dense symbol-to-code mapping.
#[derive(Debug, Clone)]
pub struct HuffmanEncoding {
    max_symbols: u16,
    max_bit_length: u8,
    symbols: Vec<EncodedSymbol>,
}

impl HuffmanEncoding {
    fn new(max_symbols: u16, max_bit_length: u8) -> Self {
        Self {
            max_symbols,
            max_bit_length,
            symbols: (0..max_symbols).map(EncodedSymbol::absent).collect(),
        }
    }

    fn set_encoded_symbols(&mut self, enc_symbols: &[EncodedSymbol]) {
        for enc in enc_symbols {
            debug_assert!(enc.symbol < self.max_symbols);
            debug_assert!(enc.bit_length <= self.max_bit_length);
            self.symbols[enc.symbol as usize] = *enc;
        }
    }

    /// Look up the code of a symbol; `None` when the symbol is absent.
    pub fn get(&self, symbol: u16) -> Option<&EncodedSymbol> {
        assert!(symbol < self.max_symbols);
        let enc = &self.symbols[symbol as usize];
        if enc.bit_length == 0 { None } else { Some(enc) }
    }

    /// Size of the alphabet this encoding covers.
    pub fn max_symbols(&self) -> u16 {
        self.max_symbols
    }

    /// Maximum code length of this encoding.
    pub fn max_bit_length(&self) -> u8 {
        self.max_bit_length
    }
}

struct TreeNode {
    count: u64,
    left: Option<usize>,
    right: Option<usize>,
}

/// Build the tree arena over the present symbols and return per-leaf
/// depths. Leaves occupy the first `num_symbols` slots; merged nodes are
/// appended after them, so children always precede their parent and a
/// single reverse scan assigns every depth.
fn tree_depths(freqs: &[u64]) -> Vec<u8> {
    let num_symbols = freqs.len();
    let mut nodes: Vec<TreeNode> = freqs
        .iter()
        .map(|&count| TreeNode {
            count,
            left: None,
            right: None,
        })
        .collect();

    let mut queue: BinaryHeap<Reverse<(u64, usize)>> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| Reverse((node.count, i)))
        .collect();

    while queue.len() > 1 {
        let Reverse((count1, node1)) = queue.pop().expect("queue holds at least two nodes");
        let Reverse((count2, node2)) = queue.pop().expect("queue holds at least two nodes");
        let merged = nodes.len();
        nodes.push(TreeNode {
            count: count1 + count2,
            left: Some(node1),
            right: Some(node2),
        });
        queue.push(Reverse((count1 + count2, merged)));
    }

    let mut depths = vec![0u8; nodes.len()];
    for i in (0..nodes.len()).rev() {
        if let Some(left) = nodes[i].left {
            depths[left] = depths[i] + 1;
        }
        if let Some(right) = nodes[i].right {
            depths[right] = depths[i] + 1;
        }
    }

    depths.truncate(num_symbols);
    depths
}

/// Rebalance bit lengths so every code fits `max_bit_length`.
///
/// Clamping overruns the Kraft budget; the budget is paid back by
/// repeatedly lengthening the shortest code with room, which frees the
/// most Kraft weight per step. `enc_symbols` is ordered by descending
/// frequency, so slack is then reclaimed from the least frequent end.
fn limit_bit_lengths(enc_symbols: &mut [EncodedSymbol], max_bit_length: u8) -> Result<()> {
    let budget = 1u32 << max_bit_length;
    let mut kraft = 0u32;

    for enc in enc_symbols.iter_mut() {
        if enc.bit_length > max_bit_length {
            enc.bit_length = max_bit_length;
        }
        kraft += 1 << (max_bit_length - enc.bit_length);
    }

    while kraft > budget {
        let Some(enc) = enc_symbols
            .iter_mut()
            .filter(|enc| enc.bit_length < max_bit_length)
            .min_by_key(|enc| enc.bit_length)
        else {
            break;
        };
        enc.bit_length += 1;
        kraft -= 1 << (max_bit_length - enc.bit_length);
    }

    for enc in enc_symbols.iter_mut().rev() {
        if enc.bit_length == 1 {
            continue;
        }
        let gain = 1u32 << (max_bit_length - enc.bit_length);
        if kraft + gain > budget {
            break;
        }
        kraft += gain;
        enc.bit_length -= 1;
    }

    if kraft > budget {
        return Err(ZjumpError::huffman(format!(
            "cannot fit {} symbols within {max_bit_length} bits",
            enc_symbols.len()
        )));
    }

    Ok(())
}

/// Assign canonical code values.
///
/// Symbols of equal length must arrive in ascending symbol order; lengths
/// themselves may arrive in any order since each length has its own
/// `next_code` counter.
fn assign_code_values(enc_symbols: &mut [EncodedSymbol], max_bit_length: u8) {
    let mut bl_count = vec![0u32; max_bit_length as usize + 1];
    for enc in enc_symbols.iter() {
        bl_count[enc.bit_length as usize] += 1;
    }

    let mut next_code = vec![0u32; max_bit_length as usize + 1];
    let mut code = 0u32;
    bl_count[0] = 0;
    for length in 1..=max_bit_length as usize {
        code = (code + bl_count[length - 1]) << 1;
        next_code[length] = code;
    }

    for enc in enc_symbols.iter_mut() {
        enc.value = next_code[enc.bit_length as usize] as u16;
        next_code[enc.bit_length as usize] += 1;
    }
}

fn kraft_sum(lengths: impl Iterator<Item = u8>, max_bit_length: u8) -> u32 {
    lengths.map(|len| 1u32 << (max_bit_length - len)).sum()
}

/// Builds an encoding from symbol frequencies.
pub struct HuffmanFrequencyBuilder {
    max_symbols: u16,
    max_bit_length: u8,
    freqs: Vec<u32>,
}

impl HuffmanFrequencyBuilder {
    /// Create a builder for an alphabet of `max_symbols` symbols and codes
    /// of at most `max_bit_length` bits.
    pub fn new(max_symbols: u16, max_bit_length: u8) -> Self {
        Self {
            max_symbols,
            max_bit_length,
            freqs: vec![0; max_symbols as usize],
        }
    }

    /// Set the frequency of a symbol.
    pub fn set_frequency(&mut self, symbol: u16, freq: u32) {
        assert!(symbol < self.max_symbols);
        self.freqs[symbol as usize] = freq;
    }

    /// Add to the frequency of a symbol.
    pub fn add_frequency(&mut self, symbol: u16, freq: u32) {
        assert!(symbol < self.max_symbols);
        self.freqs[symbol as usize] += freq;
    }

    /// Build the length-limited canonical encoding.
    ///
    /// Symbols with zero frequency are absent from the result. An empty
    /// frequency set yields an encoding with no symbols.
    pub fn build(self) -> Result<HuffmanEncoding> {
        let mut encoding = HuffmanEncoding::new(self.max_symbols, self.max_bit_length);

        // Descending frequency, so the length-limit scans see the shortest
        // codes first; ties resolve by symbol for determinism.
        let mut present: Vec<(u16, u32)> = self
            .freqs
            .iter()
            .enumerate()
            .filter(|&(_, &freq)| freq > 0)
            .map(|(symbol, &freq)| (symbol as u16, freq))
            .collect();
        if present.is_empty() {
            return Ok(encoding);
        }
        present.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut enc_symbols: Vec<EncodedSymbol> = present
            .iter()
            .map(|&(symbol, _)| EncodedSymbol::absent(symbol))
            .collect();

        if present.len() == 1 {
            enc_symbols[0].bit_length = 1;
        } else {
            let freqs: Vec<u64> = present.iter().map(|&(_, freq)| freq as u64).collect();
            let depths = tree_depths(&freqs);
            for (enc, depth) in enc_symbols.iter_mut().zip(depths) {
                enc.bit_length = depth;
            }
        }

        limit_bit_lengths(&mut enc_symbols, self.max_bit_length)?;

        enc_symbols.sort_by(|a, b| {
            a.bit_length
                .cmp(&b.bit_length)
                .then(a.symbol.cmp(&b.symbol))
        });
        assign_code_values(&mut enc_symbols, self.max_bit_length);

        encoding.set_encoded_symbols(&enc_symbols);
        Ok(encoding)
    }
}

/// Builds an encoding from explicit bit lengths, used when deserializing.
pub struct HuffmanBitLengthBuilder {
    max_symbols: u16,
    max_bit_length: u8,
    bit_lengths: Vec<u8>,
}

impl HuffmanBitLengthBuilder {
    /// Create a builder for an alphabet of `max_symbols` symbols and codes
    /// of at most `max_bit_length` bits.
    pub fn new(max_symbols: u16, max_bit_length: u8) -> Self {
        Self {
            max_symbols,
            max_bit_length,
            bit_lengths: vec![0; max_symbols as usize],
        }
    }

    /// Set the bit length of a symbol.
    pub fn set_bit_length(&mut self, symbol: u16, bit_length: u8) {
        assert!(symbol < self.max_symbols);
        assert!(bit_length <= self.max_bit_length);
        self.bit_lengths[symbol as usize] = bit_length;
    }

    /// Assign canonical code values to the declared lengths.
    ///
    /// Fails with a Huffman error when the lengths over-subscribe the code
    /// space, which would make the stream undecodable.
    pub fn build(self) -> Result<HuffmanEncoding> {
        let mut encoding = HuffmanEncoding::new(self.max_symbols, self.max_bit_length);

        // Ascending symbol order keeps equal-length code values canonical.
        let mut enc_symbols: Vec<EncodedSymbol> = self
            .bit_lengths
            .iter()
            .enumerate()
            .filter(|&(_, &len)| len > 0)
            .map(|(symbol, &len)| EncodedSymbol {
                symbol: symbol as u16,
                bit_length: len,
                value: 0,
            })
            .collect();
        if enc_symbols.is_empty() {
            return Ok(encoding);
        }

        let kraft = kraft_sum(
            enc_symbols.iter().map(|enc| enc.bit_length),
            self.max_bit_length,
        );
        if kraft > 1u32 << self.max_bit_length {
            return Err(ZjumpError::huffman("over-subscribed code lengths"));
        }

        assign_code_values(&mut enc_symbols, self.max_bit_length);
        encoding.set_encoded_symbols(&enc_symbols);
        Ok(encoding)
    }
}

/// Number of bits used for one serialized bit-length field.
fn bit_length_field_width(max_bit_length: u8) -> u8 {
    (u8::BITS - max_bit_length.leading_zeros()) as u8
}

const PRESENCE_RANGE_SIZES: [usize; 3] = [8, 16, 32];

/// Serializes a [`HuffmanEncoding`] onto a bit stream.
///
/// Four symbol-presence layouts are evaluated: one flag per symbol over the
/// whole alphabet (type 0), or a two-level scheme with range flags over
/// ranges of 8, 16 or 32 symbols (types 1 to 3). The exact bit count of
/// each is computed and the smallest wins.
pub struct HuffmanWriter<'a> {
    encoding: &'a HuffmanEncoding,
}

impl<'a> HuffmanWriter<'a> {
    /// Create a writer for `encoding`.
    pub fn new(encoding: &'a HuffmanEncoding) -> Self {
        Self { encoding }
    }

    /// Write the encoded tree representation.
    pub fn write(&self, writer: &mut BitStreamWriter<'_>) -> Result<()> {
        let max_symbols = self.encoding.max_symbols() as usize;

        // prefix[s] = number of present symbols below s
        let mut prefix = vec![0usize; max_symbols + 1];
        for symbol in 0..max_symbols {
            prefix[symbol + 1] =
                prefix[symbol] + self.encoding.get(symbol as u16).is_some() as usize;
        }

        let encoding_type = Self::select_encoding_type(&prefix, max_symbols);
        writer.try_append(encoding_type as u64, 2)?;

        if encoding_type == 0 {
            for symbol in 0..max_symbols {
                let present = prefix[symbol + 1] > prefix[symbol];
                writer.try_append(present as u64, 1)?;
            }
        } else {
            let range_size = PRESENCE_RANGE_SIZES[encoding_type as usize - 1];
            let num_ranges = max_symbols.div_ceil(range_size);

            for range in 0..num_ranges {
                let start = range * range_size;
                let end = (start + range_size).min(max_symbols);
                writer.try_append((prefix[end] > prefix[start]) as u64, 1)?;
            }

            for range in 0..num_ranges {
                let start = range * range_size;
                let end = (start + range_size).min(max_symbols);
                if prefix[end] == prefix[start] {
                    continue;
                }
                for symbol in start..end {
                    let present = prefix[symbol + 1] > prefix[symbol];
                    writer.try_append(present as u64, 1)?;
                }
            }
        }

        let field_width = bit_length_field_width(self.encoding.max_bit_length());
        for symbol in 0..max_symbols {
            if let Some(enc) = self.encoding.get(symbol as u16) {
                writer.try_append(enc.bit_length as u64, field_width)?;
            }
        }

        Ok(())
    }

    fn select_encoding_type(prefix: &[usize], max_symbols: usize) -> u8 {
        let mut best_type = 0u8;
        let mut best_cost = max_symbols;

        for (i, &range_size) in PRESENCE_RANGE_SIZES.iter().enumerate() {
            let num_ranges = max_symbols.div_ceil(range_size);
            let mut cost = num_ranges;
            for range in 0..num_ranges {
                let start = range * range_size;
                let end = (start + range_size).min(max_symbols);
                if prefix[end] > prefix[start] {
                    cost += end - start;
                }
            }
            if cost < best_cost {
                best_cost = cost;
                best_type = i as u8 + 1;
            }
        }

        best_type
    }
}

/// Reads a serialized tree back into a [`HuffmanEncoding`].
pub struct HuffmanReader {
    max_symbols: u16,
    max_bit_length: u8,
}

impl HuffmanReader {
    /// Create a reader expecting an alphabet of `max_symbols` symbols and
    /// codes of at most `max_bit_length` bits.
    pub fn new(max_symbols: u16, max_bit_length: u8) -> Self {
        Self {
            max_symbols,
            max_bit_length,
        }
    }

    /// Read the tree at the reader's cursor and rebuild the encoding.
    pub fn read(&self, reader: &mut BitStreamReader<'_>) -> Result<HuffmanEncoding> {
        let max_symbols = self.max_symbols as usize;
        let encoding_type = reader.try_read_next(2)? as u8;

        let mut present = vec![false; max_symbols];
        if encoding_type == 0 {
            for slot in present.iter_mut() {
                *slot = reader.try_read_next(1)? == 1;
            }
        } else {
            let range_size = PRESENCE_RANGE_SIZES[encoding_type as usize - 1];
            let num_ranges = max_symbols.div_ceil(range_size);

            let mut range_flags = vec![false; num_ranges];
            for flag in range_flags.iter_mut() {
                *flag = reader.try_read_next(1)? == 1;
            }

            for (range, &flag) in range_flags.iter().enumerate() {
                if !flag {
                    continue;
                }
                let start = range * range_size;
                let end = (start + range_size).min(max_symbols);
                for slot in present.iter_mut().take(end).skip(start) {
                    *slot = reader.try_read_next(1)? == 1;
                }
            }
        }

        let field_width = bit_length_field_width(self.max_bit_length);
        let mut builder = HuffmanBitLengthBuilder::new(self.max_symbols, self.max_bit_length);
        for (symbol, &is_present) in present.iter().enumerate() {
            if !is_present {
                continue;
            }
            let bit_length = reader.try_read_next(field_width)? as u8;
            if bit_length == 0 || bit_length > self.max_bit_length {
                return Err(ZjumpError::HuffmanBitLength {
                    symbol: symbol as u16,
                });
            }
            builder.set_bit_length(symbol as u16, bit_length);
        }

        builder.build()
    }
}
