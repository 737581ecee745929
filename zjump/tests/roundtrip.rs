//! End-to-end compression round-trip tests.

use zjump::{
    BlockReader, MAX_EXPANDED_BLOCK_SIZE, ZjumpBlock, compress, decompress, decompress_stream,
};

/// Deterministic pseudo-random bytes for multi-block inputs.
fn random_bytes(size: usize, mut seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

fn assert_roundtrip(original: &[u8]) {
    let compressed = compress(original).expect("compression failed");
    let decompressed = decompress(&compressed).expect("decompression failed");
    assert_eq!(
        decompressed,
        original,
        "roundtrip mismatch for {} bytes",
        original.len()
    );
}

#[test]
fn test_roundtrip_single_byte() {
    let compressed = compress(b"A").unwrap();
    assert!(!compressed.is_empty());
    assert_eq!(decompress(&compressed).unwrap(), b"A");
}

#[test]
fn test_roundtrip_short_strings() {
    let cases: [&[u8]; 7] = [
        b"A",
        b"AB",
        b"AAAAAAAA",
        b"banana",
        b"TOBEORNOTTOBEORTOBEORNOT",
        b"the quick brown fox jumps over the lazy dog",
        b"\x00\x01\x02\x03\x04\xfd\xfe\xff",
    ];
    for case in cases {
        assert_roundtrip(case);
    }
}

#[test]
fn test_roundtrip_repetitive_text() {
    let original = b"This is a test of compression! ".repeat(100);
    let compressed = compress(&original).unwrap();
    assert!(
        compressed.len() < original.len() / 2,
        "repetitive text should compress well: {} -> {}",
        original.len(),
        compressed.len()
    );
    assert_eq!(decompress(&compressed).unwrap(), original);
}

#[test]
fn test_roundtrip_all_byte_values() {
    let mut original = Vec::new();
    for _ in 0..16 {
        original.extend(0u8..=255);
    }
    assert_roundtrip(&original);
}

#[test]
fn test_roundtrip_random_data() {
    assert_roundtrip(&random_bytes(10_000, 0x123456789ABCDEF0));
}

#[test]
fn test_roundtrip_multi_block() {
    // Spans two blocks: one full plus a 50 000-byte remainder.
    let original = random_bytes(MAX_EXPANDED_BLOCK_SIZE + 50_000, 42);
    let compressed = compress(&original).unwrap();

    assert_eq!(u16::from_le_bytes([compressed[0], compressed[1]]), 2);
    assert_eq!(decompress(&compressed).unwrap(), original);
}

#[test]
fn test_roundtrip_block_boundary_exact() {
    let original = random_bytes(MAX_EXPANDED_BLOCK_SIZE, 7);
    let compressed = compress(&original).unwrap();

    assert_eq!(u16::from_le_bytes([compressed[0], compressed[1]]), 1);
    assert_eq!(decompress(&compressed).unwrap(), original);
}

#[test]
fn test_repeated_byte_block_uses_one_jump_sequence() {
    let compressed = compress(b"AAAAAAAA").unwrap();

    // Skip the 2-byte block count and the 3-byte block length.
    let mut block = ZjumpBlock::new();
    BlockReader::new(&compressed[5..]).read(&mut block).unwrap();

    assert_eq!(block.num_jseqs, 1);
    assert_eq!(block.jseq_literals, b"A");
    assert!(block.padding_literals.is_empty());
}

#[test]
fn test_decompress_into_writer() {
    let original = b"stream me through a writer".repeat(20);
    let compressed = compress(&original).unwrap();

    let mut input = compressed.as_slice();
    let mut output = Vec::new();
    decompress_stream(&mut input, &mut output).unwrap();
    assert_eq!(output, original);
}

#[test]
fn test_empty_roundtrip_produces_no_output() {
    let compressed = compress(b"").unwrap();
    assert!(compressed.is_empty());
    assert!(decompress(&compressed).unwrap().is_empty());
}
