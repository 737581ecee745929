//! Burrows-Wheeler Transform for zjump blocks.
//!
//! The forward transform permutes a block so that equal bytes cluster,
//! which is what makes the jump-sequence passes profitable. Rotations are
//! ordered by prefix doubling: ranks over the first `k` bytes are combined
//! pairwise into ranks over the first `2k`, so a block is fully ordered
//! after at most `log2(n)` rounds even when it is one long repetition.
//! The contract mirrors a suffix-array BWT library: the forward side
//! returns the primary index needed for inversion, the inverse side
//! validates it.

use zjump_core::{Result, ZjumpError};

/// Perform the Burrows-Wheeler Transform.
///
/// Returns the transformed block and the primary index (the row of the
/// original string among the sorted rotations).
pub fn transform(data: &[u8]) -> (Vec<u8>, u32) {
    if data.is_empty() {
        return (Vec::new(), 0);
    }

    let n = data.len();

    // rank[i] orders rotation i by its first k bytes; single bytes seed
    // the first round.
    let mut rank: Vec<u32> = data.iter().map(|&byte| byte as u32).collect();
    let mut next_rank = vec![0u32; n];
    let mut order: Vec<usize> = (0..n).collect();

    let mut k = 1;
    loop {
        // The rank pair (first k bytes, next k bytes) orders a rotation by
        // its first 2k bytes.
        let pair = |i: usize| (rank[i], rank[(i + k) % n]);
        order.sort_unstable_by_key(|&i| pair(i));

        next_rank[order[0]] = 0;
        for w in 1..n {
            let stepped = (pair(order[w]) != pair(order[w - 1])) as u32;
            next_rank[order[w]] = next_rank[order[w - 1]] + stepped;
        }
        std::mem::swap(&mut rank, &mut next_rank);

        // All rotations distinct, or the window already spans the block
        // (identical rotations stay tied forever).
        if rank[order[n - 1]] as usize == n - 1 || 2 * k >= n {
            break;
        }
        k *= 2;
    }

    let primary_index = order
        .iter()
        .position(|&i| i == 0)
        .expect("rotation 0 is always ranked") as u32;

    let transformed: Vec<u8> = order.iter().map(|&i| data[(i + n - 1) % n]).collect();

    (transformed, primary_index)
}

/// Perform the inverse Burrows-Wheeler Transform.
///
/// Walks the last-to-first column mapping backwards from the primary row,
/// emitting the block from its final byte to its first. Fails with a BWT
/// error when `primary_index` does not address a row of the transformed
/// block.
pub fn inverse_transform(data: &[u8], primary_index: u32) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let n = data.len();
    if primary_index as usize >= n {
        return Err(ZjumpError::bwt(format!(
            "primary index {primary_index} out of range for a {n}-byte block"
        )));
    }

    // first[b] = row where byte b's run begins in the sorted first column.
    let mut counts = [0u32; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }
    let mut first = [0u32; 256];
    let mut sum = 0;
    for (slot, &count) in first.iter_mut().zip(counts.iter()) {
        *slot = sum;
        sum += count;
    }

    // lf[i] = row of the rotation one step earlier in the cycle: the j-th
    // occurrence of a byte in the last column is the j-th row of that
    // byte's run in the first column.
    let mut lf = vec![0u32; n];
    let mut seen = [0u32; 256];
    for (i, &byte) in data.iter().enumerate() {
        lf[i] = first[byte as usize] + seen[byte as usize];
        seen[byte as usize] += 1;
    }

    let mut out = vec![0u8; n];
    let mut row = primary_index as usize;
    for slot in out.iter_mut().rev() {
        *slot = data[row];
        row = lf[row] as usize;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(data: &[u8]) {
        let (transformed, primary_index) = transform(data);
        assert_eq!(transformed.len(), data.len());
        let recovered = inverse_transform(&transformed, primary_index).unwrap();
        assert_eq!(recovered, data, "failed for {data:?}");
    }

    #[test]
    fn test_empty() {
        let (transformed, primary_index) = transform(b"");
        assert!(transformed.is_empty());
        assert_eq!(primary_index, 0);
        assert!(inverse_transform(b"", 0).unwrap().is_empty());
    }

    #[test]
    fn test_single_byte() {
        let (transformed, primary_index) = transform(b"z");
        assert_eq!(transformed, b"z");
        assert_eq!(primary_index, 0);
        assert_eq!(inverse_transform(&transformed, 0).unwrap(), b"z");
    }

    #[test]
    fn test_known_transform() {
        // The classic example: "banana" sorts to the row order
        // abanan, anaban, ananab, banana, nabana, nanaba.
        let (transformed, primary_index) = transform(b"banana");
        assert_eq!(transformed, b"nnbaaa");
        assert_eq!(primary_index, 3);
    }

    #[test]
    fn test_identical_rotations() {
        // Every rotation ties; the prefix-doubling rounds must still stop.
        let (transformed, primary_index) = transform(b"eeeeeeee");
        assert_eq!(transformed, b"eeeeeeee");
        assert_eq!(
            inverse_transform(&transformed, primary_index).unwrap(),
            b"eeeeeeee"
        );
    }

    #[test]
    fn test_roundtrip_assorted() {
        let cases: [&[u8]; 6] = [
            b"zjump",
            b"yabba dabba doo",
            b"compressible compressible compressible",
            b"abcabcabcabcabcabc",
            b"\x00\xff\x00\xff\x01",
            b"no two bytes equal: qwertyuiopasdf",
        ];
        for data in cases {
            roundtrip(data);
        }
    }

    #[test]
    fn test_roundtrip_pseudo_random() {
        let mut data = Vec::with_capacity(2048);
        let mut seed: u64 = 0x9E3779B97F4A7C15;
        for _ in 0..2048 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        roundtrip(&data);
    }

    #[test]
    fn test_primary_index_out_of_range() {
        let (transformed, _) = transform(b"banana");
        let err = inverse_transform(&transformed, 6).unwrap_err();
        assert!(matches!(err, ZjumpError::Bwt { .. }));
    }
}
