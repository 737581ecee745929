//! Run-length coding of ones (RLE-1).
//!
//! The jump-sequence transform emits long runs of jumps of one whenever a
//! chosen byte repeats back to back. RLE-1 replaces every maximal run of
//! the value 1 in the symbol stream with a bijective base-2 code over the
//! two run symbols:
//!
//! - RUN-A at digit weight `w` contributes `w`
//! - RUN-B at digit weight `w` contributes `2 * w`
//!
//! with weights 1, 2, 4, ... least-significant digit first. Every positive
//! run length has exactly one such digit string, and any other symbol
//! terminates the run, so the code is prefix-free.

use crate::{RUNA_SYMBOL, RUNB_SYMBOL};
use zjump_core::{Result, ZjumpError};

fn append_run(mut length: u64, out: &mut Vec<u16>) {
    let mut run_a = 1u64;
    let mut run_b = 2u64;

    while length > 0 {
        if length % run_b == 0 {
            out.push(RUNB_SYMBOL);
            length -= run_b;
        } else {
            out.push(RUNA_SYMBOL);
            length -= run_a;
        }
        run_a = run_b;
        run_b <<= 1;
    }
}

/// Collapse every run of the value 1 into RUN-A/RUN-B digits.
pub fn rle1_encode(stream: &[u16]) -> Vec<u16> {
    let mut out = Vec::with_capacity(stream.len());
    let mut run = 0u64;

    for &symbol in stream {
        if symbol == 1 {
            run += 1;
        } else {
            if run > 0 {
                append_run(run, &mut out);
                run = 0;
            }
            out.push(symbol);
        }
    }

    if run > 0 {
        append_run(run, &mut out);
    }

    out
}

/// Expand RUN-A/RUN-B digit strings back into runs of the value 1.
///
/// `limit` bounds the expanded stream; crafted digit strings can otherwise
/// blow up exponentially. Exceeding it is reported as the stream declaring
/// more content than a block may hold.
pub fn rle1_decode(stream: &[u16], limit: usize) -> Result<Vec<u16>> {
    let mut out = Vec::with_capacity(stream.len());
    let mut i = 0;

    while i < stream.len() {
        let symbol = stream[i];
        if symbol == RUNA_SYMBOL || symbol == RUNB_SYMBOL {
            let mut weight = 1u64;
            let mut length = 0u64;
            while i < stream.len()
                && (stream[i] == RUNA_SYMBOL || stream[i] == RUNB_SYMBOL)
            {
                if stream[i] == RUNA_SYMBOL {
                    length += weight;
                } else {
                    length += weight << 1;
                }
                if out.len() as u64 + length > limit as u64 {
                    return Err(ZjumpError::StreamTooLarge);
                }
                weight <<= 1;
                i += 1;
            }
            out.resize(out.len() + length as usize, 1);
        } else {
            if out.len() >= limit {
                return Err(ZjumpError::StreamTooLarge);
            }
            out.push(symbol);
            i += 1;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_LIMIT: usize = usize::MAX;

    #[test]
    fn test_encode_without_ones() {
        let data: [u16; 10] = [254, 2, 3, 4, 5, 6, 7, 8, 9, 254];
        assert_eq!(rle1_encode(&data), data);
    }

    #[test]
    fn test_encode_ones_only() {
        let data = [1u16; 25];
        assert_eq!(rle1_encode(&data), [0, 1, 0, 1]);
    }

    #[test]
    fn test_encode_mixed_data() {
        let mut data = vec![1u16; 20];
        data.extend_from_slice(&[
            10, 5, 20, 1, 11, 1, 1, 1, 1, 3, 3, 5, 45, 1, 1, 9, 1, 8, 22, 13,
        ]);
        data.extend_from_slice(&[1; 13]);
        data.extend_from_slice(&[3, 1, 7, 9, 1, 1, 1]);
        assert_eq!(data.len(), 60);

        let expected: [u16; 30] = [
            1, 0, 1, 0, 10, 5, 20, 0, 11, 1, 0, 3, 3, 5, 45, 1, 9, 0, 8, 22, 13, 0, 1, 1, 3, 0, 7,
            9, 0, 0,
        ];
        assert_eq!(rle1_encode(&data), expected);
    }

    #[test]
    fn test_decode_without_runs() {
        let data: [u16; 10] = [254, 3, 4, 5, 6, 7, 8, 9, 254, 3];
        assert_eq!(rle1_decode(&data, NO_LIMIT).unwrap(), data);
    }

    #[test]
    fn test_decode_runs_only() {
        let data: [u16; 4] = [0, 1, 0, 1];
        assert_eq!(rle1_decode(&data, NO_LIMIT).unwrap(), [1u16; 25]);
    }

    #[test]
    fn test_decode_mixed_data() {
        let data: [u16; 30] = [
            1, 0, 1, 0, 10, 5, 20, 0, 11, 1, 0, 3, 3, 5, 45, 1, 9, 0, 8, 22, 13, 0, 1, 1, 3, 0, 7,
            9, 0, 0,
        ];

        let mut expected = vec![1u16; 20];
        expected.extend_from_slice(&[
            10, 5, 20, 1, 11, 1, 1, 1, 1, 3, 3, 5, 45, 1, 1, 9, 1, 8, 22, 13,
        ]);
        expected.extend_from_slice(&[1; 13]);
        expected.extend_from_slice(&[3, 1, 7, 9, 1, 1, 1]);

        assert_eq!(rle1_decode(&data, NO_LIMIT).unwrap(), expected);
    }

    #[test]
    fn test_decode_respects_limit() {
        // 20 RUN-B digits would expand to far more than 100 ones.
        let data = [RUNB_SYMBOL; 20];
        let err = rle1_decode(&data, 100).unwrap_err();
        assert!(matches!(err, ZjumpError::StreamTooLarge));
    }

    #[test]
    fn test_roundtrip() {
        let data: Vec<u16> = vec![5, 1, 1, 1, 254, 1, 2, 2, 1, 1, 1, 1, 1, 1, 1, 253, 1, 255];
        let encoded = rle1_encode(&data);
        assert_eq!(rle1_decode(&encoded, NO_LIMIT).unwrap(), data);
    }
}
