// Block decoder tests
//
//   - Randomly generated valid token streams decode like a byte-at-a-time
//     reference decoder (every offset, overlapping and disjoint copies)
//   - Arbitrary bytes never panic the decoder
//   - Error kinds and offsets for hand-built corrupt streams

use lz4pack::block::decompress::{decompress_block, DecodeError, DecodeErrorKind};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ─────────────────────────────────────────────────────────────────────────────
// Stream builder and reference decoder
// ─────────────────────────────────────────────────────────────────────────────

fn push_ext(stream: &mut Vec<u8>, mut rest: usize) {
    while rest >= 255 {
        stream.push(255);
        rest -= 255;
    }
    stream.push(rest as u8);
}

/// Append one sequence. `match_len == 0` means a final literal-only run.
fn push_sequence(stream: &mut Vec<u8>, literals: &[u8], offset: u16, match_len: usize) {
    let lit_nibble = literals.len().min(15);
    let ml = match_len.saturating_sub(4);
    let ml_nibble = if match_len == 0 { 0 } else { ml.min(15) };
    stream.push(((lit_nibble << 4) | ml_nibble) as u8);
    if literals.len() >= 15 {
        push_ext(stream, literals.len() - 15);
    }
    stream.extend_from_slice(literals);
    if match_len == 0 {
        return;
    }
    stream.extend_from_slice(&offset.to_le_bytes());
    if ml >= 15 {
        push_ext(stream, ml - 15);
    }
}

/// Build a valid block of exactly `size` bytes (`size >= 5`). Returns the
/// token stream and the bytes it must decode to, expanded one byte at a time.
fn random_block(rng: &mut StdRng, size: usize, max_offset: usize) -> (Vec<u8>, Vec<u8>) {
    let mut stream = Vec::new();
    let mut expected: Vec<u8> = Vec::with_capacity(size);

    loop {
        let remaining = size - expected.len();
        if remaining < 20 || rng.gen_ratio(1, 16) {
            let literals: Vec<u8> = (0..remaining).map(|_| rng.gen()).collect();
            push_sequence(&mut stream, &literals, 0, 0);
            expected.extend_from_slice(&literals);
            return (stream, expected);
        }

        let mut lit_len = rng.gen_range(0..=(remaining - 12).min(40));
        if expected.is_empty() && lit_len == 0 {
            lit_len = 1;
        }
        let literals: Vec<u8> = (0..lit_len).map(|_| rng.gen_range(0..4u8)).collect();
        expected.extend_from_slice(&literals);

        let match_len = rng.gen_range(4..=(remaining - lit_len - 5).min(700));
        let offset = rng.gen_range(1..=expected.len().min(max_offset));
        for _ in 0..match_len {
            let b = expected[expected.len() - offset];
            expected.push(b);
        }
        push_sequence(&mut stream, &literals, offset as u16, match_len);
    }
}

#[test]
fn random_valid_streams_match_reference() {
    let mut rng = StdRng::seed_from_u64(0x1234_5678);
    for round in 0..400 {
        let size = rng.gen_range(5..20_000);
        let max_offset = if round % 2 == 0 { 16 } else { 65_535 };
        let (stream, expected) = random_block(&mut rng, size, max_offset);

        let mut out = vec![0u8; size];
        let consumed = decompress_block(&stream, &mut out).unwrap();
        assert_eq!(consumed, stream.len(), "round {round}");
        assert!(out == expected, "round {round}: size {size}");
    }
}

#[test]
fn every_short_offset_with_long_match() {
    for offset in 1..=20usize {
        let literals: Vec<u8> = (0..offset as u8).map(|i| i.wrapping_mul(37).wrapping_add(1)).collect();
        let match_len = 1000;
        let mut stream = Vec::new();
        push_sequence(&mut stream, &literals, offset as u16, match_len);
        push_sequence(&mut stream, b"tail!", 0, 0);

        let size = offset + match_len + 5;
        let mut out = vec![0u8; size];
        decompress_block(&stream, &mut out).unwrap();
        for i in 0..offset + match_len {
            assert_eq!(out[i], literals[i % offset], "offset {offset} index {i}");
        }
        assert_eq!(&out[size - 5..], b"tail!");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Corrupt input
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_source_is_truncated() {
    let mut dst = [0u8; 4];
    assert_eq!(
        decompress_block(&[], &mut dst),
        Err(DecodeError::new(DecodeErrorKind::TruncatedInput, 0))
    );
}

#[test]
fn literal_run_past_destination_end() {
    // 20 literals declared into a 10-byte destination.
    let mut stream = vec![0xF0, 5];
    stream.extend_from_slice(&[1u8; 20]);
    let mut dst = [0u8; 10];
    let err = decompress_block(&stream, &mut dst).unwrap_err();
    assert_eq!(err.kind, DecodeErrorKind::CorruptTrailingLiterals);
    assert_eq!(err.offset, 2);
}

#[test]
fn match_reaching_before_output_start() {
    let mut stream = Vec::new();
    push_sequence(&mut stream, b"abc", 4, 10);
    push_sequence(&mut stream, b"12345", 0, 0);
    let mut dst = [0u8; 18];
    let err = decompress_block(&stream, &mut dst).unwrap_err();
    assert_eq!(err, DecodeError::new(DecodeErrorKind::CorruptOffset, 4));
}

#[test]
fn block_without_final_literals() {
    // A match that ends exactly at the destination end.
    let mut stream = Vec::new();
    push_sequence(&mut stream, b"abcd", 4, 8);
    let mut dst = [0u8; 12];
    let err = decompress_block(&stream, &mut dst).unwrap_err();
    assert_eq!(err.kind, DecodeErrorKind::CorruptTrailingLiterals);
}

#[test]
fn every_prefix_of_a_valid_stream_fails_cleanly() {
    let mut rng = StdRng::seed_from_u64(99);
    let (stream, expected) = random_block(&mut rng, 3000, 300);
    for cut in 0..stream.len() {
        let mut out = vec![0u8; expected.len()];
        assert!(decompress_block(&stream[..cut], &mut out).is_err(), "cut {cut}");
    }
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(src in proptest::collection::vec(any::<u8>(), 0..600), size in 0usize..4096) {
        let mut dst = vec![0u8; size];
        if let Ok(consumed) = decompress_block(&src, &mut dst) {
            prop_assert!(consumed <= src.len());
        }
    }

    #[test]
    fn mutated_streams_never_panic(seed in any::<u64>(), flips in proptest::collection::vec((any::<usize>(), any::<u8>()), 1..8)) {
        let mut rng = StdRng::seed_from_u64(seed);
        let (mut stream, expected) = random_block(&mut rng, 2048, 1024);
        for (at, value) in flips {
            let i = at % stream.len();
            stream[i] = value;
        }
        let mut out = vec![0u8; expected.len()];
        let _ = decompress_block(&stream, &mut out);
    }
}
