//! E2E: single-shot round trips across sizes and data shapes.
//!
//! Sizes straddle the thresholds the encoder cares about: the 13-byte
//! minimum for matching and the 65547-byte switch from the 16-bit to the
//! 32-bit hash table.

use lz4pack::codec::{Codec, HEADER_SIZE};
use lz4pack::config::{CodecConfig, MatchWord, TableMode};
use lz4pack::{compress, decompress, packed_lengths};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: &[usize] = &[
    0, 1, 4, 12, 13, 14, 100, 4095, 4096, 65_535, 65_536, 65_537, 65_546, 65_547, 65_548, 200_000, 1 << 20,
];

fn text(size: usize) -> Vec<u8> {
    b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor. "
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

fn noise(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.gen()).collect()
}

/// Random runs of random lengths: matches at every distance.
fn runs(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        let b: u8 = rng.gen();
        let n = rng.gen_range(1..300).min(size - out.len());
        out.extend(std::iter::repeat(b).take(n));
    }
    out
}

/// Text with a random byte flipped now and then, so matches break at
/// arbitrary points.
fn mutated_text(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = text(size);
    for b in out.iter_mut() {
        if rng.gen_ratio(1, 97) {
            *b = rng.gen();
        }
    }
    out
}

fn check(codec: &Codec, data: &[u8], label: &str) {
    let framed = codec.compress(data).unwrap();
    if data.is_empty() {
        assert!(framed.is_empty(), "{label}");
        return;
    }
    assert!(framed.len() <= data.len() + HEADER_SIZE, "{label}: {} > {}", framed.len(), data.len() + HEADER_SIZE);
    let (unpacked, packed) = packed_lengths(&framed);
    assert_eq!(unpacked as usize, data.len(), "{label}");
    assert!(packed == 0 || (packed as usize) < data.len(), "{label}");
    assert_eq!(codec.decompress(&framed).unwrap(), data, "{label}");
}

#[test]
fn default_codec_every_size() {
    let codec = Codec::default();
    for &size in SIZES {
        check(&codec, &text(size), &format!("text {size}"));
        check(&codec, &noise(size, size as u64), &format!("noise {size}"));
        check(&codec, &runs(size, size as u64 + 1), &format!("runs {size}"));
        check(&codec, &mutated_text(size, size as u64 + 2), &format!("mutated {size}"));
        check(&codec, &vec![0u8; size], &format!("zeros {size}"));
    }
}

#[test]
fn every_configuration_agrees_with_default_decoder() {
    for table in [TableMode::Auto, TableMode::Wide] {
        for word in [MatchWord::Auto, MatchWord::Word4, MatchWord::Word8] {
            for memory in [10, 12, 14, 18, 20] {
                let config = CodecConfig::new().with_table_mode(table).with_match_word(word).with_memory_usage(memory);
                let codec = Codec::new(config);
                for &size in &[13usize, 1000, 65_546, 70_000] {
                    let data = mutated_text(size, memory as u64);
                    let framed = codec.compress(&data).unwrap();
                    // The decoder is configuration-free.
                    assert_eq!(decompress(&framed).unwrap(), data, "{config:?} size {size}");
                }
            }
        }
    }
}

#[test]
fn repetitive_text_compresses_well() {
    let data = text(1 << 20);
    let framed = compress(&data).unwrap();
    assert!(framed.len() * 20 < data.len(), "ratio too low: {}", framed.len());
}

#[test]
fn repeated_calls_are_deterministic() {
    let data = mutated_text(150_000, 3);
    let first = compress(&data).unwrap();
    for _ in 0..5 {
        assert_eq!(compress(&data).unwrap(), first);
    }
}
