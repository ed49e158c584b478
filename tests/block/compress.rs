// Block encoder tests
//
//   - Every table/word combination decodes with the single decoder
//   - Word width never changes the emitted bytes for a given table
//   - Match-length extension bytes (0xFF pairs, then single 0xFF, then rest)
//   - Back-references stay inside the 64 KiB window on large inputs
//   - Incompressible input reports OutputTooSmall instead of expanding

use lz4pack::block::compress::{compress_block, compress_with_table, CompressError, Word4, Word8};
use lz4pack::block::decompress::decompress_block;
use lz4pack::block::hash_table::{TableU16, TableU32};
use lz4pack::config::{CodecConfig, MatchWord, TableMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn text(size: usize) -> Vec<u8> {
    b"It was the best of times, it was the worst of times, it was the age of wisdom. "
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

fn random(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.gen()).collect()
}

fn all_configs() -> Vec<CodecConfig> {
    let mut out = Vec::new();
    for table in [TableMode::Auto, TableMode::Wide] {
        for word in [MatchWord::Auto, MatchWord::Word4, MatchWord::Word8] {
            for memory in [10, 14, 16] {
                out.push(
                    CodecConfig::new()
                        .with_table_mode(table)
                        .with_match_word(word)
                        .with_memory_usage(memory),
                );
            }
        }
    }
    out
}

fn round_trip(src: &[u8], config: &CodecConfig) {
    let mut packed = vec![0u8; src.len()];
    match compress_block(src, &mut packed, config) {
        Ok(n) => {
            let mut out = vec![0u8; src.len()];
            let consumed = decompress_block(&packed[..n], &mut out).unwrap();
            assert_eq!(consumed, n, "{config:?}");
            assert_eq!(out, src, "{config:?}");
        }
        Err(CompressError::OutputTooSmall) => {}
        Err(e) => panic!("{config:?}: {e}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cross-configuration compatibility
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn every_configuration_round_trips() {
    let mut mixed = text(30_000);
    mixed.extend(random(5_000, 1));
    mixed.extend(text(40_000));

    for config in all_configs() {
        for src in [text(13), text(1000), text(65_535), text(65_547), mixed.clone()] {
            round_trip(&src, &config);
        }
    }
}

#[test]
fn word_width_does_not_change_output() {
    let mut src = text(20_000);
    src.extend(random(300, 2));
    src.extend(text(3_000));
    let mut a = vec![0u8; src.len()];
    let mut b = vec![0u8; src.len()];

    let na = compress_with_table::<_, Word4>(&mut TableU16::new(14), &src, &mut a).unwrap();
    let nb = compress_with_table::<_, Word8>(&mut TableU16::new(14), &src, &mut b).unwrap();
    assert_eq!(a[..na], b[..nb]);

    let na = compress_with_table::<_, Word4>(&mut TableU32::new(12), &src, &mut a).unwrap();
    let nb = compress_with_table::<_, Word8>(&mut TableU32::new(12), &src, &mut b).unwrap();
    assert_eq!(a[..na], b[..nb]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Token stream layout
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn long_match_extension_bytes() {
    // 535 zero bytes: 1 literal, a 529-byte match at offset 1 (15 + 510 in
    // the extension), then 5 literals.
    let src = vec![0u8; 535];
    let expected: &[u8] = &[0x1F, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0x00, 0x50, 0, 0, 0, 0, 0];
    for config in all_configs() {
        let mut dst = vec![0u8; src.len()];
        let n = compress_block(&src, &mut dst, &config).unwrap();
        assert_eq!(&dst[..n], expected, "{config:?}");
    }
}

#[test]
fn match_extension_single_ff_tail() {
    // Match length 4 + 15 + 255 + 10 = 284 → ext bytes FF 0A.
    let src = vec![0u8; 1 + 284 + 5];
    let mut dst = vec![0u8; src.len()];
    let n = compress_block(&src, &mut dst, &CodecConfig::default()).unwrap();
    assert_eq!(&dst[..n], &[0x1F, 0x00, 0x01, 0x00, 0xFF, 0x0A, 0x50, 0, 0, 0, 0, 0]);
}

#[test]
fn last_five_bytes_are_literals() {
    for size in [100usize, 4096, 70_000] {
        let src = vec![b'z'; size];
        let mut dst = vec![0u8; size];
        let n = compress_block(&src, &mut dst, &CodecConfig::default()).unwrap();
        // Final token: 5 literals, no match, followed by the five bytes.
        assert_eq!(&dst[n - 6..n], &[0x50, b'z', b'z', b'z', b'z', b'z'], "size {size}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window and failure paths
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn far_repeats_stay_in_window() {
    // The same 2 KiB block at distance 70 000: too far for an offset.
    let block = random(2048, 3);
    let mut src = block.clone();
    src.extend(random(70_000 - block.len(), 4));
    src.extend(&block);
    src.extend(text(4096));

    for table in [TableMode::Auto, TableMode::Wide] {
        round_trip(&src, &CodecConfig::new().with_table_mode(table));
    }
}

#[test]
fn incompressible_input_reports_output_too_small() {
    for size in [13usize, 64, 4096, 100_000] {
        let src = random(size, size as u64);
        let mut dst = vec![0u8; size];
        for config in all_configs() {
            assert_eq!(
                compress_block(&src, &mut dst, &config),
                Err(CompressError::OutputTooSmall),
                "size {size} {config:?}"
            );
        }
    }
}

#[test]
fn any_destination_size_is_safe() {
    let src = text(3000);
    let mut full = vec![0u8; src.len()];
    let needed = compress_block(&src, &mut full, &CodecConfig::default()).unwrap();
    for cap in 0..needed + 16 {
        let mut dst = vec![0u8; cap];
        match compress_block(&src, &mut dst, &CodecConfig::default()) {
            Ok(n) => assert_eq!(dst[..n], full[..needed], "capacity {cap}"),
            Err(e) => assert_eq!(e, CompressError::OutputTooSmall, "capacity {cap}"),
        }
    }
}
