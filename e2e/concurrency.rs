//! E2E: codecs shared across threads.
//!
//! Hash tables are pooled per thread, so concurrent calls with different
//! table sizes must never see each other's state.

use std::sync::Arc;
use std::thread;

use lz4pack::codec::Codec;
use lz4pack::config::{CodecConfig, MatchWord, TableMode};
use rayon::prelude::*;

fn input(seed: usize, size: usize) -> Vec<u8> {
    (0..size).map(|i| ((i / (seed % 7 + 1)) as u8).wrapping_mul(seed as u8 | 1) % 31).collect()
}

fn codecs() -> Vec<Codec> {
    let mut out = Vec::new();
    for memory in [10, 14, 17] {
        for table in [TableMode::Auto, TableMode::Wide] {
            for word in [MatchWord::Word4, MatchWord::Word8] {
                out.push(Codec::new(
                    CodecConfig::new().with_memory_usage(memory).with_table_mode(table).with_match_word(word),
                ));
            }
        }
    }
    out
}

#[test]
fn parallel_round_trips_with_mixed_configs() {
    let codecs = codecs();
    (0..480usize).into_par_iter().for_each(|job| {
        let codec = codecs[job % codecs.len()];
        let size = [100, 5000, 65_546, 90_000][job % 4];
        let data = input(job, size);
        let framed = codec.compress(&data).unwrap();
        assert_eq!(codec.decompress(&framed).unwrap(), data, "job {job}");
    });
}

#[test]
fn parallel_output_matches_sequential() {
    let codecs = codecs();
    let jobs: Vec<(Codec, Vec<u8>)> = (0..64).map(|j| (codecs[j % codecs.len()], input(j, 40_000 + j * 1000))).collect();

    let sequential: Vec<Vec<u8>> = jobs.iter().map(|(c, d)| c.compress(d).unwrap()).collect();
    let parallel: Vec<Vec<u8>> = jobs.par_iter().map(|(c, d)| c.compress(d).unwrap()).collect();
    assert_eq!(sequential, parallel);
}

#[test]
fn one_codec_many_threads() {
    let codec = Arc::new(Codec::default());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let codec = Arc::clone(&codec);
            thread::spawn(move || {
                for round in 0..20 {
                    let data = input(t * 100 + round, 20_000);
                    let framed = codec.compress(&data).unwrap();
                    assert_eq!(codec.decompress(&framed).unwrap(), data);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
