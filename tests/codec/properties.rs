// Property checks over arbitrary inputs: round trip, size bound,
// concatenation, and no panics on garbage.

use lz4pack::codec::{Codec, HEADER_SIZE};
use lz4pack::config::{CodecConfig, MatchWord, TableMode};
use proptest::prelude::*;

fn codec_strategy() -> impl Strategy<Value = Codec> {
    (
        prop_oneof![Just(TableMode::Auto), Just(TableMode::Wide)],
        prop_oneof![Just(MatchWord::Auto), Just(MatchWord::Word4), Just(MatchWord::Word8)],
        10u32..=16,
    )
        .prop_map(|(table, word, memory)| {
            Codec::new(
                CodecConfig::new()
                    .with_table_mode(table)
                    .with_match_word(word)
                    .with_memory_usage(memory),
            )
        })
}

/// Mostly-repetitive bytes: a small alphabet so matches actually occur.
fn compressible(max: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..4, 0..max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn round_trip_arbitrary(codec in codec_strategy(), data in proptest::collection::vec(any::<u8>(), 0..5000)) {
        let framed = codec.compress(&data).unwrap();
        prop_assert_eq!(codec.decompress(&framed).unwrap(), data);
    }

    #[test]
    fn round_trip_compressible(codec in codec_strategy(), data in compressible(20_000)) {
        let framed = codec.compress(&data).unwrap();
        prop_assert_eq!(codec.decompress(&framed).unwrap(), data);
    }

    #[test]
    fn never_grows_by_more_than_a_header(data in proptest::collection::vec(any::<u8>(), 1..3000)) {
        let framed = Codec::default().compress(&data).unwrap();
        prop_assert!(framed.len() <= data.len() + HEADER_SIZE);
    }

    #[test]
    fn concatenation_decodes_to_concatenation(a in compressible(3000), b in proptest::collection::vec(any::<u8>(), 0..3000)) {
        let codec = Codec::default();
        let mut framed = codec.compress(&a).unwrap();
        framed.extend_from_slice(&codec.compress(&b).unwrap());
        let mut expected = a.clone();
        expected.extend_from_slice(&b);
        prop_assert_eq!(codec.decompress(&framed).unwrap(), expected);
    }

    #[test]
    fn garbage_never_panics(data in proptest::collection::vec(any::<u8>(), 0..2000)) {
        let _ = Codec::default().decompress(&data);
    }
}
