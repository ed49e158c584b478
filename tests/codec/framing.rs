// Framed single-shot API: header layout, stored fallback, concatenation,
// and the error each kind of damage produces.

use lz4pack::codec::{BlockHeader, Codec, HEADER_SIZE};
use lz4pack::config::{CodecConfig, TableMode};
use lz4pack::{compress, decompress, packed_lengths, DecodeError, DecodeErrorKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.gen()).collect()
}

#[test]
fn random_bytes_are_stored() {
    let input = random(64, 1);
    let framed = compress(&input).unwrap();
    assert!(framed.len() <= 64 + HEADER_SIZE);
    assert_eq!(packed_lengths(&framed), (64, 0));
    assert_eq!(&framed[HEADER_SIZE..], &input[..]);
    assert_eq!(decompress(&framed).unwrap(), input);
}

#[test]
fn repeated_byte_shrinks() {
    let input = vec![b'A'; 4096];
    let framed = compress(&input).unwrap();
    assert!(framed.len() < input.len());
    let (unpacked, packed) = packed_lengths(&framed);
    assert_eq!(unpacked, 4096);
    assert!(packed > 0);
    assert_eq!(decompress(&framed).unwrap(), input);
}

#[test]
fn concatenated_blocks_decode_in_order() {
    let parts: Vec<Vec<u8>> = vec![
        b"first block ".repeat(50),
        random(300, 2),
        vec![0u8; 70_000],
        b"x".to_vec(),
    ];
    let mut framed = Vec::new();
    let codec = Codec::new(CodecConfig::new().with_table_mode(TableMode::Wide));
    for part in &parts {
        codec.compress_into(part, &mut framed).unwrap();
    }
    let expected: Vec<u8> = parts.concat();
    assert_eq!(decompress(&framed).unwrap(), expected);
}

#[test]
fn packed_block_with_truncated_payload() {
    let framed = compress(&vec![9u8; 1000]).unwrap();
    let cut = &framed[..framed.len() - 1];
    let err = decompress(cut).unwrap_err();
    assert_eq!(err, DecodeError::new(DecodeErrorKind::TruncatedInput, HEADER_SIZE));
}

#[test]
fn stored_block_with_truncated_payload() {
    let framed = compress(b"plain").unwrap();
    let err = decompress(&framed[..HEADER_SIZE + 2]).unwrap_err();
    assert_eq!(err.kind, DecodeErrorKind::TruncatedInput);
}

#[test]
fn negative_lengths_are_malformed() {
    let header = BlockHeader { unpacked_length: 16, packed_length: -3 };
    let err = decompress(&header.to_bytes()).unwrap_err();
    assert_eq!(err, DecodeError::new(DecodeErrorKind::MalformedHeader, 0));
}

#[test]
fn packed_not_smaller_is_rejected() {
    let mut framed = compress(b"ok").unwrap();
    let at = framed.len();
    framed.extend_from_slice(&BlockHeader { unpacked_length: 4, packed_length: 4 }.to_bytes());
    framed.extend_from_slice(&[0x40, 1, 2, 3]);
    let err = decompress(&framed).unwrap_err();
    assert_eq!(err, DecodeError::new(DecodeErrorKind::LengthInvariantViolation, at));
}

#[test]
fn payload_errors_carry_absolute_offsets() {
    let mut framed = compress(b"leading stored block").unwrap();
    let payload_at = framed.len() + HEADER_SIZE;
    // Literal 'a', then a match at offset 2 with only one byte written.
    let body = [0x10, b'a', 0x02, 0x00, 0x50, 1, 2, 3, 4, 5];
    framed.extend_from_slice(&BlockHeader { unpacked_length: 32, packed_length: body.len() as i32 }.to_bytes());
    framed.extend_from_slice(&body);
    let err = decompress(&framed).unwrap_err();
    assert_eq!(err, DecodeError::new(DecodeErrorKind::CorruptOffset, payload_at + 2));
}

#[test]
fn error_display_names_kind_and_offset() {
    let err = DecodeError::new(DecodeErrorKind::CorruptOffset, 42);
    let text = err.to_string();
    assert!(text.contains("42"), "{text}");
}
