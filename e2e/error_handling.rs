//! E2E: damaged input is rejected with an error, never a panic or a
//! silently wrong result.

use std::io;

use lz4pack::codec::{BlockHeader, HEADER_SIZE};
use lz4pack::{compress, decompress, read_packed, DecodeErrorKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn sample() -> Vec<u8> {
    b"error handling sample text, repeated so it compresses; "
        .iter()
        .copied()
        .cycle()
        .take(20_000)
        .collect()
}

#[test]
fn every_truncation_fails() {
    let framed = compress(&sample()).unwrap();
    for cut in 1..framed.len() {
        assert!(decompress(&framed[..cut]).is_err(), "cut at {cut}");
    }
}

#[test]
fn every_truncation_fails_through_reader() {
    let framed = compress(&sample()).unwrap();
    for cut in (1..framed.len()).step_by(7) {
        let err = read_packed(&framed[..cut]).unwrap_err();
        assert!(
            matches!(err.kind(), io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData),
            "cut at {cut}: {err}"
        );
    }
}

#[test]
fn random_corruption_never_panics() {
    let data = sample();
    let framed = compress(&data).unwrap();
    let mut rng = StdRng::seed_from_u64(0xBAD);
    for _ in 0..2000 {
        let mut damaged = framed.clone();
        for _ in 0..rng.gen_range(1..4) {
            let i = rng.gen_range(0..damaged.len());
            damaged[i] = rng.gen();
        }
        // Either an error or some output; a lucky flip may still decode.
        let _ = decompress(&damaged);
        let _ = read_packed(damaged.as_slice());
    }
}

#[test]
fn header_fields_are_checked_before_payload() {
    let cases = [
        (BlockHeader { unpacked_length: -5, packed_length: 0 }, DecodeErrorKind::MalformedHeader),
        (BlockHeader { unpacked_length: 5, packed_length: i32::MIN }, DecodeErrorKind::MalformedHeader),
        (BlockHeader { unpacked_length: 5, packed_length: 6 }, DecodeErrorKind::LengthInvariantViolation),
        (BlockHeader { unpacked_length: 0, packed_length: 1 }, DecodeErrorKind::LengthInvariantViolation),
    ];
    for (header, kind) in cases {
        let err = decompress(&header.to_bytes()).unwrap_err();
        assert_eq!(err.kind, kind, "{header:?}");
        assert_eq!(err.offset, 0);
    }
}

#[test]
fn reader_distinguishes_short_header_from_short_payload() {
    let framed = compress(&sample()).unwrap();

    let err = read_packed(&framed[..HEADER_SIZE - 3]).unwrap_err();
    let inner = err.get_ref().and_then(|e| e.downcast_ref::<lz4pack::DecodeError>()).unwrap();
    assert_eq!(inner.kind, DecodeErrorKind::TruncatedHeader);

    let err = read_packed(&framed[..HEADER_SIZE + 3]).unwrap_err();
    let inner = err.get_ref().and_then(|e| e.downcast_ref::<lz4pack::DecodeError>()).unwrap();
    assert_eq!(inner.kind, DecodeErrorKind::TruncatedPayload);
    assert_eq!(inner.offset, HEADER_SIZE);
}

#[test]
fn huge_claimed_size_is_refused_cheaply() {
    let mut framed = BlockHeader { unpacked_length: i32::MAX, packed_length: 16 }.to_bytes().to_vec();
    framed.extend_from_slice(&[0xFF; 16]);
    assert_eq!(decompress(&framed).unwrap_err().kind, DecodeErrorKind::TruncatedInput);
    assert!(read_packed(framed.as_slice()).is_err());
}
