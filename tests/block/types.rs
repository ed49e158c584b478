// Primitive helpers: De Bruijn byte counts and overlapping match copies

use lz4pack::block::types::{common_bytes32, common_bytes64, copy_match, secure_copy, xor8, LASTLITERALS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn debruijn_counts_agree_with_trailing_zeros() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10_000 {
        let w: u64 = rng.gen();
        if w != 0 {
            assert_eq!(common_bytes64(w), (w.trailing_zeros() / 8) as usize, "{w:#x}");
        }
        let v = w as u32;
        if v != 0 {
            assert_eq!(common_bytes32(v), (v.trailing_zeros() / 8) as usize, "{v:#x}");
        }
    }
}

#[test]
fn xor8_finds_first_differing_byte() {
    let buf = vec![0x5Au8; 32];
    for diff_at in 0..8 {
        let mut b = buf.clone();
        b[16 + diff_at] ^= 0x01;
        assert_eq!(common_bytes64(xor8(&b, 0, 16)), diff_at);
    }
}

fn naive_match(buf: &mut [u8], op: usize, offset: usize, len: usize) {
    for i in 0..len {
        buf[op + i] = buf[op + i - offset];
    }
}

#[test]
fn copy_match_agrees_with_byte_loop() {
    let mut rng = StdRng::seed_from_u64(11);
    for offset in 1..=40usize {
        for len in [4usize, 5, 7, 8, 9, 15, 16, 17, 31, 64, 100, 257] {
            let op = offset + rng.gen_range(0..8);
            let size = op + len + LASTLITERALS;
            let seed: Vec<u8> = (0..size).map(|_| rng.gen()).collect();

            let mut fast = seed.clone();
            let mut slow = seed;
            copy_match(&mut fast, op, offset, len);
            naive_match(&mut slow, op, offset, len);
            assert_eq!(&fast[..op + len], &slow[..op + len], "offset {offset} len {len}");
        }
    }
}

#[test]
fn secure_copy_repeats_period() {
    let mut buf = vec![0u8; 100];
    buf[..3].copy_from_slice(b"xyz");
    assert_eq!(secure_copy(&mut buf, 0, 3, 100), 97);
    for (i, &b) in buf.iter().enumerate() {
        assert_eq!(b, b"xyz"[i % 3]);
    }
}
