#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First two bytes pick the destination size; the rest is the token stream.
    if data.len() < 2 {
        return;
    }
    let size = u16::from_le_bytes([data[0], data[1]]) as usize;
    let mut dst = vec![0u8; size];
    if let Ok(n) = lz4pack::block::decompress_block(&data[2..], &mut dst) {
        assert!(n <= data.len() - 2);
    }
});
