#![no_main]
use std::io::Read;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let single = lz4pack::decompress(data);
    let mut streamed = Vec::new();
    let stream = lz4pack::Lz4PackReader::new(data).read_to_end(&mut streamed);

    // Both paths agree on success and content.
    if let Ok(out) = single {
        assert!(stream.is_ok());
        assert_eq!(out, streamed);
    }
});
