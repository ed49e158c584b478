#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Framed round trip: always succeeds, stored or packed.
    let framed = lz4pack::compress(data).expect("framing never fails below 2 GiB");
    assert!(framed.len() <= data.len() + lz4pack::HEADER_SIZE);
    assert_eq!(lz4pack::decompress(&framed).expect("own output decodes"), data);

    // Raw block round trip when the encoding fits.
    if let Some(packed) = lz4pack::block::compress_block_to_vec(data) {
        let mut out = vec![0u8; data.len()];
        let n = lz4pack::block::decompress_block(&packed, &mut out).expect("own block decodes");
        assert_eq!(n, packed.len());
        assert_eq!(out, data);
    }
});
