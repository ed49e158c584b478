//! E2E: stream adapters over files and pipes of blocks.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use lz4pack::codec::{Codec, HEADER_SIZE};
use lz4pack::config::{CodecConfig, TableMode};
use lz4pack::{decompress, packed_lengths, Lz4PackReader, Lz4PackWriter, STREAM_BLOCK_SIZE};
use tempfile::TempDir;

fn corpus(size: usize) -> Vec<u8> {
    let words = ["stream ", "block ", "header ", "payload ", "literal ", "match ", "offset "];
    let mut out = Vec::with_capacity(size);
    let mut i = 0usize;
    while out.len() < size {
        out.extend_from_slice(words[(i * 5 + i / 3) % words.len()].as_bytes());
        i += 1;
    }
    out.truncate(size);
    out
}

/// Walk the block headers of a packed stream and return the unpacked size of
/// each block.
fn block_sizes(mut packed: &[u8]) -> Vec<usize> {
    let mut sizes = Vec::new();
    while !packed.is_empty() {
        let (unpacked, packed_len) = packed_lengths(packed);
        sizes.push(unpacked as usize);
        let payload = if packed_len == 0 { unpacked } else { packed_len };
        packed = &packed[HEADER_SIZE + payload as usize..];
    }
    sizes
}

#[test]
fn file_round_trip_through_buffered_io() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.lz4p");
    let data = corpus(500_000);

    {
        let file = BufWriter::new(File::create(&path).unwrap());
        let mut w = Lz4PackWriter::new(file);
        for chunk in data.chunks(4099) {
            w.write_all(chunk).unwrap();
        }
        w.finish().unwrap();
    }

    let mut out = Vec::new();
    let file = BufReader::new(File::open(&path).unwrap());
    Lz4PackReader::new(file).read_to_end(&mut out).unwrap();
    assert_eq!(out, data);

    let on_disk = std::fs::read(&path).unwrap();
    assert!(on_disk.len() < data.len() / 2);
    assert_eq!(decompress(&on_disk).unwrap(), data);
}

#[test]
fn blocks_follow_buffer_size() {
    let data = corpus(3 * STREAM_BLOCK_SIZE + 1000);
    let mut w = Lz4PackWriter::new(Vec::new());
    w.write_all(&data).unwrap();
    let packed = w.finish().unwrap();
    assert_eq!(
        block_sizes(&packed),
        vec![STREAM_BLOCK_SIZE, STREAM_BLOCK_SIZE, STREAM_BLOCK_SIZE, 1000]
    );
}

#[test]
fn custom_block_size_and_wide_table() {
    let data = corpus(100_000);
    let codec = Codec::new(CodecConfig::new().with_table_mode(TableMode::Wide));
    let mut w = Lz4PackWriter::with_block_size(Vec::new(), codec, 30_000);
    w.write_all(&data).unwrap();
    let packed = w.finish().unwrap();
    assert_eq!(block_sizes(&packed), vec![30_000, 30_000, 30_000, 10_000]);
    assert_eq!(decompress(&packed).unwrap(), data);
}

#[test]
fn dropped_writer_flushes_pending_bytes() {
    let mut sink = Vec::new();
    {
        let mut w = Lz4PackWriter::new(&mut sink);
        w.write_all(b"written and then dropped").unwrap();
    }
    assert_eq!(decompress(&sink).unwrap(), b"written and then dropped");
}

#[test]
fn io_copy_between_adapters() {
    let data = corpus(250_000);
    let mut packed = Vec::new();
    {
        let mut w = Lz4PackWriter::new(&mut packed);
        io::copy(&mut data.as_slice(), &mut w).unwrap();
        w.finish().unwrap();
    }
    let mut out = Vec::new();
    io::copy(&mut Lz4PackReader::new(packed.as_slice()), &mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn reader_stops_at_terminator() {
    let mut packed = Vec::new();
    {
        let mut w = Lz4PackWriter::new(&mut packed);
        w.write_all(b"before the end marker").unwrap();
        w.finish().unwrap();
    }
    packed.extend_from_slice(&[0u8; HEADER_SIZE]);
    packed.extend_from_slice(b"bytes after the stream");

    let mut reader = Lz4PackReader::new(packed.as_slice());
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"before the end marker");
    assert_eq!(reader.into_inner(), b"bytes after the stream");
}
