//! In-memory pack/unpack timing loops, used by `lz4pack -b`.
//!
//! Each pass runs the single-shot codec `iterations` times over the whole
//! buffer and keeps the fastest run. The last unpacked result is compared
//! against the source so a broken codec cannot report a speed.

use std::time::{Duration, Instant};

use crate::codec::Codec;
use crate::displaylevel;

pub const MB: f64 = (1 << 20) as f64;

/// Throughput numbers for one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    pub name: String,
    pub src_size: usize,
    pub packed_size: usize,
    pub iterations: u32,
    pub fastest_pack: Duration,
    pub fastest_unpack: Duration,
}

impl BenchResult {
    pub fn ratio(&self) -> f64 {
        if self.packed_size == 0 {
            return 1.0;
        }
        self.src_size as f64 / self.packed_size as f64
    }

    pub fn pack_mb_per_sec(&self) -> f64 {
        speed(self.src_size, self.fastest_pack)
    }

    pub fn unpack_mb_per_sec(&self) -> f64 {
        speed(self.src_size, self.fastest_unpack)
    }
}

impl core::fmt::Display for BenchResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:<20} : {:>10} -> {:>10} ({:>6.3}), {:>8.1} MB/s, {:>8.1} MB/s",
            self.name,
            self.src_size,
            self.packed_size,
            self.ratio(),
            self.pack_mb_per_sec(),
            self.unpack_mb_per_sec()
        )
    }
}

fn speed(bytes: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return f64::INFINITY;
    }
    bytes as f64 / MB / secs
}

/// Errors from a benchmark run.
#[derive(Debug)]
pub enum BenchError {
    Compress(crate::CompressError),
    Decode(crate::DecodeError),
    /// Unpacked bytes differ from the source at this index.
    Mismatch(usize),
}

impl core::fmt::Display for BenchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BenchError::Compress(e) => write!(f, "pack failed: {e}"),
            BenchError::Decode(e) => write!(f, "unpack failed: {e}"),
            BenchError::Mismatch(at) => write!(f, "unpacked data differs from source at byte {at}"),
        }
    }
}

impl std::error::Error for BenchError {}

/// Time `iterations` (at least 1) pack and unpack passes over `src`.
pub fn bench_buffer(name: &str, src: &[u8], codec: &Codec, iterations: u32) -> Result<BenchResult, BenchError> {
    let iterations = iterations.max(1);
    let mut fastest_pack = Duration::MAX;
    let mut fastest_unpack = Duration::MAX;
    let mut packed = Vec::new();

    for i in 1..=iterations {
        displaylevel!(3, "\r{:>2}# {} : packing     ", i, name);
        let start = Instant::now();
        packed = codec.compress(src).map_err(BenchError::Compress)?;
        fastest_pack = fastest_pack.min(start.elapsed());
    }

    let mut unpacked = Vec::new();
    for i in 1..=iterations {
        displaylevel!(3, "\r{:>2}# {} : unpacking   ", i, name);
        let start = Instant::now();
        unpacked = codec.decompress(&packed).map_err(BenchError::Decode)?;
        fastest_unpack = fastest_unpack.min(start.elapsed());
    }
    displaylevel!(3, "\r");

    if unpacked != src {
        let at = unpacked
            .iter()
            .zip(src)
            .position(|(a, b)| a != b)
            .unwrap_or(unpacked.len().min(src.len()));
        return Err(BenchError::Mismatch(at));
    }

    Ok(BenchResult {
        name: name.to_owned(),
        src_size: src.len(),
        packed_size: packed.len(),
        iterations,
        fastest_pack,
        fastest_unpack,
    })
}
