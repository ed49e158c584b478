//! Command-line interface for the `lz4pack` binary.
//!
//! | Submodule   | Responsibility |
//! |-------------|----------------|
//! | [`args`]    | `Args`, the clap model of flags and positional files. |
//! | [`op_mode`] | `OpMode` selection and output filename resolution. |
//!
//! [`run`] executes one parsed command: pack or unpack through the stream
//! adapters, or time the single-shot codec over the input.

pub mod args;
pub mod op_mode;

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::time::Instant;

use anyhow::{bail, Context};

use crate::bench::bench_buffer;
use crate::codec::Codec;
use crate::config::{CodecConfig, TableMode};
use crate::displaylevel;
use crate::stream::{Lz4PackReader, Lz4PackWriter, STREAM_BLOCK_SIZE};

use args::Args;
use op_mode::{input_name, resolve_destination, resolve_op_mode, Destination, OpMode};

/// Environment overrides first, then command-line flags.
pub fn codec_from_args(args: &Args) -> Codec {
    let mut config = CodecConfig::from_env();
    if let Some(m) = args.memory_usage {
        config = config.with_memory_usage(m);
    }
    if args.wide {
        config = config.with_table_mode(TableMode::Wide);
    }
    Codec::new(config)
}

/// Execute one command.
pub fn run(args: &Args) -> anyhow::Result<()> {
    let mode = resolve_op_mode(args);
    let codec = codec_from_args(args);
    displaylevel!(4, "mode {:?}, {:?}\n", mode, codec.config());

    if mode == OpMode::Bench {
        return run_bench(args, &codec);
    }

    let destination = resolve_destination(args, mode).map_err(anyhow::Error::msg)?;
    let input_label = input_name(args).map_or_else(|| "stdin".to_owned(), |p| p.display().to_string());
    let reader = open_input(args)?;

    let start = Instant::now();
    let (read, written) = match &destination {
        Destination::Stdout => {
            let stdout = io::stdout();
            let sink = BufWriter::new(stdout.lock());
            process(mode, args, codec, reader, sink)?
        }
        Destination::File(path) => {
            if path.exists() && !args.force {
                bail!("{} already exists; use -f to overwrite", path.display());
            }
            let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
            let result = process(mode, args, codec, reader, BufWriter::new(file));
            if result.is_err() {
                let _ = fs::remove_file(path);
            }
            result.with_context(|| format!("{input_label} -> {}", path.display()))?
        }
    };

    let ratio = if read == 0 { 0.0 } else { written as f64 * 100.0 / read as f64 };
    match mode {
        OpMode::Compress => displaylevel!(
            2,
            "{input_label}: packed {read} -> {written} bytes ({ratio:.2}%) in {:.3}s\n",
            start.elapsed().as_secs_f64()
        ),
        _ => displaylevel!(
            2,
            "{input_label}: unpacked {read} -> {written} bytes in {:.3}s\n",
            start.elapsed().as_secs_f64()
        ),
    }
    Ok(())
}

fn open_input(args: &Args) -> anyhow::Result<Box<dyn Read>> {
    match input_name(args) {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Pack or unpack `reader` into `sink`. Returns `(bytes read, bytes written)`.
fn process<W: Write>(mode: OpMode, args: &Args, codec: Codec, mut reader: Box<dyn Read>, sink: W) -> anyhow::Result<(u64, u64)> {
    let mut sink = CountingWriter::new(sink);
    let read = match mode {
        OpMode::Compress => {
            let block_size = args.block_size.unwrap_or(STREAM_BLOCK_SIZE);
            let mut writer = Lz4PackWriter::with_block_size(&mut sink, codec, block_size);
            let n = io::copy(&mut reader, &mut writer).context("packing failed")?;
            writer.finish().context("packing failed")?;
            n
        }
        _ => {
            let mut counted = CountingReader::new(reader);
            let mut unpacker = Lz4PackReader::new(&mut counted);
            io::copy(&mut unpacker, &mut sink).context("unpacking failed")?;
            counted.count
        }
    };
    sink.flush()?;
    Ok((read, sink.count))
}

fn run_bench(args: &Args, codec: &Codec) -> anyhow::Result<()> {
    let name = input_name(args).map_or_else(|| "stdin".to_owned(), |p| p.display().to_string());
    let mut reader = open_input(args)?;
    let mut data = Vec::new();
    reader.read_to_end(&mut data).with_context(|| format!("cannot read {name}"))?;
    if data.is_empty() {
        bail!("{name}: nothing to benchmark");
    }

    let result = bench_buffer(&name, &data, codec, args.iterations)?;
    displaylevel!(1, "{}\n", result);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Byte counters
// ─────────────────────────────────────────────────────────────────────────────

struct CountingWriter<W: Write> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct CountingReader<R: Read> {
    inner: R,
    count: u64,
}

impl<R: Read> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_layer_over_config() {
        let args = Args { memory_usage: Some(12), wide: true, ..Args::default() };
        let codec = codec_from_args(&args);
        assert_eq!(codec.config().memory_usage(), 12);
        assert_eq!(codec.config().table_mode(), TableMode::Wide);
    }

    #[test]
    fn process_round_trips_through_counters() {
        let args = Args { block_size: Some(1000), ..Args::default() };
        let data: Vec<u8> = b"counting bytes through the pipeline ".repeat(200);

        let mut packed = Vec::new();
        let (read, written) =
            process(OpMode::Compress, &args, Codec::default(), Box::new(io::Cursor::new(data.clone())), &mut packed).unwrap();
        assert_eq!(read, data.len() as u64);
        assert_eq!(written, packed.len() as u64);

        let mut unpacked = Vec::new();
        let (read, written) =
            process(OpMode::Decompress, &args, Codec::default(), Box::new(io::Cursor::new(packed.clone())), &mut unpacked).unwrap();
        assert_eq!(read, packed.len() as u64);
        assert_eq!(written, data.len() as u64);
        assert_eq!(unpacked, data);
    }
}
