// cli/args.rs: command-line model for the `lz4pack` binary.
//
// Parsed with clap derive. Everything that is not a plain flag (output name
// resolution, mode guessing, config layering) lives in `cli::op_mode` and
// `cli::run` so it can be tested without spawning the binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{MEMORY_USAGE_MAX, MEMORY_USAGE_MIN};

/// Pack and unpack files with the lz4pack block format.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "lz4pack", version, about, long_about = None)]
pub struct Args {
    /// Force compression
    #[arg(short = 'z', long = "compress", conflicts_with_all = ["decompress", "bench"])]
    pub compress: bool,

    /// Force decompression
    #[arg(short = 'd', long = "decompress", conflicts_with = "bench")]
    pub decompress: bool,

    /// Time pack/unpack loops over the input instead of writing output
    #[arg(short = 'b', long = "bench")]
    pub bench: bool,

    /// Overwrite the output file if it exists
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Write to standard output
    #[arg(short = 'c', long = "stdout")]
    pub stdout: bool,

    /// More messages (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Fewer messages (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Bytes buffered per block when packing
    #[arg(long = "block-size", value_name = "BYTES")]
    pub block_size: Option<usize>,

    /// Hash table size exponent
    #[arg(
        long = "memory-usage",
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(MEMORY_USAGE_MIN as i64..=MEMORY_USAGE_MAX as i64)
    )]
    pub memory_usage: Option<u32>,

    /// Always use the 32-bit hash table
    #[arg(long = "wide")]
    pub wide: bool,

    /// Timing passes per benchmark
    #[arg(short = 'i', long = "iterations", value_name = "N", default_value_t = 3)]
    pub iterations: u32,

    /// Input file ('-' or absent: standard input)
    pub input: Option<PathBuf>,

    /// Output file ('-': standard output)
    pub output: Option<PathBuf>,
}

impl Args {
    /// Notification level implied by -v / -q, starting from 2.
    pub fn display_level(&self) -> i32 {
        2 + self.verbose as i32 - self.quiet as i32
    }
}
