//! Binary entry point for the `lz4pack` command-line tool.
//!
//! 1. clap parses `argv` into [`Args`].
//! 2. `-v` / `-q` set the display level (default 2).
//! 3. [`run`] packs, unpacks or benchmarks; any error is printed at level 1
//!    and the process exits with status 1.

use clap::Parser;

use lz4pack::cli::args::Args;
use lz4pack::cli::run;
use lz4pack::display::set_display_level;

fn main() {
    let args = Args::parse();
    set_display_level(args.display_level());

    if let Err(e) = run(&args) {
        lz4pack::displaylevel!(1, "lz4pack: {:#}\n", e);
        std::process::exit(1);
    }
}
