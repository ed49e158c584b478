// cli/op_mode.rs: operation selection and output naming.

use std::path::{Path, PathBuf};

use super::args::Args;

/// Suffix of packed files; selects unpacking when no mode flag is given.
pub const LZ4PACK_EXTENSION: &str = ".lz4p";

/// Marker for standard input / output in file arguments.
pub const STD_MARK: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    Compress,
    Decompress,
    Bench,
}

/// Guess the operation from a file name: `.lz4p` unpacks, anything else
/// packs.
pub fn determine_op_mode(filename: &str) -> OpMode {
    if filename.ends_with(LZ4PACK_EXTENSION) {
        OpMode::Decompress
    } else {
        OpMode::Compress
    }
}

/// Explicit flags win; otherwise guess from the input name. Standard input
/// packs.
pub fn resolve_op_mode(args: &Args) -> OpMode {
    if args.bench {
        OpMode::Bench
    } else if args.decompress {
        OpMode::Decompress
    } else if args.compress {
        OpMode::Compress
    } else {
        match input_name(args) {
            Some(name) => determine_op_mode(&name.to_string_lossy()),
            None => OpMode::Compress,
        }
    }
}

/// The input path, or `None` for standard input.
pub fn input_name(args: &Args) -> Option<&Path> {
    args.input.as_deref().filter(|p| p.as_os_str() != STD_MARK)
}

/// Where output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

/// Resolve the output for pack/unpack.
///
/// `-c` or `-` means standard output; an explicit OUTPUT is used as given.
/// Otherwise a file input gets `.lz4p` appended when packing or removed when
/// unpacking, and standard input goes to standard output.
pub fn resolve_destination(args: &Args, mode: OpMode) -> Result<Destination, String> {
    if args.stdout {
        return Ok(Destination::Stdout);
    }
    if let Some(out) = &args.output {
        if out.as_os_str() == STD_MARK {
            return Ok(Destination::Stdout);
        }
        return Ok(Destination::File(out.clone()));
    }
    let Some(input) = input_name(args) else {
        return Ok(Destination::Stdout);
    };
    let name = input.to_string_lossy();
    match mode {
        OpMode::Compress => Ok(Destination::File(PathBuf::from(format!("{name}{LZ4PACK_EXTENSION}")))),
        OpMode::Decompress => match name.strip_suffix(LZ4PACK_EXTENSION) {
            Some(stem) if !stem.is_empty() => Ok(Destination::File(PathBuf::from(stem))),
            _ => Err(format!(
                "cannot determine an output filename for {name}: it does not end in {LZ4PACK_EXTENSION}"
            )),
        },
        OpMode::Bench => Ok(Destination::Stdout),
    }
}
