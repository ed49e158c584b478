// lz4pack: LZ4 block codec with length-prefixed framing and stream adapters

pub mod display;
pub mod config;
pub mod block;
pub mod codec;
pub mod stream;
pub mod bench;
pub mod cli;

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use block::{CompressError, DecodeError, DecodeErrorKind};
pub use codec::{compress, decompress, packed_lengths, BlockHeader, Codec, HEADER_SIZE};
pub use config::{CodecConfig, MatchWord, TableMode};
pub use stream::{read_packed, write_packed, Lz4PackReader, Lz4PackWriter, STREAM_BLOCK_SIZE};
