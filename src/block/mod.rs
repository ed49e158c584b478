//! LZ4 block compression and decompression.
//!
//! The raw token-stream engine with no header or framing: one encoder
//! generic over its hash table and match word, and one decoder.

pub mod compress;
pub mod decompress;
pub mod hash_table;
pub mod types;

pub use compress::{compress_block, compress_block_to_vec, compress_with_table, CompressError, ScanWord, Word4, Word8, MAX_INPUT_SIZE};
pub use decompress::{decompress_block, DecodeError, DecodeErrorKind};
pub use hash_table::{HashTable, TableU16, TableU32};
pub use types::{LZ4_64KLIMIT, MAX_DISTANCE};
