//! Block framing and the single-shot API.
//!
//! Every block is an 8-byte header followed by its payload:
//!
//! ```text
//! [unpacked_length: i32 LE][packed_length: i32 LE][payload]
//! ```
//!
//! `packed_length == 0` marks a stored block whose payload is
//! `unpacked_length` raw bytes; otherwise the payload is `packed_length`
//! bytes of token stream and `packed_length < unpacked_length`. An all-zero
//! header ends a sequence of blocks. Empty input frames to nothing at all.

use crate::block::{compress_block, decompress_block, CompressError, DecodeError, DecodeErrorKind, MAX_INPUT_SIZE};
use crate::config::CodecConfig;

/// Size of the block header.
pub const HEADER_SIZE: usize = 8;

/// Upper bound on decoded bytes per token-stream byte: one extension byte
/// adds at most 255 to a length, and every other byte yields less.
pub const MAX_EXPANSION: usize = 255;

// ─────────────────────────────────────────────────────────────────────────────
// Header
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockHeader {
    pub unpacked_length: i32,
    pub packed_length: i32,
}

impl BlockHeader {
    /// Read a header from the first 8 bytes of `buf`, or `None` if it is
    /// shorter than that.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let bytes: &[u8; HEADER_SIZE] = buf.get(..HEADER_SIZE)?.try_into().ok()?;
        Some(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            unpacked_length: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            packed_length: i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        self.write(&mut bytes);
        bytes
    }

    /// Write the header into `out[..8]`.
    pub fn write(&self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.unpacked_length.to_le_bytes());
        out[4..HEADER_SIZE].copy_from_slice(&self.packed_length.to_le_bytes());
    }

    /// All-zero header: end of the block sequence.
    pub fn is_terminator(&self) -> bool {
        self.unpacked_length == 0 && self.packed_length == 0
    }

    pub fn is_stored(&self) -> bool {
        self.packed_length == 0
    }

    /// Check the length invariants; `offset` is where the header starts and
    /// is reported in the error.
    pub fn validate(&self, offset: usize) -> Result<(), DecodeError> {
        if self.unpacked_length < 0 || self.packed_length < 0 {
            return Err(DecodeError::new(DecodeErrorKind::MalformedHeader, offset));
        }
        if self.packed_length != 0 && self.packed_length >= self.unpacked_length {
            return Err(DecodeError::new(DecodeErrorKind::LengthInvariantViolation, offset));
        }
        Ok(())
    }

    /// Bytes that follow the header. Only meaningful once validated.
    pub fn payload_len(&self) -> usize {
        if self.is_stored() {
            self.unpacked_length as usize
        } else {
            self.packed_length as usize
        }
    }
}

/// `(unpacked_length, packed_length)` of the first block in `buf`, or
/// `(0, 0)` when fewer than 8 bytes are available.
pub fn packed_lengths(buf: &[u8]) -> (i32, i32) {
    BlockHeader::parse(buf)
        .map(|h| (h.unpacked_length, h.packed_length))
        .unwrap_or((0, 0))
}

// ─────────────────────────────────────────────────────────────────────────────
// Codec
// ─────────────────────────────────────────────────────────────────────────────

/// A configured codec. Cheap to copy; holds no buffers, so one value may be
/// shared by any number of threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Frame `input` as one block. Empty input gives empty output; input
    /// that does not shrink is stored raw, so the result is never more than
    /// `input.len() + 8` bytes.
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CompressError> {
        let mut out = Vec::new();
        self.compress_into(input, &mut out)?;
        Ok(out)
    }

    /// Append one framed block for `input` to `out`. Returns the number of
    /// bytes appended; on error `out` is unchanged.
    pub fn compress_into(&self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, CompressError> {
        if input.is_empty() {
            return Ok(0);
        }
        if input.len() > MAX_INPUT_SIZE {
            return Err(CompressError::InputTooLarge);
        }

        let start = out.len();
        out.resize(start + HEADER_SIZE + input.len(), 0);
        let body = &mut out[start + HEADER_SIZE..];

        let packed = match compress_block(input, body, &self.config) {
            Ok(n) if n < input.len() => n,
            Ok(_) | Err(CompressError::OutputTooSmall) => {
                body.copy_from_slice(input);
                0
            }
            Err(e) => {
                out.truncate(start);
                return Err(e);
            }
        };

        let header = BlockHeader {
            unpacked_length: input.len() as i32,
            packed_length: packed as i32,
        };
        header.write(&mut out[start..start + HEADER_SIZE]);

        let written = HEADER_SIZE + header.payload_len();
        out.truncate(start + written);
        Ok(written)
    }

    /// Decode a sequence of framed blocks. Stops at the end of `input` or
    /// at an all-zero header. Fails as a whole: no partial output.
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        self.decompress_into(input, &mut out)?;
        Ok(out)
    }

    /// Append the decoded content of `input` to `out`. Returns the number of
    /// bytes appended; on error `out` is restored to its previous length.
    pub fn decompress_into(&self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, DecodeError> {
        let start = out.len();
        match decode_blocks(input, out) {
            Ok(()) => Ok(out.len() - start),
            Err(e) => {
                out.truncate(start);
                Err(e)
            }
        }
    }
}

/// Decode one block whose header has already been validated. `payload` is
/// exactly `header.payload_len()` bytes; `base` is its offset for errors.
pub(crate) fn decode_block_into(header: &BlockHeader, payload: &[u8], base: usize, out: &mut Vec<u8>) -> Result<(), DecodeError> {
    if header.is_stored() {
        out.extend_from_slice(payload);
        return Ok(());
    }
    let unpacked = header.unpacked_length as usize;
    if unpacked > payload.len().saturating_mul(MAX_EXPANSION) {
        // Cannot be reached by this payload; refuse before allocating.
        return Err(DecodeError::new(DecodeErrorKind::TruncatedInput, base + payload.len()));
    }
    let at = out.len();
    out.resize(at + unpacked, 0);
    decompress_block(payload, &mut out[at..]).map_err(|e| e.rebase(base))?;
    Ok(())
}

fn decode_blocks(input: &[u8], out: &mut Vec<u8>) -> Result<(), DecodeError> {
    let mut pos = 0usize;
    while pos < input.len() {
        let Some(header) = BlockHeader::parse(&input[pos..]) else {
            return Err(DecodeError::new(DecodeErrorKind::TruncatedInput, pos));
        };
        if header.is_terminator() {
            break;
        }
        header.validate(pos)?;

        let payload_start = pos + HEADER_SIZE;
        let payload_len = header.payload_len();
        if input.len() - payload_start < payload_len {
            return Err(DecodeError::new(DecodeErrorKind::TruncatedInput, payload_start));
        }
        let payload = &input[payload_start..payload_start + payload_len];
        decode_block_into(&header, payload, payload_start, out)?;
        pos = payload_start + payload_len;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Single-shot API
// ─────────────────────────────────────────────────────────────────────────────

/// [`Codec::compress`] with the default configuration.
pub fn compress(input: &[u8]) -> Result<Vec<u8>, CompressError> {
    Codec::default().compress(input)
}

/// [`Codec::decompress`] with the default configuration.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    Codec::default().decompress(input)
}
