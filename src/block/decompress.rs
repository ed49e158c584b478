//! LZ4 block decompression.
//!
//! A single decoder serves every encoder configuration: the token stream
//! does not record which hash table or word width produced it.
//!
//! # Bounds
//!
//! Malformed input must return a [`DecodeError`] and never panic. Every read
//! from `src` is checked against its length, and every write into `dst` is
//! established before the copy starts:
//!   - a literal run that would leave fewer than `COPYLENGTH` bytes must end
//!     exactly at `dst.len()` (end of block);
//!   - a match must start within the output produced so far;
//!   - a match must leave the final `LASTLITERALS` bytes for literals.

use std::io;

use super::types::{copy_match, read_le16, wild_copy, COPYLENGTH, LASTLITERALS, MINMATCH, ML_BITS, ML_MASK, RUN_MASK};

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// What went wrong while decoding a block or a sequence of framed blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// A header length field is negative.
    MalformedHeader,
    /// A header declares `packed_length >= unpacked_length` with a non-zero
    /// packed length.
    LengthInvariantViolation,
    /// The input ends before a declared payload or token stream does.
    TruncatedInput,
    /// A back-reference of distance 0 or reaching before the block output.
    CorruptOffset,
    /// A literal run or match runs into the end of the block without
    /// finishing it exactly.
    CorruptTrailingLiterals,
    /// The stream source ended inside an 8-byte block header.
    TruncatedHeader,
    /// The stream source ended inside a block payload.
    TruncatedPayload,
}

impl DecodeErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            DecodeErrorKind::MalformedHeader => "negative length in block header",
            DecodeErrorKind::LengthInvariantViolation => {
                "packed length is not smaller than unpacked length"
            }
            DecodeErrorKind::TruncatedInput => "input truncated",
            DecodeErrorKind::CorruptOffset => "match offset outside decoded output",
            DecodeErrorKind::CorruptTrailingLiterals => "block does not end on a literal run",
            DecodeErrorKind::TruncatedHeader => "block header truncated",
            DecodeErrorKind::TruncatedPayload => "block payload truncated",
        }
    }
}

impl core::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decode fault and the source offset where it was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    /// Byte offset into the input being decoded (the token stream for
    /// [`decompress_block`], the framed buffer or stream for the framer and
    /// reader).
    pub offset: usize,
}

impl DecodeError {
    pub const fn new(kind: DecodeErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// Shift the offset by `base`, for errors raised inside a sub-slice.
    pub const fn rebase(self, base: usize) -> Self {
        Self { kind: self.kind, offset: self.offset + base }
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset)
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for io::Error {
    fn from(e: DecodeError) -> Self {
        let kind = match e.kind {
            DecodeErrorKind::TruncatedHeader | DecodeErrorKind::TruncatedPayload => {
                io::ErrorKind::UnexpectedEof
            }
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, e)
    }
}

#[inline(always)]
fn fail<T>(kind: DecodeErrorKind, offset: usize) -> Result<T, DecodeError> {
    Err(DecodeError::new(kind, offset))
}

// ─────────────────────────────────────────────────────────────────────────────
// Length extension
// ─────────────────────────────────────────────────────────────────────────────

/// Sum `0xFF`-continued extension bytes starting at `*ip`, up to and
/// including the first byte below 255.
#[inline(always)]
fn read_extension(src: &[u8], ip: &mut usize) -> Result<usize, DecodeError> {
    let mut total = 0usize;
    loop {
        let Some(&b) = src.get(*ip) else {
            return fail(DecodeErrorKind::TruncatedInput, *ip);
        };
        *ip += 1;
        total += b as usize;
        if b != 255 {
            return Ok(total);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoder
// ─────────────────────────────────────────────────────────────────────────────

/// Decode one block from `src` into `dst`, whose length must be the exact
/// decompressed size.
///
/// Returns the number of `src` bytes consumed. Bytes after the end of the
/// block are left unread.
pub fn decompress_block(src: &[u8], dst: &mut [u8]) -> Result<usize, DecodeError> {
    let src_len = src.len();
    let dst_end = dst.len();
    let mut ip = 0usize;
    let mut op = 0usize;

    loop {
        // Literal length
        let Some(&token) = src.get(ip) else {
            return fail(DecodeErrorKind::TruncatedInput, ip);
        };
        ip += 1;
        let mut length = (token >> ML_BITS) as usize;
        if length == RUN_MASK {
            length += read_extension(src, &mut ip)?;
        }

        // Literals
        let cpy = op + length;
        if cpy + COPYLENGTH > dst_end {
            if cpy != dst_end {
                return fail(DecodeErrorKind::CorruptTrailingLiterals, ip);
            }
            if src_len - ip < length {
                return fail(DecodeErrorKind::TruncatedInput, ip);
            }
            dst[op..cpy].copy_from_slice(&src[ip..ip + length]);
            return Ok(ip + length);
        }
        if src_len - ip < length {
            return fail(DecodeErrorKind::TruncatedInput, ip);
        }
        ip += wild_copy(src, ip, dst, op, cpy);
        op = cpy;

        // Offset
        if src_len - ip < 2 {
            return fail(DecodeErrorKind::TruncatedInput, ip);
        }
        let offset = read_le16(src, ip) as usize;
        if offset == 0 || offset > op {
            return fail(DecodeErrorKind::CorruptOffset, ip);
        }
        ip += 2;

        // Match length
        let mut length = (token as usize) & ML_MASK;
        if length == ML_MASK {
            length += read_extension(src, &mut ip)?;
        }
        length += MINMATCH;

        let match_end = op + length;
        if match_end + LASTLITERALS > dst_end {
            return fail(DecodeErrorKind::CorruptTrailingLiterals, ip);
        }

        copy_match(dst, op, offset, length);
        op = match_end;
    }
}
