//! LZ4 block compression.
//!
//! One greedy, single-pass encoder serves both table layouts:
//!
//! | Rust item                     | Role                                                |
//! |-------------------------------|-----------------------------------------------------|
//! | [`compress_with_table`]       | generic core over `HashTable` × `ScanWord`          |
//! | [`compress_block`]            | picks the table and word width from a `CodecConfig` |
//! | [`Word8`] / [`Word4`]         | forward match extension, 8 or 4 bytes per step      |
//!
//! The encoder writes into a destination no larger than the source and
//! gives up with [`CompressError::OutputTooSmall`] as soon as the output
//! would not end up smaller; the framer then stores the block raw.
//!
//! Sequence layout: `token | [literal length ext] | literals | offset (LE16)
//! | [match length ext]`, closed by a literal-only sequence.

use super::hash_table::{rent_u16, rent_u32, HashTable};
use super::types::{
    common_bytes32, common_bytes64, equal2, equal4, extension_bytes, wild_copy, write_le16, xor4,
    xor8, LASTLITERALS, LZ4_64KLIMIT, MFLIMIT, MINMATCH, MIN_LENGTH, ML_BITS, ML_MASK, RUN_MASK,
    SKIPSTRENGTH,
};
use crate::config::{CodecConfig, MatchWord, TableMode};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Largest input a block header can describe (`i32` length field).
pub const MAX_INPUT_SIZE: usize = i32::MAX as usize;

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by block compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressError {
    /// The compressed form would not fit in the destination, i.e. it would
    /// not be smaller than the source.
    OutputTooSmall,
    /// The input exceeds [`MAX_INPUT_SIZE`].
    InputTooLarge,
}

impl core::fmt::Display for CompressError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CompressError::OutputTooSmall => f.write_str("compressed block would not shrink"),
            CompressError::InputTooLarge => {
                write!(f, "input exceeds the {MAX_INPUT_SIZE}-byte block limit")
            }
        }
    }
}

impl std::error::Error for CompressError {}

// ─────────────────────────────────────────────────────────────────────────────
// Forward match extension
// ─────────────────────────────────────────────────────────────────────────────

/// Word width used to extend a match forward.
pub trait ScanWord {
    const WIDTH: usize;

    /// `None` when the `WIDTH` bytes at `a` and `b` are equal, otherwise the
    /// number of equal leading bytes.
    fn mismatch(src: &[u8], a: usize, b: usize) -> Option<usize>;
}

/// 8 bytes per step, XOR of two `u64`s.
pub struct Word8;

/// 4 bytes per step, XOR of two `u32`s.
pub struct Word4;

impl ScanWord for Word8 {
    const WIDTH: usize = 8;

    #[inline(always)]
    fn mismatch(src: &[u8], a: usize, b: usize) -> Option<usize> {
        match xor8(src, a, b) {
            0 => None,
            diff => Some(common_bytes64(diff)),
        }
    }
}

impl ScanWord for Word4 {
    const WIDTH: usize = 4;

    #[inline(always)]
    fn mismatch(src: &[u8], a: usize, b: usize) -> Option<usize> {
        match xor4(src, a, b) {
            0 => None,
            diff => Some(common_bytes32(diff)),
        }
    }
}

/// Extend a verified match at `ip`/`reference` as far as `last_literals`.
/// Returns the new `ip`.
#[inline(always)]
fn count_forward<W: ScanWord>(src: &[u8], mut ip: usize, mut reference: usize, last_literals: usize) -> usize {
    while ip < last_literals - (W::WIDTH - 1) {
        match W::mismatch(src, reference, ip) {
            None => {
                ip += W::WIDTH;
                reference += W::WIDTH;
            }
            Some(n) => return ip + n,
        }
    }

    if W::WIDTH > 4 && ip < last_literals - 3 && equal4(src, reference, ip) {
        ip += 4;
        reference += 4;
    }
    if ip < last_literals - 1 && equal2(src, reference, ip) {
        ip += 2;
        reference += 2;
    }
    if ip < last_literals && src[reference] == src[ip] {
        ip += 1;
    }
    ip
}

// ─────────────────────────────────────────────────────────────────────────────
// Length encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Write the extension of a literal run that saturated its nibble: one
/// `0xFF` per 255, then the remainder.
#[inline(always)]
fn write_literal_extension(dst: &mut [u8], mut op: usize, mut len: usize) -> usize {
    while len > 254 {
        dst[op] = 255;
        op += 1;
        len -= 255;
    }
    dst[op] = len as u8;
    op + 1
}

/// Write the extension of a match length that saturated its nibble.
///
/// Emits `0xFF 0xFF` pairs while more than 509 remains, then at most one
/// single `0xFF`, then the remainder. The decoder sums every byte, so this
/// is the same value as the literal scheme.
#[inline(always)]
fn write_match_extension(dst: &mut [u8], mut op: usize, mut len: usize) -> usize {
    while len > 509 {
        dst[op] = 255;
        dst[op + 1] = 255;
        op += 2;
        len -= 510;
    }
    if len > 254 {
        dst[op] = 255;
        op += 1;
        len -= 255;
    }
    dst[op] = len as u8;
    op + 1
}

/// Emit `src[anchor..]` as the closing literal-only sequence.
fn encode_last_literals(src: &[u8], anchor: usize, dst: &mut [u8], mut op: usize) -> Result<usize, CompressError> {
    let last_run = src.len() - anchor;
    if op + last_run + 1 + (last_run + 255 - RUN_MASK) / 255 > dst.len() {
        return Err(CompressError::OutputTooSmall);
    }

    if last_run >= RUN_MASK {
        dst[op] = (RUN_MASK << ML_BITS) as u8;
        op = write_literal_extension(dst, op + 1, last_run - RUN_MASK);
    } else {
        dst[op] = (last_run << ML_BITS) as u8;
        op += 1;
    }

    op += wild_copy(src, anchor, dst, op, op + last_run);
    Ok(op)
}

// ─────────────────────────────────────────────────────────────────────────────
// Core compression loop
// ─────────────────────────────────────────────────────────────────────────────

/// Compress `src` into `dst` using `table` for match finding.
///
/// `table` is reset on entry. Returns the number of bytes written, or
/// `Err(CompressError::OutputTooSmall)` as soon as the stream cannot fit in
/// `dst` with the usual end-of-buffer margins.
pub fn compress_with_table<T: HashTable, W: ScanWord>(
    table: &mut T,
    src: &[u8],
    dst: &mut [u8],
) -> Result<usize, CompressError> {
    table.reset();

    let src_end = src.len();
    let dst_end = dst.len();
    let mut anchor = 0usize;
    let mut op = 0usize;

    if src_end < MIN_LENGTH {
        return encode_last_literals(src, anchor, dst, op);
    }

    let mflimit = src_end - MFLIMIT;
    let last_literals = src_end - LASTLITERALS;

    // First byte
    let h = table.hash(src, 0);
    table.put(h, 0);
    let mut ip = 1usize;
    let mut h_fwd = table.hash(src, ip);

    'main: loop {
        // ── Find a match ────────────────────────────────────────────────────
        let mut attempts: usize = (1 << SKIPSTRENGTH) + 3;
        let mut fwd = ip;
        let mut reference;
        loop {
            let h = h_fwd;
            let step = attempts >> SKIPSTRENGTH;
            attempts += 1;
            ip = fwd;
            fwd = ip + step;

            if fwd > mflimit {
                break 'main;
            }

            h_fwd = table.hash(src, fwd);
            reference = table.get(h);
            table.put(h, ip);

            if T::in_window(reference, ip) && equal4(src, reference, ip) {
                break;
            }
        }

        // ── Catch up ────────────────────────────────────────────────────────
        while ip > anchor && reference > 0 && src[ip - 1] == src[reference - 1] {
            ip -= 1;
            reference -= 1;
        }

        // ── Encode literal length and copy literals ────────────────────────
        let length = ip - anchor;
        let mut token = op;
        op += 1;

        if op + length + (length >> 8) + (2 + 1 + LASTLITERALS) > dst_end {
            return Err(CompressError::OutputTooSmall);
        }

        if length >= RUN_MASK {
            dst[token] = (RUN_MASK << ML_BITS) as u8;
            let ext = extension_bytes(length);
            if op + ext + length + 2 > dst_end {
                return Err(CompressError::OutputTooSmall);
            }
            op = write_literal_extension(dst, op, length - RUN_MASK);
        } else {
            dst[token] = (length << ML_BITS) as u8;
        }
        op += wild_copy(src, anchor, dst, op, op + length);

        // ── Sequences: offset, match length, and direct follow-up matches ──
        loop {
            write_le16(dst, op, (ip - reference) as u16);
            op += 2;

            ip += MINMATCH;
            reference += MINMATCH;
            anchor = ip;
            ip = count_forward::<W>(src, ip, reference, last_literals);

            let len = ip - anchor;
            if op + (len >> 8) + (1 + LASTLITERALS) > dst_end {
                return Err(CompressError::OutputTooSmall);
            }
            if len >= ML_MASK {
                if op + extension_bytes(len) > dst_end {
                    return Err(CompressError::OutputTooSmall);
                }
                dst[token] += ML_MASK as u8;
                op = write_match_extension(dst, op, len - ML_MASK);
            } else {
                dst[token] += len as u8;
            }

            // Test end of chunk
            if ip > mflimit {
                anchor = ip;
                break 'main;
            }

            // Fill table
            let h = table.hash(src, ip - 2);
            table.put(h, ip - 2);

            // Test next position
            let h = table.hash(src, ip);
            reference = table.get(h);
            table.put(h, ip);
            if !(T::in_window(reference, ip) && equal4(src, reference, ip)) {
                break;
            }

            if op + 3 > dst_end {
                return Err(CompressError::OutputTooSmall);
            }
            token = op;
            dst[token] = 0;
            op += 1;
        }

        // Prepare next loop
        anchor = ip;
        ip += 1;
        h_fwd = table.hash(src, ip);
    }

    encode_last_literals(src, anchor, dst, op)
}

/// Compress one block with the table layout and word width chosen by
/// `config`.
///
/// `dst` is normally exactly `src.len()` bytes: the caller wants either a
/// strictly smaller encoding or nothing.
pub fn compress_block(src: &[u8], dst: &mut [u8], config: &CodecConfig) -> Result<usize, CompressError> {
    if src.len() > MAX_INPUT_SIZE {
        return Err(CompressError::InputTooLarge);
    }

    let memory_usage = config.memory_usage;
    let small = config.table_mode == TableMode::Auto && src.len() < LZ4_64KLIMIT;

    if small {
        let mut table = rent_u16(memory_usage);
        match config.match_word {
            MatchWord::Word8 => compress_with_table::<_, Word8>(&mut *table, src, dst),
            MatchWord::Auto | MatchWord::Word4 => compress_with_table::<_, Word4>(&mut *table, src, dst),
        }
    } else {
        let mut table = rent_u32(memory_usage);
        match config.match_word {
            MatchWord::Word4 => compress_with_table::<_, Word4>(&mut *table, src, dst),
            MatchWord::Auto | MatchWord::Word8 => compress_with_table::<_, Word8>(&mut *table, src, dst),
        }
    }
}

/// Compress with the default configuration into a freshly sized buffer.
///
/// Returns `None` when the encoding does not fit in `src.len()` bytes.
pub fn compress_block_to_vec(src: &[u8]) -> Option<Vec<u8>> {
    let mut dst = vec![0u8; src.len()];
    let n = compress_block(src, &mut dst, &CodecConfig::default()).ok()?;
    dst.truncate(n);
    Some(dst)
}
