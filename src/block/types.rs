//! LZ4 block constants, byte-level primitives and copy helpers.
//!
//! Everything here works on plain slices and indices:
//!   - Format constants (MINMATCH, MFLIMIT, LASTLITERALS, token bit layout)
//!   - Little-endian reads/writes at arbitrary offsets
//!   - 2/4-byte equality tests and 4/8-byte XOR words
//!   - De Bruijn byte-position tables used to measure match length
//!   - `wild_copy` (disjoint regions) and `secure_copy` (self-overlapping
//!     back-references), plus `copy_match`, the decoder's match expander
//!
//! Callers establish bounds before calling in; a panic from these helpers
//! means a caller broke its own invariant, never that input was malformed.

// ─────────────────────────────────────────────────────────────────────────────
// Constants: block format
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum match length encoded in an LZ4 block.
pub const MINMATCH: usize = 4;

/// Width of the decoder's bulk-copy granularity.
pub const COPYLENGTH: usize = 8;

/// Last N bytes of a block are always emitted as literals.
pub const LASTLITERALS: usize = 5;

/// Minimum bytes needed at the input tail to attempt a new match.
pub const MFLIMIT: usize = COPYLENGTH + MINMATCH;

/// Inputs shorter than this are emitted as a single literal run.
pub const MIN_LENGTH: usize = MFLIMIT + 1;

pub const KB: usize = 1 << 10;

/// Inputs below this length use the 16-bit hash table.
pub const LZ4_64KLIMIT: usize = (64 * KB) + (MFLIMIT - 1);

pub const MAXD_LOG: u32 = 16;

/// Largest back-reference distance the 2-byte offset can express.
pub const MAX_DISTANCE: usize = (1 << MAXD_LOG) - 1;

pub const ML_BITS: u32 = 4;
pub const ML_MASK: usize = (1 << ML_BITS) - 1;
pub const RUN_BITS: u32 = 8 - ML_BITS;
pub const RUN_MASK: usize = (1 << RUN_BITS) - 1;

/// Knuth multiplicative hash constant.
pub const MULTIPLIER: u32 = 2_654_435_761;

/// Higher → the encoder searches longer before accelerating over data it
/// considers incompressible.
pub const NOTCOMPRESSIBLE_DETECTIONLEVEL: u32 = 6;

pub const SKIPSTRENGTH: u32 = if NOTCOMPRESSIBLE_DETECTIONLEVEL > 2 {
    NOTCOMPRESSIBLE_DETECTIONLEVEL
} else {
    2
};

// ─────────────────────────────────────────────────────────────────────────────
// Lookup tables
// ─────────────────────────────────────────────────────────────────────────────

/// Pulls the reference back after the first four bytes of a short-gap match
/// so the next 4-byte copy reads a region that no longer overlaps its target.
pub static DECODER_TABLE_32: [usize; 8] = [0, 3, 2, 3, 0, 0, 0, 0];

/// Final reference adjustment after the 8-byte short-gap prefix; leaves a
/// gap that is a multiple of the original offset and at least 8.
pub static DECODER_TABLE_64: [isize; 8] = [0, 0, 0, -1, 0, 1, 2, 3];

/// Byte index of the lowest set bit of a 64-bit word, indexed by
/// `(lowest_bit * DEBRUIJN_MULTIPLIER_64) >> 58`.
pub static DEBRUIJN_TABLE_64: [u8; 64] = [
    0, 0, 0, 0, 0, 1, 1, 2, 0, 3, 1, 3, 1, 4, 2, 7, //
    0, 2, 3, 6, 1, 5, 3, 5, 1, 3, 4, 4, 2, 5, 6, 7, //
    7, 0, 1, 2, 3, 3, 4, 6, 2, 6, 5, 5, 3, 4, 5, 6, //
    7, 1, 2, 4, 6, 4, 4, 5, 7, 2, 6, 5, 7, 6, 7, 7, //
];

pub const DEBRUIJN_MULTIPLIER_64: u64 = 0x0218_A392_CDAB_BD3F;

/// Byte index of the lowest set bit of a 32-bit word, indexed by
/// `(lowest_bit * DEBRUIJN_MULTIPLIER_32) >> 27`.
pub static DEBRUIJN_TABLE_32: [u8; 32] = [
    0, 0, 3, 0, 3, 1, 3, 0, 3, 2, 2, 1, 3, 2, 0, 1, //
    3, 3, 1, 2, 2, 2, 2, 0, 3, 1, 2, 0, 1, 0, 1, 1, //
];

pub const DEBRUIJN_MULTIPLIER_32: u32 = 0x077C_B531;

// ─────────────────────────────────────────────────────────────────────────────
// Little-endian reads and writes
// ─────────────────────────────────────────────────────────────────────────────

#[inline(always)]
pub fn read_le16(buf: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([buf[pos], buf[pos + 1]])
}

#[inline(always)]
pub fn read_le32(buf: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]])
}

#[inline(always)]
pub fn read_le64(buf: &[u8], pos: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&buf[pos..pos + 8]);
    u64::from_le_bytes(word)
}

#[inline(always)]
pub fn write_le16(buf: &mut [u8], pos: usize, value: u16) {
    buf[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline(always)]
pub fn write_le32(buf: &mut [u8], pos: usize, value: u32) {
    buf[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
}

// ─────────────────────────────────────────────────────────────────────────────
// Equality and XOR words
// ─────────────────────────────────────────────────────────────────────────────

#[inline(always)]
pub fn equal2(buf: &[u8], a: usize, b: usize) -> bool {
    buf[a] == buf[b] && buf[a + 1] == buf[b + 1]
}

#[inline(always)]
pub fn equal4(buf: &[u8], a: usize, b: usize) -> bool {
    read_le32(buf, a) == read_le32(buf, b)
}

#[inline(always)]
pub fn xor4(buf: &[u8], a: usize, b: usize) -> u32 {
    read_le32(buf, a) ^ read_le32(buf, b)
}

#[inline(always)]
pub fn xor8(buf: &[u8], a: usize, b: usize) -> u64 {
    read_le64(buf, a) ^ read_le64(buf, b)
}

/// Number of equal leading bytes given a non-zero little-endian XOR of two
/// 8-byte words.
#[inline(always)]
pub fn common_bytes64(diff: u64) -> usize {
    debug_assert!(diff != 0);
    let lowest = diff & diff.wrapping_neg();
    DEBRUIJN_TABLE_64[(lowest.wrapping_mul(DEBRUIJN_MULTIPLIER_64) >> 58) as usize] as usize
}

/// Number of equal leading bytes given a non-zero little-endian XOR of two
/// 4-byte words.
#[inline(always)]
pub fn common_bytes32(diff: u32) -> usize {
    debug_assert!(diff != 0);
    let lowest = diff & diff.wrapping_neg();
    DEBRUIJN_TABLE_32[(lowest.wrapping_mul(DEBRUIJN_MULTIPLIER_32) >> 27) as usize] as usize
}

// ─────────────────────────────────────────────────────────────────────────────
// Copy primitives
// ─────────────────────────────────────────────────────────────────────────────

/// Copy `src[src_pos..]` into `dst[dst_pos..dst_end]`; the two regions live
/// in different buffers. Returns the number of bytes copied.
#[inline(always)]
pub fn wild_copy(src: &[u8], src_pos: usize, dst: &mut [u8], dst_pos: usize, dst_end: usize) -> usize {
    let len = dst_end - dst_pos;
    dst[dst_pos..dst_end].copy_from_slice(&src[src_pos..src_pos + len]);
    len
}

/// Fill `buf[dst..dst_end]` from the earlier position `src`, where the
/// regions may overlap (`src < dst`). Returns the number of bytes written.
///
/// The span `buf[src..dst]` is periodic with period `dst - src`. Each
/// step copies at most `gap` bytes (so source and target never overlap
/// within one `copy_within`) and afterwards the known-periodic span has
/// doubled, so the next chunk may be twice as large. Once the gap covers
/// what is left the tail goes in a single copy.
pub fn secure_copy(buf: &mut [u8], src: usize, dst: usize, dst_end: usize) -> usize {
    debug_assert!(src < dst);
    let length = dst_end - dst;
    let mut out = dst;
    while out < dst_end {
        let gap = out - src;
        let chunk = gap.min(dst_end - out);
        buf.copy_within(src..src + chunk, out);
        out += chunk;
    }
    length
}

/// Expand a back-reference of `len` bytes starting at `op`, copying from
/// `op - offset`.
///
/// Preconditions (checked by the decoder): `1 <= offset <= op`, `len >= MINMATCH`
/// and `op + len + LASTLITERALS <= buf.len()`. The last condition guarantees
/// the 8-byte prefix stays inside `buf` even when it runs past the match end;
/// those extra bytes are rewritten by the following sequence.
#[inline]
pub fn copy_match(buf: &mut [u8], op: usize, offset: usize, len: usize) {
    let match_end = op + len;
    let mut op = op;
    let mut reference = op - offset;

    if offset < COPYLENGTH {
        // Short gap: the reference overlaps the bytes being written.
        for i in 0..4 {
            buf[op + i] = buf[reference + i];
        }
        op += 4;
        reference += 4;
        reference -= DECODER_TABLE_32[offset];
        buf.copy_within(reference..reference + 4, op);
        op += COPYLENGTH - 4;
        reference = (reference as isize - DECODER_TABLE_64[offset]) as usize;
    } else {
        buf.copy_within(reference..reference + COPYLENGTH, op);
        op += COPYLENGTH;
        reference += COPYLENGTH;
    }

    if op >= match_end {
        return;
    }
    if op - reference >= match_end - op {
        buf.copy_within(reference..reference + (match_end - op), op);
    } else {
        secure_copy(buf, reference, op, match_end);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Varint helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Bytes needed after a saturated nibble to encode `len - 15` with the
/// 255-step continuation scheme (`len >= 15`).
#[inline(always)]
pub fn extension_bytes(len: usize) -> usize {
    debug_assert!(len >= RUN_MASK);
    (len - RUN_MASK) / 255 + 1
}
