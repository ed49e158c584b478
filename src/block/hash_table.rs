//! Match-finder hash tables and their per-thread pool.
//!
//! A table maps the multiplicative hash of a 4-byte little-endian word to
//! the most recent input position that produced it. Positions are stored
//! truncated to the table's entry width; stale or colliding entries are
//! harmless because the encoder re-checks the candidate's bytes.
//!
//! Two layouts exist:
//!
//! | Table       | Entry | Slots                     | Used for                       |
//! |-------------|-------|---------------------------|--------------------------------|
//! | [`TableU32`] | `u32` | `1 << (memory_usage - 2)` | inputs `>= LZ4_64KLIMIT`       |
//! | [`TableU16`] | `u16` | `1 << (memory_usage - 1)` | inputs `<  LZ4_64KLIMIT`       |
//!
//! Tables are scratch memory scoped to one encode call. [`rent_u32`] and
//! [`rent_u16`] hand out a table from a thread-local pool (the encoder zeroes
//! it on entry) and the returned guard puts it back when dropped, on success
//! and failure alike.

use core::cell::RefCell;
use core::ops::{Deref, DerefMut};

use super::types::{read_le32, MAX_DISTANCE, MINMATCH, MULTIPLIER};

// ─────────────────────────────────────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Storage for the encoder's position index.
pub trait HashTable {
    /// Number of hash bits kept; the table has `1 << hash_log()` slots.
    fn hash_log(&self) -> u32;

    /// Zero every slot.
    fn reset(&mut self);

    fn get(&self, h: usize) -> usize;

    fn put(&mut self, h: usize, pos: usize);

    /// Whether a candidate found at `reference` may be used from `pos`.
    fn in_window(reference: usize, pos: usize) -> bool;

    /// Hash of the 4-byte word at `src[pos..pos + 4]`.
    #[inline(always)]
    fn hash(&self, src: &[u8], pos: usize) -> usize {
        (read_le32(src, pos).wrapping_mul(MULTIPLIER) >> (MINMATCH as u32 * 8 - self.hash_log()))
            as usize
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 32-bit table
// ─────────────────────────────────────────────────────────────────────────────

/// Table with 32-bit position entries.
#[derive(Debug, Clone)]
pub struct TableU32 {
    slots: Vec<u32>,
    hash_log: u32,
}

impl TableU32 {
    /// Hash bits for a given memory-usage exponent.
    pub const fn hash_log_for(memory_usage: u32) -> u32 {
        memory_usage - 2
    }

    pub fn new(memory_usage: u32) -> Self {
        let hash_log = Self::hash_log_for(memory_usage);
        Self { slots: vec![0; 1 << hash_log], hash_log }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn resize(&mut self, memory_usage: u32) {
        self.hash_log = Self::hash_log_for(memory_usage);
        self.slots.resize(1 << self.hash_log, 0);
    }
}

impl HashTable for TableU32 {
    #[inline(always)]
    fn hash_log(&self) -> u32 {
        self.hash_log
    }

    fn reset(&mut self) {
        self.slots.fill(0);
    }

    #[inline(always)]
    fn get(&self, h: usize) -> usize {
        self.slots[h] as usize
    }

    #[inline(always)]
    fn put(&mut self, h: usize, pos: usize) {
        self.slots[h] = pos as u32;
    }

    /// Entries from earlier than `MAX_DISTANCE` bytes back are stale.
    #[inline(always)]
    fn in_window(reference: usize, pos: usize) -> bool {
        pos.wrapping_sub(reference) <= MAX_DISTANCE
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 16-bit table
// ─────────────────────────────────────────────────────────────────────────────

/// Table with 16-bit position entries; only valid for inputs shorter than
/// `LZ4_64KLIMIT`, where every stored position fits and every offset is in
/// range.
#[derive(Debug, Clone)]
pub struct TableU16 {
    slots: Vec<u16>,
    hash_log: u32,
}

impl TableU16 {
    /// One bit more than [`TableU32`]: the same memory holds twice the slots.
    pub const fn hash_log_for(memory_usage: u32) -> u32 {
        memory_usage - 1
    }

    pub fn new(memory_usage: u32) -> Self {
        let hash_log = Self::hash_log_for(memory_usage);
        Self { slots: vec![0; 1 << hash_log], hash_log }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn resize(&mut self, memory_usage: u32) {
        self.hash_log = Self::hash_log_for(memory_usage);
        self.slots.resize(1 << self.hash_log, 0);
    }
}

impl HashTable for TableU16 {
    #[inline(always)]
    fn hash_log(&self) -> u32 {
        self.hash_log
    }

    fn reset(&mut self) {
        self.slots.fill(0);
    }

    #[inline(always)]
    fn get(&self, h: usize) -> usize {
        self.slots[h] as usize
    }

    #[inline(always)]
    fn put(&mut self, h: usize, pos: usize) {
        debug_assert!(pos <= u16::MAX as usize, "position overflows a 16-bit table");
        self.slots[h] = pos as u16;
    }

    #[inline(always)]
    fn in_window(_reference: usize, _pos: usize) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Thread-local pool
// ─────────────────────────────────────────────────────────────────────────────

thread_local! {
    static POOL_U32: RefCell<Vec<TableU32>> = const { RefCell::new(Vec::new()) };
    static POOL_U16: RefCell<Vec<TableU16>> = const { RefCell::new(Vec::new()) };
}

/// Tables above this many per thread are dropped instead of pooled.
const POOL_CAPACITY: usize = 4;

/// A table on loan from the pool; returned when dropped.
pub struct Rented<T: Pooled> {
    table: T,
}

/// Tables that can live in the thread-local pool.
pub trait Pooled: HashTable + Sized {
    /// A slot-less placeholder; allocates nothing.
    fn empty() -> Self;
    fn take(memory_usage: u32) -> Self;
    fn give_back(self);
}

impl Pooled for TableU32 {
    fn empty() -> Self {
        Self { slots: Vec::new(), hash_log: 0 }
    }

    fn take(memory_usage: u32) -> Self {
        let pooled = POOL_U32.with(|pool| pool.borrow_mut().pop());
        match pooled {
            Some(mut table) => {
                table.resize(memory_usage);
                table
            }
            None => TableU32::new(memory_usage),
        }
    }

    fn give_back(self) {
        // The pool may already be gone during thread teardown.
        let _ = POOL_U32.try_with(|pool| {
            let mut pool = pool.borrow_mut();
            if pool.len() < POOL_CAPACITY {
                pool.push(self);
            }
        });
    }
}

impl Pooled for TableU16 {
    fn empty() -> Self {
        Self { slots: Vec::new(), hash_log: 0 }
    }

    fn take(memory_usage: u32) -> Self {
        let pooled = POOL_U16.with(|pool| pool.borrow_mut().pop());
        match pooled {
            Some(mut table) => {
                table.resize(memory_usage);
                table
            }
            None => TableU16::new(memory_usage),
        }
    }

    fn give_back(self) {
        // The pool may already be gone during thread teardown.
        let _ = POOL_U16.try_with(|pool| {
            let mut pool = pool.borrow_mut();
            if pool.len() < POOL_CAPACITY {
                pool.push(self);
            }
        });
    }
}

/// Borrow a 32-bit table sized for `memory_usage`.
pub fn rent_u32(memory_usage: u32) -> Rented<TableU32> {
    Rented { table: TableU32::take(memory_usage) }
}

/// Borrow a 16-bit table sized for `memory_usage`.
pub fn rent_u16(memory_usage: u32) -> Rented<TableU16> {
    Rented { table: TableU16::take(memory_usage) }
}

impl<T: Pooled> Deref for Rented<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.table
    }
}

impl<T: Pooled> DerefMut for Rented<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.table
    }
}

impl<T: Pooled> Drop for Rented<T> {
    fn drop(&mut self) {
        core::mem::replace(&mut self.table, T::empty()).give_back();
    }
}
