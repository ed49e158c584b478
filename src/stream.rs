//! Streaming adapters over the block framer.
//!
//! - [`Lz4PackWriter`] buffers writes and emits one framed block per full
//!   buffer, `flush()`, `finish()` or drop
//! - [`Lz4PackReader`] parses framed blocks on demand and serves their
//!   content as a continuous byte stream
//! - [`write_packed`] / [`read_packed`] are whole-buffer conveniences
//!
//! The output of a writer is exactly the concatenation of single-shot
//! [`compress`](crate::compress) calls, so [`decompress`](crate::decompress)
//! reads it too.

use std::io::{self, Read, Write};

use crate::block::{DecodeError, DecodeErrorKind, LZ4_64KLIMIT};
use crate::codec::{decode_block_into, BlockHeader, Codec, HEADER_SIZE};
use crate::displaylevel;

/// Default writer buffer: the largest block that still takes the 16-bit
/// hash table.
pub const STREAM_BLOCK_SIZE: usize = LZ4_64KLIMIT - 1;

// ─────────────────────────────────────────────────────────────────────────────
// Lz4PackWriter<W>
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming compressor backed by any `W: Write`.
///
/// # Usage
/// ```no_run
/// use lz4pack::Lz4PackWriter;
/// use std::io::Write;
///
/// let mut w = Lz4PackWriter::new(Vec::new());
/// w.write_all(b"hello").unwrap();
/// let packed: Vec<u8> = w.finish().unwrap();
/// ```
pub struct Lz4PackWriter<W: Write> {
    codec: Codec,
    /// Wrapped in `Option` so `finish()` can take ownership.
    inner: Option<W>,
    /// Bytes waiting to become the next block.
    pending: Vec<u8>,
    /// Framed output of the last block.
    framed: Vec<u8>,
    block_size: usize,
    blocks_written: u64,
    /// Sticky error flag: once set, writes fail and `Drop` skips the final
    /// flush.
    errored: bool,
}

impl<W: Write> Lz4PackWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_codec(writer, Codec::default())
    }

    pub fn with_codec(writer: W, codec: Codec) -> Self {
        Self::with_block_size(writer, codec, STREAM_BLOCK_SIZE)
    }

    /// A writer that emits blocks of at most `block_size` bytes (at least 1).
    pub fn with_block_size(writer: W, codec: Codec, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            codec,
            inner: Some(writer),
            pending: Vec::with_capacity(block_size.min(STREAM_BLOCK_SIZE)),
            framed: Vec::new(),
            block_size,
            blocks_written: 0,
            errored: false,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    /// Emit pending bytes, flush the sink and return it.
    ///
    /// Prefer this over dropping the writer: errors on drop are discarded.
    pub fn finish(mut self) -> io::Result<W> {
        if self.errored {
            return Err(io::Error::other("an earlier write failed; packed stream is incomplete"));
        }
        self.emit_block()?;
        let mut writer = self.take_inner()?;
        writer.flush()?;
        Ok(writer)
    }

    /// Same as [`finish`](Self::finish).
    pub fn into_inner(self) -> io::Result<W> {
        self.finish()
    }

    fn take_inner(&mut self) -> io::Result<W> {
        self.inner.take().ok_or_else(|| io::Error::other("writer already finished"))
    }

    fn check_state(&self) -> io::Result<()> {
        if self.errored {
            return Err(io::Error::other("an earlier write failed"));
        }
        Ok(())
    }

    /// Frame `pending` as one block and write it to the sink.
    fn emit_block(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let Some(inner) = self.inner.as_mut() else {
            return Err(io::Error::other("writer already finished"));
        };

        self.framed.clear();
        if let Err(e) = self.codec.compress_into(&self.pending, &mut self.framed) {
            self.errored = true;
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e));
        }
        if let Err(e) = inner.write_all(&self.framed) {
            self.errored = true;
            return Err(e);
        }

        self.blocks_written += 1;
        displaylevel!(
            4,
            "block {}: {} -> {} bytes\n",
            self.blocks_written,
            self.pending.len(),
            self.framed.len()
        );
        self.pending.clear();
        Ok(())
    }
}

impl<W: Write> Write for Lz4PackWriter<W> {
    /// Buffer `buf`, emitting a block each time the buffer fills.
    ///
    /// If the sink fails after earlier blocks of `buf` went out, returns the
    /// count of those bytes; the failure itself surfaces on the next call.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_state()?;
        let mut p = 0usize;
        while p < buf.len() {
            let room = self.block_size - self.pending.len();
            let chunk = room.min(buf.len() - p);
            self.pending.extend_from_slice(&buf[p..p + chunk]);
            if self.pending.len() == self.block_size {
                if let Err(e) = self.emit_block() {
                    // The chunk that did not make it out is not reported as written.
                    self.pending.truncate(self.pending.len() - chunk);
                    return if p > 0 { Ok(p) } else { Err(e) };
                }
            }
            p += chunk;
        }
        Ok(buf.len())
    }

    /// Emit pending bytes as a (possibly short) block, then flush the sink.
    fn flush(&mut self) -> io::Result<()> {
        self.check_state()?;
        self.emit_block()?;
        match self.inner.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for Lz4PackWriter<W> {
    /// Best-effort final flush; errors are ignored. Call
    /// [`Lz4PackWriter::finish`] to observe them.
    fn drop(&mut self) {
        if self.inner.is_none() || self.errored {
            return;
        }
        if self.emit_block().is_ok() {
            if let Some(w) = self.inner.as_mut() {
                let _ = w.flush();
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lz4PackReader<R>
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming decompressor backed by any `R: Read`.
pub struct Lz4PackReader<R: Read> {
    inner: R,
    /// Decoded content of the current block.
    block: Vec<u8>,
    cursor: usize,
    /// Raw payload of the block being fetched.
    payload: Vec<u8>,
    /// Source bytes consumed so far, for error offsets.
    consumed: usize,
    finished: bool,
    /// Sticky failure: once a block fetch fails the source position is lost,
    /// so every later read reports the same fault.
    failure: Option<ReadFailure>,
}

/// What made a reader give up.
#[derive(Debug, Clone, Copy)]
enum ReadFailure {
    Decode(DecodeError),
    Source(io::ErrorKind),
}

impl ReadFailure {
    fn from_io(e: &io::Error) -> Self {
        match e.get_ref().and_then(|inner| inner.downcast_ref::<DecodeError>()) {
            Some(decode) => ReadFailure::Decode(*decode),
            None => ReadFailure::Source(e.kind()),
        }
    }

    fn to_io(self) -> io::Error {
        match self {
            ReadFailure::Decode(e) => e.into(),
            ReadFailure::Source(kind) => io::Error::new(kind, "an earlier read failed; packed stream position is lost"),
        }
    }
}

impl<R: Read> Lz4PackReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: reader,
            block: Vec::new(),
            cursor: 0,
            payload: Vec::new(),
            consumed: 0,
            finished: false,
            failure: None,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Return the source. Decoded bytes not yet read are discarded.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Load the next block. `Ok(false)` at a clean end of the source or at an
    /// all-zero header.
    fn next_block(&mut self) -> io::Result<bool> {
        if self.finished {
            return Ok(false);
        }

        let mut bytes = [0u8; HEADER_SIZE];
        let n = read_full(&mut self.inner, &mut bytes)?;
        if n == 0 {
            self.finished = true;
            return Ok(false);
        }
        if n < HEADER_SIZE {
            return Err(DecodeError::new(DecodeErrorKind::TruncatedHeader, self.consumed).into());
        }

        let header = BlockHeader::from_bytes(&bytes);
        if header.is_terminator() {
            self.finished = true;
            return Ok(false);
        }
        header.validate(self.consumed)?;

        let payload_start = self.consumed + HEADER_SIZE;
        let payload_len = header.payload_len();
        self.payload.clear();
        (&mut self.inner).take(payload_len as u64).read_to_end(&mut self.payload)?;
        if self.payload.len() < payload_len {
            return Err(DecodeError::new(DecodeErrorKind::TruncatedPayload, payload_start).into());
        }

        self.block.clear();
        self.cursor = 0;
        if header.is_stored() {
            std::mem::swap(&mut self.block, &mut self.payload);
        } else {
            decode_block_into(&header, &self.payload, payload_start, &mut self.block)?;
        }
        self.consumed = payload_start + payload_len;

        displaylevel!(4, "read block: {} -> {} bytes\n", payload_len, self.block.len());
        Ok(true)
    }
}

impl<R: Read> Read for Lz4PackReader<R> {
    /// Serve bytes from the current block, fetching the next one when it is
    /// exhausted. Returns `0` at end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.cursor == self.block.len() {
            if let Some(failure) = self.failure {
                return Err(failure.to_io());
            }
            match self.next_block() {
                Ok(true) => {}
                Ok(false) => return Ok(0),
                Err(e) => {
                    // Nothing of a failed block is ever served.
                    self.failure = Some(ReadFailure::from_io(&e));
                    self.block.clear();
                    self.cursor = 0;
                    return Err(e);
                }
            }
        }
        let n = buf.len().min(self.block.len() - self.cursor);
        buf[..n].copy_from_slice(&self.block[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }
}

/// Fill `buf` from `src` as far as the source allows. Returns the number of
/// bytes read; less than `buf.len()` only at end of source.
fn read_full<R: Read>(src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ─────────────────────────────────────────────────────────────────────────────
// Convenience functions
// ─────────────────────────────────────────────────────────────────────────────

/// Pack `data` through a default writer into `writer` and return it.
pub fn write_packed<W: Write>(data: &[u8], writer: W) -> io::Result<W> {
    let mut w = Lz4PackWriter::new(writer);
    w.write_all(data)?;
    w.finish()
}

/// Read a whole packed stream from `reader`.
pub fn read_packed<R: Read>(reader: R) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    Lz4PackReader::new(reader).read_to_end(&mut out)?;
    Ok(out)
}
