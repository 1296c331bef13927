/***************************************************************************************************
 * Copyright (c) 2021-2023 Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
//! The `Source` abstraction: the pluggable read side of the wire boundary. A `Source` need not
//! hold its bytes contiguously in memory; `BufferSource` is the trivial contiguous case and
//! `ReaderSource` (std-only) adapts an arbitrary `std::io::Read`.
use crate::error::{CBORError, Result};

/// A position-addressable byte source. Positions are plain `usize` offsets from the start of
/// the stream; they are opaque to callers (the cursor stores them, never arithmetic on them)
/// but are cheap `Copy` values rather than an associated type, since both the contiguous and
/// pull-based implementations can express "how far into the stream" as a single integer.
pub trait Source {
    /// Returns true if `len` bytes starting at `pos` are available without blocking or pulling
    /// further input. Never mutates the source.
    fn can_read_bytes(&self, pos: usize, len: usize) -> bool;

    /// Returns a contiguous slice of `len` bytes starting at `pos`, if currently resident.
    /// Implementations that cannot always provide a contiguous slice (e.g. a ring buffer that
    /// wraps) return `None`, in which case the caller falls back to `transfer_string` or to
    /// `advance_bytes` plus a destination buffer.
    fn read_bytes(&self, pos: usize, len: usize) -> Option<&[u8]>;

    /// Advances the source's notion of "current position" by `len` bytes, pulling more input
    /// if needed. Mutates the source; used when walking past data the caller does not need a
    /// view of (e.g. skipping an unused value).
    fn advance_bytes(&mut self, pos: usize, len: usize) -> Result<()>;

    /// Guarantees that a subsequent `read_bytes(pos, len)` will succeed, pulling input if the
    /// source is pull-based. Does not otherwise change the source's logical position; this is
    /// the hook pre-parse uses to peek a head before deciding how many bytes it spans.
    fn ensure(&mut self, pos: usize, len: usize) -> Result<()>;

    /// Copies `len` bytes starting at `pos` into `dest`, pulling input as necessary. Used for
    /// copying a string's content out of a source that cannot guarantee a contiguous view.
    fn transfer_string(&mut self, pos: usize, len: usize, dest: &mut [u8]) -> Result<()>;

    /// The total number of bytes currently known to be available from `pos` onward, or `None`
    /// if the source's total length cannot be determined without consuming it.
    fn remaining_from(&self, pos: usize) -> Option<usize>;
}

/// A `Source` backed by a single contiguous, already fully resident byte slice. This is the
/// zero-copy default: `read_bytes` always succeeds for in-bounds ranges and no data is ever
/// copied unless the caller explicitly asks for it via `transfer_string`.
#[derive(Copy, Clone, Debug)]
pub struct BufferSource<'buf> {
    bytes: &'buf [u8],
}

impl<'buf> BufferSource<'buf> {
    /// Wraps `bytes` as a source. The entire slice is considered resident from offset 0.
    pub fn new(bytes: &'buf [u8]) -> Self {
        BufferSource { bytes }
    }

    /// The total length of the underlying slice.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the underlying slice is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl<'buf> Source for BufferSource<'buf> {
    fn can_read_bytes(&self, pos: usize, len: usize) -> bool {
        pos.checked_add(len).map_or(false, |end| end <= self.bytes.len())
    }

    fn read_bytes(&self, pos: usize, len: usize) -> Option<&[u8]> {
        let end = pos.checked_add(len)?;
        self.bytes.get(pos..end)
    }

    fn advance_bytes(&mut self, pos: usize, len: usize) -> Result<()> {
        if self.can_read_bytes(pos, len) {
            Ok(())
        } else {
            Err(CBORError::UnexpectedEOF)
        }
    }

    fn transfer_string(&mut self, pos: usize, len: usize, dest: &mut [u8]) -> Result<()> {
        let src = self.read_bytes(pos, len).ok_or(CBORError::UnexpectedEOF)?;
        if dest.len() < len {
            return Err(CBORError::OutOfMemory);
        }
        dest[..len].copy_from_slice(src);
        Ok(())
    }

    fn remaining_from(&self, pos: usize) -> Option<usize> {
        self.bytes.len().checked_sub(pos)
    }

    fn ensure(&mut self, pos: usize, len: usize) -> Result<()> {
        self.advance_bytes(pos, len)
    }
}

/// A `Source` that pulls bytes from an arbitrary `std::io::Read`, buffering internally so that
/// already-read bytes remain available to `read_bytes`. Positions below the internal buffer's
/// start are no longer resident and return `None`/an error, matching the forward-only nature of
/// a non-seekable reader.
#[cfg(feature = "std")]
pub struct ReaderSource<R> {
    reader: R,
    buf: alloc::vec::Vec<u8>,
    base: usize,
}

#[cfg(feature = "std")]
impl<R: std::io::Read> ReaderSource<R> {
    /// Wraps `reader` as a source with no bytes yet pulled.
    pub fn new(reader: R) -> Self {
        ReaderSource {
            reader,
            buf: alloc::vec::Vec::new(),
            base: 0,
        }
    }

    fn fill_to(&mut self, end: usize) -> Result<()> {
        while self.base + self.buf.len() < end {
            let mut chunk = [0u8; 256];
            let n = self.reader.read(&mut chunk).map_err(|_| CBORError::IO)?;
            if n == 0 {
                return Err(CBORError::UnexpectedEOF);
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Source for ReaderSource<R> {
    fn can_read_bytes(&self, pos: usize, len: usize) -> bool {
        pos >= self.base && pos - self.base + len <= self.buf.len()
    }

    fn read_bytes(&self, pos: usize, len: usize) -> Option<&[u8]> {
        if pos < self.base {
            return None;
        }
        let start = pos - self.base;
        let end = start.checked_add(len)?;
        self.buf.get(start..end)
    }

    fn advance_bytes(&mut self, pos: usize, len: usize) -> Result<()> {
        self.fill_to(pos + len)
    }

    fn transfer_string(&mut self, pos: usize, len: usize, dest: &mut [u8]) -> Result<()> {
        self.fill_to(pos + len)?;
        let src = self.read_bytes(pos, len).ok_or(CBORError::InternalError)?;
        if dest.len() < len {
            return Err(CBORError::OutOfMemory);
        }
        dest[..len].copy_from_slice(src);
        Ok(())
    }

    fn remaining_from(&self, _pos: usize) -> Option<usize> {
        None
    }

    fn ensure(&mut self, pos: usize, len: usize) -> Result<()> {
        self.fill_to(pos + len)
    }
}
