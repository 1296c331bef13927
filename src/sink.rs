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
//! The `Sink` abstraction: the pluggable write side of the wire boundary.
use crate::error::{CBORError, Result};

/// A byte sink the encoder writes to. `write` is infallible with respect to space: a sink that
/// cannot hold everything still reports how many bytes it is short by, via
/// `shortfall`, so the encoder can surface `Encoder::extra_bytes_needed` without re-running the
/// whole encode.
pub trait Sink {
    /// Appends `bytes` to the sink. Implementations that run out of room still track how many
    /// bytes were requested in total, accumulating a shortfall, rather than returning early.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// The number of bytes written to the sink so far (including any that overflowed).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// If the sink has ever run out of space, the number of additional bytes that would have
    /// been needed to hold everything written to it. Zero if the sink never overflowed.
    fn shortfall(&self) -> usize;
}

/// A `Sink` backed by a caller-owned, fixed-capacity byte slice. Writes beyond capacity are not
/// performed, but are still counted towards `len`/`shortfall`, matching tinycbor's
/// `cbor_encoder_get_extra_bytes_needed` convention of letting an encode run to completion
/// against an oversized "probe" to discover exactly how much space is required.
pub struct BufferSink<'buf> {
    buf: &'buf mut [u8],
    written: usize,
    shortfall: usize,
}

impl<'buf> BufferSink<'buf> {
    /// Wraps `buf` as a sink with nothing yet written.
    pub fn new(buf: &'buf mut [u8]) -> Self {
        BufferSink {
            buf,
            written: 0,
            shortfall: 0,
        }
    }

    /// The bytes written so far, if they all fit; `None` if the sink ever overflowed.
    pub fn as_slice(&self) -> Option<&[u8]> {
        if self.shortfall == 0 {
            Some(&self.buf[..self.written])
        } else {
            None
        }
    }
}

impl<'buf> Sink for BufferSink<'buf> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let capacity = self.buf.len();
        let room = capacity.saturating_sub(self.written);
        let take = room.min(bytes.len());
        self.buf[self.written..self.written + take].copy_from_slice(&bytes[..take]);
        self.shortfall += bytes.len() - take;
        self.written += take;
        Ok(())
    }

    fn len(&self) -> usize {
        self.written
    }

    fn shortfall(&self) -> usize {
        self.shortfall
    }
}

/// A `Sink` that forwards every write to a caller-supplied closure, for streaming output to a
/// transport that is not a flat buffer (a socket, a framed channel, and so on). The closure
/// reports failure via `Err`, which the sink surfaces as `CBORError::IO`.
pub struct CallbackSink<'f> {
    write_fn: &'f mut dyn FnMut(&[u8]) -> core::result::Result<(), ()>,
    written: usize,
}

impl<'f> CallbackSink<'f> {
    /// Wraps `write_fn` as a sink. Every accepted write calls `write_fn` exactly once.
    pub fn new(write_fn: &'f mut dyn FnMut(&[u8]) -> core::result::Result<(), ()>) -> Self {
        CallbackSink {
            write_fn,
            written: 0,
        }
    }
}

impl<'f> Sink for CallbackSink<'f> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (self.write_fn)(bytes).map_err(|_| CBORError::IO)?;
        self.written += bytes.len();
        Ok(())
    }

    fn len(&self) -> usize {
        self.written
    }

    fn shortfall(&self) -> usize {
        0
    }
}
