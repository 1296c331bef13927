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
//! The streaming encoder. An `Encoder` borrows a `Sink` exclusively; `create_array`/`create_map`
//! reborrow that same sink into a child `Encoder` rather than copying a pointer the way tinycbor's
//! C API does, so the parent cannot be used again until the child is closed.
use crate::constants::*;
use crate::error::{CBORError, Result};
use crate::sink::Sink;
use crate::wire;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Run-time options controlling the encoder's own checks.
#[derive(Copy, Clone, Debug)]
pub struct EncoderOptions {
    /// When true, `create_array`/`create_map`/`encode_tag` count against `max_nesting`.
    pub check_nesting: bool,
    /// Maximum container/tag nesting depth permitted when `check_nesting` is set.
    pub max_nesting: u32,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            check_nesting: true,
            max_nesting: 32,
        }
    }
}

/// Which IEEE 754 width `Encoder::encode_floating_point` writes. The caller picks the width —
/// typically because it was observed on a parsed `Cursor` (`ItemType::Float`'s `ai` field) and
/// is being re-emitted verbatim rather than re-narrowed — so that a `double` read back from the
/// wire is not silently shrunk to a `half` on re-encode.
#[cfg(feature = "float")]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FloatWidth {
    /// IEEE 754 binary16.
    Half,
    /// IEEE 754 binary32.
    Single,
    /// IEEE 754 binary64.
    Double,
}

/// How many more elements the current container expects, or that it is indefinite-length and
/// closes only on an explicit `close_container` call.
#[derive(Copy, Clone, Debug)]
enum Remaining {
    Definite(u64),
    Indefinite,
    /// Not a container: the top-level encoder, or a finished child.
    NotContainer,
}

/// A streaming CBOR encoder over a borrowed `Sink`. Each container level is represented by its
/// own `Encoder` value, borrowing the same underlying sink as its parent.
pub struct Encoder<'s, S: Sink> {
    sink: &'s mut S,
    remaining: Remaining,
    depth: u32,
    options: EncoderOptions,
}

impl<'s, S: Sink> Encoder<'s, S> {
    /// Creates a top-level encoder writing into `sink`.
    pub fn new(sink: &'s mut S) -> Self {
        Encoder {
            sink,
            remaining: Remaining::NotContainer,
            depth: 0,
            options: EncoderOptions::default(),
        }
    }

    /// Creates a top-level encoder with explicit options.
    pub fn with_options(sink: &'s mut S, options: EncoderOptions) -> Self {
        Encoder {
            sink,
            remaining: Remaining::NotContainer,
            depth: 0,
            options,
        }
    }

    fn check_depth(&self) -> Result<()> {
        if self.options.check_nesting && self.depth >= self.options.max_nesting {
            Err(CBORError::NestingTooDeep)
        } else {
            Ok(())
        }
    }

    fn consume_one(&mut self) -> Result<()> {
        match &mut self.remaining {
            Remaining::Definite(n) => {
                if *n == 0 {
                    return Err(CBORError::ContainerNotCompleted);
                }
                *n -= 1;
                Ok(())
            }
            Remaining::Indefinite | Remaining::NotContainer => Ok(()),
        }
    }

    fn emit_head(&mut self, major_type: u8, argument: u64) -> Result<()> {
        let mut buf = [0u8; 9];
        let n = wire::encode_head(major_type, argument, &mut buf)?;
        self.sink.write(&buf[..n])
    }

    /// Encodes an unsigned integer.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn encode_uint(&mut self, value: u64) -> Result<()> {
        self.consume_one()?;
        self.emit_head(MT_UINT, value)
    }

    /// Encodes a negative integer given as its magnitude `n`, representing the CBOR value
    /// `-1 - n` (so `n == 0` encodes `-1`).
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn encode_negative_int(&mut self, n: u64) -> Result<()> {
        self.consume_one()?;
        self.emit_head(MT_NINT, n)
    }

    /// Encodes a signed integer of either sign, choosing major type 0 or 1 as required.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn encode_int(&mut self, value: i64) -> Result<()> {
        if value >= 0 {
            self.encode_uint(value as u64)
        } else {
            // value == -1 - n  =>  n == -(value + 1), computed without overflow at i64::MIN.
            let n = (value as i128).checked_neg().and_then(|v| v.checked_sub(1));
            let n = n.ok_or(CBORError::DataTooLarge)?;
            self.encode_negative_int(n as u64)
        }
    }

    /// Encodes a simple value (major type 7, `ai` carries the value directly or via one byte).
    /// Values 24..=31 are reserved by RFC 8949 for the fixed meanings (false/true/null/
    /// undefined/break already have their own encodings below); callers that need an
    /// unregistered simple value use this directly and accept the strictness cost.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn encode_simple_value(&mut self, value: u8) -> Result<()> {
        if (AI_RESERVED_MIN..=AI_INDEFINITE).contains(&value) {
            return Err(CBORError::IllegalSimpleType);
        }
        self.consume_one()?;
        self.emit_head(MT_SIMPLE, value as u64)
    }

    /// Encodes a boolean as its dedicated one-byte simple value (`0xf4`/`0xf5`).
    pub fn encode_boolean(&mut self, value: bool) -> Result<()> {
        self.consume_one()?;
        self.emit_head(MT_SIMPLE, if value { SIMPLE_TRUE } else { SIMPLE_FALSE } as u64)
    }

    /// Encodes the `null` simple value (`0xf6`).
    pub fn encode_null(&mut self) -> Result<()> {
        self.consume_one()?;
        self.emit_head(MT_SIMPLE, SIMPLE_NULL as u64)
    }

    /// Encodes the `undefined` simple value (`0xf7`).
    pub fn encode_undefined(&mut self) -> Result<()> {
        self.consume_one()?;
        self.emit_head(MT_SIMPLE, SIMPLE_UNDEFINED as u64)
    }

    /// Encodes `bits` verbatim as `kind`'s IEEE 754 width: exactly 1+2, 1+4 or 1+8 bytes, with
    /// no narrowing or shortest-form selection. `bits` carries the raw bit pattern in its low
    /// 16/32/64 bits for `Half`/`Single`/`Double` respectively — exactly what `Cursor::
    /// raw_argument` returns for a parsed `Float` item, so a value decoded at one width can be
    /// re-emitted at that same width rather than being re-narrowed by `
    /// encode_floating_point_shortest`.
    #[cfg(feature = "float")]
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn encode_floating_point(&mut self, kind: FloatWidth, bits: u64) -> Result<()> {
        self.consume_one()?;
        match kind {
            FloatWidth::Half => {
                let mut buf = [0u8; 3];
                buf[0] = (MT_SIMPLE << MAJOR_TYPE_SHIFT) | FLOAT_HALF;
                buf[1..3].copy_from_slice(&(bits as u16).to_be_bytes());
                self.sink.write(&buf)
            }
            FloatWidth::Single => {
                let mut buf = [0u8; 5];
                buf[0] = (MT_SIMPLE << MAJOR_TYPE_SHIFT) | FLOAT_SINGLE;
                buf[1..5].copy_from_slice(&(bits as u32).to_be_bytes());
                self.sink.write(&buf)
            }
            FloatWidth::Double => {
                let mut buf = [0u8; 9];
                buf[0] = (MT_SIMPLE << MAJOR_TYPE_SHIFT) | FLOAT_DOUBLE;
                buf[1..9].copy_from_slice(&bits.to_be_bytes());
                self.sink.write(&buf)
            }
        }
    }

    /// Encodes `value` as the shortest IEEE 754 form that round-trips it exactly: half
    /// precision, then single, then double. A convenience built on `encode_floating_point` for
    /// callers that have a value to encode rather than a width they already need to match (a
    /// parser observing a width that must be preserved on re-encode uses `encode_floating_point`
    /// directly instead).
    #[cfg(feature = "float")]
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn encode_floating_point_shortest(&mut self, value: f64) -> Result<()> {
        if wire::f64_fits_f32(value) && wire::f32_fits_half(value as f32) {
            let bits = wire::encode_f32_to_half(value as f32);
            self.encode_floating_point(FloatWidth::Half, bits as u64)
        } else if wire::f64_fits_f32(value) {
            self.encode_floating_point(FloatWidth::Single, (value as f32).to_bits() as u64)
        } else {
            self.encode_floating_point(FloatWidth::Double, value.to_bits())
        }
    }

    /// Encodes a tag number; the tagged item itself must be encoded immediately afterward by a
    /// subsequent call on the same encoder.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn encode_tag(&mut self, tag: u64) -> Result<()> {
        self.check_depth()?;
        self.emit_head(MT_TAG, tag)
    }

    /// Encodes a complete (non-chunked) byte string.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn encode_byte_string(&mut self, bytes: &[u8]) -> Result<()> {
        self.consume_one()?;
        self.emit_head(MT_BSTR, bytes.len() as u64)?;
        self.sink.write(bytes)
    }

    /// Encodes a complete (non-chunked) UTF-8 text string.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn encode_text_string(&mut self, text: &str) -> Result<()> {
        self.consume_one()?;
        let bytes = text.as_bytes();
        self.emit_head(MT_TSTR, bytes.len() as u64)?;
        self.sink.write(bytes)
    }

    /// Begins a definite-length array of `len` elements, returning a child encoder that must be
    /// passed to `close_container` after exactly `len` items have been encoded on it.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn create_array(&mut self, len: u64) -> Result<Encoder<'_, S>> {
        self.consume_one()?;
        self.check_depth()?;
        self.emit_head(MT_ARRAY, len)?;
        Ok(Encoder {
            sink: &mut *self.sink,
            remaining: Remaining::Definite(len),
            depth: self.depth + 1,
            options: self.options,
        })
    }

    /// Begins an indefinite-length array, terminated by `close_container` calling
    /// `wire::encode_break` rather than checking an element count.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn create_indefinite_array(&mut self) -> Result<Encoder<'_, S>> {
        self.consume_one()?;
        self.check_depth()?;
        let mut buf = [0u8; 1];
        wire::encode_indefinite_head(MT_ARRAY, &mut buf)?;
        self.sink.write(&buf)?;
        Ok(Encoder {
            sink: &mut *self.sink,
            remaining: Remaining::Indefinite,
            depth: self.depth + 1,
            options: self.options,
        })
    }

    /// Begins a definite-length map of `len` key/value pairs (`2 * len` encode calls expected
    /// on the child before `close_container`).
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn create_map(&mut self, len: u64) -> Result<Encoder<'_, S>> {
        self.consume_one()?;
        self.check_depth()?;
        let pairs = len.checked_mul(2).ok_or(CBORError::DataTooLarge)?;
        self.emit_head(MT_MAP, len)?;
        Ok(Encoder {
            sink: &mut *self.sink,
            remaining: Remaining::Definite(pairs),
            depth: self.depth + 1,
            options: self.options,
        })
    }

    /// Begins an indefinite-length map.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn create_indefinite_map(&mut self) -> Result<Encoder<'_, S>> {
        self.consume_one()?;
        self.check_depth()?;
        let mut buf = [0u8; 1];
        wire::encode_indefinite_head(MT_MAP, &mut buf)?;
        self.sink.write(&buf)?;
        Ok(Encoder {
            sink: &mut *self.sink,
            remaining: Remaining::Indefinite,
            depth: self.depth + 1,
            options: self.options,
        })
    }

    /// Closes a container opened by `create_array`/`create_map`/`create_indefinite_array`/
    /// `create_indefinite_map`. For a definite-length container this checks that exactly the
    /// declared number of items were encoded; for an indefinite one it writes the break stop
    /// code. Strict by default — use `close_container_lax` to waive the completion check.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn close_container(&mut self, child: Encoder<'_, S>) -> Result<()> {
        match child.remaining {
            Remaining::Definite(0) => Ok(()),
            Remaining::Definite(_) => Err(CBORError::ContainerNotCompleted),
            Remaining::Indefinite => {
                let mut buf = [0u8; 1];
                wire::encode_break(&mut buf)?;
                self.sink.write(&buf)
            }
            Remaining::NotContainer => Err(CBORError::InternalError),
        }
    }

    /// As `close_container`, but does not check that a definite-length container received its
    /// declared count before being closed. Indefinite containers still receive their break.
    /// Named explicitly and never the default, per the lax/strict split this crate makes
    /// available for indefinite-container close checking.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn close_container_lax(&mut self, child: Encoder<'_, S>) -> Result<()> {
        match child.remaining {
            Remaining::Definite(_) => Ok(()),
            Remaining::Indefinite => {
                let mut buf = [0u8; 1];
                wire::encode_break(&mut buf)?;
                self.sink.write(&buf)
            }
            Remaining::NotContainer => Err(CBORError::InternalError),
        }
    }

    /// The number of additional bytes the underlying sink would have needed to accept
    /// everything written to it so far. Zero unless the sink has overflowed.
    pub fn extra_bytes_needed(&self) -> usize {
        self.sink.shortfall()
    }
}
