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
//! The wire codec: translating between a CBOR item head (major type, additional information,
//! argument) and its byte encoding. Neither the encoder nor the cursor touch raw bytes directly
//! outside of this module.
use crate::constants::*;
use crate::error::{CBORError, Result};

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// A decoded item head: major type, additional information and the (possibly implicit)
/// argument value. For major type 7, `argument` carries the simple-value/float payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Head {
    /// The item's major type (0-7).
    pub major_type: u8,
    /// The raw additional-information field from the initial byte.
    pub ai: u8,
    /// The decoded argument: the integer value, tag number, or string/container length, or the
    /// raw float bit pattern for major type 7. Zero for the break stop code.
    pub argument: u64,
}

/// Encodes the shortest-form head for `major_type` and `argument` into `out`, returning the
/// number of bytes written. `out` must be at least 9 bytes long.
#[cfg_attr(feature = "trace", func_trace::trace)]
pub fn encode_head(major_type: u8, argument: u64, out: &mut [u8]) -> Result<usize> {
    let top = major_type << MAJOR_TYPE_SHIFT;
    if argument <= PAYLOAD_AI_BITS as u64 {
        if out.is_empty() {
            return Err(CBORError::OutOfMemory);
        }
        out[0] = top | argument as u8;
        Ok(1)
    } else if argument <= u8::MAX as u64 {
        if out.len() < 2 {
            return Err(CBORError::OutOfMemory);
        }
        out[0] = top | PAYLOAD_ONE_BYTE;
        out[1] = argument as u8;
        Ok(2)
    } else if argument <= u16::MAX as u64 {
        if out.len() < 3 {
            return Err(CBORError::OutOfMemory);
        }
        out[0] = top | PAYLOAD_TWO_BYTES;
        out[1..3].copy_from_slice(&(argument as u16).to_be_bytes());
        Ok(3)
    } else if argument <= u32::MAX as u64 {
        if out.len() < 5 {
            return Err(CBORError::OutOfMemory);
        }
        out[0] = top | PAYLOAD_FOUR_BYTES;
        out[1..5].copy_from_slice(&(argument as u32).to_be_bytes());
        Ok(5)
    } else {
        if out.len() < 9 {
            return Err(CBORError::OutOfMemory);
        }
        out[0] = top | PAYLOAD_EIGHT_BYTES;
        out[1..9].copy_from_slice(&argument.to_be_bytes());
        Ok(9)
    }
}

/// Encodes a head using a fixed-width form, used only for indefinite-length container/string
/// heads (always one byte) and the break stop code.
#[cfg_attr(feature = "trace", func_trace::trace)]
pub fn encode_indefinite_head(major_type: u8, out: &mut [u8]) -> Result<usize> {
    if out.is_empty() {
        return Err(CBORError::OutOfMemory);
    }
    out[0] = (major_type << MAJOR_TYPE_SHIFT) | AI_INDEFINITE;
    Ok(1)
}

/// Encodes the break stop code into `out`.
#[cfg_attr(feature = "trace", func_trace::trace)]
pub fn encode_break(out: &mut [u8]) -> Result<usize> {
    if out.is_empty() {
        return Err(CBORError::OutOfMemory);
    }
    out[0] = BREAK;
    Ok(1)
}

/// Decodes a single item head from `buf`, returning the head and the number of bytes consumed.
/// Does not interpret `28..=30` as an error for major type 7 (simple values above 23 are
/// checked by the caller, since the legality of `ai == 24` with `argument < 32` is a strictness
/// concern, not a well-formedness one).
#[cfg_attr(feature = "trace", func_trace::trace)]
pub fn decode_head(buf: &[u8]) -> Result<(Head, usize)> {
    let first = *buf.first().ok_or(CBORError::UnexpectedEOF)?;
    let major_type = first >> MAJOR_TYPE_SHIFT;
    let ai = first & AI_MASK;

    if major_type == MT_SIMPLE && ai == AI_INDEFINITE {
        // Break stop code: caller distinguishes this from "indefinite length" by major type.
        return Ok((
            Head {
                major_type,
                ai,
                argument: 0,
            },
            1,
        ));
    }

    match ai {
        0..=PAYLOAD_AI_BITS => Ok((
            Head {
                major_type,
                ai,
                argument: ai as u64,
            },
            1,
        )),
        PAYLOAD_ONE_BYTE => {
            let b = *buf.get(1).ok_or(CBORError::UnexpectedEOF)?;
            Ok((
                Head {
                    major_type,
                    ai,
                    argument: b as u64,
                },
                2,
            ))
        }
        PAYLOAD_TWO_BYTES => {
            let s = buf.get(1..3).ok_or(CBORError::UnexpectedEOF)?;
            let v = u16::from_be_bytes([s[0], s[1]]);
            Ok((
                Head {
                    major_type,
                    ai,
                    argument: v as u64,
                },
                3,
            ))
        }
        PAYLOAD_FOUR_BYTES => {
            let s = buf.get(1..5).ok_or(CBORError::UnexpectedEOF)?;
            let v = u32::from_be_bytes([s[0], s[1], s[2], s[3]]);
            Ok((
                Head {
                    major_type,
                    ai,
                    argument: v as u64,
                },
                5,
            ))
        }
        PAYLOAD_EIGHT_BYTES => {
            let s = buf.get(1..9).ok_or(CBORError::UnexpectedEOF)?;
            let mut b = [0u8; 8];
            b.copy_from_slice(s);
            Ok((
                Head {
                    major_type,
                    ai,
                    argument: u64::from_be_bytes(b),
                },
                9,
            ))
        }
        AI_INDEFINITE => Ok((
            Head {
                major_type,
                ai,
                argument: 0,
            },
            1,
        )),
        AI_RESERVED_MIN..=AI_RESERVED_MAX => {
            if major_type == MT_UINT || major_type == MT_NINT {
                Err(CBORError::IllegalNumber)
            } else {
                Err(CBORError::UnknownType)
            }
        }
        _ => Err(CBORError::InternalError),
    }
}

/// Decodes an IEEE 754 half-precision float (additional information 25 under major type 7)
/// into an `f32`, matching tinycbor's own widening-to-`f32` convention for `f16` values.
#[cfg(feature = "float")]
#[cfg_attr(feature = "trace", func_trace::trace)]
pub fn decode_half_to_f32(bits: u16) -> f32 {
    half::f16::from_bits(bits).to_f32()
}

/// Encodes an `f32` into its nearest half-precision representation, for callers that have
/// already decided the value round-trips exactly through `f16`.
#[cfg(feature = "float")]
#[cfg_attr(feature = "trace", func_trace::trace)]
pub fn encode_f32_to_half(value: f32) -> u16 {
    half::f16::from_f32(value).to_bits()
}

/// True if `value` round-trips exactly through half precision, used by the encoder's
/// shortest-float-form selection.
#[cfg(feature = "float")]
pub fn f32_fits_half(value: f32) -> bool {
    let narrowed = half::f16::from_f32(value);
    narrowed.to_f32() == value || (value.is_nan() && narrowed.to_f32().is_nan())
}

/// True if `value` round-trips exactly through single precision.
#[cfg(feature = "float")]
pub fn f64_fits_f32(value: f64) -> bool {
    let narrowed = value as f32;
    narrowed as f64 == value || (value.is_nan() && (narrowed as f64).is_nan())
}
