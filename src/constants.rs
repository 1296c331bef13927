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
//! Wire-level constants: major types, additional-information encodings and payload widths.

/// Major type 0: unsigned integer.
pub const MT_UINT: u8 = 0;
/// Major type 1: negative integer.
pub const MT_NINT: u8 = 1;
/// Major type 2: byte string.
pub const MT_BSTR: u8 = 2;
/// Major type 3: text string.
pub const MT_TSTR: u8 = 3;
/// Major type 4: array.
pub const MT_ARRAY: u8 = 4;
/// Major type 5: map.
pub const MT_MAP: u8 = 5;
/// Major type 6: tag.
pub const MT_TAG: u8 = 6;
/// Major type 7: simple value / float / break.
pub const MT_SIMPLE: u8 = 7;

/// Mask isolating the major type from an initial byte.
pub const MAJOR_TYPE_SHIFT: u8 = 5;
/// Mask isolating the additional information from an initial byte.
pub const AI_MASK: u8 = 0x1f;

/// Additional information values 0..=23 encode the value directly.
pub const PAYLOAD_AI_BITS: u8 = 23;
/// Additional information 24: one following byte.
pub const PAYLOAD_ONE_BYTE: u8 = 24;
/// Additional information 25: two following bytes.
pub const PAYLOAD_TWO_BYTES: u8 = 25;
/// Additional information 26: four following bytes.
pub const PAYLOAD_FOUR_BYTES: u8 = 26;
/// Additional information 27: eight following bytes.
pub const PAYLOAD_EIGHT_BYTES: u8 = 27;
/// Additional information 28..=30: reserved, not assigned a meaning by RFC 8949.
pub const AI_RESERVED_MIN: u8 = 28;
/// See `AI_RESERVED_MIN`.
pub const AI_RESERVED_MAX: u8 = 30;
/// Additional information 31: indefinite length (major types 2-5) or the break stop code
/// (major type 7).
pub const AI_INDEFINITE: u8 = 31;

/// The one-byte break stop code that terminates an indefinite-length container or string.
pub const BREAK: u8 = 0xff;

/// Simple value encodings carried directly in the additional-information field.
pub const SIMPLE_FALSE: u8 = 20;
/// See `SIMPLE_FALSE`.
pub const SIMPLE_TRUE: u8 = 21;
/// See `SIMPLE_FALSE`.
pub const SIMPLE_NULL: u8 = 22;
/// See `SIMPLE_FALSE`.
pub const SIMPLE_UNDEFINED: u8 = 23;

/// Additional information for the three IEEE 754 float widths under major type 7.
pub const FLOAT_HALF: u8 = 25;
/// See `FLOAT_HALF`.
pub const FLOAT_SINGLE: u8 = 26;
/// See `FLOAT_HALF`.
pub const FLOAT_DOUBLE: u8 = 27;
