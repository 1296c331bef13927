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
//! A single-pass structural and semantic checker, built entirely on the public `Cursor`/`Parser`
//! API described in the parser module (the same surface a pretty-printer or JSON converter would
//! use) rather than reaching into the parser's internals. Each `ValidatorOptions` flag is
//! independently toggleable; disabling all of them still leaves the parser's own well-formedness
//! checks (run unconditionally during pre-parse) in force.
use crate::cursor::{Cursor, ItemType, Parser};
use crate::error::{CBORError, Result};
use crate::source::Source;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Run-time flags selecting which strictness rules the validator applies on top of the parser's
/// unconditional well-formedness checks. All four default to enabled: this crate treats strict,
/// canonical CBOR as the default expectation and lax acceptance as something a caller opts into
/// explicitly, matching `ParserOptions`'s own default (`strict_simple_value: true`).
#[derive(Copy, Clone, Debug)]
pub struct ValidatorOptions {
    /// Every integer, string/container length and tag number must use the shortest head form
    /// RFC 8949 permits (§8.1's "shortest-form canonical encoding" invariant).
    pub canonical: bool,
    /// A recognised tag number must decorate an item of the type it is defined over (tag 0 over
    /// text, tags 2/3/21/22/23/24 over byte strings, tag 32 and friends over text). Tags this
    /// crate does not recognise are passed through unchecked rather than rejected, since CBOR
    /// tags are an open, extensible registry.
    pub check_tags: bool,
    /// Every text string chunk must be well-formed UTF-8: no overlong sequences, no surrogate
    /// code points, no code point above U+10FFFF.
    pub check_utf8: bool,
    /// No two keys within the same map may compare byte-for-byte equal. Requires the `alloc`
    /// feature to actually run (it needs to remember prior keys' byte spans within the single
    /// pass); silently skipped in a pure `no_std` build regardless of this flag.
    pub check_unique_keys: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        ValidatorOptions {
            canonical: true,
            check_tags: true,
            check_utf8: true,
            check_unique_keys: true,
        }
    }
}

/// A recursive, single-pass validator over a `Parser`. Holds no state of its own beyond its
/// options, so one `Validator` value may be reused across any number of `validate` calls.
#[derive(Copy, Clone, Debug, Default)]
pub struct Validator {
    options: ValidatorOptions,
}

#[cfg(feature = "alloc")]
type KeySpans = Vec<(usize, usize)>;
#[cfg(not(feature = "alloc"))]
type KeySpans = ();

impl Validator {
    /// A validator with every strictness flag enabled.
    pub fn new() -> Self {
        Validator {
            options: ValidatorOptions::default(),
        }
    }

    /// A validator with explicit options.
    pub fn with_options(options: ValidatorOptions) -> Self {
        Validator { options }
    }

    /// Validates the single top-level item `parser` produces (recursing into every nested
    /// container, tag and chunked string), then requires the source to be exhausted: any byte
    /// remaining after the top-level item fails with `GarbageAtEnd`.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn validate<Src: Source>(&self, parser: &mut Parser<Src>) -> Result<()> {
        let root = parser.init()?;
        let next = self.validate_item(parser, root)?;
        match parser.ensure_range(next.pos(), 1) {
            Ok(()) => Err(CBORError::GarbageAtEnd),
            Err(CBORError::UnexpectedEOF) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Validates the item at `cursor`, recursing as needed, and returns the cursor for the item
    /// immediately following it at the same nesting level (exactly what `Cursor::advance` would
    /// return, since this function's every path ultimately calls it exactly once per item).
    fn validate_item<Src: Source>(&self, parser: &mut Parser<Src>, cursor: Cursor) -> Result<Cursor> {
        if cursor.at_end() {
            return Err(CBORError::InternalError);
        }
        if self.options.canonical {
            self.check_canonical(parser, &cursor)?;
        }
        match cursor.item_type() {
            ItemType::Tag => {
                let tag = cursor.get_tag(parser)?;
                let tagged = cursor.advance(parser)?;
                if tagged.at_end() {
                    return Err(parser.last_error().unwrap_or(CBORError::UnexpectedEOF));
                }
                if self.options.check_tags {
                    check_tag_appropriateness(tag, tagged.item_type())?;
                }
                self.validate_item(parser, tagged)
            }
            ItemType::TextString if self.options.check_utf8 => {
                self.check_utf8(parser, &cursor)?;
                cursor.advance(parser)
            }
            ItemType::Array => self.validate_sequence(parser, cursor, false),
            ItemType::Map => self.validate_sequence(parser, cursor, true),
            _ => cursor.advance(parser),
        }
    }

    /// Walks every element (array) or key/value pair (map) of the container at `cursor`.
    fn validate_sequence<Src: Source>(&self, parser: &mut Parser<Src>, cursor: Cursor, is_map: bool) -> Result<Cursor> {
        let mut child = cursor.enter_container(parser)?;
        let mut key_spans: KeySpans = Default::default();
        loop {
            if child.at_end() {
                break;
            }
            let key_start = child.pos();
            let next = self.validate_item(parser, child)?;
            if is_map {
                let key_span = (key_start, next.pos());
                self.record_and_check_key(parser, &mut key_spans, key_span)?;
                if next.at_end() {
                    return Err(CBORError::InternalError);
                }
                child = self.validate_item(parser, next)?;
            } else {
                child = next;
            }
        }
        cursor.leave_container(parser, child)
    }

    #[cfg(feature = "alloc")]
    fn record_and_check_key<Src: Source>(
        &self,
        parser: &mut Parser<Src>,
        key_spans: &mut KeySpans,
        span: (usize, usize),
    ) -> Result<()> {
        if self.options.check_unique_keys {
            for &seen in key_spans.iter() {
                if keys_equal(parser, seen, span)? {
                    return Err(CBORError::DuplicateObjectKeys);
                }
            }
        }
        key_spans.push(span);
        Ok(())
    }

    #[cfg(not(feature = "alloc"))]
    fn record_and_check_key<Src: Source>(
        &self,
        _parser: &mut Parser<Src>,
        _key_spans: &mut KeySpans,
        _span: (usize, usize),
    ) -> Result<()> {
        Ok(())
    }

    fn check_canonical<Src: Source>(&self, parser: &Parser<Src>, cursor: &Cursor) -> Result<()> {
        let has_argument = match cursor.item_type() {
            ItemType::Integer | ItemType::Tag | ItemType::SimpleValue => true,
            ItemType::ByteString | ItemType::TextString | ItemType::Array | ItemType::Map => {
                cursor.is_length_known()
            }
            _ => false,
        };
        if !has_argument {
            return Ok(());
        }
        let argument = cursor.raw_argument(parser)?;
        if cursor.head_len() != shortest_head_len(argument) {
            return Err(CBORError::IllegalNumber);
        }
        Ok(())
    }

    fn check_utf8<Src: Source>(&self, parser: &mut Parser<Src>, cursor: &Cursor) -> Result<()> {
        parser.for_each_chunk(cursor, |chunk| {
            validate_utf8(chunk).map_err(|_| CBORError::InvalidUtf8TextString)
        })
    }
}

/// Compares two already-validated byte spans for equality, pulling each span into the source's
/// resident window first. Spans of different lengths are never equal without reading either.
#[cfg(feature = "alloc")]
fn keys_equal<Src: Source>(parser: &mut Parser<Src>, a: (usize, usize), b: (usize, usize)) -> Result<bool> {
    let len = a.1 - a.0;
    if len != b.1 - b.0 {
        return Ok(false);
    }
    parser.ensure_range(a.0, len)?;
    parser.ensure_range(b.0, len)?;
    Ok(parser.raw_slice(a.0, len)? == parser.raw_slice(b.0, len)?)
}

/// The number of bytes `wire::encode_head` would use for `argument`: the shortest-form rule
/// from §8.1, restated here rather than imported so the validator can apply it uniformly to
/// integers, tags, and string/container lengths without constructing a `Head`.
fn shortest_head_len(argument: u64) -> usize {
    if argument <= 23 {
        1
    } else if argument <= u8::MAX as u64 {
        2
    } else if argument <= u16::MAX as u64 {
        3
    } else if argument <= u32::MAX as u64 {
        5
    } else {
        9
    }
}

/// Tag-appropriateness table for the tags spec.md names explicitly (0, 2, 3, 21, 22, 23, 32) plus
/// the handful of other IANA-registered tags with an unambiguous, RFC-defined type requirement.
/// Tags outside this table are accepted regardless of the tagged item's type: CBOR's tag space is
/// open-ended, and rejecting every tag this crate doesn't special-case would make the validator
/// reject perfectly ordinary private or application-specific tags.
fn check_tag_appropriateness(tag: u64, item_type: ItemType) -> Result<()> {
    let ok = match tag {
        0 => item_type == ItemType::TextString,
        1 => item_type == ItemType::Integer || item_type == ItemType::Float,
        2 | 3 => item_type == ItemType::ByteString,
        4 | 5 => item_type == ItemType::Array,
        21 | 22 | 23 | 24 => item_type == ItemType::ByteString,
        32 | 33 | 34 | 35 | 36 => item_type == ItemType::TextString,
        _ => return Ok(()),
    };
    if ok {
        Ok(())
    } else {
        Err(CBORError::InappropriateTagForType)
    }
}

/// Hand-rolled UTF-8 validation, byte at a time: the initial byte of each sequence classifies
/// its length (1-4 bytes), continuation bytes must fall in `0x80..=0xBF`, overlong encodings and
/// surrogate code points (U+D800..=U+DFFF) are rejected, and code points above U+10FFFF are
/// rejected. Kept independent of `core::str::from_utf8` per the design note that this check is
/// invariant across implementations and belongs to the validator, not the string-copy path.
fn validate_utf8(bytes: &[u8]) -> core::result::Result<(), ()> {
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        let (len, min_cp, mut cp): (usize, u32, u32) = if b0 & 0x80 == 0 {
            (1, 0, b0 as u32)
        } else if b0 & 0xE0 == 0xC0 {
            (2, 0x80, (b0 & 0x1F) as u32)
        } else if b0 & 0xF0 == 0xE0 {
            (3, 0x800, (b0 & 0x0F) as u32)
        } else if b0 & 0xF8 == 0xF0 {
            (4, 0x10000, (b0 & 0x07) as u32)
        } else {
            return Err(());
        };
        if i + len > bytes.len() {
            return Err(());
        }
        for &b in &bytes[i + 1..i + len] {
            if b & 0xC0 != 0x80 {
                return Err(());
            }
            cp = (cp << 6) | (b & 0x3F) as u32;
        }
        if cp < min_cp || cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
            return Err(());
        }
        i += len;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Parser;
    use crate::source::BufferSource;

    fn validate_bytes(bytes: &[u8]) -> Result<()> {
        let mut parser = Parser::new(BufferSource::new(bytes));
        Validator::new().validate(&mut parser)
    }

    #[test]
    fn accepts_well_formed_array() {
        // 83 01 20 f5 -> [1, -1, true]
        assert!(validate_bytes(&[0x83, 0x01, 0x20, 0xf5]).is_ok());
    }

    #[test]
    fn accepts_map_with_distinct_keys() {
        // a2 01 65 "Hello" 02 f4 -> {1: "Hello", 2: false}
        let bytes = [0xa2, 0x01, 0x65, b'H', b'e', b'l', b'l', b'o', 0x02, 0xf4];
        assert!(validate_bytes(&bytes).is_ok());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn rejects_duplicate_map_keys() {
        // a2 01 01 01 02 -> {1: 1, 1: 2}
        let bytes = [0xa2, 0x01, 0x01, 0x01, 0x02];
        assert_eq!(validate_bytes(&bytes), Err(CBORError::DuplicateObjectKeys));
    }

    #[test]
    fn rejects_overlong_integer_as_non_canonical() {
        // 18 05 -> unsigned 5 encoded in 2 bytes instead of 1.
        assert_eq!(validate_bytes(&[0x18, 0x05]), Err(CBORError::IllegalNumber));
    }

    #[test]
    fn lax_mode_accepts_overlong_integer() {
        let mut parser = Parser::new(BufferSource::new(&[0x18, 0x05]));
        let options = ValidatorOptions {
            canonical: false,
            ..ValidatorOptions::default()
        };
        assert!(Validator::with_options(options).validate(&mut parser).is_ok());
    }

    #[test]
    fn rejects_invalid_utf8_text_string() {
        // 61 ff -> one-byte text string containing a lone continuation byte.
        assert_eq!(validate_bytes(&[0x61, 0xff]), Err(CBORError::InvalidUtf8TextString));
    }

    #[test]
    fn rejects_surrogate_code_point() {
        // A three-byte sequence encoding U+D800 (a surrogate), never legal in UTF-8.
        assert_eq!(validate_bytes(&[0x63, 0xed, 0xa0, 0x80]), Err(CBORError::InvalidUtf8TextString));
    }

    #[test]
    fn rejects_tag_zero_over_non_text() {
        // c0 01 -> tag 0 (expected date/time string) decorating an integer.
        assert_eq!(validate_bytes(&[0xc0, 0x01]), Err(CBORError::InappropriateTagForType));
    }

    #[test]
    fn accepts_unrecognised_tag_over_any_type() {
        // d9 04 d2 01 -> tag 1234 (unrecognised) over an integer.
        assert!(validate_bytes(&[0xd9, 0x04, 0xd2, 0x01]).is_ok());
    }

    #[test]
    fn rejects_trailing_garbage() {
        // Two consecutive top-level integers; only one is permitted.
        assert_eq!(validate_bytes(&[0x01, 0x02]), Err(CBORError::GarbageAtEnd));
    }

    #[test]
    fn rejects_chunked_string_type_mismatch() {
        // 5f 41 48 61 65 ff -> indefinite byte string with a text-string chunk inside.
        assert_eq!(
            validate_bytes(&[0x5f, 0x41, 0x48, 0x61, 0x65, 0xff]),
            Err(CBORError::IllegalType)
        );
    }
}
