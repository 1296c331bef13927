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
//! The streaming parser and its cursor. A `Cursor` is a small `Copy` value describing the item
//! at the parser's current position; it does not itself borrow the `Parser` (no back-pointer,
//! no cycle) — every operation that needs source access takes the owning `Parser` as an explicit
//! parameter, borrowed exclusively only for the duration of that call.
use crate::constants::*;
use crate::error::{CBORError, Result};
use crate::source::Source;
use crate::wire;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

const FLAG_NEGATIVE: u8 = 1 << 0;
const FLAG_TOO_LARGE: u8 = 1 << 1;
const FLAG_UNKNOWN_LENGTH: u8 = 1 << 2;

/// The item kind at a cursor's current position, collapsing the eight CBOR major types into
/// the observable kinds described in the data model: unsigned and negative integers share one
/// `Integer` kind, distinguished by the `NegativeInteger` flag bit, mirroring the wire format's
/// own major-type-0/1 split.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemType {
    /// Major type 0 (unsigned) or 1 (negative); see `FLAG_NEGATIVE`.
    Integer,
    /// Major type 2: byte string, definite or indefinite.
    ByteString,
    /// Major type 3: UTF-8 text string, definite or indefinite.
    TextString,
    /// Major type 4: ordered sequence of items, definite or indefinite.
    Array,
    /// Major type 5: ordered sequence of key/value pairs, definite or indefinite.
    Map,
    /// Major type 6: a tag number decorating the item that immediately follows it.
    Tag,
    /// Major type 7, additional information 20 or 21.
    Boolean,
    /// Major type 7, additional information 22.
    Null,
    /// Major type 7, additional information 23.
    Undefined,
    /// Major type 7: a simple value other than a float, boolean, null, undefined, or break.
    SimpleValue,
    /// Major type 7: a half, single, or double precision IEEE-754 value.
    Float,
    /// The break stop code, seen while iterating an indefinite-length container or string.
    Break,
    /// No item is present: the cursor is exhausted (its container is complete) or errored.
    Invalid,
}

/// How many more items (including the one this cursor names, if any) remain in the enclosing
/// sequence before it is complete.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Remaining {
    Count(u64),
    Indefinite,
}

/// A lightweight, copyable description of the parser's position. Holds up to 16 bits of the
/// pre-parsed head value directly (`extra`); wider values set the `TooLarge` flag and are
/// re-read from the source on demand by the accessor that needs them.
#[derive(Copy, Clone, Debug)]
pub struct Cursor {
    pos: usize,
    head_len: u8,
    major_type: u8,
    ai: u8,
    extra: u16,
    item_type: ItemType,
    remaining: Remaining,
    flags: u8,
}

impl Cursor {
    /// The item kind at this position.
    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    /// The raw CBOR major type (0-7) of the item at this position. Meaningless for `Invalid`.
    pub fn major_type(&self) -> u8 {
        self.major_type
    }

    /// The raw additional-information field of the item's head. Used by the validator to check
    /// canonical (shortest-form) encoding and the simple-type range.
    pub fn ai(&self) -> u8 {
        self.ai
    }

    /// This item's offset into the source.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The number of bytes this item's head occupied on the wire, including any follow-on
    /// argument bytes. Used by the validator to check that the shortest encoding form was used.
    pub fn head_len(&self) -> usize {
        self.head_len as usize
    }

    /// The item's raw pre-parsed argument (the integer value, tag number, string/container
    /// length, or float bit pattern), regardless of item kind. Exposed for the validator's
    /// canonical-encoding check, which needs it uniformly across all item kinds.
    pub fn raw_argument<Src: Source>(&self, parser: &Parser<Src>) -> Result<u64> {
        parser.argument(self)
    }

    /// True once the cursor has no item (its container is complete, or the top-level item has
    /// been fully consumed).
    pub fn at_end(&self) -> bool {
        matches!(self.item_type, ItemType::Invalid | ItemType::Break)
    }

    /// False for strings/arrays/maps whose head additional information was 31 (indefinite).
    /// True for every other item kind.
    pub fn is_length_known(&self) -> bool {
        self.flags & FLAG_UNKNOWN_LENGTH == 0
    }

    /// The declared length of a definite-length byte/text string, array, or map. `None` for an
    /// indefinite-length item or any item kind without a length.
    pub fn get_string_length<Src: Source>(&self, parser: &Parser<Src>) -> Result<Option<u64>> {
        if !matches!(self.item_type, ItemType::ByteString | ItemType::TextString) {
            return Err(CBORError::InternalError);
        }
        if !self.is_length_known() {
            return Ok(None);
        }
        Ok(Some(parser.argument(self)?))
    }

    /// The raw unsigned magnitude for an `Integer` item whose major type is 0 (unsigned).
    pub fn get_uint64<Src: Source>(&self, parser: &Parser<Src>) -> Result<u64> {
        if self.item_type != ItemType::Integer || self.flags & FLAG_NEGATIVE != 0 {
            return Err(CBORError::InternalError);
        }
        parser.argument(self)
    }

    /// The signed value of an `Integer` item of either major type, checked against `i64`'s
    /// range: unsigned values above `i64::MAX` and negative magnitudes at or beyond `2^63`
    /// both fail with `DataTooLarge`.
    pub fn get_int64_checked<Src: Source>(&self, parser: &Parser<Src>) -> Result<i64> {
        if self.item_type != ItemType::Integer {
            return Err(CBORError::InternalError);
        }
        let raw = parser.argument(self)?;
        if self.flags & FLAG_NEGATIVE != 0 {
            if raw >= 1u64 << 63 {
                return Err(CBORError::DataTooLarge);
            }
            Ok(-1 - raw as i64)
        } else {
            if raw > i64::MAX as u64 {
                return Err(CBORError::DataTooLarge);
            }
            Ok(raw as i64)
        }
    }

    /// Alias for `get_int64_checked`, kept as a separate name to match the parser's documented
    /// two-spelling accessor pair for signed extraction.
    pub fn get_int64<Src: Source>(&self, parser: &Parser<Src>) -> Result<i64> {
        self.get_int64_checked(parser)
    }

    /// The tag number of a `Tag` item.
    pub fn get_tag<Src: Source>(&self, parser: &Parser<Src>) -> Result<u64> {
        if self.item_type != ItemType::Tag {
            return Err(CBORError::InternalError);
        }
        parser.argument(self)
    }

    /// The value of a `Boolean` item.
    pub fn get_bool(&self) -> Result<bool> {
        if self.item_type != ItemType::Boolean {
            return Err(CBORError::InternalError);
        }
        Ok(self.ai == SIMPLE_TRUE)
    }

    pub fn is_null(&self) -> bool {
        self.item_type == ItemType::Null
    }

    pub fn is_undefined(&self) -> bool {
        self.item_type == ItemType::Undefined
    }

    /// The payload of a `SimpleValue` item (a major-type-7 scalar that is not a float, bool,
    /// null, undefined, or break).
    pub fn get_simple_value<Src: Source>(&self, parser: &Parser<Src>) -> Result<u8> {
        if self.item_type != ItemType::SimpleValue {
            return Err(CBORError::InternalError);
        }
        Ok(parser.argument(self)? as u8)
    }

    /// The exact IEEE-754 value of a `Float` item, widened to `f64`. Half-precision values are
    /// expanded via `wire::decode_half_to_f32`.
    #[cfg(feature = "float")]
    pub fn get_float<Src: Source>(&self, parser: &Parser<Src>) -> Result<f64> {
        if self.item_type != ItemType::Float {
            return Err(CBORError::InternalError);
        }
        let bits = parser.argument(self)?;
        match self.ai {
            FLOAT_HALF => Ok(wire::decode_half_to_f32(bits as u16) as f64),
            FLOAT_SINGLE => Ok(f32::from_bits(bits as u32) as f64),
            FLOAT_DOUBLE => Ok(f64::from_bits(bits)),
            _ => Err(CBORError::InternalError),
        }
    }

    /// Copies this byte/text string's content into `dest`, following chunks if the string is
    /// indefinite-length. Fails with `OutOfMemory` if `dest` is shorter than the total length
    /// rather than truncating silently.
    pub fn copy_string<Src: Source>(&self, parser: &mut Parser<Src>, dest: &mut [u8]) -> Result<usize> {
        if !matches!(self.item_type, ItemType::ByteString | ItemType::TextString) {
            return Err(CBORError::InternalError);
        }
        if self.is_length_known() {
            let len = parser.argument(self)? as usize;
            if dest.len() < len {
                return Err(CBORError::OutOfMemory);
            }
            let start = self.pos + self.head_len as usize;
            parser.source.ensure(start, len)?;
            if let Some(slice) = parser.source.read_bytes(start, len) {
                dest[..len].copy_from_slice(slice);
            } else {
                parser.source.transfer_string(start, len, &mut dest[..len])?;
            }
            Ok(len)
        } else {
            parser.copy_chunked_string(self, dest)
        }
    }

    /// The total length of this byte/text string, walking chunks if indefinite-length. Overflow
    /// while summing chunk lengths fails with `DataTooLarge`.
    pub fn calculate_string_length<Src: Source>(&self, parser: &mut Parser<Src>) -> Result<u64> {
        if !matches!(self.item_type, ItemType::ByteString | ItemType::TextString) {
            return Err(CBORError::InternalError);
        }
        if self.is_length_known() {
            parser.argument(self)
        } else {
            parser.chunked_string_length(self)
        }
    }

    /// True if this text string's content is byte-for-byte equal to `s`.
    pub fn text_string_equals<Src: Source>(&self, parser: &mut Parser<Src>, s: &str) -> Result<bool> {
        if self.item_type != ItemType::TextString {
            return Err(CBORError::InternalError);
        }
        parser.text_string_equals(self, s)
    }

    /// Copies this byte/text string into a freshly allocated buffer. Requires the `alloc`
    /// feature; this is the crate's only allocating operation.
    #[cfg(feature = "alloc")]
    pub fn dup_string<Src: Source>(&self, parser: &mut Parser<Src>) -> Result<Vec<u8>> {
        let len = self.calculate_string_length(parser)? as usize;
        let mut out = alloc::vec![0u8; len];
        let copied = self.copy_string(parser, &mut out)?;
        out.truncate(copied);
        Ok(out)
    }

    /// Enters an `Array` or `Map` container, returning a cursor for its first element (or the
    /// end-of-container sentinel, if empty).
    pub fn enter_container<Src: Source>(&self, parser: &mut Parser<Src>) -> Result<Cursor> {
        if !matches!(self.item_type, ItemType::Array | ItemType::Map) {
            return Err(parser.latch_err(CBORError::InternalError));
        }
        parser.check_depth()?;
        let remaining = parser.container_remaining(self)?;
        parser.depth += 1;
        parser.pre_parse_at(self.pos + self.head_len as usize, remaining)
    }

    /// Leaves a container entered by `enter_container`. `child` must be at the end of the
    /// container (`child.at_end()`); violating this is a fatal internal error. Returns a cursor
    /// for the item following the container in its own enclosing sequence.
    pub fn leave_container<Src: Source>(&self, parser: &mut Parser<Src>, child: Cursor) -> Result<Cursor> {
        if !child.at_end() {
            return Err(parser.latch_err(CBORError::InternalError));
        }
        parser.depth -= 1;
        let next_pos = child.pos + child.head_len as usize;
        let new_remaining = self.decrement_remaining()?;
        parser.pre_parse_at(next_pos, new_remaining)
    }

    /// Advances exactly one non-container, non-indefinite-length item: a scalar or a
    /// definite-length string. Errors rather than recursing if called on an array, map, tag, or
    /// indefinite-length string — call `advance` for those.
    pub fn advance_fixed<Src: Source>(&self, parser: &mut Parser<Src>) -> Result<Cursor> {
        match self.item_type {
            ItemType::Array | ItemType::Map | ItemType::Tag => {
                return Err(parser.latch_err(CBORError::InternalError))
            }
            ItemType::ByteString | ItemType::TextString if !self.is_length_known() => {
                return Err(parser.latch_err(CBORError::InternalError))
            }
            ItemType::Invalid | ItemType::Break => {
                return Err(parser.latch_err(CBORError::AdvancePastEOF))
            }
            _ => {}
        }
        let end = parser.skip_extent(self)?;
        let new_remaining = self.decrement_remaining()?;
        parser.pre_parse_at(end, new_remaining)
    }

    /// Advances one item, recursing fully into containers and chunked strings so that the
    /// returned cursor is the next sibling at this same nesting level.
    pub fn advance<Src: Source>(&self, parser: &mut Parser<Src>) -> Result<Cursor> {
        if self.item_type == ItemType::Tag {
            // A tag is transparent to its enclosing sequence's item count: advancing past it
            // reveals the tagged item at the same `remaining` level.
            return parser.pre_parse_at(self.pos + self.head_len as usize, self.remaining);
        }
        if matches!(self.item_type, ItemType::Invalid | ItemType::Break) {
            return Err(parser.latch_err(CBORError::AdvancePastEOF));
        }
        let end = parser.skip_extent(self)?;
        let new_remaining = self.decrement_remaining()?;
        parser.pre_parse_at(end, new_remaining)
    }

    fn decrement_remaining(&self) -> Result<Remaining> {
        match self.remaining {
            Remaining::Count(0) => Err(CBORError::AdvancePastEOF),
            Remaining::Count(n) => Ok(Remaining::Count(n - 1)),
            Remaining::Indefinite => Ok(Remaining::Indefinite),
        }
    }
}

/// Run-time options controlling the parser's own well-formedness checks. Flags that require
/// whole-document context (tag appropriateness, UTF-8, map key uniqueness) live on the
/// `Validator` instead; `strict_simple_value` is enforceable per-item during pre-parse.
#[derive(Copy, Clone, Debug)]
pub struct ParserOptions {
    /// Reject simple values 0..=31 encoded via the one-byte-follow-on form (ai = 24) rather
    /// than inline. Disabling this accepts the non-canonical encoding.
    pub strict_simple_value: bool,
    /// Maximum container/tag nesting depth.
    pub max_nesting: u32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            strict_simple_value: true,
            max_nesting: 1024,
        }
    }
}

/// Owns the source binding and the sticky error latch shared by every cursor derived from it.
pub struct Parser<Src: Source> {
    source: Src,
    options: ParserOptions,
    depth: u32,
    error: Option<CBORError>,
}

impl<Src: Source> Parser<Src> {
    /// Creates a parser over `source` with default options.
    pub fn new(source: Src) -> Self {
        Parser {
            source,
            options: ParserOptions::default(),
            depth: 0,
            error: None,
        }
    }

    /// Creates a parser over `source` with explicit options.
    pub fn with_options(source: Src, options: ParserOptions) -> Self {
        Parser {
            source,
            options,
            depth: 0,
            error: None,
        }
    }

    /// The error kind latched by the most recent failing operation, if any.
    pub fn last_error(&self) -> Option<CBORError> {
        self.error
    }

    /// Produces the root cursor, pre-parsing the item at offset 0.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn init(&mut self) -> Result<Cursor> {
        self.pre_parse_at(0, Remaining::Count(1))
    }

    fn latch_err(&mut self, e: CBORError) -> CBORError {
        self.error = Some(e);
        e
    }

    fn check_depth(&self) -> Result<()> {
        if self.depth >= self.options.max_nesting {
            Err(CBORError::NestingTooDeep)
        } else {
            Ok(())
        }
    }

    /// Returns the full pre-parsed argument value for `cursor`, re-reading the head's follow-on
    /// bytes from the source if the value did not fit in the cursor's 16-bit `extra` field.
    fn argument(&self, cursor: &Cursor) -> Result<u64> {
        if cursor.flags & FLAG_TOO_LARGE != 0 {
            let slice = self
                .source
                .read_bytes(cursor.pos, cursor.head_len as usize)
                .ok_or(CBORError::InternalError)?;
            let (head, _) = wire::decode_head(slice)?;
            Ok(head.argument)
        } else {
            Ok(cursor.extra as u64)
        }
    }

    fn container_remaining(&self, cursor: &Cursor) -> Result<Remaining> {
        if !cursor.is_length_known() {
            return Ok(Remaining::Indefinite);
        }
        let len = self.argument(cursor)?;
        if cursor.item_type == ItemType::Map {
            len.checked_mul(2).map(Remaining::Count).ok_or(CBORError::DataTooLarge)
        } else {
            Ok(Remaining::Count(len))
        }
    }

    /// Decodes the item head at `pos`. `remaining` describes the enclosing sequence state
    /// *before* this item; `Remaining::Count(0)` produces the end-of-sequence sentinel without
    /// reading any bytes, and a break byte is only legal when `remaining` is `Indefinite`.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    fn pre_parse_at(&mut self, pos: usize, remaining: Remaining) -> Result<Cursor> {
        if remaining == Remaining::Count(0) {
            return Ok(Cursor {
                pos,
                head_len: 0,
                major_type: 0,
                ai: 0,
                extra: 0,
                item_type: ItemType::Invalid,
                remaining,
                flags: 0,
            });
        }

        self.source.ensure(pos, 1).map_err(|e| self.latch_err(e))?;
        let first = *self
            .source
            .read_bytes(pos, 1)
            .ok_or_else(|| CBORError::UnexpectedEOF)
            .map_err(|e| self.latch_err(e))?
            .first()
            .ok_or_else(|| CBORError::UnexpectedEOF)
            .map_err(|e| self.latch_err(e))?;
        let ai = first & AI_MASK;
        let head_len: usize = match ai {
            0..=PAYLOAD_AI_BITS => 1,
            PAYLOAD_ONE_BYTE => 2,
            PAYLOAD_TWO_BYTES => 3,
            PAYLOAD_FOUR_BYTES => 5,
            PAYLOAD_EIGHT_BYTES => 9,
            _ => 1,
        };
        self.source.ensure(pos, head_len).map_err(|e| self.latch_err(e))?;
        let slice = self
            .source
            .read_bytes(pos, head_len)
            .ok_or(CBORError::UnexpectedEOF)
            .map_err(|e| self.latch_err(e))?;
        let (head, _consumed) = wire::decode_head(slice).map_err(|e| self.latch_err(e))?;

        if head.major_type == MT_SIMPLE && head.ai == AI_INDEFINITE {
            return match remaining {
                Remaining::Indefinite => Ok(Cursor {
                    pos,
                    head_len: head_len as u8,
                    major_type: head.major_type,
                    ai: head.ai,
                    extra: 0,
                    item_type: ItemType::Break,
                    remaining: Remaining::Count(0),
                    flags: 0,
                }),
                Remaining::Count(_) => Err(self.latch_err(CBORError::UnexpectedBreak)),
            };
        }

        let mut flags = 0u8;
        let item_type = match head.major_type {
            MT_UINT => ItemType::Integer,
            MT_NINT => {
                flags |= FLAG_NEGATIVE;
                ItemType::Integer
            }
            MT_BSTR => {
                if head.ai == AI_INDEFINITE {
                    flags |= FLAG_UNKNOWN_LENGTH;
                }
                ItemType::ByteString
            }
            MT_TSTR => {
                if head.ai == AI_INDEFINITE {
                    flags |= FLAG_UNKNOWN_LENGTH;
                }
                ItemType::TextString
            }
            MT_ARRAY => {
                if head.ai == AI_INDEFINITE {
                    flags |= FLAG_UNKNOWN_LENGTH;
                }
                ItemType::Array
            }
            MT_MAP => {
                if head.ai == AI_INDEFINITE {
                    flags |= FLAG_UNKNOWN_LENGTH;
                }
                ItemType::Map
            }
            MT_TAG => ItemType::Tag,
            MT_SIMPLE => match head.ai {
                SIMPLE_FALSE | SIMPLE_TRUE => ItemType::Boolean,
                SIMPLE_NULL => ItemType::Null,
                SIMPLE_UNDEFINED => ItemType::Undefined,
                PAYLOAD_ONE_BYTE => {
                    if self.options.strict_simple_value && head.argument < 32 {
                        return Err(self.latch_err(CBORError::UnknownSimpleType));
                    }
                    ItemType::SimpleValue
                }
                FLOAT_HALF | FLOAT_SINGLE | FLOAT_DOUBLE => ItemType::Float,
                // ai 28..=30 is rejected earlier, by `wire::decode_head`.
                0..=19 => ItemType::SimpleValue,
                _ => return Err(self.latch_err(CBORError::InternalError)),
            },
            _ => return Err(self.latch_err(CBORError::InternalError)),
        };

        let too_large = head.argument > u16::MAX as u64;
        if too_large {
            flags |= FLAG_TOO_LARGE;
        }
        let extra = if too_large { 0 } else { head.argument as u16 };

        Ok(Cursor {
            pos,
            head_len: head_len as u8,
            major_type: head.major_type,
            ai: head.ai,
            extra,
            item_type,
            remaining,
            flags,
        })
    }

    /// Computes the source offset immediately following `cursor`'s full extent: for scalars
    /// this is just past the head, for definite strings past their payload, for chunked strings
    /// past the terminating break, and for containers past their recursively-skipped contents.
    fn skip_extent(&mut self, cursor: &Cursor) -> Result<usize> {
        match cursor.item_type {
            ItemType::Integer
            | ItemType::Boolean
            | ItemType::Null
            | ItemType::Undefined
            | ItemType::SimpleValue
            | ItemType::Float => Ok(cursor.pos + cursor.head_len as usize),
            ItemType::Tag => {
                let tagged = self.pre_parse_at(cursor.pos + cursor.head_len as usize, cursor.remaining)?;
                self.skip_extent(&tagged)
            }
            ItemType::ByteString | ItemType::TextString => {
                if cursor.is_length_known() {
                    let len = self.argument(cursor)? as usize;
                    let start = cursor.pos + cursor.head_len as usize;
                    let end = start.checked_add(len).ok_or(CBORError::DataTooLarge)?;
                    self.source.ensure(start, len)?;
                    Ok(end)
                } else {
                    self.skip_chunked_string(cursor)
                }
            }
            ItemType::Array | ItemType::Map => {
                self.check_depth()?;
                self.depth += 1;
                let remaining = self.container_remaining(cursor)?;
                let first = self.pre_parse_at(cursor.pos + cursor.head_len as usize, remaining)?;
                let end = self.skip_to_container_end(first)?;
                self.depth -= 1;
                Ok(end)
            }
            ItemType::Break | ItemType::Invalid => Err(CBORError::InternalError),
        }
    }

    fn skip_to_container_end(&mut self, mut cursor: Cursor) -> Result<usize> {
        loop {
            match cursor.item_type {
                ItemType::Invalid => return Ok(cursor.pos),
                ItemType::Break => return Ok(cursor.pos + cursor.head_len as usize),
                _ => {
                    let end = self.skip_extent(&cursor)?;
                    let new_remaining = cursor.decrement_remaining()?;
                    cursor = self.pre_parse_at(end, new_remaining)?;
                }
            }
        }
    }

    fn skip_chunked_string(&mut self, cursor: &Cursor) -> Result<usize> {
        let mut pos = cursor.pos + cursor.head_len as usize;
        loop {
            let chunk = self.pre_parse_at(pos, Remaining::Indefinite)?;
            match chunk.item_type {
                ItemType::Break => return Ok(chunk.pos + chunk.head_len as usize),
                t if t == cursor.item_type => {
                    if !chunk.is_length_known() {
                        return Err(self.latch_err(CBORError::IllegalType));
                    }
                    let len = self.argument(&chunk)? as usize;
                    let start = chunk.pos + chunk.head_len as usize;
                    pos = start.checked_add(len).ok_or(CBORError::DataTooLarge)?;
                    self.source.ensure(start, len)?;
                }
                _ => return Err(self.latch_err(CBORError::IllegalType)),
            }
        }
    }

    fn chunked_string_length(&mut self, cursor: &Cursor) -> Result<u64> {
        let mut pos = cursor.pos + cursor.head_len as usize;
        let mut total: u64 = 0;
        loop {
            let chunk = self.pre_parse_at(pos, Remaining::Indefinite)?;
            match chunk.item_type {
                ItemType::Break => return Ok(total),
                t if t == cursor.item_type => {
                    if !chunk.is_length_known() {
                        return Err(self.latch_err(CBORError::IllegalType));
                    }
                    let len = self.argument(&chunk)?;
                    total = total.checked_add(len).ok_or_else(|| self.latch_err(CBORError::DataTooLarge))?;
                    let start = chunk.pos + chunk.head_len as usize;
                    let len_usize = len as usize;
                    self.source.ensure(start, len_usize)?;
                    pos = start + len_usize;
                }
                _ => return Err(self.latch_err(CBORError::IllegalType)),
            }
        }
    }

    fn copy_chunked_string(&mut self, cursor: &Cursor, dest: &mut [u8]) -> Result<usize> {
        let mut pos = cursor.pos + cursor.head_len as usize;
        let mut copied = 0usize;
        loop {
            let chunk = self.pre_parse_at(pos, Remaining::Indefinite)?;
            match chunk.item_type {
                ItemType::Break => return Ok(copied),
                t if t == cursor.item_type => {
                    if !chunk.is_length_known() {
                        return Err(self.latch_err(CBORError::IllegalType));
                    }
                    let len = self.argument(&chunk)? as usize;
                    let start = chunk.pos + chunk.head_len as usize;
                    if copied + len > dest.len() {
                        return Err(self.latch_err(CBORError::OutOfMemory));
                    }
                    self.source.ensure(start, len)?;
                    if let Some(slice) = self.source.read_bytes(start, len) {
                        dest[copied..copied + len].copy_from_slice(slice);
                    } else {
                        self.source.transfer_string(start, len, &mut dest[copied..copied + len])?;
                    }
                    copied += len;
                    pos = start + len;
                }
                _ => return Err(self.latch_err(CBORError::IllegalType)),
            }
        }
    }

    fn text_string_equals(&mut self, cursor: &Cursor, s: &str) -> Result<bool> {
        let total = self.chunked_string_length_or_definite(cursor)?;
        if total as usize != s.len() {
            return Ok(false);
        }
        if cursor.is_length_known() {
            let start = cursor.pos + cursor.head_len as usize;
            self.source.ensure(start, s.len())?;
            let slice = self
                .source
                .read_bytes(start, s.len())
                .ok_or(CBORError::InternalError)?;
            return Ok(slice == s.as_bytes());
        }
        let mut pos = cursor.pos + cursor.head_len as usize;
        let mut offset = 0usize;
        let mut mismatch = false;
        loop {
            let chunk = self.pre_parse_at(pos, Remaining::Indefinite)?;
            match chunk.item_type {
                ItemType::Break => return Ok(!mismatch),
                ItemType::TextString => {
                    let len = self.argument(&chunk)? as usize;
                    let start = chunk.pos + chunk.head_len as usize;
                    self.source.ensure(start, len)?;
                    let slice = self
                        .source
                        .read_bytes(start, len)
                        .ok_or(CBORError::InternalError)?;
                    if slice != s[offset..offset + len].as_bytes() {
                        mismatch = true;
                    }
                    offset += len;
                    pos = start + len;
                }
                _ => return Err(self.latch_err(CBORError::IllegalType)),
            }
        }
    }

    fn chunked_string_length_or_definite(&mut self, cursor: &Cursor) -> Result<u64> {
        if cursor.is_length_known() {
            self.argument(cursor)
        } else {
            self.chunked_string_length(cursor)
        }
    }

    /// Confirms `len` bytes starting at `pos` are available, pulling input if the source is
    /// pull-based. Exposed to the validator, which needs to probe for trailing bytes after the
    /// top-level item without going through a cursor.
    pub(crate) fn ensure_range(&mut self, pos: usize, len: usize) -> Result<()> {
        self.source.ensure(pos, len)
    }

    /// A resident byte slice, for the validator's map-key-uniqueness comparison. Callers must
    /// have already made the span resident via `ensure_range`.
    pub(crate) fn raw_slice(&self, pos: usize, len: usize) -> Result<&[u8]> {
        self.source.read_bytes(pos, len).ok_or(CBORError::InternalError)
    }

    /// Runs `f` once per chunk of a byte/text string's content: once with the whole payload for
    /// a definite-length string, once per chunk (in order) for an indefinite-length one. Exposed
    /// to the validator's per-chunk UTF-8 check, which must validate each chunk independently
    /// rather than copying the whole string out first.
    pub(crate) fn for_each_chunk(
        &mut self,
        cursor: &Cursor,
        mut f: impl FnMut(&[u8]) -> Result<()>,
    ) -> Result<()> {
        if cursor.is_length_known() {
            let len = self.argument(cursor)? as usize;
            let start = cursor.pos + cursor.head_len as usize;
            self.source.ensure(start, len)?;
            let slice = self.source.read_bytes(start, len).ok_or(CBORError::InternalError)?;
            f(slice)
        } else {
            let mut pos = cursor.pos + cursor.head_len as usize;
            loop {
                let chunk = self.pre_parse_at(pos, Remaining::Indefinite)?;
                match chunk.item_type {
                    ItemType::Break => return Ok(()),
                    t if t == cursor.item_type => {
                        if !chunk.is_length_known() {
                            return Err(self.latch_err(CBORError::IllegalType));
                        }
                        let len = self.argument(&chunk)? as usize;
                        let start = chunk.pos + chunk.head_len as usize;
                        self.source.ensure(start, len)?;
                        let slice = self.source.read_bytes(start, len).ok_or(CBORError::InternalError)?;
                        f(slice)?;
                        pos = start + len;
                    }
                    _ => return Err(self.latch_err(CBORError::IllegalType)),
                }
            }
        }
    }
}
