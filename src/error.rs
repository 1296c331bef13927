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
/***************************************************************************************************
 * cbor_core Error API
 *
 * A single error enum shared by the wire codec, encoder, parser/cursor and validator. This
 * implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator by default.
 **************************************************************************************************/
use core::result;

#[cfg(any(feature = "std", test))]
use thiserror::Error;

/// An alias for Result<T, CBORError> used throughout this crate.
pub type Result<T> = result::Result<T, CBORError>;

/// `CBORError` enumerates every failure mode raised while encoding, parsing or validating CBOR.
/// There is one flat enum rather than one per subsystem: callers that bubble parse errors up
/// through several layers of container traversal do not have to convert between nested types.
#[cfg_attr(any(feature = "std", test), derive(Copy, Clone, Error, Debug, PartialEq, Eq))]
#[cfg_attr(all(not(feature = "std"), not(test)), derive(Copy, Clone, Debug, PartialEq, Eq))]
pub enum CBORError {
    /// The source was exhausted while a head or its follow-on bytes were still expected.
    #[cfg_attr(any(feature = "std", test), error("Unexpected end of input"))]
    UnexpectedEOF,
    /// An indefinite-length container or chunked string was never terminated by a break.
    #[cfg_attr(any(feature = "std", test), error("Break stop code missing before end of input"))]
    BreakMissingAtEOF,
    /// A break stop code (0xFF) was seen somewhere it is not legal.
    #[cfg_attr(any(feature = "std", test), error("Unexpected break stop code"))]
    UnexpectedBreak,
    /// Additional information 28..=30 was observed outside of a break context.
    #[cfg_attr(any(feature = "std", test), error("Unknown major type/additional information combination"))]
    UnknownType,
    /// A chunk within an indefinite-length string did not match the major type of its container.
    #[cfg_attr(any(feature = "std", test), error("Chunked string chunk type mismatch"))]
    IllegalType,
    /// Additional information 28..=30 was observed where a definite number was expected.
    #[cfg_attr(any(feature = "std", test), error("Illegal number: reserved additional information"))]
    IllegalNumber,
    /// A simple value encoding used a value or form that RFC 8949 forbids.
    #[cfg_attr(any(feature = "std", test), error("Illegal simple value encoding"))]
    IllegalSimpleType,
    /// Simple value 24..=31 seen while strict simple-value checking is enabled.
    #[cfg_attr(any(feature = "std", test), error("Simple value not permitted by strict mode"))]
    UnknownSimpleType,
    /// A tag number the validator does not recognise, with strict tag checking enabled.
    #[cfg_attr(any(feature = "std", test), error("Unrecognised tag number"))]
    UnknownTag,
    /// A recognised tag decorates an item of the wrong major type.
    #[cfg_attr(any(feature = "std", test), error("Tag is not appropriate for the tagged item's type"))]
    InappropriateTagForType,
    /// Two keys in the same map compared equal.
    #[cfg_attr(any(feature = "std", test), error("Map contains duplicate keys"))]
    DuplicateObjectKeys,
    /// A text string chunk was not well-formed UTF-8.
    #[cfg_attr(any(feature = "std", test), error("Text string is not valid UTF-8"))]
    InvalidUtf8TextString,
    /// A length computation (e.g. summing chunked-string lengths) would overflow.
    #[cfg_attr(any(feature = "std", test), error("Computed size exceeds platform limits"))]
    DataTooLarge,
    /// Container/tag nesting exceeded the configured recursion cap.
    #[cfg_attr(any(feature = "std", test), error("Nesting exceeds the configured depth limit"))]
    NestingTooDeep,
    /// The sink (bounded buffer) ran out of room; see `Encoder::extra_bytes_needed`.
    #[cfg_attr(any(feature = "std", test), error("Sink has insufficient space for this item"))]
    OutOfMemory,
    /// The underlying source or sink I/O callback failed.
    #[cfg_attr(any(feature = "std", test), error("I/O failure in source or sink"))]
    IO,
    /// `advance` was called on a cursor already at the end of its enclosing container.
    #[cfg_attr(any(feature = "std", test), error("Advance called past end of input"))]
    AdvancePastEOF,
    /// `close_container` was called before the declared element count had been emitted.
    #[cfg_attr(any(feature = "std", test), error("Container was closed before it was completed"))]
    ContainerNotCompleted,
    /// A JSON-conversion consumer (out of scope here) found a non-string map key.
    #[cfg_attr(any(feature = "std", test), error("JSON object key is not a string"))]
    JsonObjectKeyNotString,
    /// An invariant that the implementation itself is responsible for maintaining was violated.
    #[cfg_attr(any(feature = "std", test), error("Internal error"))]
    InternalError,
    /// Strict validation found bytes after the single top-level item.
    #[cfg_attr(any(feature = "std", test), error("Unconsumed bytes after the top-level item"))]
    GarbageAtEnd,
}

/// Returns a stable, human-readable message for an error kind.
///
/// This is the crate's only diagnostics surface: a `match` over the enum returning constant
/// data, callable even when `std` is disabled.
pub fn cbor_error_string(kind: CBORError) -> &'static str {
    use CBORError::*;
    match kind {
        UnexpectedEOF => "unexpected end of input",
        BreakMissingAtEOF => "break stop code missing before end of input",
        UnexpectedBreak => "unexpected break stop code",
        UnknownType => "unknown major type/additional information combination",
        IllegalType => "chunked string chunk type mismatch",
        IllegalNumber => "illegal number: reserved additional information",
        IllegalSimpleType => "illegal simple value encoding",
        UnknownSimpleType => "simple value not permitted by strict mode",
        UnknownTag => "unrecognised tag number",
        InappropriateTagForType => "tag is not appropriate for the tagged item's type",
        DuplicateObjectKeys => "map contains duplicate keys",
        InvalidUtf8TextString => "text string is not valid UTF-8",
        DataTooLarge => "computed size exceeds platform limits",
        NestingTooDeep => "nesting exceeds the configured depth limit",
        OutOfMemory => "sink has insufficient space for this item",
        IO => "I/O failure in source or sink",
        AdvancePastEOF => "advance called past end of input",
        ContainerNotCompleted => "container was closed before it was completed",
        JsonObjectKeyNotString => "JSON object key is not a string",
        InternalError => "internal error",
        GarbageAtEnd => "unconsumed bytes after the top-level item",
    }
}
