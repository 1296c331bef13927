/***************************************************************************************************
 * Copyright (c) 2020-2022, Qualcomm Innovation Center, Inc. All rights reserved.
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
 * cbor_core module definition
 *
 * A streaming, zero-copy CBOR (RFC 8949) encoder, parser and validator. This implementation is
 * designed for use in constrained systems and requires neither the Rust standard library nor an
 * allocator by default.
 **************************************************************************************************/

// Default configuration
#![no_std]
#![warn(missing_docs)]

//! # cbor_core
//!
//! `cbor_core` provides a streaming CBOR ([RFC 8949](https://www.rfc-editor.org/rfc/rfc8949))
//! implementation built around three small, independently useful pieces:
//!
//! - An [`encoder::Encoder`] that writes items directly to a [`sink::Sink`] — a fixed buffer, or
//!   a caller-supplied write callback — always in the shortest encoding RFC 8949 permits.
//! - A [`cursor::Parser`]/[`cursor::Cursor`] pair that walks items from a [`source::Source`] one
//!   at a time, including indefinite-length containers and chunked strings, without building an
//!   intermediate tree.
//! - A [`validator::Validator`] that performs a second, independently configurable pass checking
//!   canonical encoding, tag/type appropriateness, UTF-8 validity and map key uniqueness.
//!
//! The default build is `no_std` and allocator-free: encoding and parsing work entirely against
//! caller-supplied buffers. The `std` feature enables a pull-based [`source::ReaderSource`] over
//! `std::io::Read`; `alloc` enables [`cursor::Cursor::dup_string`]; `float` enables the floating
//! point item kind; `trace` enables function-level tracing via `func_trace`. `full` enables all
//! of the above.
//!
//! ## Example
//!
//! ```
//! use cbor_core::encoder::Encoder;
//! use cbor_core::sink::BufferSink;
//!
//! let mut buf = [0u8; 16];
//! {
//!     let mut sink = BufferSink::new(&mut buf);
//!     let mut enc = Encoder::new(&mut sink);
//!     let mut arr = enc.create_array(3).unwrap();
//!     arr.encode_uint(1).unwrap();
//!     arr.encode_boolean(true).unwrap();
//!     arr.encode_negative_int(9).unwrap();
//!     enc.close_container(arr).unwrap();
//! }
//! assert_eq!(&buf[..4], &[0x83, 0x01, 0xf5, 0x29]);
//! ```

#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(any(feature = "alloc", test))]
extern crate alloc;

#[cfg(any(feature = "float", test))]
extern crate half;

mod constants;

/// The wire codec: translating between item heads and their byte encoding.
pub mod wire;

/// The `Source` trait and its two implementations, `BufferSource` and (std-only) `ReaderSource`.
pub mod source;

/// The `Sink` trait and its two implementations, `BufferSink` and `CallbackSink`.
pub mod sink;

/// The streaming encoder.
pub mod encoder;

/// The streaming parser and its cursor.
pub mod cursor;

/// The structural/strictness validator.
pub mod validator;

/// Error definitions shared by every module in this crate.
pub mod error;
