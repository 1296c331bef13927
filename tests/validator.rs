/***************************************************************************************************
 * Copyright (c) 2020-2023 Qualcomm Innovation Center, Inc. All rights reserved.
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
 * Integration tests for the structural/strictness validator, exercising each `ValidatorOptions`
 * flag independently and its interaction with nested containers, tags and chunked strings.
 **************************************************************************************************/

extern crate cbor_core;

use cbor_core::cursor::Parser;
use cbor_core::error::CBORError;
use cbor_core::source::BufferSource;
use cbor_core::validator::{Validator, ValidatorOptions};

fn validate(bytes: &[u8]) -> cbor_core::error::Result<()> {
    let mut parser = Parser::new(BufferSource::new(bytes));
    Validator::new().validate(&mut parser)
}

fn validate_with(bytes: &[u8], options: ValidatorOptions) -> cbor_core::error::Result<()> {
    let mut parser = Parser::new(BufferSource::new(bytes));
    Validator::with_options(options).validate(&mut parser)
}

/***************************************************************************************************
 * A well-formed document of every major item kind, nested several levels deep, must validate
 * cleanly under the default (fully strict) options.
 **************************************************************************************************/
#[test]
fn accepts_deeply_nested_well_formed_document() {
    println!("<=== accepts_deeply_nested_well_formed_document ===>");
    // {"a": [1, 2, {"b": true}], "c": h'0102'}
    let bytes = [
        0xa2, // map(2)
        0x61, b'a', // "a"
        0x83, 0x01, 0x02, // [1, 2,
        0xa1, 0x61, b'b', 0xf5, // {"b": true}]
        0x61, b'c', // "c"
        0x42, 0x01, 0x02, // h'0102'
    ];
    assert_eq!(validate(&bytes), Ok(()));
}

#[test]
fn accepts_indefinite_length_array_of_chunked_strings() {
    println!("<=== accepts_indefinite_length_array_of_chunked_strings ===>");
    // [_ (_ "strea", "ming")]
    let bytes = [
        0x9f, 0x7f, 0x65, b's', b't', b'r', b'e', b'a', 0x64, b'm', b'i', b'n', b'g', 0xff, 0xff,
    ];
    assert_eq!(validate(&bytes), Ok(()));
}

/***************************************************************************************************
 * Canonical (shortest-form) encoding.
 **************************************************************************************************/
#[test]
fn rejects_non_shortest_array_length() {
    println!("<=== rejects_non_shortest_array_length ===>");
    // 98 01 01 -> a one-element array whose length is encoded in the 1-byte-follow-on form
    // instead of inline.
    let bytes = [0x98, 0x01, 0x01];
    assert_eq!(validate(&bytes), Err(CBORError::IllegalNumber));
}

#[test]
fn rejects_non_shortest_tag_number() {
    println!("<=== rejects_non_shortest_tag_number ===>");
    // d8 00 01 -> tag 0 encoded via the 1-byte-follow-on form instead of inline.
    let bytes = [0xd8, 0x00, 0x01];
    assert_eq!(validate(&bytes), Err(CBORError::IllegalNumber));
}

#[test]
fn canonical_check_does_not_apply_to_indefinite_length_items() {
    println!("<=== canonical_check_does_not_apply_to_indefinite_length_items ===>");
    // An indefinite-length array has no length argument to judge for shortest form.
    let bytes = [0x9f, 0x01, 0xff];
    assert_eq!(validate(&bytes), Ok(()));
}

/***************************************************************************************************
 * Tag/type appropriateness.
 **************************************************************************************************/
#[test]
fn rejects_tag_two_over_text_string() {
    println!("<=== rejects_tag_two_over_text_string ===>");
    // c2 61 61 -> tag 2 (expected positive bignum, a byte string) decorating a text string.
    let bytes = [0xc2, 0x61, b'a'];
    assert_eq!(validate(&bytes), Err(CBORError::InappropriateTagForType));
}

#[test]
fn accepts_tag_two_over_byte_string() {
    println!("<=== accepts_tag_two_over_byte_string ===>");
    // c2 41 01 -> tag 2 over a one-byte byte string.
    let bytes = [0xc2, 0x41, 0x01];
    assert_eq!(validate(&bytes), Ok(()));
}

#[test]
fn check_tags_disabled_accepts_mismatched_tag() {
    println!("<=== check_tags_disabled_accepts_mismatched_tag ===>");
    let options = ValidatorOptions {
        check_tags: false,
        ..ValidatorOptions::default()
    };
    let bytes = [0xc2, 0x61, b'a'];
    assert_eq!(validate_with(&bytes, options), Ok(()));
}

/***************************************************************************************************
 * UTF-8 validity, including chunked strings (each chunk validated independently).
 **************************************************************************************************/
#[test]
fn rejects_invalid_utf8_in_one_chunk_of_a_chunked_string() {
    println!("<=== rejects_invalid_utf8_in_one_chunk_of_a_chunked_string ===>");
    // 7f 61 "a" 61 ff ff -> chunked text string whose second chunk is a lone continuation byte.
    let bytes = [0x7f, 0x61, b'a', 0x61, 0xff, 0xff];
    assert_eq!(validate(&bytes), Err(CBORError::InvalidUtf8TextString));
}

#[test]
fn check_utf8_disabled_accepts_invalid_bytes() {
    println!("<=== check_utf8_disabled_accepts_invalid_bytes ===>");
    let options = ValidatorOptions {
        check_utf8: false,
        ..ValidatorOptions::default()
    };
    let bytes = [0x61, 0xff];
    assert_eq!(validate_with(&bytes, options), Ok(()));
}

/***************************************************************************************************
 * Duplicate key detection, including across nested maps and non-scalar keys.
 **************************************************************************************************/
#[cfg(feature = "alloc")]
#[test]
fn rejects_duplicate_keys_with_non_scalar_values() {
    println!("<=== rejects_duplicate_keys_with_non_scalar_values ===>");
    // {"a": [1], "a": [2]}
    let bytes = [
        0xa2, 0x61, b'a', 0x81, 0x01, 0x61, b'a', 0x81, 0x02,
    ];
    assert_eq!(validate(&bytes), Err(CBORError::DuplicateObjectKeys));
}

#[cfg(feature = "alloc")]
#[test]
fn accepts_keys_of_equal_length_but_different_content() {
    println!("<=== accepts_keys_of_equal_length_but_different_content ===>");
    // {"aa": 1, "ab": 2} -- same-length keys that must still be compared byte-for-byte.
    let bytes = [
        0xa2, 0x62, b'a', b'a', 0x01, 0x62, b'a', b'b', 0x02,
    ];
    assert_eq!(validate(&bytes), Ok(()));
}

#[cfg(feature = "alloc")]
#[test]
fn check_unique_keys_disabled_accepts_duplicates() {
    println!("<=== check_unique_keys_disabled_accepts_duplicates ===>");
    let options = ValidatorOptions {
        check_unique_keys: false,
        ..ValidatorOptions::default()
    };
    let bytes = [0xa2, 0x01, 0x01, 0x01, 0x02];
    assert_eq!(validate_with(&bytes, options), Ok(()));
}

/***************************************************************************************************
 * Trailing garbage after the top-level item.
 **************************************************************************************************/
#[test]
fn accepts_single_top_level_item_with_nothing_after_it() {
    println!("<=== accepts_single_top_level_item_with_nothing_after_it ===>");
    assert_eq!(validate(&[0x01]), Ok(()));
}

#[test]
fn rejects_garbage_after_top_level_container() {
    println!("<=== rejects_garbage_after_top_level_container ===>");
    // A complete array followed by a stray byte.
    let bytes = [0x81, 0x01, 0x02];
    assert_eq!(validate(&bytes), Err(CBORError::GarbageAtEnd));
}

/***************************************************************************************************
 * Disabling every flag still leaves the parser's own well-formedness checks (run unconditionally
 * during pre-parse) in force: a reserved additional-information value is still rejected.
 **************************************************************************************************/
#[test]
fn disabling_all_flags_still_rejects_malformed_wire_data() {
    println!("<=== disabling_all_flags_still_rejects_malformed_wire_data ===>");
    let options = ValidatorOptions {
        canonical: false,
        check_tags: false,
        check_utf8: false,
        check_unique_keys: false,
    };
    let bytes = [0x1c]; // major type 0, reserved additional information
    assert_eq!(validate_with(&bytes, options), Err(CBORError::IllegalNumber));
}
