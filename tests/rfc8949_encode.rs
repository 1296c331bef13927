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
 * Test cases from RFC8949, Appendix A, for encoding using the streaming `Encoder`.
 **************************************************************************************************/

extern crate cbor_core;

#[cfg(feature = "float")]
use cbor_core::error::CBORError;
use cbor_core::encoder::Encoder;
use cbor_core::sink::BufferSink;

fn encode_to_vec(f: impl FnOnce(&mut Encoder<BufferSink<'_>>) -> cbor_core::error::Result<()>) -> Vec<u8> {
    let mut buf = [0u8; 256];
    let mut sink = BufferSink::new(&mut buf);
    let mut enc = Encoder::new(&mut sink);
    f(&mut enc).expect("encode should succeed");
    sink.as_slice().expect("sink should not overflow").to_vec()
}

/***************************************************************************************************
 * Unsigned and negative integers (RFC8949, Appendix A, Table 4 entries for major types 0 and 1).
 **************************************************************************************************/
#[test]
fn encode_unsigned_integers() -> cbor_core::error::Result<()> {
    println!("<=== encode_unsigned_integers ===>");
    for (val, expect) in [
        (0u64, &[0x00][..]),
        (1, &[0x01][..]),
        (10, &[0x0a][..]),
        (23, &[0x17][..]),
        (24, &[0x18, 0x18][..]),
        (25, &[0x18, 0x19][..]),
        (100, &[0x18, 0x64][..]),
        (1000, &[0x19, 0x03, 0xe8][..]),
        (1_000_000, &[0x1a, 0x00, 0x0f, 0x42, 0x40][..]),
        (1_000_000_000_000, &[0x1b, 0x00, 0x00, 0x00, 0xe8, 0xd4, 0xa5, 0x10, 0x00][..]),
        (18_446_744_073_709_551_615, &[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff][..]),
    ] {
        let out = encode_to_vec(|enc| enc.encode_uint(val));
        println!("value: {}, got: {:02x?}, expect: {:02x?}", val, out, expect);
        assert_eq!(out, expect);
    }
    Ok(())
}

#[test]
fn encode_negative_integers() -> cbor_core::error::Result<()> {
    println!("<=== encode_negative_integers ===>");
    for (val, expect) in [
        (-1i64, &[0x20][..]),
        (-10, &[0x29][..]),
        (-100, &[0x38, 0x63][..]),
        (-1000, &[0x39, 0x03, 0xe7][..]),
    ] {
        let out = encode_to_vec(|enc| enc.encode_int(val));
        println!("value: {}, got: {:02x?}, expect: {:02x?}", val, out, expect);
        assert_eq!(out, expect);
    }
    Ok(())
}

#[test]
fn encode_int_at_i64_min_does_not_overflow() -> cbor_core::error::Result<()> {
    println!("<=== encode_int_at_i64_min_does_not_overflow ===>");
    // -1 - n == i64::MIN  =>  n == i64::MAX as u64, computed without overflowing i64 arithmetic.
    let out = encode_to_vec(|enc| enc.encode_int(i64::MIN));
    assert_eq!(out, [0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    Ok(())
}

/***************************************************************************************************
 * Simple values: booleans, null, undefined (RFC8949, Appendix A, Table 4 entries for major type 7).
 **************************************************************************************************/
#[test]
fn encode_simple_values() -> cbor_core::error::Result<()> {
    println!("<=== encode_simple_values ===>");
    assert_eq!(encode_to_vec(|enc| enc.encode_boolean(false)), [0xf4]);
    assert_eq!(encode_to_vec(|enc| enc.encode_boolean(true)), [0xf5]);
    assert_eq!(encode_to_vec(|enc| enc.encode_null()), [0xf6]);
    assert_eq!(encode_to_vec(|enc| enc.encode_undefined()), [0xf7]);
    Ok(())
}

/***************************************************************************************************
 * Floating point (RFC8949, Appendix A). `encode_floating_point_shortest` is the convenience that
 * picks the shortest IEEE-754 form that round-trips a value exactly; `encode_floating_point`
 * itself takes an explicit `FloatWidth` and writes its bits verbatim, with no narrowing, so that
 * a width observed while parsing can always be reproduced on re-encode.
 **************************************************************************************************/
#[cfg(feature = "float")]
use cbor_core::encoder::FloatWidth;

#[cfg(feature = "float")]
#[test]
fn encode_floats_pick_shortest_exact_form() -> Result<(), CBORError> {
    println!("<=== encode_floats_pick_shortest_exact_form ===>");
    for (val, expect) in [
        (0.0f64, &[0xf9, 0x00, 0x00][..]),
        (-0.0, &[0xf9, 0x80, 0x00][..]),
        (1.0, &[0xf9, 0x3c, 0x00][..]),
        (1.5, &[0xf9, 0x3e, 0x00][..]),
        (65504.0, &[0xf9, 0x7b, 0xff][..]),
        (100000.0, &[0xfa, 0x47, 0xc3, 0x50, 0x00][..]),
        (3.4028234663852886e+38, &[0xfa, 0x7f, 0x7f, 0xff, 0xff][..]),
        (1.1, &[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a][..]),
        (1.0e+300, &[0xfb, 0x7e, 0x37, 0xe4, 0x3c, 0x88, 0x00, 0x75, 0x9c][..]),
    ] {
        let out = encode_to_vec(|enc| enc.encode_floating_point_shortest(val));
        println!("value: {}, got: {:02x?}, expect: {:02x?}", val, out, expect);
        assert_eq!(out, expect);
    }
    Ok(())
}

#[cfg(feature = "float")]
#[test]
fn encode_float_special_values() -> Result<(), CBORError> {
    println!("<=== encode_float_special_values ===>");
    assert_eq!(encode_to_vec(|enc| enc.encode_floating_point_shortest(f64::INFINITY)), [0xf9, 0x7c, 0x00]);
    assert_eq!(encode_to_vec(|enc| enc.encode_floating_point_shortest(f64::NEG_INFINITY)), [0xf9, 0xfc, 0x00]);
    // A quiet NaN round-trips through half precision, so the shortest form is chosen for it too.
    let out = encode_to_vec(|enc| enc.encode_floating_point_shortest(f64::NAN));
    assert_eq!(out[0], 0xf9);
    Ok(())
}

/***************************************************************************************************
 * `encode_floating_point` writes each width verbatim: a double does not get narrowed to a half
 * just because its value happens to round-trip through one, satisfying §8.1's round-trip
 * invariant for a parsed `Float` item re-emitted at its observed width.
 **************************************************************************************************/
#[cfg(feature = "float")]
#[test]
fn encode_floating_point_writes_each_width_verbatim() -> Result<(), CBORError> {
    println!("<=== encode_floating_point_writes_each_width_verbatim ===>");
    // 1.0 round-trips through half precision, but encoding it as a double must still produce
    // the full 8-byte double form (FB 3FF0000000000000), not the shortened FB 3C00.
    let out = encode_to_vec(|enc| enc.encode_floating_point(FloatWidth::Double, 1.0f64.to_bits()));
    assert_eq!(out, [0xfb, 0x3f, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    let out = encode_to_vec(|enc| enc.encode_floating_point(FloatWidth::Single, (1.0f32.to_bits()) as u64));
    assert_eq!(out, [0xfa, 0x3f, 0x80, 0x00, 0x00]);

    let out = encode_to_vec(|enc| enc.encode_floating_point(FloatWidth::Half, 0x3c00));
    assert_eq!(out, [0xf9, 0x3c, 0x00]);
    Ok(())
}

/***************************************************************************************************
 * Decode-then-re-encode at the observed width reproduces the original bytes exactly, which the
 * shortest-form convenience alone could not do for a double that happens to narrow cleanly.
 **************************************************************************************************/
#[cfg(feature = "float")]
#[test]
fn float_round_trips_at_its_observed_width() -> Result<(), CBORError> {
    println!("<=== float_round_trips_at_its_observed_width ===>");
    use cbor_core::cursor::{ItemType, Parser};
    use cbor_core::source::BufferSource;

    let original = [0xfb, 0x3f, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]; // double 1.0
    let mut parser = Parser::new(BufferSource::new(&original));
    let cur = parser.init()?;
    assert_eq!(cur.item_type(), ItemType::Float);
    assert_eq!(cur.ai(), 27); // double-precision additional information
    let bits = cur.raw_argument(&parser)?;

    let out = encode_to_vec(|enc| enc.encode_floating_point(FloatWidth::Double, bits));
    assert_eq!(out, original);
    Ok(())
}

/***************************************************************************************************
 * Byte strings and text strings.
 **************************************************************************************************/
#[test]
fn encode_byte_strings() -> cbor_core::error::Result<()> {
    println!("<=== encode_byte_strings ===>");
    assert_eq!(encode_to_vec(|enc| enc.encode_byte_string(&[])), [0x40]);
    assert_eq!(
        encode_to_vec(|enc| enc.encode_byte_string(&[0x01, 0x02, 0x03, 0x04])),
        [0x44, 0x01, 0x02, 0x03, 0x04]
    );
    Ok(())
}

#[test]
fn encode_text_strings() -> cbor_core::error::Result<()> {
    println!("<=== encode_text_strings ===>");
    for (val, expect) in [
        ("", &[0x60][..]),
        ("a", &[0x61, b'a'][..]),
        ("IETF", &[0x64, b'I', b'E', b'T', b'F'][..]),
        ("\"\\", &[0x62, b'"', b'\\'][..]),
    ] {
        let out = encode_to_vec(|enc| enc.encode_text_string(val));
        println!("value: {:?}, got: {:02x?}, expect: {:02x?}", val, out, expect);
        assert_eq!(out, expect);
    }
    Ok(())
}

/***************************************************************************************************
 * Arrays: empty, short, nested and long (triggering the two-byte length form).
 **************************************************************************************************/
#[test]
fn encode_empty_array() -> cbor_core::error::Result<()> {
    println!("<=== encode_empty_array ===>");
    let out = encode_to_vec(|enc| {
        let child = enc.create_array(0)?;
        enc.close_container(child)
    });
    assert_eq!(out, [0x80]);
    Ok(())
}

#[test]
fn encode_flat_array() -> cbor_core::error::Result<()> {
    println!("<=== encode_flat_array ===>");
    // [1, 2, 3]
    let out = encode_to_vec(|enc| {
        let mut child = enc.create_array(3)?;
        child.encode_uint(1)?;
        child.encode_uint(2)?;
        child.encode_uint(3)?;
        enc.close_container(child)
    });
    assert_eq!(out, [0x83, 0x01, 0x02, 0x03]);
    Ok(())
}

#[test]
fn encode_nested_array() -> cbor_core::error::Result<()> {
    println!("<=== encode_nested_array ===>");
    // [1, [2, 3], [4, 5]]
    let out = encode_to_vec(|enc| {
        let mut outer = enc.create_array(3)?;
        outer.encode_uint(1)?;
        let mut inner1 = outer.create_array(2)?;
        inner1.encode_uint(2)?;
        inner1.encode_uint(3)?;
        outer.close_container(inner1)?;
        let mut inner2 = outer.create_array(2)?;
        inner2.encode_uint(4)?;
        inner2.encode_uint(5)?;
        outer.close_container(inner2)?;
        enc.close_container(outer)
    });
    assert_eq!(out, [0x83, 0x01, 0x82, 0x02, 0x03, 0x82, 0x04, 0x05]);
    Ok(())
}

#[test]
fn encode_long_array_uses_two_byte_length() -> cbor_core::error::Result<()> {
    println!("<=== encode_long_array_uses_two_byte_length ===>");
    // A 25-element array of integers 1..=25, per RFC8949 Appendix A's [1..25] example.
    let out = encode_to_vec(|enc| {
        let mut child = enc.create_array(25)?;
        for i in 1..=25u64 {
            child.encode_uint(i)?;
        }
        enc.close_container(child)
    });
    assert_eq!(&out[0..2], [0x98, 0x19]);
    // Head (2 bytes) + 23 one-byte ints (1..=23) + 2 two-byte ints (24, 25).
    assert_eq!(out.len(), 2 + 23 + 2 * 2);
    Ok(())
}

/***************************************************************************************************
 * Maps.
 **************************************************************************************************/
#[test]
fn encode_empty_map() -> cbor_core::error::Result<()> {
    println!("<=== encode_empty_map ===>");
    let out = encode_to_vec(|enc| {
        let child = enc.create_map(0)?;
        enc.close_container(child)
    });
    assert_eq!(out, [0xa0]);
    Ok(())
}

#[test]
fn encode_map_with_string_keys() -> cbor_core::error::Result<()> {
    println!("<=== encode_map_with_string_keys ===>");
    // {"a": 1, "b": [2, 3]}
    let out = encode_to_vec(|enc| {
        let mut child = enc.create_map(2)?;
        child.encode_text_string("a")?;
        child.encode_uint(1)?;
        child.encode_text_string("b")?;
        let mut inner = child.create_array(2)?;
        inner.encode_uint(2)?;
        inner.encode_uint(3)?;
        child.close_container(inner)?;
        enc.close_container(child)
    });
    assert_eq!(
        out,
        [0xa2, 0x61, b'a', 0x01, 0x61, b'b', 0x82, 0x02, 0x03]
    );
    Ok(())
}

/***************************************************************************************************
 * Indefinite-length containers and the lax-close Open Question resolution.
 **************************************************************************************************/
#[test]
fn encode_indefinite_array() -> cbor_core::error::Result<()> {
    println!("<=== encode_indefinite_array ===>");
    // [_ 1, 2]
    let out = encode_to_vec(|enc| {
        let mut child = enc.create_indefinite_array()?;
        child.encode_uint(1)?;
        child.encode_uint(2)?;
        enc.close_container(child)
    });
    assert_eq!(out, [0x9f, 0x01, 0x02, 0xff]);
    Ok(())
}

#[test]
fn close_container_rejects_incomplete_definite_array() {
    println!("<=== close_container_rejects_incomplete_definite_array ===>");
    let mut buf = [0u8; 16];
    let mut sink = BufferSink::new(&mut buf);
    let mut enc = Encoder::new(&mut sink);
    let mut child = enc.create_array(3).unwrap();
    child.encode_uint(1).unwrap();
    let result = enc.close_container(child);
    assert_eq!(result, Err(cbor_core::error::CBORError::ContainerNotCompleted));
}

#[test]
fn close_container_lax_accepts_incomplete_definite_array() {
    println!("<=== close_container_lax_accepts_incomplete_definite_array ===>");
    let mut buf = [0u8; 16];
    let mut sink = BufferSink::new(&mut buf);
    let mut enc = Encoder::new(&mut sink);
    let mut child = enc.create_array(3).unwrap();
    child.encode_uint(1).unwrap();
    assert!(enc.close_container_lax(child).is_ok());
}

/***************************************************************************************************
 * Tags.
 **************************************************************************************************/
#[test]
fn encode_tagged_byte_string() -> cbor_core::error::Result<()> {
    println!("<=== encode_tagged_byte_string ===>");
    // 23(h'01020304') -> tag 23 (expected base16 encoding) over a byte string.
    let out = encode_to_vec(|enc| {
        enc.encode_tag(23)?;
        enc.encode_byte_string(&[0x01, 0x02, 0x03, 0x04])
    });
    assert_eq!(out, [0xd7, 0x44, 0x01, 0x02, 0x03, 0x04]);
    Ok(())
}

/***************************************************************************************************
 * Sink overflow: `extra_bytes_needed` must report the true shortfall without the encode erroring.
 **************************************************************************************************/
#[test]
fn sink_overflow_reports_shortfall() {
    println!("<=== sink_overflow_reports_shortfall ===>");
    let mut buf = [0u8; 2];
    let mut sink = BufferSink::new(&mut buf);
    let mut enc = Encoder::new(&mut sink);
    enc.encode_byte_string(&[0x01, 0x02, 0x03, 0x04, 0x05]).unwrap();
    assert_eq!(enc.extra_bytes_needed(), 4);
    assert!(sink.as_slice().is_none());
}
