//! Chunk-boundary invariance.
//!
//! The parser must produce the same messages however the byte stream is
//! split. These tests compare chunked parses against a single-chunk parse
//! of the same bytes, exhaustively for every one- and two-cut split of
//! short streams, and for fixed chunk sizes over the larger fixture.
//!
//! Splits of interest that the exhaustive loops are guaranteed to hit:
//!
//! - between CR and LF of a CRLF terminator
//! - inside a field name, right after the colon, right after the space
//! - inside a 2-, 3- and 4-byte UTF-8 code point

use sse_tests::{MIXED_STREAM, parse_in_chunks, parse_split_at, parse_whole, render};
use sse_wire::{Parser, ParserConfig};

const SHORT_STREAMS: &[&[u8]] = &[
    b"id:1\rdata:d1\r\n\r\n",
    b"event: a\ndata: x\ndata: y\n\n: c\n\nflag\r\n\r\n",
    "data: é€😀\r\n\r\nid: ü\n\n".as_bytes(),
    b":\r\n\r\ndata:  two\r\rdata\n\n",
];

#[test]
fn every_single_cut_matches_whole_parse() {
    for input in SHORT_STREAMS {
        let expected = parse_whole(input);
        for cut in 0..=input.len() {
            assert_eq!(
                parse_split_at(input, &[cut]),
                expected,
                "input {:?} cut at {cut}",
                String::from_utf8_lossy(input)
            );
        }
    }
}

#[test]
fn every_double_cut_matches_whole_parse() {
    for input in SHORT_STREAMS {
        let expected = parse_whole(input);
        for first in 0..=input.len() {
            for second in first..=input.len() {
                assert_eq!(
                    parse_split_at(input, &[first, second]),
                    expected,
                    "input {:?} cut at {first},{second}",
                    String::from_utf8_lossy(input)
                );
            }
        }
    }
}

#[test]
fn single_byte_chunks_match_whole_parse() {
    let expected = parse_whole(MIXED_STREAM);
    assert_eq!(expected.len(), 3);
    assert_eq!(parse_in_chunks(MIXED_STREAM, 1), expected);
}

#[test]
fn fixed_chunk_sizes_match_whole_parse() {
    let expected = parse_whole(MIXED_STREAM);
    for size in 1..=MIXED_STREAM.len() {
        assert_eq!(
            parse_in_chunks(MIXED_STREAM, size),
            expected,
            "chunk size {size}"
        );
    }
}

#[test]
fn empty_chunks_are_harmless() {
    let mut parser = Parser::new();
    let mut messages = Vec::new();
    let chunks: [&[u8]; 7] = [b"", b"data", b"", b": x\n", b"", b"\n", b""];
    for chunk in chunks {
        messages.extend(parser.feed(chunk).unwrap());
    }
    assert_eq!(render(&messages), "{data=\"x\\n\"}");
}

#[test]
fn crlf_split_is_one_terminator() {
    // Without CRLF folding the LF in the second chunk would be a blank
    // line and dispatch early.
    let messages = parse_split_at(b"id: 1\r\ndata: 2\r\n\r\n", &[6]);
    assert_eq!(render(&messages), "{id=\"1\", data=\"2\\n\"}");
}

#[test]
fn split_code_point_is_not_replaced() {
    let input = "data: 😀\n\n".as_bytes();
    // The emoji occupies bytes 6..10; cut inside it at every position.
    for cut in 7..10 {
        let messages = parse_split_at(input, &[cut]);
        assert_eq!(messages[0].data(), Some("😀\n"), "cut at {cut}");
    }
}

#[test]
fn strict_mode_accepts_split_code_points() {
    let input = "event: ☃\ndata: ok\n\n".as_bytes();
    let mut parser = Parser::with_config(ParserConfig::strict());
    let mut messages = Vec::new();
    for byte in input {
        messages.extend(parser.feed(std::slice::from_ref(byte)).unwrap());
    }
    assert_eq!(messages[0].event(), Some("☃"));
}

#[test]
fn advance_offsets_cover_every_byte() {
    let input = b"data: a\n\ndata: b\n\ndata: c\n\n";
    let mut parser = Parser::new();
    let mut offset = 0;
    let mut offsets = Vec::new();
    while let sse_wire::Progress::Message { consumed, .. } = parser.advance(input, offset).unwrap()
    {
        offsets.push(consumed);
        offset = consumed;
    }
    assert_eq!(offsets, vec![9, 18, 27]);
}
