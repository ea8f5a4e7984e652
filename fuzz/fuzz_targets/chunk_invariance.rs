#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sse_wire::Parser;

#[derive(Debug, Arbitrary)]
struct Input {
    data: Vec<u8>,
    /// Chunk lengths, cycled until the data is exhausted. Zero means an
    /// empty chunk is offered.
    lengths: Vec<u8>,
}

// Fuzz target: chunking must never change the parse.
//
// Feeds the same bytes once whole and once split by fuzzer-chosen chunk
// lengths (including empty chunks), then compares the message sequences.
fuzz_target!(|input: Input| {
    let whole = Parser::new().feed(&input.data).unwrap();

    let mut parser = Parser::new();
    let mut chunked = Vec::new();
    let mut rest = input.data.as_slice();
    let mut lengths = input.lengths.iter().cycle();
    while !rest.is_empty() {
        let len = match lengths.next() {
            Some(&len) => usize::from(len).min(rest.len()),
            None => rest.len(),
        };
        let (chunk, tail) = rest.split_at(len);
        chunked.extend(parser.feed(chunk).unwrap());
        rest = tail;
        // Guard against an all-zero length list spinning forever.
        if len == 0 && input.lengths.iter().all(|&l| l == 0) {
            chunked.extend(parser.feed(rest).unwrap());
            rest = &[];
        }
    }

    assert_eq!(whole, chunked);
});
