#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: lossy parser over arbitrary bytes.
//
// Lossy parsing has no error path, so any Err is a bug. Catches:
// - Out-of-bounds offsets in the state machine
// - Pending UTF-8 bytes overflowing the 3-byte buffer
// - Panics on empty values, bare names, lone CR at the end
fuzz_target!(|data: &[u8]| {
    let messages = sse_wire::Parser::new()
        .feed(data)
        .expect("lossy parsing cannot fail");
    for message in &messages {
        assert!(!message.is_empty(), "empty message dispatched");
    }
});
