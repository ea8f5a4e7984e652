#![no_main]

use libfuzzer_sys::fuzz_target;
use sse_wire::{Parser, ParserConfig};

// Fuzz target: strict UTF-8 mode and token limits.
//
// Errors are expected here; the target only checks the parser never
// panics and that valid UTF-8 input never reports InvalidUtf8.
fuzz_target!(|data: &[u8]| {
    let config = ParserConfig {
        max_token_len: Some(64),
        ..ParserConfig::strict()
    };
    let result = Parser::with_config(config).feed(data);
    if std::str::from_utf8(data).is_ok() {
        assert!(
            !matches!(result, Err(sse_wire::ParseError::InvalidUtf8 { .. })),
            "valid UTF-8 rejected"
        );
    }
});
