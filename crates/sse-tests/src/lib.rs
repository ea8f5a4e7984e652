//! Shared fixtures for the integration suites and benches.
//!
//! Everything here goes through the public API only: whole-buffer parsing,
//! parsing with an explicit chunking, and a compact one-line rendering of
//! messages used by the snapshot tests.

use sse_wire::{Message, Parser};

/// A stream touching every grammar feature: comments, multi-line `data`,
/// a field without a colon, CR / LF / CRLF terminators and non-ASCII text.
pub const MIXED_STREAM: &[u8] = b": stream start\r\n\
id: 1\n\
event: greeting\n\
data: hello\n\
data:  indented\n\
\n\
:keep-alive\r\r\
id:2\r\
data:caf\xC3\xA9 \xE2\x98\x83\r\
flag\r\n\
\r\n\
retry: 1000\n\
data\n\
\n\
data: unterminated";

/// Replace every `\n` in `text` with `eol`.
#[must_use]
pub fn with_line_ending(text: &str, eol: &str) -> Vec<u8> {
    text.replace('\n', eol).into_bytes()
}

/// Parse `input` as a single chunk.
///
/// # Panics
///
/// Panics if the default (lossy) parser reports an error, which it never
/// does.
#[must_use]
pub fn parse_whole(input: &[u8]) -> Vec<Message> {
    Parser::new().feed(input).expect("lossy parsing cannot fail")
}

/// Parse `input` split at the given (sorted, in-bounds) cut offsets.
///
/// # Panics
///
/// Panics if the parser reports an error.
#[must_use]
pub fn parse_split_at(input: &[u8], cuts: &[usize]) -> Vec<Message> {
    let mut parser = Parser::new();
    let mut messages = Vec::new();
    let mut start = 0;
    for &cut in cuts.iter().chain(std::iter::once(&input.len())) {
        messages.extend(parser.feed(&input[start..cut]).expect("lossy parsing cannot fail"));
        start = cut;
    }
    messages
}

/// Parse `input` in chunks of `size` bytes.
///
/// # Panics
///
/// Panics if `size` is zero or the parser reports an error.
#[must_use]
pub fn parse_in_chunks(input: &[u8], size: usize) -> Vec<Message> {
    let mut parser = Parser::new();
    input
        .chunks(size)
        .flat_map(|chunk| parser.feed(chunk).expect("lossy parsing cannot fail"))
        .collect()
}

/// One line per message: `{name="value", ...}` with values debug-escaped.
#[must_use]
pub fn render(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| {
            let fields: Vec<String> = message
                .iter()
                .map(|(name, value)| format!("{name}={value:?}"))
                .collect();
            format!("{{{}}}", fields.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
