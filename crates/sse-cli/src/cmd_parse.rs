/// Implementation of `sse parse`.
///
/// Streams the input through [`SseStream`] and writes each message to stdout
/// as soon as it is dispatched, so a live stream piped from stdin is printed
/// incrementally.
///
/// # Output formats
///
/// ```text
/// ┌──────┬───────────────────────────────────────────────────────────────┐
/// │ text │ event: update                                                 │
/// │      │ data: first line                                              │
/// │      │ data: second line                                             │
/// │      │ (blank line)                                                  │
/// ├──────┼───────────────────────────────────────────────────────────────┤
/// │ json │ {"event":"update","data":"first line\nsecond line\n"}         │
/// └──────┴───────────────────────────────────────────────────────────────┘
/// ```
///
/// Text output is itself a valid event stream: feeding it back through
/// `sse parse` yields the same messages.
use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use sse_stream::{Message, SseStream};
use sse_wire::message::DATA_FIELD;
use tracing::info;

use crate::{OutputFormat, ParseArgs};

/// Run the `sse parse` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or read, the parser
/// rejects the input under `--strict` / `--max-token`, or stdout cannot be
/// written.
pub async fn run(args: &ParseArgs) -> Result<()> {
    let source = args.input.open().await?;
    let mut stream = SseStream::with_config(source, args.input.stream_config());
    let mut stdout = io::stdout();
    let mut count = 0usize;

    loop {
        if args.max_messages.is_some_and(|max| count >= max) {
            stream.close().await.context("cannot close input")?;
        }
        let Some(item) = stream.next().await else {
            break;
        };
        let message =
            item.with_context(|| format!("failed to parse {}", args.input.file.display()))?;

        let written = match args.format {
            OutputFormat::Text => write_text(&mut stdout, &message),
            OutputFormat::Json => write_json(&mut stdout, &message),
        };
        written
            .and_then(|()| stdout.flush())
            .context("cannot write to stdout")?;
        count += 1;
    }

    if let Some(result) = stream.finish_result() {
        info!(messages = count, %result, "parse finished");
    }
    Ok(())
}

/// Write a message back out in wire form.
fn write_text(out: &mut impl Write, message: &Message) -> io::Result<()> {
    for (name, value) in message.iter() {
        if name == DATA_FIELD && value.is_empty() {
            // Only a bare `data` line leaves the value empty.
            writeln!(out, "{name}")?;
        } else if name == DATA_FIELD {
            // Each accumulated line ends with '\n'; emit one `data:` per line.
            for line in value.lines() {
                writeln!(out, "{name}: {line}")?;
            }
        } else {
            writeln!(out, "{name}: {value}")?;
        }
    }
    writeln!(out)
}

fn write_json(out: &mut impl Write, message: &Message) -> io::Result<()> {
    serde_json::to_writer(&mut *out, &MessageJson(message))?;
    writeln!(out)
}

/// Serializes a [`Message`] as a JSON object with keys in field order.
struct MessageJson<'a>(&'a Message);

impl Serialize for MessageJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(fields: &[(&str, &str)]) -> Message {
        fields
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn text_splits_data_lines() {
        let msg = message(&[("event", "update"), ("data", "a\nb\n")]);
        let mut out = Vec::new();
        write_text(&mut out, &msg).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "event: update\ndata: a\ndata: b\n\n"
        );
    }

    #[test]
    fn text_round_trips_through_parser() {
        let inputs: [&[u8]; 4] = [
            b"id: 9\ndata: x\ndata:\ndata: y\n\n",
            b"data\nid: 1\n\n",
            b"data\n\n",
            b"event\ndata: \n\n",
        ];
        for input in inputs {
            let parsed = sse_wire::Parser::new().feed(input).unwrap();
            assert_eq!(parsed.len(), 1, "input {input:?}");

            let mut out = Vec::new();
            write_text(&mut out, &parsed[0]).unwrap();
            let reparsed = sse_wire::Parser::new().feed(&out).unwrap();
            assert_eq!(reparsed, parsed, "input {input:?}");
        }
    }

    #[test]
    fn empty_data_is_written_as_bare_name() {
        let msg = message(&[("data", ""), ("id", "1")]);
        let mut out = Vec::new();
        write_text(&mut out, &msg).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "data\nid: 1\n\n");
    }

    #[test]
    fn json_keeps_field_order() {
        let msg = message(&[("retry", "10"), ("data", "d\n"), ("event", "e")]);
        let mut out = Vec::new();
        write_json(&mut out, &msg).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"retry\":\"10\",\"data\":\"d\\n\",\"event\":\"e\"}\n"
        );
    }
}
