/// Implementation of `sse stats`.
///
/// Streams the input through [`SseStream`] without printing messages and
/// reports how many were dispatched, which fields they carried, and how the
/// session finished.
///
/// # Example output
///
/// ```text
/// File:     capture.sse
/// Messages: 3
/// Fields:   7
///
/// Field               Count
/// ─────────────────────────
/// data                    3
/// event                   3
/// id                      1
/// ─────────────────────────
/// Data bytes:   42
/// Finish:       server closed
/// ```
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use sse_stream::{Message, SseStream};

use crate::StatsArgs;

/// Aggregated counts over every dispatched message.
#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    messages: usize,
    fields: usize,
    data_bytes: usize,
    by_name: BTreeMap<String, usize>,
}

impl Tally {
    fn add(&mut self, message: &Message) {
        self.messages += 1;
        self.fields += message.len();
        self.data_bytes += message.data().map_or(0, str::len);
        for name in message.keys() {
            *self.by_name.entry(name.to_owned()).or_default() += 1;
        }
    }
}

/// Run the `sse stats` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or read, or the parser
/// rejects the input under `--strict` / `--max-token`.
pub async fn run(args: &StatsArgs) -> Result<()> {
    let source = args.input.open().await?;
    let mut stream = SseStream::with_config(source, args.input.stream_config());
    let mut tally = Tally::default();

    while let Some(item) = stream.next().await {
        let message =
            item.with_context(|| format!("failed to parse {}", args.input.file.display()))?;
        tally.add(&message);
    }

    println!("File:     {}", args.input.file.display());
    println!("Messages: {}", tally.messages);
    println!("Fields:   {}", tally.fields);
    println!();
    println!("{:<18}{:>7}", "Field", "Count");
    println!("{}", "─".repeat(25));
    for (name, count) in &tally.by_name {
        println!("{name:<18}{count:>7}");
    }
    println!("{}", "─".repeat(25));
    println!("Data bytes:   {}", tally.data_bytes);
    if let Some(result) = stream.finish_result() {
        println!("Finish:       {result}");
    }
    Ok(())
}
