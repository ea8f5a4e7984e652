/// SSE command-line tool — replay a captured Server-Sent Events stream
/// through the incremental parser.
///
/// # Command overview
///
/// ```text
/// sse <COMMAND> [OPTIONS]
///
/// Commands:
///   parse    Print every message dispatched by the stream
///   stats    Print message and field counts for the stream
///   help     Print help information
///
/// Global options:
///   -v, --verbose    Log driver activity (chunk reads, finish result)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// `FILE` may be `-` to read from stdin, so a live stream can be piped in:
///
/// ```text
/// curl -sN https://example.com/events | sse parse - --format json
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                          |
/// |------|--------------------------------------------------|
/// | 0    | Success                                          |
/// | 1    | Error (I/O failure, strict-mode parse error, …)  |
///
/// Messages go to stdout; logs and errors go to stderr.
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sse_stream::{ReaderSource, StreamConfig, Utf8Policy};
use tokio::io::AsyncRead;
use tracing_subscriber::EnvFilter;

mod cmd_parse;
mod cmd_stats;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Parse Server-Sent Events streams from files or stdin.
#[derive(Parser)]
#[command(name = "sse", version, about = "Server-Sent Events stream parser")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log driver activity to stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every message dispatched by the stream.
    Parse(ParseArgs),
    /// Print message and field counts for the stream.
    Stats(StatsArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Input options shared by every command.
///
/// ```text
/// ┌──────────────┬─────────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                              │
/// ├──────────────┼─────────────────────────────────────────────────────┤
/// │ --chunk-size │ bytes per read (default 8192); 1 replays byte-wise  │
/// │ --strict     │ fail on invalid UTF-8 instead of substituting U+FFFD │
/// │ --max-token  │ fail when one field name or value exceeds N bytes   │
/// └──────────────┴─────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InputArgs {
    /// Path to the captured stream, or `-` for stdin.
    pub file: PathBuf,

    /// Maximum bytes per chunk fed to the parser.
    #[arg(long, default_value_t = sse_stream::config::DEFAULT_READ_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Reject invalid UTF-8 in field names and values.
    #[arg(long)]
    pub strict: bool,

    /// Reject field names or values longer than this many bytes.
    #[arg(long)]
    pub max_token: Option<usize>,
}

impl InputArgs {
    /// Map the flags onto a [`StreamConfig`].
    pub fn stream_config(&self) -> StreamConfig {
        let mut config = StreamConfig {
            read_chunk_size: self.chunk_size,
            ..StreamConfig::default()
        };
        if self.strict {
            config.parser.utf8 = Utf8Policy::Strict;
        }
        config.parser.max_token_len = self.max_token;
        config
    }

    /// Open the input as a byte source.
    pub async fn open(&self) -> Result<ReaderSource<Box<dyn AsyncRead + Unpin + Send>>> {
        let reader: Box<dyn AsyncRead + Unpin + Send> = if self.file == Path::new("-") {
            Box::new(tokio::io::stdin())
        } else {
            let file = tokio::fs::File::open(&self.file)
                .await
                .with_context(|| format!("cannot open {}", self.file.display()))?;
            Box::new(file)
        };
        Ok(ReaderSource::new(reader, self.chunk_size))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `name: value` lines, one blank line after each message.
    Text,
    /// One JSON object per line, keys in field order.
    Json,
}

/// Arguments for `sse parse`.
#[derive(clap::Args)]
pub struct ParseArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Close the stream after this many messages.
    #[arg(long)]
    pub max_messages: Option<usize>,
}

/// Arguments for `sse stats`.
#[derive(clap::Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse(args) => cmd_parse::run(&args).await,
        Commands::Stats(args) => cmd_stats::run(&args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
