use sse_wire::ParserConfig;

/// Default number of bytes requested per `read()` from an `AsyncRead`.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8 * 1024;

/// Configuration for [`SseStream`](crate::stream::SseStream) and the
/// bundled byte sources.
///
/// ```text
/// ┌─────────────────┬────────────────────────────────────────────────┐
/// │ Field           │ Purpose                                        │
/// ├─────────────────┼────────────────────────────────────────────────┤
/// │ parser          │ UTF-8 policy and token limit for the parser    │
/// │ read_chunk_size │ Upper bound per read for `ReaderSource`        │
/// │ cancel_reason   │ Reason passed to `ByteSource::cancel` on close │
/// └─────────────────┴────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug)]
pub struct StreamConfig {
    pub parser: ParserConfig,

    /// Maximum bytes per chunk when reading from an `AsyncRead`. Chunk
    /// size never changes the messages produced, only how often the
    /// reader is polled.
    pub read_chunk_size: usize,

    /// Passed to the byte source when the consumer closes the session.
    pub cancel_reason: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            cancel_reason: "client closed".to_owned(),
        }
    }
}
