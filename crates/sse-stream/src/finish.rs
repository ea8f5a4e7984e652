use std::fmt;

use crate::error::StreamError;

/// Why a streaming session ended.
///
/// Exactly one result is produced per [`SseStream`] and it never changes
/// afterwards.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Variant      │ Produced when                                        │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ ServerClosed │ the byte source reported end-of-stream               │
/// │ ClientClosed │ the consumer called close (or used a CloseHandle)    │
/// │ Thrown       │ read/cancel failed, or the parser rejected input     │
/// │ HttpStatus   │ the caller supplied a transport status to finish on  │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
///
/// [`SseStream`]: crate::stream::SseStream
#[derive(Clone, Debug)]
pub enum FinishResult {
    ServerClosed,
    ClientClosed,
    Thrown(StreamError),
    /// Never produced by the driver itself; see
    /// [`SseStream::finish_with_status`](crate::stream::SseStream::finish_with_status).
    HttpStatus(u16),
}

impl FinishResult {
    #[must_use]
    pub fn error(&self) -> Option<&StreamError> {
        match self {
            FinishResult::Thrown(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_server_closed(&self) -> bool {
        matches!(self, FinishResult::ServerClosed)
    }

    #[must_use]
    pub fn is_client_closed(&self) -> bool {
        matches!(self, FinishResult::ClientClosed)
    }
}

impl fmt::Display for FinishResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishResult::ServerClosed => f.write_str("server closed"),
            FinishResult::ClientClosed => f.write_str("client closed"),
            FinishResult::Thrown(e) => write!(f, "error: {e}"),
            FinishResult::HttpStatus(status) => write!(f, "http status {status}"),
        }
    }
}
