use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use futures::Stream;
use sse_wire::{Message, Parser, Progress};
use tracing::{debug, info, trace, warn};

use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::finish::FinishResult;
use crate::source::ByteSource;

/// Requests early termination of an [`SseStream`] from anywhere.
///
/// Obtained from [`SseStream::close_handle`]. Closing only raises a flag;
/// the driver notices it at its next loop check, cancels the byte source and
/// finishes with [`FinishResult::ClientClosed`].
#[derive(Clone, Debug, Default)]
pub struct CloseHandle {
    closed: Arc<AtomicBool>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Drives a [`Parser`] from a [`ByteSource`] and yields messages one at a
/// time.
///
/// Each call to [`next`](Self::next) resumes the parser where the previous
/// call stopped, pulling chunks only when the buffered one is exhausted.
/// A message is returned as soon as it is dispatched, even if the rest of
/// the chunk holds more.
///
/// ```text
///   ┌────────────┐  read()   ┌──────────┐ advance() ┌────────┐
///   │ ByteSource │ ────────▶ │ SseStream│ ────────▶ │ Parser │
///   └────────────┘  Bytes    └──────────┘  Message  └────────┘
///                                 │
///                          next() │ Option<Result<Message, _>>
///                                 ▼
///                             consumer ── close() / CloseHandle
/// ```
///
/// The session ends exactly once, with a [`FinishResult`]:
///
/// ```text
///   close requested          → ClientClosed
///   source end-of-stream     → ServerClosed (an open record is dropped)
///   read/cancel/parse error  → Thrown(error), error also returned
/// ```
///
/// After that, `next` returns `None` without touching the source and
/// [`finish_result`](Self::finish_result) keeps returning the same value.
///
/// # Example
///
/// ```rust,no_run
/// use sse_stream::{ChunkSource, SseStream};
///
/// async fn print_all() {
///     let source = ChunkSource::split(b"data: hello\n\n", 4);
///     let mut stream = SseStream::new(source);
///     while let Some(message) = stream.next().await {
///         println!("{:?}", message.unwrap().data());
///     }
///     println!("{}", stream.finish_result().unwrap());
/// }
/// ```
pub struct SseStream<S> {
    source: S,
    parser: Parser,
    config: StreamConfig,
    /// Chunk currently being parsed and the offset to resume at.
    chunk: Bytes,
    offset: usize,
    close: CloseHandle,
    cancel_requested: bool,
    finish: Option<FinishResult>,
}

impl<S: ByteSource> SseStream<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_config(source, StreamConfig::default())
    }

    #[must_use]
    pub fn with_config(source: S, config: StreamConfig) -> Self {
        Self {
            source,
            parser: Parser::with_config(config.parser),
            config,
            chunk: Bytes::new(),
            offset: 0,
            close: CloseHandle::default(),
            cancel_requested: false,
            finish: None,
        }
    }

    /// Pull the next message.
    ///
    /// Returns `Some(Ok(message))` for each dispatched record,
    /// `Some(Err(error))` once if the session fails, and `None` once the
    /// session has finished.
    pub async fn next(&mut self) -> Option<Result<Message, StreamError>> {
        if self.finish.is_some() {
            return None;
        }

        loop {
            if self.close.is_closed() {
                if let Err(e) = self.request_cancel().await {
                    return Some(Err(self.fail(e)));
                }
                self.complete(FinishResult::ClientClosed);
                return None;
            }

            if self.offset < self.chunk.len() {
                match self.parser.advance(&self.chunk, self.offset) {
                    Ok(Progress::Message { message, consumed }) => {
                        self.offset = consumed;
                        trace!(fields = message.len(), "dispatched message");
                        return Some(Ok(message));
                    }
                    Ok(Progress::NeedMore) => {
                        self.chunk = Bytes::new();
                        self.offset = 0;
                    }
                    Err(e) => return Some(Err(self.fail(e.into()))),
                }
                continue;
            }

            match self.source.read().await {
                Ok(Some(chunk)) => {
                    debug!(len = chunk.len(), "read chunk");
                    self.chunk = chunk;
                    self.offset = 0;
                }
                Ok(None) => {
                    if self.close.is_closed() {
                        self.complete(FinishResult::ClientClosed);
                    } else {
                        if !self.parser.is_idle() {
                            debug!("stream ended inside a record; dropping it");
                        }
                        self.complete(FinishResult::ServerClosed);
                    }
                    return None;
                }
                Err(e) => return Some(Err(self.fail(StreamError::Read(Arc::new(e))))),
            }
        }
    }

    /// Adapt the driver into a [`futures::Stream`] of messages.
    ///
    /// The stream borrows the driver, so the [`FinishResult`] is still
    /// available once it is exhausted.
    pub fn messages(&mut self) -> impl Stream<Item = Result<Message, StreamError>> + '_ {
        futures::stream::unfold(self, |stream| async move {
            let item = stream.next().await?;
            Some((item, stream))
        })
    }

    /// Request early termination and cancel the byte source.
    ///
    /// The session finishes with [`FinishResult::ClientClosed`] on the next
    /// call to [`next`](Self::next). Calling `close` again, or after the
    /// session finished, does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Cancel`] if the source fails to cancel; the
    /// session then finishes as [`FinishResult::Thrown`].
    pub async fn close(&mut self) -> Result<(), StreamError> {
        if self.finish.is_some() {
            return Ok(());
        }
        self.close.close();
        self.request_cancel().await.map_err(|e| self.fail(e))
    }

    /// A handle that can close this session from another task.
    #[must_use]
    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    /// Finish the session with a transport status supplied by the caller,
    /// e.g. after rejecting a non-200 response before reading the body.
    /// Has no effect if the session already finished.
    pub fn finish_with_status(&mut self, status: u16) -> &FinishResult {
        if self.finish.is_none() {
            info!(status, "sse session finished by transport status");
        }
        self.finish.get_or_insert(FinishResult::HttpStatus(status))
    }

    /// The terminal outcome, once the session has finished.
    #[must_use]
    pub fn finish_result(&self) -> Option<&FinishResult> {
        self.finish.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finish.is_some()
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    async fn request_cancel(&mut self) -> Result<(), StreamError> {
        if self.cancel_requested {
            return Ok(());
        }
        self.cancel_requested = true;
        debug!(reason = %self.config.cancel_reason, "cancelling byte source");
        self.source
            .cancel(&self.config.cancel_reason)
            .await
            .map_err(|e| StreamError::Cancel(Arc::new(e)))
    }

    fn fail(&mut self, error: StreamError) -> StreamError {
        warn!(%error, "sse session failed");
        self.complete(FinishResult::Thrown(error.clone()));
        error
    }

    fn complete(&mut self, result: FinishResult) {
        if self.finish.is_none() {
            info!(%result, "sse session finished");
            self.finish = Some(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use async_trait::async_trait;

    use super::*;
    use crate::source::ChunkSource;

    /// Source that fails on the read after its chunks run out.
    struct FailingSource {
        chunks: ChunkSource,
    }

    #[async_trait]
    impl ByteSource for FailingSource {
        async fn read(&mut self) -> io::Result<Option<Bytes>> {
            match self.chunks.read().await? {
                Some(chunk) => Ok(Some(chunk)),
                None => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            }
        }

        async fn cancel(&mut self, reason: &str) -> io::Result<()> {
            self.chunks.cancel(reason).await
        }
    }

    async fn collect<S: ByteSource>(stream: &mut SseStream<S>) -> Vec<Message> {
        let mut out = Vec::new();
        while let Some(item) = stream.next().await {
            out.push(item.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn yields_messages_then_server_closed() {
        let source = ChunkSource::split(b"data: a\n\ndata: b\n\n", 5);
        let mut stream = SseStream::new(source);

        let messages = collect(&mut stream).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].data(), Some("b\n"));
        assert!(stream.finish_result().unwrap().is_server_closed());
    }

    #[tokio::test]
    async fn yields_before_reading_further() {
        let source = ChunkSource::new(vec![&b"data: a\n\ndata: b\n\n"[..], &b"data: c\n\n"[..]]);
        let mut stream = SseStream::new(source);

        stream.next().await.unwrap().unwrap();
        // Second message of the first chunk comes out of the buffer.
        assert_eq!(stream.source().remaining(), 1);
        stream.next().await.unwrap().unwrap();
        assert_eq!(stream.source().remaining(), 1);
    }

    #[tokio::test]
    async fn close_between_pulls_finishes_client_closed() {
        let source = ChunkSource::new(vec![&b"data: a\n\ndata: b\n\n"[..]]);
        let mut stream = SseStream::new(source);

        stream.next().await.unwrap().unwrap();
        stream.close().await.unwrap();
        assert!(stream.source().is_cancelled());

        assert!(stream.next().await.is_none());
        assert!(stream.finish_result().unwrap().is_client_closed());
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut stream = SseStream::new(ChunkSource::new(Vec::<Bytes>::new()));
        stream.close().await.unwrap();
        stream.close().await.unwrap();
        assert!(stream.next().await.is_none());
        stream.close().await.unwrap();
        assert!(stream.finish_result().unwrap().is_client_closed());
    }

    #[tokio::test]
    async fn close_handle_is_observed_on_next_pull() {
        let source = ChunkSource::split(b"data: a\n\ndata: b\n\n", 3);
        let mut stream = SseStream::new(source);
        let handle = stream.close_handle();

        stream.next().await.unwrap().unwrap();
        handle.close();
        assert!(stream.next().await.is_none());
        assert!(stream.finish_result().unwrap().is_client_closed());
        assert!(stream.source().is_cancelled());
    }

    #[tokio::test]
    async fn read_error_is_thrown_and_cached() {
        let source = FailingSource {
            chunks: ChunkSource::new(vec![&b"data: a\n\n"[..]]),
        };
        let mut stream = SseStream::new(source);

        assert!(stream.next().await.unwrap().is_ok());
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(
            err.io_error().map(io::Error::kind),
            Some(io::ErrorKind::ConnectionReset)
        );
        assert!(matches!(
            stream.finish_result(),
            Some(FinishResult::Thrown(StreamError::Read(_)))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn strict_parse_error_is_thrown() {
        let config = StreamConfig {
            parser: sse_wire::ParserConfig::strict(),
            ..StreamConfig::default()
        };
        let source = ChunkSource::new(vec![&b"data: \xFF\n\n"[..]]);
        let mut stream = SseStream::with_config(source, config);

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, StreamError::Parse(_)));
        assert!(stream.finish_result().unwrap().error().is_some());
    }

    #[tokio::test]
    async fn status_finish_is_reserved_for_caller() {
        let mut stream = SseStream::new(ChunkSource::split(b"data: a\n\n", 4));
        assert!(matches!(
            stream.finish_with_status(503),
            FinishResult::HttpStatus(503)
        ));
        assert!(stream.next().await.is_none());
        assert_eq!(stream.source().remaining(), 3);
    }

    #[tokio::test]
    async fn messages_adapter_streams_all() {
        use futures::StreamExt;

        let mut stream = SseStream::new(ChunkSource::split(b"id: 1\n\nid: 2\n\n", 2));
        let ids: Vec<String> = stream
            .messages()
            .map(|m| m.unwrap().id().unwrap_or_default().to_owned())
            .collect()
            .await;
        assert_eq!(ids, vec!["1", "2"]);
        assert!(stream.finish_result().unwrap().is_server_closed());
    }
}
