use std::collections::VecDeque;
use std::io;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// A pull-based, cancelable producer of byte chunks.
///
/// This is the seam between the driver and whatever transport delivers the
/// event stream (an HTTP response body, a file, a test fixture). Chunk
/// boundaries carry no meaning; the parser copes with any split.
///
/// ```text
///   read()    ──▶ Some(chunk) | None (end-of-stream)
///   cancel()  ──▶ stop producing; later reads return None
/// ```
///
/// Implementations should return `Ok(None)` from every `read` after
/// `cancel` has been called.
#[async_trait]
pub trait ByteSource: Send {
    /// Pull the next chunk. `Ok(None)` marks end-of-stream.
    async fn read(&mut self) -> io::Result<Option<Bytes>>;

    /// Ask the source to stop producing.
    async fn cancel(&mut self, reason: &str) -> io::Result<()>;
}

#[async_trait]
impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    async fn read(&mut self) -> io::Result<Option<Bytes>> {
        (**self).read().await
    }

    async fn cancel(&mut self, reason: &str) -> io::Result<()> {
        (**self).cancel(reason).await
    }
}

/// An in-memory [`ByteSource`] that replays a fixed list of chunks.
///
/// Useful for tests and for replaying captured streams with a chosen
/// chunking, e.g. one byte at a time to exercise every split point.
///
/// ```rust
/// use sse_stream::ChunkSource;
///
/// let source = ChunkSource::split(b"data: hi\n\n", 3);
/// assert_eq!(source.remaining(), 4);
/// ```
#[derive(Debug, Default)]
pub struct ChunkSource {
    chunks: VecDeque<Bytes>,
    cancelled: bool,
}

impl ChunkSource {
    pub fn new<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            cancelled: false,
        }
    }

    /// Split `data` into chunks of at most `chunk_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    #[must_use]
    pub fn split(data: &[u8], chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be non-zero");
        Self::new(data.chunks(chunk_size).map(Bytes::copy_from_slice))
    }

    /// Chunks not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[async_trait]
impl ByteSource for ChunkSource {
    async fn read(&mut self) -> io::Result<Option<Bytes>> {
        if self.cancelled {
            return Ok(None);
        }
        Ok(self.chunks.pop_front())
    }

    async fn cancel(&mut self, _reason: &str) -> io::Result<()> {
        self.cancelled = true;
        self.chunks.clear();
        Ok(())
    }
}

/// A [`ByteSource`] over any tokio [`AsyncRead`]: files, sockets, stdin,
/// HTTP bodies adapted to `AsyncRead`.
///
/// Each `read()` returns whatever a single read of up to `chunk_size`
/// bytes produced. A zero-length read is end-of-stream. Chunks are split
/// off one growing buffer, so no per-read zeroing or copy happens.
pub struct ReaderSource<R> {
    reader: R,
    chunk_size: usize,
    buf: BytesMut,
    cancelled: bool,
}

impl<R: AsyncRead + Unpin + Send> ReaderSource<R> {
    /// Wrap `reader`, reading at most `chunk_size` bytes per chunk (a zero
    /// size is treated as 1).
    #[must_use]
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            buf: BytesMut::new(),
            cancelled: false,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> ByteSource for ReaderSource<R> {
    async fn read(&mut self) -> io::Result<Option<Bytes>> {
        if self.cancelled {
            return Ok(None);
        }
        self.buf.reserve(self.chunk_size);
        let limit = u64::try_from(self.chunk_size).unwrap_or(u64::MAX);
        let n = (&mut self.reader).take(limit).read_buf(&mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf.split().freeze()))
    }

    async fn cancel(&mut self, _reason: &str) -> io::Result<()> {
        self.cancelled = true;
        Ok(())
    }
}
