use std::io;
use std::sync::Arc;

use sse_wire::ParseError;

/// Errors that end a streaming session.
///
/// Every variant is fatal. The driver records the error in
/// [`FinishResult::Thrown`](crate::finish::FinishResult::Thrown) and also
/// returns it to the caller, so the type is `Clone`; I/O errors are shared
/// through an `Arc` to make that possible.
///
/// ```text
///   StreamError
///   ├── Read(io::Error)     ← ByteSource::read failed
///   ├── Cancel(io::Error)   ← ByteSource::cancel failed
///   └── Parse(ParseError)   ← strict UTF-8 or token limit violated
/// ```
#[derive(Clone, Debug, thiserror::Error)]
pub enum StreamError {
    #[error("byte source read failed: {0}")]
    Read(Arc<io::Error>),

    #[error("byte source cancel failed: {0}")]
    Cancel(Arc<io::Error>),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl StreamError {
    /// The underlying I/O error, when the failure came from the byte source.
    #[must_use]
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            StreamError::Read(e) | StreamError::Cancel(e) => Some(e),
            StreamError::Parse(_) => None,
        }
    }
}
