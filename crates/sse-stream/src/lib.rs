#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod finish;
pub mod source;
pub mod stream;

pub use config::StreamConfig;
pub use error::StreamError;
pub use finish::FinishResult;
pub use source::{ByteSource, ChunkSource, ReaderSource};
pub use stream::{CloseHandle, SseStream};

pub use sse_wire::{Message, ParseError, ParserConfig, Utf8Policy};
