#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod message;
pub mod parser;
pub mod utf8;

pub use config::{ParserConfig, Utf8Policy};
pub use error::{ParseError, Token};
pub use message::Message;
pub use parser::{Parser, Progress, State};
pub use utf8::{InvalidSequence, Utf8Decoder};
