use crate::config::ParserConfig;
use crate::error::{ParseError, Token};
use crate::message::Message;
use crate::utf8::Utf8Decoder;

const COLON: u8 = b':';
const CR: u8 = b'\r';
const LF: u8 = b'\n';
const SPACE: u8 = b' ';

fn is_line_terminator(byte: u8) -> bool {
    byte == CR || byte == LF
}

fn is_name_terminator(byte: u8) -> bool {
    byte == COLON || is_line_terminator(byte)
}

/// The token the state machine is currently scanning.
///
/// ```text
///              ┌──────── ':' ───────▶ SkipComment ──┐
///              │                                     │
///   FieldStart ┼── other ──▶ FieldName ── ':' ──▶ FieldValue
///      ▲  │    │                 │                   │
///      │  │    └── CR/LF: dispatch                   │
///      │  │                      └── CR/LF ──────────┤
///      │  └── CR ──▶ SkipLineFeedAfterCarriageReturn │
///      └───────────────────────────────◀──── CR/LF ──┘
/// ```
///
/// Every line terminator that is a CR moves through
/// `SkipLineFeedAfterCarriageReturn` so that CRLF counts as one terminator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum State {
    /// At the first byte of a line.
    #[default]
    FieldStart,
    /// Collecting a field name.
    FieldName,
    /// Collecting the value of `name`. `started` becomes true once the
    /// value's first byte has been seen, which is the only byte eligible for
    /// leading-space stripping.
    FieldValue { name: String, started: bool },
    /// Discarding a comment line.
    SkipComment,
    /// A CR was consumed; swallow one LF if it comes next, then continue
    /// in the boxed state.
    SkipLineFeedAfterCarriageReturn(Box<State>),
}

impl State {
    /// The state that follows a line terminator.
    fn after_line_end(terminator: u8) -> Self {
        if terminator == CR {
            State::SkipLineFeedAfterCarriageReturn(Box::new(State::FieldStart))
        } else {
            State::FieldStart
        }
    }
}

/// Outcome of [`Parser::advance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    /// A blank line dispatched a record. Resume the same chunk at
    /// `consumed`.
    Message { message: Message, consumed: usize },
    /// The chunk is exhausted; offer the next chunk from offset 0.
    NeedMore,
}

/// Mutable state for the record being built.
#[derive(Debug, Default)]
struct ParseContext {
    message: Message,
    /// Decoded text of the name or value in progress.
    text: String,
    decoder: Utf8Decoder,
}

/// Incremental SSE parser.
///
/// The parser is a pure byte-level state machine: it never performs I/O and
/// never looks at a byte twice. Chunks are offered one at a time through
/// [`advance`](Self::advance), which runs until either a record is
/// dispatched or the chunk runs out. Because all resumption data lives in
/// [`State`] and the parse context, the sequence of messages is the same
/// however the input is split:
///
/// ```text
///   "id:1\rdata:d1\r\n\r\n"   as one chunk
///   "id:" "1\rda" "ta:d1\r" "\n\r\n"
///   one byte at a time
///                     ──▶  [ { id: "1", data: "d1\n" } ]
/// ```
///
/// A record that is still open when input ends is never dispatched.
///
/// # Example
///
/// ```rust
/// use sse_wire::Parser;
///
/// let mut parser = Parser::new();
/// assert!(parser.feed(b"event: ping\nda").unwrap().is_empty());
///
/// let messages = parser.feed(b"ta: hello\n\n").unwrap();
/// assert_eq!(messages.len(), 1);
/// assert_eq!(messages[0].event(), Some("ping"));
/// assert_eq!(messages[0].data(), Some("hello\n"));
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    state: State,
    ctx: ParseContext,
    config: ParserConfig,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// True when no part of a record is buffered: the parser is at a line
    /// start and the in-progress message is empty. Input ending in any other
    /// situation drops a partial record.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let at_line_start = match &self.state {
            State::FieldStart => true,
            State::SkipLineFeedAfterCarriageReturn(next) => **next == State::FieldStart,
            _ => false,
        };
        at_line_start && self.ctx.message.is_empty()
    }

    /// Discard any partial record and return to the start of a line.
    pub fn reset(&mut self) {
        self.state = State::FieldStart;
        self.ctx = ParseContext::default();
    }

    /// Run the state machine over `chunk[offset..]`.
    ///
    /// Returns [`Progress::Message`] as soon as a record is dispatched, with
    /// the offset at which to continue in the same chunk, or
    /// [`Progress::NeedMore`] once every byte of the chunk has been consumed.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] only for the opt-in checks in
    /// [`ParserConfig`]. After an error the parser should be discarded or
    /// [`reset`](Self::reset).
    pub fn advance(&mut self, chunk: &[u8], mut offset: usize) -> Result<Progress, ParseError> {
        while offset < chunk.len() {
            let state = std::mem::take(&mut self.state);
            let (next, consumed, dispatched) = self.step(state, chunk, offset)?;
            self.state = next;
            offset = consumed;
            if let Some(message) = dispatched {
                return Ok(Progress::Message {
                    message,
                    consumed: offset,
                });
            }
        }
        Ok(Progress::NeedMore)
    }

    /// Feed a whole chunk and collect every record it dispatches.
    ///
    /// # Errors
    ///
    /// See [`advance`](Self::advance).
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Message>, ParseError> {
        let mut messages = Vec::new();
        let mut offset = 0;
        while let Progress::Message { message, consumed } = self.advance(chunk, offset)? {
            messages.push(message);
            offset = consumed;
        }
        Ok(messages)
    }

    /// One transition. `offset` is always in bounds.
    fn step(
        &mut self,
        state: State,
        chunk: &[u8],
        offset: usize,
    ) -> Result<(State, usize, Option<Message>), ParseError> {
        let rest = &chunk[offset..];
        match state {
            State::FieldStart => match rest[0] {
                COLON => Ok((State::SkipComment, offset + 1, None)),
                byte @ (CR | LF) => {
                    let message = std::mem::take(&mut self.ctx.message);
                    let dispatched = (!message.is_empty()).then_some(message);
                    Ok((State::after_line_end(byte), offset + 1, dispatched))
                }
                _ => Ok((State::FieldName, offset, None)),
            },

            State::FieldName => match rest.iter().position(|&b| is_name_terminator(b)) {
                None => {
                    self.decode(rest, Token::FieldName)?;
                    Ok((State::FieldName, chunk.len(), None))
                }
                Some(end) => {
                    self.decode(&rest[..end], Token::FieldName)?;
                    let name = self.finish_token(Token::FieldName)?;
                    let terminator = rest[end];
                    let next = if terminator == COLON {
                        State::FieldValue {
                            name,
                            started: false,
                        }
                    } else {
                        self.ctx.message.set(name, String::new());
                        State::after_line_end(terminator)
                    };
                    Ok((next, offset + end + 1, None))
                }
            },

            State::FieldValue { name, started } => {
                let skip = usize::from(!started && rest[0] == SPACE);
                let value_bytes = &rest[skip..];
                match value_bytes.iter().position(|&b| is_line_terminator(b)) {
                    None => {
                        self.decode(value_bytes, Token::FieldValue)?;
                        let next = State::FieldValue {
                            name,
                            started: true,
                        };
                        Ok((next, chunk.len(), None))
                    }
                    Some(end) => {
                        self.decode(&value_bytes[..end], Token::FieldValue)?;
                        let value = self.finish_token(Token::FieldValue)?;
                        self.ctx.message.assign(name, &value);
                        let next = State::after_line_end(value_bytes[end]);
                        Ok((next, offset + skip + end + 1, None))
                    }
                }
            }

            State::SkipComment => match rest.iter().position(|&b| is_line_terminator(b)) {
                None => Ok((State::SkipComment, chunk.len(), None)),
                Some(end) => Ok((State::after_line_end(rest[end]), offset + end + 1, None)),
            },

            State::SkipLineFeedAfterCarriageReturn(next) => {
                let consumed = if rest[0] == LF { offset + 1 } else { offset };
                Ok((*next, consumed, None))
            }
        }
    }

    /// Streaming-decode a fragment of the current token.
    fn decode(&mut self, bytes: &[u8], token: Token) -> Result<(), ParseError> {
        let ParseContext { text, decoder, .. } = &mut self.ctx;
        decoder
            .decode(bytes, text, self.config.utf8)
            .map_err(|_| ParseError::InvalidUtf8 { token })?;
        self.check_len(token)
    }

    /// Flush the decoder and hand back the finished token text. The decoder
    /// is empty afterwards.
    fn finish_token(&mut self, token: Token) -> Result<String, ParseError> {
        let ParseContext { text, decoder, .. } = &mut self.ctx;
        decoder
            .flush(text, self.config.utf8)
            .map_err(|_| ParseError::InvalidUtf8 { token })?;
        self.check_len(token)?;
        Ok(std::mem::take(&mut self.ctx.text))
    }

    fn check_len(&self, token: Token) -> Result<(), ParseError> {
        match self.config.max_token_len {
            Some(limit) if self.ctx.text.len() > limit => {
                Err(ParseError::TokenTooLong { token, limit })
            }
            _ => Ok(()),
        }
    }
}
