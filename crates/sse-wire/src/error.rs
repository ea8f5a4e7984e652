use std::fmt;

/// The kind of decoded token an error refers to.
///
/// Only field names and field values are decoded as text. Comment lines
/// are skipped byte-wise and never produce errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    FieldName,
    FieldValue,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::FieldName => f.write_str("field name"),
            Token::FieldValue => f.write_str("field value"),
        }
    }
}

/// Errors surfaced by the incremental parser.
///
/// The grammar itself is permissive: any byte that is not a terminator is
/// accepted as name or value content, so there is no "malformed record"
/// variant. Both variants below are opt-in through [`ParserConfig`] and
/// are fatal to the parse session that raised them.
///
/// ```text
///   ParseError
///   ├── InvalidUtf8    ← strict UTF-8 policy and an invalid sequence
///   └── TokenTooLong   ← decoded token grew past `max_token_len`
/// ```
///
/// [`ParserConfig`]: crate::config::ParserConfig
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A field name or value contained bytes that are not valid UTF-8
    /// while the parser runs with [`Utf8Policy::Strict`].
    ///
    /// [`Utf8Policy::Strict`]: crate::config::Utf8Policy::Strict
    #[error("invalid UTF-8 in {token}")]
    InvalidUtf8 { token: Token },

    /// A single field name or value exceeded the configured limit.
    #[error("{token} exceeds {limit} bytes")]
    TokenTooLong { token: Token, limit: usize },
}
