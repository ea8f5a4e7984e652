/// How the streaming decoder treats byte sequences that are not UTF-8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Utf8Policy {
    /// Replace each maximal invalid subsequence with U+FFFD and keep going.
    #[default]
    Lossy,
    /// Fail the parse with [`ParseError::InvalidUtf8`].
    ///
    /// [`ParseError::InvalidUtf8`]: crate::error::ParseError::InvalidUtf8
    Strict,
}

/// Configuration for [`Parser`](crate::parser::Parser).
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────────┐
/// │ Field         │ Purpose                                          │
/// ├───────────────┼──────────────────────────────────────────────────┤
/// │ utf8          │ Lossy replacement (default) or strict rejection  │
/// │ max_token_len │ Optional cap on a decoded field name or value    │
/// └───────────────┴──────────────────────────────────────────────────┘
/// ```
///
/// The defaults accept every byte sequence, which is what a browser
/// `EventSource` does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParserConfig {
    /// Decoding policy for field names and values.
    pub utf8: Utf8Policy,

    /// Maximum decoded length, in bytes, of a single field name or field
    /// value. `None` means unbounded. A `data` field is measured per line,
    /// not by its accumulated value.
    pub max_token_len: Option<usize>,
}

impl ParserConfig {
    /// Configuration that rejects invalid UTF-8 instead of replacing it.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            utf8: Utf8Policy::Strict,
            ..Self::default()
        }
    }
}
