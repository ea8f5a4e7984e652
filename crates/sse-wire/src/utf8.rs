use crate::config::Utf8Policy;

/// Maximum number of bytes a partial code point can leave pending.
/// A UTF-8 code point is at most 4 bytes, so at most 3 can be incomplete.
const MAX_PENDING: usize = 3;

const REPLACEMENT: char = '\u{FFFD}';

/// An invalid UTF-8 sequence was found under [`Utf8Policy::Strict`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid UTF-8 sequence")]
pub struct InvalidSequence;

/// Streaming UTF-8 decoder with an explicit pending-bytes buffer.
///
/// A chunk boundary can land in the middle of a multi-byte code point. The
/// decoder keeps the incomplete prefix (1–3 bytes) and completes it with the
/// leading bytes of the next fragment:
///
/// ```text
///   fragment 1: 68 C3        → "h"   pending [C3]
///   fragment 2: A9 21        → "é!"  pending []
/// ```
///
/// [`decode`](Self::decode) is the streaming call and never finalizes a
/// trailing partial code point. [`flush`](Self::flush) finalizes: leftover
/// bytes are reported as invalid and the pending buffer is cleared, so no
/// state carries over into the next token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Utf8Decoder {
    pending: [u8; MAX_PENDING],
    pending_len: usize,
}

impl Utf8Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of an incomplete code point carried over from earlier fragments.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending[..self.pending_len]
    }

    /// Decode one fragment in streaming mode, appending text to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSequence`] when `policy` is strict and the fragment
    /// (together with any pending bytes) contains an invalid sequence. An
    /// incomplete sequence at the end of the fragment is not an error; it is
    /// kept pending.
    pub fn decode(
        &mut self,
        bytes: &[u8],
        out: &mut String,
        policy: Utf8Policy,
    ) -> Result<(), InvalidSequence> {
        let rest = if self.pending_len > 0 {
            self.complete_pending(bytes, out, policy)?
        } else {
            bytes
        };
        self.decode_run(rest, out, policy)
    }

    /// Finalize the current token: any pending bytes form a truncated
    /// sequence. Always leaves the decoder empty.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSequence`] when `policy` is strict and bytes were
    /// pending.
    pub fn flush(&mut self, out: &mut String, policy: Utf8Policy) -> Result<(), InvalidSequence> {
        let had_pending = self.pending_len > 0;
        self.pending_len = 0;
        if had_pending {
            replace_or_fail(out, policy)?;
        }
        Ok(())
    }

    /// Feed the head of `bytes` into the pending partial code point and
    /// return whatever is left of `bytes` afterwards.
    fn complete_pending<'a>(
        &mut self,
        bytes: &'a [u8],
        out: &mut String,
        policy: Utf8Policy,
    ) -> Result<&'a [u8], InvalidSequence> {
        let held = self.pending_len;
        let needed = sequence_width(self.pending[0]).saturating_sub(held);
        let take = needed.min(bytes.len());

        let mut scratch = [0u8; 4];
        scratch[..held].copy_from_slice(&self.pending[..held]);
        scratch[held..held + take].copy_from_slice(&bytes[..take]);
        let candidate = &scratch[..held + take];

        match std::str::from_utf8(candidate) {
            Ok(text) => {
                out.push_str(text);
                self.pending_len = 0;
                Ok(&bytes[take..])
            }
            // Still a valid prefix; the whole fragment went into it.
            Err(e) if e.error_len().is_none() => {
                self.pending[..candidate.len()].copy_from_slice(candidate);
                self.pending_len = candidate.len();
                Ok(&bytes[take..])
            }
            Err(e) => {
                self.pending_len = 0;
                replace_or_fail(out, policy)?;
                // Only the input bytes that belong to the invalid sequence
                // are consumed; the rest is decoded from scratch.
                let invalid = e.error_len().unwrap_or(candidate.len());
                Ok(&bytes[invalid.saturating_sub(held).min(bytes.len())..])
            }
        }
    }

    fn decode_run(
        &mut self,
        mut bytes: &[u8],
        out: &mut String,
        policy: Utf8Policy,
    ) -> Result<(), InvalidSequence> {
        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    out.push_str(text);
                    return Ok(());
                }
                Err(e) => {
                    let (valid, rest) = bytes.split_at(e.valid_up_to());
                    // `valid` was just checked, so this borrows without copying.
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        None => {
                            self.pending[..rest.len()].copy_from_slice(rest);
                            self.pending_len = rest.len();
                            return Ok(());
                        }
                        Some(invalid) => {
                            replace_or_fail(out, policy)?;
                            bytes = &rest[invalid..];
                        }
                    }
                }
            }
        }
    }
}

fn replace_or_fail(out: &mut String, policy: Utf8Policy) -> Result<(), InvalidSequence> {
    match policy {
        Utf8Policy::Lossy => {
            out.push(REPLACEMENT);
            Ok(())
        }
        Utf8Policy::Strict => Err(InvalidSequence),
    }
}

/// Total length of the sequence introduced by a lead byte.
fn sequence_width(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 1,
    }
}
