//! Reassembling frames from arbitrarily split chunks.

use std::fmt::{self, Display};
use std::str;

const SEPARATOR: &str = "\n\n";

/// The stream is not valid UTF-8.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidUtf8;

impl Display for InvalidUtf8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "stream is not valid UTF-8".fmt(f)
    }
}

impl std::error::Error for InvalidUtf8 {}

/// A decoder that turns a chunked byte stream into frames delimited by
/// blank lines.
///
/// The decoder works on the cumulative buffer, so a frame, a separator,
/// or even a multi-byte character may be split across any number of
/// chunks without changing the produced frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: String,
    // Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
}

impl FrameDecoder {
    /// Creates a decoder with an empty buffer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns the frames it completes, in order.
    ///
    /// Separators are not included in the frames. A frame may be empty
    /// when separators are adjacent.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, InvalidUtf8> {
        self.decode(chunk)?;

        let mut frames = vec![];
        let mut start = 0;
        while let Some(idx) = self.buf[start..].find(SEPARATOR) {
            frames.push(self.buf[start..start + idx].to_owned());
            start += idx + SEPARATOR.len();
        }
        // What's left may be the unterminated prefix of the next frame.
        self.buf.drain(..start);

        Ok(frames)
    }

    /// Ends the stream, returning how many bytes of an unterminated frame
    /// were discarded.
    #[inline]
    pub fn finish(self) -> usize {
        self.buf.len() + self.pending.len()
    }

    fn decode(&mut self, chunk: &[u8]) -> Result<(), InvalidUtf8> {
        let bytes: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            self.pending.extend_from_slice(chunk);
            &self.pending
        };

        let valid_len = match str::from_utf8(bytes) {
            Ok(s) => {
                self.buf.push_str(s);
                bytes.len()
            }
            // `error_len() == None` means the input ends in the middle of
            // a character, which the next chunk may complete.
            Err(err) if err.error_len().is_none() => {
                let valid_len = err.valid_up_to();
                let Ok(s) = str::from_utf8(&bytes[..valid_len]) else {
                    return Err(InvalidUtf8);
                };
                self.buf.push_str(s);
                valid_len
            }
            Err(_) => return Err(InvalidUtf8),
        };

        let rest = bytes[valid_len..].to_vec();
        self.pending = rest;
        Ok(())
    }
}
