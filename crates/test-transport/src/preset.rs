use bytes::Bytes;
use serde_json::Value;

/// The preset behavior of one exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresetExchange {
    /// Raw chunks of the body, delivered as-is in this order.
    pub chunks: Vec<Bytes>,
    /// If set, opening the exchange fails.
    pub open_failure: bool,
    /// If set, reading fails after this many chunks have been delivered.
    pub read_failure_after: Option<usize>,
}

impl PresetExchange {
    /// Creates a `PresetExchange` with the specified raw chunks.
    #[inline]
    pub fn with_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Creates a `PresetExchange` whose body is the given frames, each
    /// terminated by a blank line and delivered as its own chunk.
    #[inline]
    pub fn with_frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_chunks(
            frames
                .into_iter()
                .map(|f| format!("{}\n\n", f.as_ref()).into_bytes()),
        )
    }

    /// Creates a `PresetExchange` that can never be opened.
    #[inline]
    pub fn failing_open() -> Self {
        Self {
            open_failure: true,
            ..Default::default()
        }
    }

    /// Makes reading fail after `count` chunks.
    #[inline]
    pub fn with_read_failure_after(mut self, count: usize) -> Self {
        self.read_failure_after = Some(count);
        self
    }
}

/// Formats a `data:` frame carrying an answer event, including the
/// trailing separator.
pub fn answer_frame(content: &str) -> String {
    data_frame(&serde_json::json!({ "type": "answer", "content": content }))
}

/// Formats a `data:` frame carrying the given JSON document, including
/// the trailing separator.
pub fn data_frame(value: &Value) -> String {
    format!("data: {value}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_terminated() {
        let preset = PresetExchange::with_frames(["data: a", "data: b"]);
        assert_eq!(preset.chunks.len(), 2);
        assert_eq!(preset.chunks[0], Bytes::from_static(b"data: a\n\n"));
        assert!(!preset.open_failure);
    }

    #[test]
    fn test_answer_frame_keeps_unicode() {
        let frame = answer_frame("시트러스");
        assert_eq!(
            frame,
            "data: {\"content\":\"시트러스\",\"type\":\"answer\"}\n\n"
        );
    }
}
