//! The ordered conversation state.

use serde::{Deserialize, Serialize};

/// Who wrote a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking.
    User,
    /// The remote assistant.
    Assistant,
}

/// One transcript entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    text: String,
    streaming: bool,
}

impl Message {
    /// Creates a finished user message.
    #[inline]
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            streaming: false,
        }
    }

    /// Creates the empty assistant placeholder of a newly opened stream.
    #[inline]
    pub fn assistant_in_flight() -> Self {
        Self {
            role: Role::Assistant,
            text: String::new(),
            streaming: true,
        }
    }

    /// Returns who wrote this message.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the full current text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether this message is still receiving updates.
    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }
}

/// An append-only log of messages where only the last assistant message
/// may change while its stream is active.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Adds a message to the end.
    pub fn append(&mut self, message: Message) {
        debug_assert!(
            !message.streaming || self.in_flight().is_none(),
            "a message is already in flight"
        );
        self.messages.push(message);
    }

    /// Replaces the text of the last message if it was written by the
    /// assistant. Returns whether the text changed.
    pub fn update_last_assistant(&mut self, text: &str) -> bool {
        let Some(last) = self.messages.last_mut() else {
            return false;
        };
        if last.role != Role::Assistant || last.text == text {
            return false;
        }
        text.clone_into(&mut last.text);
        true
    }

    /// Marks every message as finished. Returns whether one was in
    /// flight.
    pub fn finish_in_flight(&mut self) -> bool {
        let mut finished = false;
        for message in &mut self.messages {
            finished |= message.streaming;
            message.streaming = false;
        }
        finished
    }

    /// Returns the message that is still receiving updates, if any.
    #[inline]
    pub fn in_flight(&self) -> Option<&Message> {
        self.messages.last().filter(|m| m.streaming)
    }

    /// Returns the messages in chronological order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Discards all messages.
    #[inline]
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming_count(transcript: &Transcript) -> usize {
        transcript
            .messages()
            .iter()
            .filter(|m| m.is_streaming())
            .count()
    }

    #[test]
    fn test_update_last_assistant() {
        let mut transcript = Transcript::default();
        transcript.append(Message::user("hi"));

        // The last message is not from the assistant.
        assert!(!transcript.update_last_assistant("ignored"));
        assert_eq!(transcript.messages()[0].text(), "hi");

        transcript.append(Message::assistant_in_flight());
        assert!(transcript.update_last_assistant("Hello"));
        assert!(transcript.update_last_assistant("Hello there"));
        // Idempotent under identical content.
        assert!(!transcript.update_last_assistant("Hello there"));
        // Shorter revisions are accepted.
        assert!(transcript.update_last_assistant("Hi"));
        assert_eq!(transcript.in_flight().unwrap().text(), "Hi");
    }

    #[test]
    fn test_single_in_flight() {
        let mut transcript = Transcript::default();
        for round in 0..3 {
            transcript.finish_in_flight();
            transcript.append(Message::user(format!("q{round}")));
            assert_eq!(streaming_count(&transcript), 0);
            transcript.append(Message::assistant_in_flight());
            assert_eq!(streaming_count(&transcript), 1);
        }
        assert!(transcript.finish_in_flight());
        assert!(!transcript.finish_in_flight());
        assert!(transcript.in_flight().is_none());
        assert_eq!(transcript.messages().len(), 6);
    }

    #[test]
    fn test_finished_message_keeps_text() {
        let mut transcript = Transcript::default();
        transcript.append(Message::user("q"));
        transcript.append(Message::assistant_in_flight());
        transcript.update_last_assistant("partial");
        transcript.finish_in_flight();

        let last = &transcript.messages()[1];
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.text(), "partial");
        assert!(!last.is_streaming());
    }
}
