use sillage_model::ThreadId;

use crate::transcript::Role;

/// Where the latest exchange is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExchangeStage {
    /// No exchange has started since the session began or was reset.
    #[default]
    Idle,
    /// The request is sent and the body is not readable yet.
    Opening,
    /// The body is being read.
    Streaming,
    /// The body ended normally.
    Completed,
    /// The exchange could not be opened or broke while reading.
    Failed,
}

/// A message as it should be rendered.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageView {
    /// Who wrote the message.
    pub role: Role,
    /// The full current text.
    pub text: String,
    /// The text to show now. For the in-flight message this is the
    /// revealed prefix of `text`, for all others it equals `text`.
    pub displayed: String,
    /// Whether the message is still receiving updates.
    pub streaming: bool,
}

/// The state of a session at one point in time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionSnapshot {
    /// The thread all submissions are attached to.
    pub thread_id: ThreadId,
    /// The transcript in chronological order.
    pub messages: Vec<MessageView>,
    /// The stage of the latest exchange.
    pub stage: ExchangeStage,
    /// Whether an exchange is running.
    pub busy: bool,
    /// A notice to show when the latest exchange failed.
    pub error: Option<String>,
    /// The latest progress note of the running exchange.
    pub activity: Option<String>,
}

impl SessionSnapshot {
    /// Returns the message that is still receiving updates, if any.
    #[inline]
    pub fn in_flight(&self) -> Option<&MessageView> {
        self.messages.last().filter(|m| m.streaming)
    }
}
