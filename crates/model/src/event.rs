use serde::{Deserialize, Serialize};

/// A typed update interpreted from one frame of the response stream.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamEvent {
    /// The full current answer text. Each answer replaces the previous
    /// one, it is never a delta.
    Answer(String),
    /// A progress note from the remote side, e.g. what it is searching.
    Log(String),
    /// The remote side reported a failure while producing the answer.
    RemoteError(String),
    /// A well-formed event of a kind this client doesn't understand.
    Ignored {
        /// The `type` field of the event.
        kind: String,
    },
}
