use std::error::Error;
use std::pin::Pin;
use std::task::{self, Poll};

use bytes::Bytes;

use crate::error::ErrorKind;
use crate::request::ChatRequest;

/// The error type for a chat transport.
pub trait TransportError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that opens exchanges with the remote assistant.
///
/// Once created, a transport should behave like a stateless object. It
/// may be asked to open a new exchange while an older body is still
/// being read, and it should be prepared for being dropped anytime.
pub trait ChatTransport: Send + Sync {
    /// The error type that may be returned by the transport.
    type Error: TransportError;

    /// The streaming body type for this transport.
    type Body: ChatBody<Error = Self::Error>;

    /// Opens an exchange.
    ///
    /// The returned future resolves once the remote side has accepted
    /// the request and a readable body is available. Any other outcome
    /// must be reported as an error of kind [`ErrorKind::Open`].
    fn open(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Body, Self::Error>> + Send + 'static;
}

/// A streaming response body.
pub trait ChatBody: Sized + Send + 'static {
    /// The error type that may be returned while reading.
    type Error: TransportError;

    /// Attempts to pull out the next chunk of the body.
    ///
    /// # Return value
    ///
    /// - `Poll::Pending` means that the body is still waiting for data.
    ///   Implementations will ensure that the current task will be
    ///   notified when the next chunk may be ready.
    /// - `Poll::Ready(Ok(Some(chunk)))` means a chunk is available. Chunk
    ///   boundaries carry no meaning and may fall anywhere.
    /// - `Poll::Ready(Ok(None))` means the body has ended.
    /// - `Poll::Ready(Err(error))` means reading failed.
    ///
    /// Calling this method after the end should always return `None`.
    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<Bytes>, Self::Error>>;
}
