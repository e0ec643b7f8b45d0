use std::fmt::{self, Display};
use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;

use sillage_model::{
    ChatBody, ChatRequest, ChatTransport, ErrorKind, StreamEvent,
    TransportError,
};
use tracing::Instrument;

use crate::event::interpret;
use crate::frame::FrameDecoder;

type ExchangeResult = Result<(), ExchangeError>;
type BoxedExchangeFuture = Pin<Box<dyn Future<Output = ExchangeResult> + Send>>;
type OnUpdate = Box<dyn Fn(ExchangeUpdate) + Send + 'static>;
type HandlerFn =
    Arc<dyn Fn(ChatRequest, OnUpdate) -> BoxedExchangeFuture + Send + Sync>;

/// Progress of a running exchange, in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeUpdate {
    /// The remote side accepted the request and the body is readable.
    Opened,
    /// An event was interpreted from the body.
    Event(StreamEvent),
}

/// Why an exchange failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeError {
    kind: ErrorKind,
    message: String,
}

impl ExchangeError {
    fn from_transport<E: TransportError>(err: &E) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ExchangeError {}

/// A wrapper around a transport that runs the decode and interpret
/// pipeline for each exchange, and provides a type-erased interface for
/// the session.
#[derive(Clone)]
pub struct ExchangeClient {
    handler_fn: HandlerFn,
}

impl ExchangeClient {
    #[inline]
    pub fn new<T: ChatTransport + 'static>(transport: T) -> Self {
        // Erase `T` so the session doesn't need a generic parameter.
        let handler_fn: HandlerFn =
            Arc::new(move |req: ChatRequest, on_update: OnUpdate| {
                let fut = transport.open(&req);
                let exchange_fut: BoxedExchangeFuture = Box::pin(
                    async move {
                        trace!("opening exchange: {req:?}");
                        let body_or_err = fut.await;
                        handle_body::<T>(body_or_err, on_update).await
                    }
                    .instrument(trace_span!("exchange")),
                );
                exchange_fut
            });
        Self { handler_fn }
    }

    /// Runs one exchange to its end, reporting progress through
    /// `on_update`.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. No further updates are reported once
    /// the returned future is dropped.
    #[inline]
    pub async fn run(
        &self,
        req: ChatRequest,
        on_update: impl Fn(ExchangeUpdate) + Send + 'static,
    ) -> ExchangeResult {
        (self.handler_fn)(req, Box::new(on_update)).await
    }
}

async fn handle_body<T: ChatTransport + 'static>(
    body_or_err: Result<T::Body, T::Error>,
    on_update: OnUpdate,
) -> ExchangeResult {
    let body = match body_or_err {
        Ok(body) => body,
        Err(err) => {
            error!("failed to open exchange: {err}");
            return Err(ExchangeError::from_transport(&err));
        }
    };
    on_update(ExchangeUpdate::Opened);

    let mut decoder = FrameDecoder::new();
    let mut pinned_body = pin!(body);
    loop {
        let chunk_or_err =
            poll_fn(|cx| pinned_body.as_mut().poll_next_chunk(cx)).await;
        let chunk = match chunk_or_err {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) => {
                error!("failed to read exchange: {err}");
                return Err(ExchangeError::from_transport(&err));
            }
        };
        trace!("got a chunk of {} bytes", chunk.len());

        let frames = decoder.push(&chunk).map_err(|err| {
            error!("failed to decode exchange: {err}");
            ExchangeError {
                kind: ErrorKind::Decode,
                message: err.to_string(),
            }
        })?;
        for event in frames.iter().filter_map(|frame| interpret(frame)) {
            trace!("got an event: {event:?}");
            on_update(ExchangeUpdate::Event(event));
        }
    }

    let discarded = decoder.finish();
    if discarded > 0 {
        debug!("discarded {discarded} bytes of an unterminated frame");
    }
    trace!("finished an exchange");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use sillage_model::ThreadId;
    use sillage_test_transport::{PresetExchange, TestTransport, answer_frame};

    use super::*;

    fn request(query: &str) -> ChatRequest {
        ChatRequest {
            user_query: query.to_owned(),
            thread_id: ThreadId::from("T1"),
        }
    }

    async fn run_collecting(
        client: &ExchangeClient,
        query: &str,
    ) -> (ExchangeResult, Vec<ExchangeUpdate>) {
        let updates = Arc::new(Mutex::new(vec![]));
        let result = client
            .run(request(query), {
                let updates = Arc::clone(&updates);
                move |update| updates.lock().unwrap().push(update)
            })
            .await;
        let updates = updates.lock().unwrap().clone();
        (result, updates)
    }

    #[tokio::test]
    async fn test_split_frames() {
        let stream = format!(
            "{}{}",
            answer_frame("시트러스"),
            answer_frame("시트러스 향수를 추천합니다.")
        );
        let (head, tail) = stream.as_bytes().split_at(stream.len() / 2 + 1);

        let mut transport = TestTransport::default();
        transport.add_exchange(
            "q",
            PresetExchange::with_chunks([head.to_vec(), tail.to_vec()]),
        );
        let client = ExchangeClient::new(transport);

        let (result, updates) = run_collecting(&client, "q").await;
        assert_eq!(result, Ok(()));
        assert_eq!(
            updates,
            vec![
                ExchangeUpdate::Opened,
                ExchangeUpdate::Event(StreamEvent::Answer(
                    "시트러스".to_owned()
                )),
                ExchangeUpdate::Event(StreamEvent::Answer(
                    "시트러스 향수를 추천합니다.".to_owned()
                )),
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_frames_are_skipped() {
        let mut transport = TestTransport::default();
        transport.add_exchange(
            "q",
            PresetExchange::with_frames([
                "data: {broken",
                "data: {\"type\":\"usage\"}",
                "data: {\"type\":\"answer\",\"content\":\"ok\"}",
                "data: {\"type\":\"answer\",\"content\":\"never termin",
            ])
            .with_read_failure_after(3),
        );
        let client = ExchangeClient::new(transport);

        let (result, updates) = run_collecting(&client, "q").await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Read);
        assert_eq!(
            updates,
            vec![
                ExchangeUpdate::Opened,
                ExchangeUpdate::Event(StreamEvent::Ignored {
                    kind: "usage".to_owned()
                }),
                ExchangeUpdate::Event(StreamEvent::Answer("ok".to_owned())),
            ]
        );
    }

    #[tokio::test]
    async fn test_open_failure() {
        let mut transport = TestTransport::default();
        transport.add_exchange("q", PresetExchange::failing_open());
        let client = ExchangeClient::new(transport);

        let (result, updates) = run_collecting(&client, "q").await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Open);
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let mut transport = TestTransport::default();
        transport.add_exchange(
            "q",
            PresetExchange::with_chunks([b"data: \xc3\x28\n\n".to_vec()]),
        );
        let client = ExchangeClient::new(transport);

        let (result, updates) = run_collecting(&client, "q").await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Decode);
        assert_eq!(updates, vec![ExchangeUpdate::Opened]);
    }
}
