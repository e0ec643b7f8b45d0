//! A scripted fake transport for testing purpose.

mod preset;

use std::collections::{HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use bytes::Bytes;
use sillage_model::{
    ChatBody, ChatRequest, ChatTransport, ErrorKind, TransportError,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl StdError for Error {}

impl TransportError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestBody {
    chunks: VecDeque<Bytes>,
    delivered: usize,
    read_failure_after: Option<usize>,
    delay: Option<Duration>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ChatBody for TestBody {
    type Error = crate::Error;

    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Bytes>, Self::Error>> {
        let this = self.get_mut();

        if let Some(delay) = this.delay {
            let sleep =
                this.sleep.get_or_insert_with(|| Box::pin(sleep(delay)));
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;
        }

        if this.read_failure_after == Some(this.delivered) {
            return Poll::Ready(Err(Error {
                message: "connection reset",
                kind: ErrorKind::Read,
            }));
        }

        let chunk = this.chunks.pop_front();
        if chunk.is_some() {
            this.delivered += 1;
        }
        Poll::Ready(Ok(chunk))
    }
}

/// A scripted fake transport for testing purpose.
///
/// Before opening exchanges, you need to set up the script, which is how
/// the remote side should respond to a query. Exchanges are selected by
/// the query text of the request; opening an exchange for a query that
/// has no script fails.
///
/// # Note
///
/// This type is not optimized for production use, every opened body
/// copies its chunks. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestTransport {
    script: Arc<HashMap<String, PresetExchange>>,
    delay: Option<Duration>,
}

impl TestTransport {
    #[inline]
    pub fn add_exchange<S: Into<String>>(
        &mut self,
        query: S,
        preset: PresetExchange,
    ) {
        Arc::make_mut(&mut self.script).insert(query.into(), preset);
    }

    /// Sets a delay applied before each chunk (and before the end of the
    /// body) is delivered.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }
}

impl Debug for TestTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestTransport")
            .field("queries", &self.script.keys().collect::<Vec<_>>())
            .field("delay", &self.delay)
            .finish()
    }
}

impl ChatTransport for TestTransport {
    type Error = crate::Error;
    type Body = TestBody;

    fn open(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Body, Self::Error>> + Send + 'static
    {
        let result = match self.script.get(&req.user_query) {
            None => Err(Error {
                message: "no script for query",
                kind: ErrorKind::Open,
            }),
            Some(preset) if preset.open_failure => Err(Error {
                message: "service unavailable",
                kind: ErrorKind::Open,
            }),
            Some(preset) => Ok(TestBody {
                chunks: preset.chunks.iter().cloned().collect(),
                delivered: 0,
                read_failure_after: preset.read_failure_after,
                delay: self.delay,
                sleep: None,
            }),
        };
        ready(result)
    }
}
