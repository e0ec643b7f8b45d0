use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use pin_project_lite::pin_project;
use reqwest::Response;
use sillage_model::{ChatBody, ErrorKind};

use crate::Error;

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextChunk = (reqwest::Result<Option<Bytes>>, Response);

pin_project! {
    /// The streaming body of an HTTP exchange.
    pub struct HttpBody {
        next_chunk_fut: Option<PinnedFuture<NextChunk>>,
    }
}

impl HttpBody {
    #[inline]
    pub(crate) fn from_response(response: Response) -> Self {
        Self {
            next_chunk_fut: Some(Box::pin(next_chunk(response))),
        }
    }
}

impl ChatBody for HttpBody {
    type Error = crate::Error;

    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Bytes>, Self::Error>> {
        let this = self.project();
        let Some(next_chunk_fut) = this.next_chunk_fut else {
            // The body has been exhausted.
            return Poll::Ready(Ok(None));
        };
        let (chunk_or_err, response) = ready!(next_chunk_fut.as_mut().poll(cx));
        match chunk_or_err {
            Ok(Some(chunk)) => {
                // The response moves into the future for the next chunk.
                *this.next_chunk_fut = Some(Box::pin(next_chunk(response)));
                Poll::Ready(Ok(Some(chunk)))
            }
            Ok(None) => {
                *this.next_chunk_fut = None;
                Poll::Ready(Ok(None))
            }
            Err(err) => {
                *this.next_chunk_fut = None;
                Poll::Ready(Err(Error::new(format!("{err}"), ErrorKind::Read)))
            }
        }
    }
}

async fn next_chunk(mut response: Response) -> NextChunk {
    let chunk_or_err = response.chunk().await;
    (chunk_or_err, response)
}
