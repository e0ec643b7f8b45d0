//! A transport that talks to the remote assistant over HTTP.
//!
//! Each exchange is one `POST` of a JSON body; the answer streams back as
//! server-sent events.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod body;
mod config;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use mime::Mime;
use reqwest::{Client, Response, StatusCode, header};
use sillage_model::{ChatRequest, ChatTransport, ErrorKind, TransportError};

pub use body::HttpBody;
pub use config::{HttpTransportConfig, HttpTransportConfigBuilder};

/// Error type for [`HttpTransport`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl TransportError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// HTTP transport to the remote assistant.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    config: Arc<HttpTransportConfig>,
}

impl HttpTransport {
    /// Creates a new `HttpTransport` with the given configuration.
    #[inline]
    pub fn new(config: HttpTransportConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Asks the remote side whether it is up.
    pub async fn check_health(&self) -> Result<(), Error> {
        self.client
            .get(&self.config.health_url)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map(|_| ())
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Open))
    }
}

impl ChatTransport for HttpTransport {
    type Error = Error;
    type Body = HttpBody;

    fn open(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Body, Self::Error>> + Send + 'static
    {
        let resp_fut = self
            .client
            .post(&self.config.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(req)
            .send();

        async move {
            let resp = match resp_fut.await.and_then(Response::error_for_status)
            {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(format!("{err}"), ErrorKind::Open));
                }
            };
            check_response(&resp)?;

            // Here we got a readable body.
            Ok(HttpBody::from_response(resp))
        }
    }
}

fn check_response(resp: &Response) -> Result<(), Error> {
    let status = resp.status();
    if status == StatusCode::NO_CONTENT || resp.content_length() == Some(0) {
        return Err(Error::new(
            format!("response has no body ({status})"),
            ErrorKind::Open,
        ));
    }

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let is_event_stream = content_type
        .and_then(|v| v.parse().ok())
        .map(|m: Mime| m.subtype().as_str() == "event-stream")
        .unwrap_or(false);
    if !is_event_stream {
        // Frames are still decoded, the remote side may just be sloppy
        // about its headers.
        warn!("unexpected content type: {content_type:?}");
    }
    Ok(())
}
