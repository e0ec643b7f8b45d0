//! A terminal client for a streaming assistant.
//!
//! The crate ships a CLI for using in the terminal. It can also be used
//! as a library that bundles the engine with the HTTP transport, so a
//! host app only has to render snapshots.

#![deny(missing_docs)]

use std::path::PathBuf;

pub use sillage_core::{
    ExchangeStage, MessageView, Session, SessionBuilder, SessionSnapshot,
};
use sillage_core::thread::FileThreadStore;
pub use sillage_http::{HttpTransport, HttpTransportConfigBuilder};

/// Re-exports of [`sillage_core`] crate.
pub mod core {
    pub use sillage_core::*;
}

/// Re-exports of [`sillage_model`] crate.
pub mod model {
    pub use sillage_model::*;
}

/// Builds a session that posts to `endpoint` (or the default endpoint)
/// and keeps its thread identity in `thread_file`, if given.
pub fn http_session(
    endpoint: Option<String>,
    thread_file: Option<PathBuf>,
) -> (Session, HttpTransport) {
    let mut config = HttpTransportConfigBuilder::new();
    if let Some(endpoint) = endpoint {
        config = config.with_endpoint(endpoint);
    }
    let transport = HttpTransport::new(config.build());

    let mut builder = SessionBuilder::with_transport(transport.clone());
    if let Some(thread_file) = thread_file {
        builder = builder.with_thread_store(FileThreadStore::new(thread_file));
    }
    (builder.build(), transport)
}
