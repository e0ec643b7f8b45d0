//! The streaming transcript engine: framing, interpretation, transcript
//! state, paced reveal and the session that ties them together.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod event;
mod exchange_client;
pub mod frame;
pub mod reveal;
mod session;
pub mod thread;
pub mod transcript;

pub use session::{
    ExchangeStage, MessageView, Session, SessionBuilder, SessionSnapshot,
};
