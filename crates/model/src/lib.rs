//! Protocol types shared by the transcript engine and its transports.
//!
//! A conversation is scoped by a [`ThreadId`]. Each submission becomes one
//! [`ChatRequest`], which a [`ChatTransport`] turns into a streaming
//! [`ChatBody`]. The body yields raw chunks; framing and interpretation
//! happen elsewhere, so transports only need to move bytes.
//!
//! Types in this crate don't define any behavior, they are the contract
//! that transports and the engine agree on.

#![deny(missing_docs)]

mod error;
mod event;
mod request;
mod transport;

pub use error::*;
pub use event::*;
pub use request::*;
pub use transport::*;
