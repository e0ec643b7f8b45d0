use std::time::Duration;

use sillage_model::{ChatTransport, ThreadId};

use super::Session;
use crate::exchange_client::ExchangeClient;
use crate::reveal::DEFAULT_REVEAL_DELAY;
use crate::thread::{MemoryThreadStore, ThreadStore};

/// [`Session`] builder.
pub struct SessionBuilder {
    pub(crate) client: ExchangeClient,
    pub(crate) thread_store: Box<dyn ThreadStore>,
    pub(crate) reveal_delay: Duration,
}

impl SessionBuilder {
    /// Creates a new builder with the specified transport.
    #[inline]
    pub fn with_transport<T: ChatTransport + 'static>(transport: T) -> Self {
        Self {
            client: ExchangeClient::new(transport),
            thread_store: Box::new(MemoryThreadStore::default()),
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }

    /// Sets where the thread identity is kept. Without one, the identity
    /// only lives as long as the session.
    #[inline]
    pub fn with_thread_store(
        mut self,
        thread_store: impl ThreadStore + 'static,
    ) -> Self {
        self.thread_store = Box::new(thread_store);
        self
    }

    /// Sets the delay between two revealed characters.
    #[inline]
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    /// Builds the session.
    ///
    /// The stored thread identity is reused if there is one, otherwise a
    /// fresh identity is generated and stored.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn build(self) -> Session {
        let thread_id = match self.thread_store.get() {
            Ok(Some(thread_id)) => thread_id,
            Ok(None) => self.store_new_thread_id(),
            Err(err) => {
                warn!("failed to read thread identity: {err}");
                self.store_new_thread_id()
            }
        };
        Session::spawn_from_builder(self, thread_id)
    }

    fn store_new_thread_id(&self) -> ThreadId {
        let thread_id = ThreadId::generate();
        if let Err(err) = self.thread_store.set(&thread_id) {
            warn!("failed to store thread identity: {err}");
        }
        thread_id
    }
}
