mod builder;
mod snapshot;
mod state;

use sillage_model::ThreadId;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::Instrument;

pub use builder::SessionBuilder;
pub use snapshot::{ExchangeStage, MessageView, SessionSnapshot};
use state::{Command, SessionState, run_session};

/// A chat session, like a window that displays messages and has an input
/// box.
///
/// The session owns the transcript and runs at most one exchange at a
/// time. All state changes happen on a single task, and every change is
/// published as a [`SessionSnapshot`] for renderers to pick up. Dropping
/// the session stops that task and abandons any running exchange.
pub struct Session {
    cmd_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    _kill_tx: watch::Sender<bool>,
}

impl Session {
    /// Submits a query.
    ///
    /// Blank queries are refused and `false` is returned. Otherwise any
    /// exchange still running is abandoned, the query is appended to
    /// the transcript and a new exchange starts. The returned future
    /// resolves as soon as the submission is accepted, use
    /// [`Session::wait_idle`] to wait for the answer.
    pub async fn submit<S: Into<String>>(&self, query: S) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.request(Command::Submit(query.into(), ack_tx), ack_rx)
            .await
    }

    /// Starts a new conversation with a fresh thread identity, discarding
    /// the transcript.
    ///
    /// This is refused while an exchange is running, in which case
    /// `false` is returned.
    pub async fn reset(&self) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.request(Command::Reset(ack_tx), ack_rx).await
    }

    /// Returns the latest snapshot.
    #[inline]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Returns a receiver that is notified on every state change.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Waits until no exchange is running.
    pub async fn wait_idle(&self) {
        let mut snapshot_rx = self.subscribe();
        if snapshot_rx.wait_for(|s| !s.busy).await.is_err() {
            warn!("session task has been dropped too early");
        }
    }

    async fn request(
        &self,
        cmd: Command,
        ack_rx: oneshot::Receiver<bool>,
    ) -> bool {
        if self.cmd_tx.send(cmd).is_err() {
            warn!("session task has been dropped too early");
            return false;
        }
        ack_rx.await.unwrap_or(false)
    }
}

impl Session {
    fn spawn_from_builder(
        builder: SessionBuilder,
        thread_id: ThreadId,
    ) -> Self {
        let SessionBuilder {
            client,
            thread_store,
            reveal_delay,
        } = builder;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = watch::channel(false);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot {
            thread_id: thread_id.clone(),
            messages: vec![],
            stage: Default::default(),
            busy: false,
            error: None,
            activity: None,
        });
        let state = SessionState {
            client,
            thread_store,
            thread_id,
            transcript: Default::default(),
            reveal: Default::default(),
            reveal_delay,
            next_tick: None,
            stage: Default::default(),
            busy: false,
            error: None,
            activity: None,
            generation: 0,
            running_task: None,
            cmd_tx: cmd_tx.clone(),
            snapshot_tx,
        };

        tokio::spawn(
            run_session(state, cmd_rx, kill_rx)
                .instrument(trace_span!("session")),
        );
        Self {
            cmd_tx,
            snapshot_rx,
            _kill_tx: kill_tx,
        }
    }
}
