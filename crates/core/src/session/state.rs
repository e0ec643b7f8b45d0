use std::future::pending;
use std::time::Duration;

use sillage_model::{ChatRequest, StreamEvent, ThreadId};
use tokio::select;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use super::snapshot::{ExchangeStage, MessageView, SessionSnapshot};
use crate::exchange_client::{ExchangeClient, ExchangeError, ExchangeUpdate};
use crate::reveal::Reveal;
use crate::thread::ThreadStore;
use crate::transcript::{Message, Transcript};

const FAILURE_NOTICE: &str =
    "Something went wrong while receiving the answer. Please try again.";

#[derive(Debug)]
pub enum Command {
    Submit(String, oneshot::Sender<bool>),
    Reset(oneshot::Sender<bool>),
    Exchange {
        generation: u64,
        update: ExchangeUpdate,
    },
    ExchangeFinished {
        generation: u64,
        result: Result<(), ExchangeError>,
    },
}

pub struct SessionState {
    pub(super) client: ExchangeClient,
    pub(super) thread_store: Box<dyn ThreadStore>,
    pub(super) thread_id: ThreadId,
    pub(super) transcript: Transcript,
    pub(super) reveal: Reveal,
    pub(super) reveal_delay: Duration,
    pub(super) next_tick: Option<Instant>,
    pub(super) stage: ExchangeStage,
    pub(super) busy: bool,
    pub(super) error: Option<String>,
    pub(super) activity: Option<String>,
    // Bumped whenever the running exchange stops being the current one.
    // Updates tagged with an older generation are discarded.
    pub(super) generation: u64,
    pub(super) running_task: Option<JoinHandle<()>>,
    pub(super) cmd_tx: mpsc::UnboundedSender<Command>,
    pub(super) snapshot_tx: watch::Sender<SessionSnapshot>,
}

pub async fn run_session(
    mut state: SessionState,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    mut kill_rx: watch::Receiver<bool>,
) {
    debug!("started");
    loop {
        let next_tick = state.next_tick;
        let tick = async move {
            match next_tick {
                Some(at) => sleep_until(at).await,
                None => pending().await,
            }
        };

        select! {
            biased;

            _ = kill_rx.changed() => {
                break;
            }
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    break;
                };
                trace!("received command: {cmd:?}");
                state.handle(cmd);
            }
            _ = tick => {
                state.tick();
            }
        }
    }
    state.abandon_exchange();
    debug!("will terminate");
}

impl SessionState {
    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Submit(query, ack) => {
                ack.send(self.submit(&query)).ok();
            }
            Command::Reset(ack) => {
                ack.send(self.reset()).ok();
            }
            Command::Exchange { generation, update }
                if generation == self.generation =>
            {
                self.apply_update(update);
            }
            Command::ExchangeFinished { generation, result }
                if generation == self.generation =>
            {
                self.finish_exchange(result);
            }
            stale => {
                trace!("discarding update of an abandoned exchange: {stale:?}");
            }
        }
    }

    fn submit(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || self.thread_id.as_str().is_empty() {
            debug!("refusing a blank submission");
            return false;
        }

        self.abandon_exchange();
        self.transcript.finish_in_flight();
        self.reset_reveal();
        self.transcript.append(Message::user(query));
        self.error = None;
        self.activity = None;
        self.busy = true;
        self.stage = ExchangeStage::Opening;

        let req = ChatRequest {
            user_query: query.to_owned(),
            thread_id: self.thread_id.clone(),
        };
        let generation = self.generation;
        let client = self.client.clone();
        let cmd_tx = self.cmd_tx.clone();
        let task = tokio::spawn(async move {
            let update_tx = cmd_tx.clone();
            let result = client
                .run(req, move |update| {
                    update_tx
                        .send(Command::Exchange { generation, update })
                        .ok();
                })
                .await;
            cmd_tx
                .send(Command::ExchangeFinished { generation, result })
                .ok();
        });
        self.running_task = Some(task);

        self.publish();
        true
    }

    fn reset(&mut self) -> bool {
        if self.busy {
            debug!("refusing to reset while an exchange is running");
            return false;
        }

        let thread_id = ThreadId::generate();
        if let Err(err) = self.thread_store.set(&thread_id) {
            warn!("failed to store thread identity: {err}");
        }
        info!("started a new thread: {thread_id}");
        self.thread_id = thread_id;

        self.abandon_exchange();
        self.transcript.clear();
        self.reset_reveal();
        self.error = None;
        self.activity = None;
        self.stage = ExchangeStage::Idle;

        self.publish();
        true
    }

    fn apply_update(&mut self, update: ExchangeUpdate) {
        match update {
            ExchangeUpdate::Opened => {
                self.stage = ExchangeStage::Streaming;
                self.transcript.append(Message::assistant_in_flight());
                self.reset_reveal();
            }
            ExchangeUpdate::Event(StreamEvent::Answer(text)) => {
                if !self.transcript.update_last_assistant(&text) {
                    return;
                }
                self.reveal.sync(&text);
                self.schedule_tick();
            }
            ExchangeUpdate::Event(StreamEvent::Log(note)) => {
                self.activity = Some(note);
            }
            ExchangeUpdate::Event(StreamEvent::RemoteError(message)) => {
                warn!("remote side reported an error: {message}");
                return;
            }
            ExchangeUpdate::Event(StreamEvent::Ignored { kind }) => {
                debug!("ignoring an event of kind {kind:?}");
                return;
            }
        }
        self.publish();
    }

    fn finish_exchange(&mut self, result: Result<(), ExchangeError>) {
        self.running_task = None;
        match result {
            Ok(()) => {
                debug!("exchange completed");
                self.stage = ExchangeStage::Completed;
            }
            Err(err) => {
                error!("exchange failed ({}): {err}", err.kind());
                self.stage = ExchangeStage::Failed;
                self.error = Some(FAILURE_NOTICE.to_owned());
            }
        }
        self.transcript.finish_in_flight();
        self.reset_reveal();
        self.activity = None;
        self.busy = false;
        self.publish();
    }

    fn tick(&mut self) {
        self.next_tick = None;
        let Some(message) = self.transcript.in_flight() else {
            return;
        };
        self.reveal.advance(message.text());
        self.schedule_tick();
        self.publish();
    }

    fn schedule_tick(&mut self) {
        if self.next_tick.is_some() {
            return;
        }
        let behind = self
            .transcript
            .in_flight()
            .is_some_and(|m| !self.reveal.is_caught_up(m.text()));
        if behind {
            self.next_tick = Some(Instant::now() + self.reveal_delay);
        }
    }

    fn reset_reveal(&mut self) {
        self.reveal.reset();
        self.next_tick = None;
    }

    pub(super) fn abandon_exchange(&mut self) {
        self.generation += 1;
        if let Some(task) = self.running_task.take() {
            debug!("abandoning the running exchange");
            task.abort();
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let messages = self
            .transcript
            .messages()
            .iter()
            .map(|m| MessageView {
                role: m.role(),
                text: m.text().to_owned(),
                displayed: if m.is_streaming() {
                    self.reveal.displayed().to_owned()
                } else {
                    m.text().to_owned()
                },
                streaming: m.is_streaming(),
            })
            .collect();
        SessionSnapshot {
            thread_id: self.thread_id.clone(),
            messages,
            stage: self.stage,
            busy: self.busy,
            error: self.error.clone(),
            activity: self.activity.clone(),
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}
