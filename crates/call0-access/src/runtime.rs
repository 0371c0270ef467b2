//! Generic runtime for access orchestration.
//!
//! The Runtime drives the access event loop, coordinating between:
//! - [`AccessClient`]: pure access state machine
//! - [`Driver`]: backend requests and UI output
//! - [`RuntimeHandle`]: commands from the call UI
//!
//! The loop is single-task and cooperative. Requests are kept in a
//! [`FuturesUnordered`] so several may be in flight at once; nothing
//! serializes them and nothing cancels them. Responses that arrive after the
//! session they belong to was reset are dropped by the state machine.

use std::time::Duration;

use futures::{
    FutureExt, StreamExt,
    future::BoxFuture,
    stream::FuturesUnordered,
};
use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    time::{Instant, Interval, MissedTickBehavior},
};

use crate::{
    AccessAction, AccessClient, AccessConfig, AccessEvent, CallId, CallSession, Driver, UserIdentity,
};

/// Capacity of the command channel.
const COMMAND_CAPACITY: usize = 64;

/// The runtime has stopped and no longer accepts commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("access runtime has stopped")]
pub struct RuntimeClosed;

/// Commands sent from the call UI to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mount, switch, or unmount (`None`) a call.
    SetCall(Option<CallId>),
    /// Update the external `joined` flag.
    SetJoined(bool),
    /// Update the signed-in identity.
    SetUser(UserIdentity),
    /// Ask the host for access.
    RequestAccess,
    /// Tear down and stop the runtime.
    Shutdown,
}

/// Cloneable control handle for a running [`Runtime`].
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<CallSession>,
}

impl RuntimeHandle {
    /// Send a raw command.
    pub async fn send(&self, command: Command) -> Result<(), RuntimeClosed> {
        self.commands.send(command).await.map_err(|_| RuntimeClosed)
    }

    /// Mount, switch, or unmount (`None`) a call.
    pub async fn set_call(&self, call_id: Option<CallId>) -> Result<(), RuntimeClosed> {
        self.send(Command::SetCall(call_id)).await
    }

    /// Update the external `joined` flag.
    pub async fn set_joined(&self, joined: bool) -> Result<(), RuntimeClosed> {
        self.send(Command::SetJoined(joined)).await
    }

    /// Update the signed-in identity.
    pub async fn set_user(&self, user: UserIdentity) -> Result<(), RuntimeClosed> {
        self.send(Command::SetUser(user)).await
    }

    /// Ask the host for access.
    pub async fn request_access(&self) -> Result<(), RuntimeClosed> {
        self.send(Command::RequestAccess).await
    }

    /// Tear down and stop the runtime.
    pub async fn shutdown(&self) -> Result<(), RuntimeClosed> {
        self.send(Command::Shutdown).await
    }

    /// Latest session snapshot.
    pub fn session(&self) -> CallSession {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every rendered session change.
    pub fn subscribe(&self) -> watch::Receiver<CallSession> {
        self.snapshots.clone()
    }
}

/// Generic runtime that orchestrates the [`AccessClient`] and a [`Driver`].
///
/// # Type Parameters
///
/// - `D`: backend and UI driver
pub struct Runtime<D: Driver> {
    driver: D,
    client: AccessClient,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<CallSession>,
    poller: Option<Interval>,
    in_flight: FuturesUnordered<BoxFuture<'static, AccessEvent>>,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime and its control handle.
    pub fn new(driver: D, user: UserIdentity, config: AccessConfig) -> (Self, RuntimeHandle) {
        let client = AccessClient::new(user, config);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(client.session().clone());

        let runtime = Self {
            driver,
            client,
            commands: command_rx,
            snapshots: snapshot_tx,
            poller: None,
            in_flight: FuturesUnordered::new(),
        };
        let handle = RuntimeHandle { commands: command_tx, snapshots: snapshot_rx };
        (runtime, handle)
    }

    /// Run the event loop until [`Command::Shutdown`] or until every handle
    /// is dropped.
    ///
    /// Each iteration waits for whichever comes first:
    /// 1. A command from the call UI
    /// 2. A completed request
    /// 3. A polling tick
    pub async fn run(mut self) -> D {
        self.driver.render(self.client.session(), self.client.user());

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.apply_command(command),
                },

                Some(event) = self.in_flight.next() => {
                    let actions = self.client.handle(event);
                    self.process_actions(actions);
                },

                () = next_tick(&mut self.poller) => {
                    tracing::trace!("access poll tick");
                    let actions = self.client.handle(AccessEvent::PollTick);
                    self.process_actions(actions);
                },
            }
        }

        // Unmount: disarm the timer; in-flight responses are dropped with
        // the runtime.
        let actions = self.client.set_call(None);
        self.process_actions(actions);
        tracing::debug!(in_flight = self.in_flight.len(), "access runtime stopped");
        self.driver
    }

    fn apply_command(&mut self, command: Command) {
        let actions = match command {
            Command::SetCall(call_id) => self.client.set_call(call_id),
            Command::SetJoined(joined) => self.client.set_joined(joined),
            Command::SetUser(user) => self.client.handle(AccessEvent::UserChanged { user }),
            Command::RequestAccess => self.client.request_access(),
            Command::Shutdown => vec![],
        };
        self.process_actions(actions);
    }

    /// Execute actions returned by the state machine.
    fn process_actions(&mut self, actions: Vec<AccessAction>) {
        for action in actions {
            match action {
                AccessAction::Render => {
                    let session = self.client.session();
                    self.driver.render(session, self.client.user());
                    self.snapshots.send_replace(session.clone());
                },
                AccessAction::Notify(notification) => self.driver.notify(&notification),
                AccessAction::StartPolling { interval } => {
                    self.poller = Some(poll_interval(interval));
                },
                AccessAction::StopPolling => self.poller = None,
                AccessAction::FetchCreator { generation, call_id } => {
                    tracing::debug!(%call_id, generation, "fetching creator");
                    let driver = self.driver.clone();
                    self.in_flight.push(
                        async move {
                            let outcome = driver.fetch_creator(&call_id).await;
                            AccessEvent::CreatorFetched { generation, outcome }
                        }
                        .boxed(),
                    );
                },
                AccessAction::CheckAccess { generation, call_id } => {
                    tracing::debug!(%call_id, generation, "checking access");
                    let driver = self.driver.clone();
                    self.in_flight.push(
                        async move {
                            let outcome = driver.check_access(&call_id).await;
                            AccessEvent::AccessChecked { generation, outcome }
                        }
                        .boxed(),
                    );
                },
                AccessAction::RequestJoin { generation, call_id } => {
                    tracing::debug!(%call_id, generation, "requesting to join");
                    let driver = self.driver.clone();
                    self.in_flight.push(
                        async move {
                            let outcome = driver.request_join(&call_id).await;
                            AccessEvent::JoinRequestCompleted { generation, outcome }
                        }
                        .boxed(),
                    );
                },
            }
        }
    }
}

/// Timer whose first tick fires one `period` after arming.
///
/// The immediate access check is issued by the state machine itself, so
/// the timer only covers the follow-up ticks. Missed ticks are skipped to
/// keep ticks aligned to the loop start.
fn poll_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Resolve on the next tick, or never if polling is disarmed.
async fn next_tick(poller: &mut Option<Interval>) {
    match poller {
        Some(interval) => {
            interval.tick().await;
        },
        None => std::future::pending().await,
    }
}
