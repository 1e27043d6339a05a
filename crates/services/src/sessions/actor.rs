//! Session actor: one tokio task owns the store.
//!
//! Commands arrive over an mpsc channel, ticks come from the injected
//! `TickSource`, and the pending network call is polled in the same
//! `select!` loop. Observers read `SessionSnapshot`s from a watch channel.

use futures::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use quiz_core::model::{Attempt, LevelId, OptionId, QuestionId, QuizResult};

use super::store::{LoadTicket, NavDirection, SessionStore, SubmissionTicket, TickOutcome};
use super::ticks::{IntervalTicks, TickSource};
use super::view::SessionSnapshot;
use super::workflow::QuizSessionService;
use crate::error::{ApiError, SessionError};

/// Requests a UI sends to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start { level_id: LevelId, force: bool },
    SelectAnswer { question: QuestionId, option: OptionId },
    ClearAnswer { question: QuestionId },
    Navigate(NavDirection),
    GotoIndex(usize),
    Pause,
    Resume,
    Submit,
    Reset,
}

enum Completion {
    Loaded(LoadTicket, Result<Attempt, ApiError>),
    Submitted(SubmissionTicket, Result<QuizResult, ApiError>),
}

enum Event {
    Cancelled,
    Completed(Completion),
    Command(Option<SessionCommand>),
    Tick,
}

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Owning handle to a session actor. Dropping it cancels the session.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    state: watch::Receiver<SessionSnapshot>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Spawn an actor on the current tokio runtime.
    #[must_use]
    pub fn spawn<T>(service: QuizSessionService, ticks: T) -> Self
    where
        T: TickSource + 'static,
    {
        let (commands_tx, commands_rx) = mpsc::channel(service.config().command_buffer.max(1));
        let store = service.new_store();
        let (state_tx, state_rx) = watch::channel(SessionSnapshot::capture(&store));
        let cancel = CancellationToken::new();

        let actor = SessionActor {
            service,
            store,
            ticks,
            commands: commands_rx,
            state: state_tx,
            cancel: cancel.clone(),
            in_flight: None,
        };
        let task = tokio::spawn(actor.run());

        Self {
            commands: commands_tx,
            state: state_rx,
            cancel,
            task: Some(task),
        }
    }

    /// Spawn an actor ticking on the wall clock at the configured interval.
    #[must_use]
    pub fn spawn_with_interval(service: QuizSessionService) -> Self {
        let ticks = IntervalTicks::new(service.config().tick_interval);
        Self::spawn(service, ticks)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn start(&self, level_id: LevelId) -> Result<(), SessionError> {
        self.send(SessionCommand::Start {
            level_id,
            force: false,
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn start_forced(&self, level_id: LevelId) -> Result<(), SessionError> {
        self.send(SessionCommand::Start {
            level_id,
            force: true,
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn select_answer(
        &self,
        question: QuestionId,
        option: OptionId,
    ) -> Result<(), SessionError> {
        self.send(SessionCommand::SelectAnswer { question, option })
            .await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn clear_answer(&self, question: QuestionId) -> Result<(), SessionError> {
        self.send(SessionCommand::ClearAnswer { question }).await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn navigate(&self, direction: NavDirection) -> Result<(), SessionError> {
        self.send(SessionCommand::Navigate(direction)).await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn goto_index(&self, index: usize) -> Result<(), SessionError> {
        self.send(SessionCommand::GotoIndex(index)).await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn pause(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Pause).await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn resume(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Resume).await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn submit(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Submit).await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor has stopped.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Reset).await
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the actor stops first.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        let mut rx = self.state.clone();
        let snapshot = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Stop the actor without waiting. Pending network calls are dropped.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.commands.is_closed()
    }

    /// Stop the actor and wait for its task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                debug!(error = %err, "session actor ended abnormally");
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

//
// ─── ACTOR ─────────────────────────────────────────────────────────────────────
//

struct SessionActor<T> {
    service: QuizSessionService,
    store: SessionStore,
    ticks: T,
    commands: mpsc::Receiver<SessionCommand>,
    state: watch::Sender<SessionSnapshot>,
    cancel: CancellationToken,
    in_flight: Option<BoxFuture<'static, Completion>>,
}

impl<T: TickSource> SessionActor<T> {
    async fn run(mut self) {
        debug!("session actor started");
        loop {
            let timer_active = self.store.timer_active();
            let event = tokio::select! {
                biased;
                () = self.cancel.cancelled() => Event::Cancelled,
                completion = next_completion(&mut self.in_flight) => Event::Completed(completion),
                command = self.commands.recv() => Event::Command(command),
                () = self.ticks.next_tick(), if timer_active => Event::Tick,
            };

            match event {
                Event::Cancelled | Event::Command(None) => break,
                Event::Completed(completion) => {
                    self.in_flight = None;
                    self.complete(completion);
                }
                Event::Command(Some(command)) => self.handle(command),
                Event::Tick => self.tick(),
            }
            self.state.send_replace(SessionSnapshot::capture(&self.store));
        }

        if let Some(attempt) = self.store.attempt() {
            info!(attempt_id = %attempt.id(), phase = %self.store.phase(), "session closed");
        }
        debug!("session actor stopped");
    }

    fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start { level_id, force } => self.begin_load(level_id, force),
            SessionCommand::SelectAnswer { question, option } => {
                self.store.select_answer(&question, &option);
            }
            SessionCommand::ClearAnswer { question } => {
                self.store.clear_answer(&question);
            }
            SessionCommand::Navigate(direction) => {
                self.store.navigate(direction);
            }
            SessionCommand::GotoIndex(index) => {
                self.store.goto_index(index);
            }
            SessionCommand::Pause => {
                self.store.pause();
            }
            SessionCommand::Resume => {
                self.store.resume();
            }
            SessionCommand::Submit => self.begin_submit(),
            SessionCommand::Reset => {
                self.in_flight = None;
                self.store.reset();
            }
        }
    }

    fn begin_load(&mut self, level_id: LevelId, force: bool) {
        let ticket = match self.store.begin_loading(level_id, force) {
            Ok(ticket) => ticket,
            Err(err) => {
                debug!(error = %err, "start ignored");
                return;
            }
        };
        // Any earlier call now belongs to a discarded attempt.
        let service = self.service.clone();
        self.in_flight = Some(Box::pin(async move {
            let outcome = service.load(&ticket).await;
            Completion::Loaded(ticket, outcome)
        }));
    }

    fn begin_submit(&mut self) {
        let ticket = match self.store.begin_submission() {
            Ok(ticket) => ticket,
            Err(err) => {
                debug!(error = %err, "submit ignored");
                return;
            }
        };
        let submissions = self.service.submissions().clone();
        self.in_flight = Some(Box::pin(async move {
            let outcome = submissions.execute(&ticket).await;
            Completion::Submitted(ticket, outcome)
        }));
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Loaded(ticket, outcome) => {
                if self.store.finish_loading(ticket, outcome).is_ok() {
                    self.ticks.reset();
                }
            }
            Completion::Submitted(ticket, outcome) => {
                if let Err(err) = self.store.finish_submission(ticket, outcome) {
                    debug!(error = %err, "submission did not complete");
                }
            }
        }
    }

    fn tick(&mut self) {
        if self.store.tick() == TickOutcome::TimeUp {
            self.begin_submit();
        }
    }
}

async fn next_completion(in_flight: &mut Option<BoxFuture<'static, Completion>>) -> Completion {
    match in_flight.as_mut() {
        Some(call) => call.await,
        None => std::future::pending().await,
    }
}
