#![forbid(unsafe_code)]

//! Elm-style program loop for Post Aid front ends.
//!
//! A [`Model`] owns all application state. Input becomes messages, messages go
//! through [`Model::update`], and side effects come back as [`Cmd`]s that the
//! [`Program`] executes. Background work ([`Cmd::Task`]) either runs on its own
//! thread and reports back over the program's channel, or runs inline when the
//! program is configured for deterministic execution.
//!
//! # Example
//!
//! ```
//! use postaid_runtime::program::{Cmd, Model, Program, ProgramConfig};
//!
//! struct Counter {
//!     count: i32,
//! }
//!
//! enum Msg {
//!     Increment,
//!     Fetched(i32),
//!     Quit,
//! }
//!
//! impl Model for Counter {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Increment => Cmd::task(|| Msg::Fetched(10)),
//!             Msg::Fetched(n) => {
//!                 self.count += n;
//!                 Cmd::none()
//!             }
//!             Msg::Quit => Cmd::quit(),
//!         }
//!     }
//!
//!     fn view(&self, out: &mut String) {
//!         out.push_str(&self.count.to_string());
//!     }
//! }
//!
//! let mut program = Program::new(Counter { count: 0 }, ProgramConfig::inline());
//! program.init();
//! program.send(Msg::Increment);
//! assert_eq!(program.render(), "10");
//! program.send(Msg::Quit);
//! assert!(!program.is_running());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, debug_span};

/// Application state and behavior.
pub trait Model: Sized {
    /// The message type for this model.
    type Message: Send + 'static;

    /// Startup commands, run once by [`Program::init`].
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// The state transition function.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state as text.
    fn view(&self, out: &mut String);
}

/// Diagnostics metadata for a background task.
#[derive(Debug, Clone, Default)]
pub struct TaskSpec {
    /// Task name, used as the worker thread name and in logs.
    pub name: Option<String>,
}

impl TaskSpec {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Side effects requested by the model.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Stop the program. Later messages are ignored.
    Quit,
    /// Execute several commands (sequentially).
    Batch(Vec<Cmd<M>>),
    /// Execute commands in order, stopping early on quit.
    Sequence(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Append a line to the program log.
    Log(String),
    /// Run a blocking closure off the update path; its result is sent back as
    /// a message.
    Task(TaskSpec, Box<dyn FnOnce() -> M + Send>),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::Task(spec, _) => f.debug_struct("Task").field("spec", spec).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Create a batch of commands, collapsing empty and single-element lists.
    pub fn batch(cmds: Vec<Self>) -> Self {
        Self::collapse(cmds, Self::Batch)
    }

    /// Create a sequence of commands, collapsing empty and single-element lists.
    pub fn sequence(cmds: Vec<Self>) -> Self {
        Self::collapse(cmds, Self::Sequence)
    }

    fn collapse(mut cmds: Vec<Self>, wrap: fn(Vec<Self>) -> Self) -> Self {
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => wrap(cmds),
        }
    }

    /// Create a background task command.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::default(), Box::new(f))
    }

    /// Create a named background task command.
    pub fn task_named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::named(name), Box::new(f))
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Sequence(_) => "Sequence",
            Self::Msg(_) => "Msg",
            Self::Log(_) => "Log",
            Self::Task(..) => "Task",
        }
    }

    /// Number of atomic commands, counting through batches and sequences.
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Batch(cmds) | Self::Sequence(cmds) => cmds.iter().map(Self::count).sum(),
            _ => 1,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// How [`Cmd::Task`] closures are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskMode {
    /// One spawned thread per task; results arrive through the channel.
    #[default]
    Threaded,
    /// Run on the caller's thread and dispatch the result immediately.
    /// Deterministic, used by tests.
    Inline,
}

#[derive(Debug, Clone, Default)]
pub struct ProgramConfig {
    pub task_mode: TaskMode,
}

impl ProgramConfig {
    #[must_use]
    pub fn inline() -> Self {
        Self {
            task_mode: TaskMode::Inline,
        }
    }

    #[must_use]
    pub fn threaded() -> Self {
        Self {
            task_mode: TaskMode::Threaded,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Channel
// ─────────────────────────────────────────────────────────────────────────────

enum Envelope<M> {
    /// Result of a task spawned by this program.
    TaskResult(M),
    /// Message from an outside source (store listener, input thread).
    External(M),
}

/// Handle for delivering messages to a [`Program`] from other threads.
pub struct MessageSender<M> {
    tx: mpsc::Sender<Envelope<M>>,
}

impl<M> Clone for MessageSender<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M: Send + 'static> MessageSender<M> {
    /// Queue a message. Returns `false` once the program has been dropped.
    pub fn send(&self, msg: M) -> bool {
        self.tx.send(Envelope::External(msg)).is_ok()
    }
}

impl<M> std::fmt::Debug for MessageSender<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSender").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Program
// ─────────────────────────────────────────────────────────────────────────────

/// Drives a [`Model`]: dispatches messages, executes commands, renders views.
pub struct Program<M: Model> {
    model: M,
    config: ProgramConfig,
    tx: mpsc::Sender<Envelope<M::Message>>,
    rx: mpsc::Receiver<Envelope<M::Message>>,
    running: bool,
    in_flight: Arc<AtomicUsize>,
    logs: Vec<String>,
}

impl<M: Model> Program<M> {
    pub fn new(model: M, config: ProgramConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            model,
            config,
            tx,
            rx,
            running: true,
            in_flight: Arc::new(AtomicUsize::new(0)),
            logs: Vec::new(),
        }
    }

    /// A sender other threads can use to feed messages into this program.
    pub fn sender(&self) -> MessageSender<M::Message> {
        MessageSender {
            tx: self.tx.clone(),
        }
    }

    /// Run `Model::init` and execute the returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute(cmd);
    }

    /// Dispatch one message through `update`.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let span = debug_span!("postaid.program.update");
        let _guard = span.enter();
        let cmd = self.model.update(msg);
        debug!(cmd = cmd.type_name(), count = cmd.count(), "update returned");
        self.execute(cmd);
    }

    /// Dispatch every message already queued, without blocking.
    /// Returns the number dispatched.
    pub fn pump(&mut self) -> usize {
        let mut dispatched = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            self.receive(envelope);
            dispatched += 1;
        }
        dispatched
    }

    /// Wait up to `timeout` for a message, then drain the queue.
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(envelope) => {
                self.receive(envelope);
                1 + self.pump()
            }
            Err(_) => 0,
        }
    }

    /// Dispatch messages until no spawned task is outstanding or `timeout`
    /// elapses. Returns `true` when idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.in_flight() > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.pump_timeout(deadline - now);
        }
        true
    }

    /// Render the model into a fresh string.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.model.view(&mut out);
        out
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// `false` after a [`Cmd::Quit`] was executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of spawned tasks whose result has not been dispatched yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Lines emitted through [`Cmd::Log`].
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Take and clear the emitted log lines.
    pub fn take_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.logs)
    }

    fn receive(&mut self, envelope: Envelope<M::Message>) {
        let msg = match envelope {
            Envelope::TaskResult(msg) => {
                self.in_flight.fetch_sub(1, Ordering::AcqRel);
                msg
            }
            Envelope::External(msg) => msg,
        };
        self.send(msg);
    }

    fn execute(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                debug!("program quit");
                self.running = false;
            }
            Cmd::Msg(m) => self.send(m),
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for c in cmds {
                    self.execute(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Log(text) => {
                tracing::info!(target: "postaid.log", "{text}");
                self.logs.push(text);
            }
            Cmd::Task(spec, f) => self.run_task(spec, f),
        }
    }

    fn run_task(&mut self, spec: TaskSpec, f: Box<dyn FnOnce() -> M::Message + Send>) {
        match self.config.task_mode {
            TaskMode::Inline => {
                debug!(task = spec.name.as_deref().unwrap_or("task"), "running task inline");
                let msg = f();
                self.send(msg);
            }
            TaskMode::Threaded => {
                let tx = self.tx.clone();
                let name = spec.name.unwrap_or_else(|| "postaid-task".to_owned());
                self.in_flight.fetch_add(1, Ordering::AcqRel);
                let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
                    let msg = f();
                    let _ = tx.send(Envelope::TaskResult(msg));
                });
                if let Err(e) = spawned {
                    self.in_flight.fetch_sub(1, Ordering::AcqRel);
                    tracing::warn!(task = %name, error = %e, "failed to spawn task thread");
                }
            }
        }
    }
}
