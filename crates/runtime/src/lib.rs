//! Runtime integration.
//!
//! Runs a session on its own tokio task and bridges it to callers through
//! a bounded command channel and an unbounded outbound channel.

pub mod driver;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use blockfall_core::GameConfig;
use blockfall_store::{Storage, Store};

pub use driver::{
    ClockMode, Command, DriverOptions, Flow, Outbound, SessionDriver, SessionReport,
};

/// Pending commands before senders wait
pub const COMMAND_QUEUE: usize = 64;

/// Running session task.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    outbound: mpsc::UnboundedReceiver<Outbound>,
    task: JoinHandle<Option<SessionReport>>,
}

impl SessionHandle {
    pub async fn send(&self, cmd: Command) -> Result<()> {
        self.commands
            .send(cmd)
            .await
            .context("session task is gone")
    }

    pub fn sender(&self) -> mpsc::Sender<Command> {
        self.commands.clone()
    }

    pub async fn recv(&mut self) -> Option<Outbound> {
        self.outbound.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Outbound> {
        self.outbound.try_recv().ok()
    }

    /// Stop the task and wait for the last session report
    pub async fn shutdown(self) -> Result<Option<SessionReport>> {
        // The task may already have stopped on its own.
        let _ = self.commands.send(Command::Shutdown).await;
        self.task.await.context("session task panicked")
    }
}

/// Start a session on the current tokio runtime.
pub fn spawn_session<S>(
    config: GameConfig,
    options: DriverOptions,
    store: Option<Store<S>>,
) -> SessionHandle
where
    S: Storage + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(COMMAND_QUEUE);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<Outbound>();

    let driver = SessionDriver::new(config, options, store, out_tx);
    let task = tokio::spawn(driver.run(cmd_rx));

    SessionHandle {
        commands: cmd_tx,
        outbound: out_rx,
        task,
    }
}
