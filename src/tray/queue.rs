//! Cross-thread icon updates
//!
//! Producers on any thread push [`IconCommand`]s through an [`IconUpdater`];
//! the controller is the only consumer and drains the queue on the UI thread,
//! so commands are applied in the order they were sent.

use crate::error::{AppError, Result};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// An icon change waiting for the UI thread
#[derive(Debug)]
pub struct IconCommand {
    pub path: PathBuf,
    reply: Option<Sender<Result<()>>>,
}

impl IconCommand {
    /// Report the outcome to a waiting ticket, if any
    pub fn complete(self, outcome: Result<()>) {
        if let Some(reply) = self.reply {
            // The ticket may have been dropped; nobody is waiting then
            let _ = reply.send(outcome);
        }
    }
}

/// Create a connected updater / receiver pair
pub fn channel() -> (IconUpdater, Receiver<IconCommand>) {
    let (tx, rx) = mpsc::channel();
    (IconUpdater { tx }, rx)
}

/// Thread-safe handle for changing the icon of a status item
#[derive(Debug, Clone)]
pub struct IconUpdater {
    tx: Sender<IconCommand>,
}

impl IconUpdater {
    /// Queue an icon change without waiting for it to be applied
    pub fn update_icon(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(path.into(), None)
    }

    /// Queue an icon change and get a ticket for its outcome
    pub fn request_icon(&self, path: impl Into<PathBuf>) -> Result<UpdateTicket> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(path.into(), Some(reply_tx))?;
        Ok(UpdateTicket { rx: reply_rx })
    }

    fn send(&self, path: PathBuf, reply: Option<Sender<Result<()>>>) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(AppError::IconLoadFailure("empty icon path".to_string()));
        }
        // The receiver is dropped on teardown
        self.tx
            .send(IconCommand { path, reply })
            .map_err(|_| AppError::Disposed)
    }
}

/// Outcome of a queued icon change
#[derive(Debug)]
pub struct UpdateTicket {
    rx: Receiver<Result<()>>,
}

impl UpdateTicket {
    /// Block until the UI thread applied or discarded the change
    pub fn wait(self) -> Result<()> {
        self.rx.recv().unwrap_or(Err(AppError::Disposed))
    }

    /// Like [`wait`](Self::wait), giving the ticket back on timeout
    pub fn wait_timeout(self, timeout: Duration) -> std::result::Result<Result<()>, Self> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Ok(outcome),
            Err(RecvTimeoutError::Disconnected) => Ok(Err(AppError::Disposed)),
            Err(RecvTimeoutError::Timeout) => Err(self),
        }
    }
}
