// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Join-credential handoff
//!
//! A single-writer / multiple-reader handoff with two carriers:
//!
//! - [`CredentialStore`]: the shared file at a well-known path. Publish is
//!   write-once and goes through a temp file plus atomic rename, so a reader
//!   can never observe a partially written credential.
//! - [`ReadySignal`]: an in-process written-once broadcast for machines
//!   provisioned concurrently in the same run, so they need not poll the
//!   filesystem.
//!
//! [`wait_for_credential`] is the worker's poll loop: check existence at a
//! fixed interval, bounded by an optional timeout and a cancellation flag.

use crate::cancel::CancelFlag;
use crate::clock::Clock;
use crate::credential::{CredentialError, JoinCredential};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Errors from the credential handoff
#[derive(Debug, Error)]
pub enum GateError {
    #[error("credential already published at {0}")]
    AlreadyPublished(PathBuf),
    #[error("credential already signalled")]
    AlreadySignalled,
    #[error("publisher dropped without signalling")]
    PublisherGone,
    #[error("invalid credential: {0}")]
    Credential(#[from] CredentialError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the worker's credential wait
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("wait cancelled")]
    Cancelled,
    #[error("credential did not appear within {waited:?}")]
    TimedOut { waited: Duration },
    #[error(transparent)]
    Gate(#[from] GateError),
}

// =============================================================================
// File-backed store
// =============================================================================

/// The shared credential file at a well-known path
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the credential. Write-once: publishing over an existing
    /// credential is an error. The write lands under a temporary name and is
    /// renamed into place, so readers observe either nothing or the whole
    /// credential.
    pub fn publish(&self, credential: &JoinCredential) -> Result<(), GateError> {
        if self.exists() {
            return Err(GateError::AlreadyPublished(self.path.clone()));
        }

        let staging = self.staging_path();
        std::fs::write(&staging, format!("{}\n", credential.command()))?;
        std::fs::rename(&staging, &self.path)?;
        tracing::info!(path = %self.path.display(), "join credential published");
        Ok(())
    }

    /// Read the credential if it has been published.
    pub fn read(&self) -> Result<Option<JoinCredential>, GateError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(JoinCredential::new(contents)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".partial");
        PathBuf::from(name)
    }
}

// =============================================================================
// In-process signal
// =============================================================================

/// Written-once, read-many readiness signal
#[derive(Clone)]
pub struct ReadySignal {
    tx: Arc<watch::Sender<Option<JoinCredential>>>,
}

impl ReadySignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Broadcast the credential to all subscribers. Write-once.
    pub fn publish(&self, credential: JoinCredential) -> Result<(), GateError> {
        let mut published = false;
        self.tx.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(credential.clone());
                published = true;
            }
            published
        });

        if published {
            Ok(())
        } else {
            Err(GateError::AlreadySignalled)
        }
    }

    pub fn subscribe(&self) -> ReadyWatch {
        ReadyWatch {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber half of a [`ReadySignal`]
pub struct ReadyWatch {
    rx: watch::Receiver<Option<JoinCredential>>,
}

impl ReadyWatch {
    /// Resolve with the credential once it has been published.
    pub async fn wait(&mut self) -> Result<JoinCredential, GateError> {
        loop {
            if let Some(credential) = self.rx.borrow_and_update().clone() {
                return Ok(credential);
            }
            if self.rx.changed().await.is_err() {
                return Err(GateError::PublisherGone);
            }
        }
    }
}

// =============================================================================
// Poll loop
// =============================================================================

/// How a worker waits for the shared credential file
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Fixed interval between existence checks
    pub interval: Duration,
    /// Upper bound on the wait; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: None,
        }
    }
}

/// Block until the shared credential file exists, then read it.
///
/// Checks at `opts.interval`, stopping early on cancellation or when the
/// optional timeout elapses. A wait with no timeout only ends when the
/// credential appears or the flag is cancelled.
pub async fn wait_for_credential(
    store: &CredentialStore,
    opts: &WaitOptions,
    cancel: &CancelFlag,
    clock: &impl Clock,
) -> Result<JoinCredential, WaitError> {
    let started = clock.now();

    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        if let Some(credential) = store.read()? {
            return Ok(credential);
        }

        let waited = clock.now().duration_since(started);
        if let Some(timeout) = opts.timeout {
            if waited >= timeout {
                return Err(WaitError::TimedOut { waited });
            }
        }

        tracing::debug!(
            path = %store.path().display(),
            ?waited,
            "credential not yet published, waiting"
        );
        tokio::select! {
            _ = cancel.cancelled() => return Err(WaitError::Cancelled),
            _ = tokio::time::sleep(opts.interval) => {}
        }
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
