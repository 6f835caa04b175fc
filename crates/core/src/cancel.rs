// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellation flag shared between the CLI signal handler and waits
//!
//! The worker's credential wait is the only long suspension point in a
//! bring-up, so cancellation only needs a set-once flag that can wake an
//! async waiter.

use std::sync::Arc;
use tokio::sync::watch;

/// Set-once cancellation flag. Cloning shares the flag.
#[derive(Clone)]
pub struct CancelFlag {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelFlag {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation. Safe to call from a signal handler thread.
    pub fn cancel(&self) {
        // send_replace never fails; the sender holds its own receiver slot
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        while !*rx.borrow_and_update() {
            // changed() cannot fail: we hold the sender via Arc
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
