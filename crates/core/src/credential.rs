// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The opaque join credential
//!
//! Produced exactly once by the master, consumed by every worker. The
//! contents are the join command itself; they carry a cluster token, so
//! `Debug` redacts them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("join credential is empty")]
    Empty,
}

/// Opaque token enabling a worker to attach to the cluster
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCredential(String);

impl JoinCredential {
    /// Wrap a join command, rejecting blank input. Surrounding whitespace
    /// (e.g. the trailing newline from `token create`) is trimmed.
    pub fn new(command: impl Into<String>) -> Result<Self, CredentialError> {
        let command = command.into();
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The join command to execute on a worker.
    pub fn command(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for JoinCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JoinCredential(<redacted>)")
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
