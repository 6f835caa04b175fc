// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bootstrap handshake state machines
//!
//! The only stateful coordination in a bring-up: the master initializes the
//! cluster and publishes the join credential exactly once; each worker waits
//! for the credential and consumes it exactly once.
//!
//! Both machines are pure: `transition` returns the next state and the
//! effects the caller must execute. Failures are terminal, matching the
//! fail-fast nature of provisioning; there is no retry state.

use crate::credential::JoinCredential;
use crate::topology::MachineName;
use std::net::Ipv4Addr;

/// Side effects requested by a handshake transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeEffect {
    /// Run cluster initialization on the master
    RunClusterInit {
        advertise_address: Ipv4Addr,
        pod_network_cidr: String,
    },
    /// Apply the network overlay manifest on the master
    ApplyOverlay { manifest_url: String },
    /// Mint the join credential and publish it to the shared store
    PublishCredential,
    /// Execute the join command on a worker, exactly once
    ExecuteJoin { credential: JoinCredential },
}

// =============================================================================
// Master
// =============================================================================

/// Master-side handshake states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterState {
    Uninitialized,
    Initializing,
    CredentialWritten,
    /// Initialization failed; the credential was never published and
    /// workers stay blocked. Terminal.
    Failed { reason: String },
}

impl MasterState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MasterState::CredentialWritten | MasterState::Failed { .. })
    }
}

/// Events driving the master machine
#[derive(Debug, Clone)]
pub enum MasterEvent {
    /// Begin initialization
    Start,
    /// The credential reached the shared store
    CredentialPublished,
    /// Any initialization step failed (fatal, no retry)
    InitFailed { reason: String },
}

/// Master side of the bootstrap handshake
#[derive(Debug, Clone)]
pub struct Master {
    pub machine: MachineName,
    pub state: MasterState,
    advertise_address: Ipv4Addr,
    pod_network_cidr: String,
    overlay_manifest_url: String,
}

impl Master {
    pub fn new(
        machine: MachineName,
        advertise_address: Ipv4Addr,
        pod_network_cidr: impl Into<String>,
        overlay_manifest_url: impl Into<String>,
    ) -> Self {
        Self {
            machine,
            state: MasterState::Uninitialized,
            advertise_address,
            pod_network_cidr: pod_network_cidr.into(),
            overlay_manifest_url: overlay_manifest_url.into(),
        }
    }

    /// Pure transition function - returns new state and effects
    pub fn transition(&self, event: MasterEvent) -> (Master, Vec<HandshakeEffect>) {
        match (&self.state, &event) {
            (MasterState::Uninitialized, MasterEvent::Start) => {
                let mut master = self.clone();
                master.state = MasterState::Initializing;

                let effects = vec![
                    HandshakeEffect::RunClusterInit {
                        advertise_address: self.advertise_address,
                        pod_network_cidr: self.pod_network_cidr.clone(),
                    },
                    HandshakeEffect::ApplyOverlay {
                        manifest_url: self.overlay_manifest_url.clone(),
                    },
                    HandshakeEffect::PublishCredential,
                ];
                (master, effects)
            }

            (MasterState::Initializing, MasterEvent::CredentialPublished) => {
                let mut master = self.clone();
                master.state = MasterState::CredentialWritten;
                (master, vec![])
            }

            // Fail-fast: any step failure before the credential is written
            (state, MasterEvent::InitFailed { reason }) if !state.is_terminal() => {
                let mut master = self.clone();
                master.state = MasterState::Failed {
                    reason: reason.clone(),
                };
                (master, vec![])
            }

            // Invalid transitions - no change
            _ => (self.clone(), vec![]),
        }
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Worker-side handshake states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
    /// Polling for the credential to appear
    Waiting,
    Joined,
    /// The join command failed. Terminal; the machine is left unjoined
    /// with no automatic remediation.
    Failed { reason: String },
}

impl WorkerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Joined | WorkerState::Failed { .. })
    }
}

/// Events driving the worker machine
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// The credential became visible in the shared store
    CredentialObserved { credential: JoinCredential },
    /// The join command completed
    JoinSucceeded,
    /// The join command failed, or the wait was abandoned
    JoinFailed { reason: String },
}

/// Worker side of the bootstrap handshake
#[derive(Debug, Clone)]
pub struct Worker {
    pub machine: MachineName,
    pub state: WorkerState,
    join_attempted: bool,
}

impl Worker {
    pub fn new(machine: MachineName) -> Self {
        Self {
            machine,
            state: WorkerState::Waiting,
            join_attempted: false,
        }
    }

    /// Whether a join was ever requested. At most one join is ever emitted.
    pub fn join_attempted(&self) -> bool {
        self.join_attempted
    }

    /// Pure transition function - returns new state and effects
    pub fn transition(&self, event: WorkerEvent) -> (Worker, Vec<HandshakeEffect>) {
        match (&self.state, &event) {
            // The one and only join attempt
            (WorkerState::Waiting, WorkerEvent::CredentialObserved { credential })
                if !self.join_attempted =>
            {
                let mut worker = self.clone();
                worker.join_attempted = true;

                let effects = vec![HandshakeEffect::ExecuteJoin {
                    credential: credential.clone(),
                }];
                (worker, effects)
            }

            (WorkerState::Waiting, WorkerEvent::JoinSucceeded) if self.join_attempted => {
                let mut worker = self.clone();
                worker.state = WorkerState::Joined;
                (worker, vec![])
            }

            (WorkerState::Waiting, WorkerEvent::JoinFailed { reason }) => {
                let mut worker = self.clone();
                worker.state = WorkerState::Failed {
                    reason: reason.clone(),
                };
                (worker, vec![])
            }

            // Invalid transitions - no change
            _ => (self.clone(), vec![]),
        }
    }
}

#[cfg(test)]
#[path = "handshake_tests.rs"]
mod tests;
