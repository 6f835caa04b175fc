// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kup-core: Core library for the kup cluster bring-up tool
//!
//! This crate provides:
//! - The static cluster topology (machines, roles, forwarded ports)
//! - Pure state machines for the master/worker bootstrap handshake
//! - The join-credential handoff (file-backed store plus in-process signal)
//! - Cluster configuration loading
//! - The post-bring-up summary report

pub mod cancel;
pub mod clock;

pub mod config;
pub mod credential;
pub mod gate;
pub mod handshake;
pub mod report;
pub mod topology;

// Re-exports
pub use cancel::CancelFlag;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ClusterConfig, ConfigError, ProvisionConfig};
pub use credential::{CredentialError, JoinCredential};
pub use gate::{
    CredentialStore, GateError, ReadySignal, ReadyWatch, WaitError, WaitOptions,
    wait_for_credential,
};
pub use handshake::{
    HandshakeEffect, Master, MasterEvent, MasterState, Worker, WorkerEvent, WorkerState,
};
pub use topology::{Machine, MachineName, PortForward, Role, Topology, TopologyError};
