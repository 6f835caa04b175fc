// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static cluster topology
//!
//! The topology is the fixed membership table of the cluster: every machine,
//! its private address, and its role. Roles are assigned once, at
//! construction time, so downstream code branches on an enum instead of
//! comparing name strings.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use thiserror::Error;

/// Guest port serving plain HTTP on every machine
pub const HTTP_GUEST_PORT: u16 = 80;
/// Guest port of the cluster API server
pub const API_GUEST_PORT: u16 = 6443;
/// First host port forwarded to [`HTTP_GUEST_PORT`]
pub const HTTP_HOST_BASE: u16 = 8000;
/// First host port forwarded to [`API_GUEST_PORT`]
pub const API_HOST_BASE: u16 = 6440;

/// Errors from topology construction
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("topology has no machines")]
    Empty,
    #[error("duplicate machine name: {0}")]
    DuplicateName(String),
    #[error("duplicate machine address: {0}")]
    DuplicateAddress(Ipv4Addr),
    #[error("master {0} is not in the topology")]
    UnknownMaster(String),
}

/// Unique identifier for a machine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineName(pub String);

impl std::fmt::Display for MachineName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MachineName {
    fn from(s: &str) -> Self {
        MachineName(s.to_string())
    }
}

impl From<String> for MachineName {
    fn from(s: String) -> Self {
        MachineName(s)
    }
}

/// Role of a machine in the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Initializes the cluster and publishes the join credential
    Master,
    /// Waits for the join credential and attaches to the cluster
    Worker,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Worker => "worker",
        }
    }
}

/// A host-to-guest port forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortForward {
    pub guest: u16,
    pub host: u16,
}

/// A machine in the cluster topology
#[derive(Debug, Clone, Serialize)]
pub struct Machine {
    pub name: MachineName,
    pub address: Ipv4Addr,
    pub role: Role,
    /// Position in the topology; drives host port assignment
    pub index: usize,
}

impl Machine {
    /// Host port forwards for this machine, derived purely from its position.
    pub fn forwarded_ports(&self) -> [PortForward; 2] {
        let offset = self.index as u16;
        [
            PortForward {
                guest: HTTP_GUEST_PORT,
                host: HTTP_HOST_BASE + offset,
            },
            PortForward {
                guest: API_GUEST_PORT,
                host: API_HOST_BASE + offset,
            },
        ]
    }

    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }

    /// Hosts-file line for this machine
    pub fn hosts_entry(&self) -> String {
        format!("{} {}", self.address, self.name)
    }
}

/// The fixed cluster membership table
///
/// Only constructible through [`Topology::new`] or
/// [`Topology::default_cluster`], both of which guarantee a non-empty
/// machine list containing exactly one master.
#[derive(Debug, Clone, Serialize)]
pub struct Topology {
    machines: Vec<Machine>,
}

impl Topology {
    /// Build a topology from `(name, address)` entries, designating
    /// `master_name` as the single master. Order is preserved.
    pub fn new(
        entries: Vec<(String, Ipv4Addr)>,
        master_name: &str,
    ) -> Result<Self, TopologyError> {
        if entries.is_empty() {
            return Err(TopologyError::Empty);
        }
        if !entries.iter().any(|(name, _)| name == master_name) {
            return Err(TopologyError::UnknownMaster(master_name.to_string()));
        }

        let mut machines = Vec::with_capacity(entries.len());
        for (index, (name, address)) in entries.into_iter().enumerate() {
            if machines.iter().any(|m: &Machine| m.name.0 == name) {
                return Err(TopologyError::DuplicateName(name));
            }
            if machines.iter().any(|m: &Machine| m.address == address) {
                return Err(TopologyError::DuplicateAddress(address));
            }
            let role = if name == master_name {
                Role::Master
            } else {
                Role::Worker
            };
            machines.push(Machine {
                name: MachineName(name),
                address,
                role,
                index,
            });
        }

        Ok(Self { machines })
    }

    /// The default three-machine topology with the first machine as master.
    pub fn default_cluster() -> Self {
        let machines = [
            ("centos1", Ipv4Addr::new(192, 168, 50, 10), Role::Master),
            ("centos2", Ipv4Addr::new(192, 168, 50, 11), Role::Worker),
            ("centos3", Ipv4Addr::new(192, 168, 50, 12), Role::Worker),
        ]
        .into_iter()
        .enumerate()
        .map(|(index, (name, address, role))| Machine {
            name: MachineName(name.to_string()),
            address,
            role,
            index,
        })
        .collect();

        Self { machines }
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.name.0 == name)
    }

    /// The single designated master.
    pub fn master(&self) -> &Machine {
        // Construction guarantees exactly one master
        self.machines
            .iter()
            .find(|m| m.is_master())
            .unwrap_or(&self.machines[0])
    }

    /// All non-master machines, in topology order.
    pub fn workers(&self) -> impl Iterator<Item = &Machine> {
        self.machines.iter().filter(|m| !m.is_master())
    }

    /// Hosts-file lines for every machine, in topology order.
    pub fn hosts_entries(&self) -> Vec<String> {
        self.machines.iter().map(Machine::hosts_entry).collect()
    }
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
