// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster configuration
//!
//! A `kup.toml` file can override the built-in topology and provisioning
//! settings. Every field is optional; with no file at all, `kup` brings up
//! the default three-machine cluster.
//!
//! ```toml
//! master = "centos1"
//!
//! [[machine]]
//! name = "centos1"
//! address = "192.168.50.10"
//!
//! [provision]
//! poll_interval = "5s"
//! join_timeout = "10m"
//! ```

use crate::topology::{Topology, TopologyError};
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),
}

/// Provisioning settings shared by all machines
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionConfig {
    /// Pod network address range passed to cluster init
    pub pod_network_cidr: String,
    /// Network overlay manifest applied on the master
    pub overlay_manifest_url: String,
    /// Well-known shared path carrying the join credential
    pub credential_path: PathBuf,
    /// Unprivileged user granted runtime access and the kubeconfig
    pub runtime_user: String,
    /// Fixed interval between worker existence checks
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Upper bound on the worker wait; absent means wait indefinitely
    #[serde(with = "humantime_serde::option")]
    pub join_timeout: Option<Duration>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            pod_network_cidr: "10.244.0.0/16".to_string(),
            overlay_manifest_url:
                "https://raw.githubusercontent.com/coreos/flannel/master/Documentation/kube-flannel.yml"
                    .to_string(),
            credential_path: PathBuf::from("/tmp/join_command.sh"),
            runtime_user: "vagrant".to_string(),
            poll_interval: Duration::from_secs(5),
            join_timeout: None,
        }
    }
}

/// Fully resolved cluster configuration
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub topology: Topology,
    pub provision: ProvisionConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    /// Name of the designated master; defaults to the first machine
    master: Option<String>,
    #[serde(default, rename = "machine")]
    machines: Vec<RawMachine>,
    #[serde(default)]
    provision: ProvisionConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMachine {
    name: String,
    address: Ipv4Addr,
}

impl ClusterConfig {
    /// The built-in configuration: default topology, default settings.
    pub fn builtin() -> Self {
        Self {
            topology: Topology::default_cluster(),
            provision: ProvisionConfig::default(),
        }
    }

    /// Parse configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let entries: Vec<(String, Ipv4Addr)> = if raw.machines.is_empty() {
            Topology::default_cluster()
                .machines()
                .iter()
                .map(|m| (m.name.0.clone(), m.address))
                .collect()
        } else {
            raw.machines
                .into_iter()
                .map(|m| (m.name, m.address))
                .collect()
        };
        let master = match raw.master {
            Some(master) => master,
            None => entries[0].0.clone(),
        };
        let topology = Topology::new(entries, &master)?;

        Ok(Self {
            topology,
            provision: raw.provision,
        })
    }

    /// Load configuration from a file, or fall back to the built-in
    /// configuration when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::builtin()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
