// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provisioning step definitions
//!
//! Each step is a named shell script rendered from a template against the
//! machine it runs on. The common sequence prepares any machine to host the
//! orchestration agents; the master and worker role steps are built here too
//! and assembled into plans by [`crate::plan`].

use crate::template::{TemplateEngine, TemplateError};
use kup_core::config::ProvisionConfig;
use kup_core::credential::JoinCredential;
use kup_core::topology::{Machine, Topology};
use serde::Serialize;
use thiserror::Error;

/// Errors from step construction
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// A named shell script to run on a machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub name: String,
    pub script: String,
}

impl Step {
    fn render(
        name: &str,
        template: &str,
        ctx: &StepContext<'_>,
        engine: &TemplateEngine,
    ) -> Result<Self, StepError> {
        Ok(Self {
            name: name.to_string(),
            script: engine.render(template, ctx)?,
        })
    }
}

/// Template context for one machine
#[derive(Serialize)]
struct StepContext<'a> {
    name: &'a str,
    address: String,
    hosts: String,
    pod_cidr: &'a str,
    overlay_url: &'a str,
    user: &'a str,
}

impl<'a> StepContext<'a> {
    fn new(machine: &'a Machine, topology: &Topology, config: &'a ProvisionConfig) -> Self {
        Self {
            name: &machine.name.0,
            address: machine.address.to_string(),
            hosts: topology.hosts_entries().join("\n"),
            pod_cidr: &config.pod_network_cidr,
            overlay_url: &config.overlay_manifest_url,
            user: &config.runtime_user,
        }
    }
}

const SET_HOSTNAME: &str = "hostnamectl set-hostname {{ name }}";

const SEED_HOSTS: &str = "\
cat >> /etc/hosts << EOF
{{ hosts }}
EOF";

const DISABLE_SELINUX: &str = "\
setenforce 0
sed -i 's/^SELINUX=enforcing$/SELINUX=disabled/' /etc/selinux/config";

const DISABLE_SWAP: &str = "\
swapoff -a
sed -i '/ swap / s/^/#/' /etc/fstab";

const INSTALL_RUNTIME: &str = "\
yum update -y
yum install -y docker
systemctl start docker
systemctl enable docker
usermod -aG docker {{ user }}";

const CONFIGURE_REPO: &str = "\
cat > /etc/yum.repos.d/kubernetes.repo << EOF
[kubernetes]
name=Kubernetes
baseurl=https://packages.cloud.google.com/yum/repos/kubernetes-el7-x86_64
enabled=1
gpgcheck=1
repo_gpgcheck=1
gpgkey=https://packages.cloud.google.com/yum/doc/yum-key.gpg https://packages.cloud.google.com/yum/doc/rpm-package-key.gpg
EOF";

const INSTALL_AGENTS: &str = "\
yum install -y kubelet kubeadm kubectl
systemctl enable kubelet";

const APPLY_SYSCTL: &str = "\
cat >> /etc/sysctl.conf << EOF
net.bridge.bridge-nf-call-iptables = 1
net.ipv4.ip_forward = 1
EOF
sysctl -p";

const CLUSTER_INIT: &str = "kubeadm init \
--apiserver-advertise-address={{ address }} \
--pod-network-cidr={{ pod_cidr }}";

const INSTALL_KUBECONFIG: &str = "\
mkdir -p /home/{{ user }}/.kube
cp /etc/kubernetes/admin.conf /home/{{ user }}/.kube/config
chown {{ user }}:{{ user }} /home/{{ user }}/.kube/config";

const APPLY_OVERLAY: &str = "sudo -u {{ user }} kubectl apply -f {{ overlay_url }}";

const MINT_CREDENTIAL: &str = "kubeadm token create --print-join-command";

/// Step name of the one worker join execution
pub const JOIN_STEP: &str = "join-cluster";
/// Step name of the credential-minting master step
pub const MINT_STEP: &str = "mint-credential";

/// The OS-preparation sequence every machine runs, in order.
pub fn common_steps(
    machine: &Machine,
    topology: &Topology,
    config: &ProvisionConfig,
    engine: &TemplateEngine,
) -> Result<Vec<Step>, StepError> {
    let ctx = StepContext::new(machine, topology, config);
    Ok(vec![
        Step::render("set-hostname", SET_HOSTNAME, &ctx, engine)?,
        Step::render("seed-hosts", SEED_HOSTS, &ctx, engine)?,
        Step::render("disable-selinux", DISABLE_SELINUX, &ctx, engine)?,
        Step::render("disable-swap", DISABLE_SWAP, &ctx, engine)?,
        Step::render("install-runtime", INSTALL_RUNTIME, &ctx, engine)?,
        Step::render("configure-repo", CONFIGURE_REPO, &ctx, engine)?,
        Step::render("install-agents", INSTALL_AGENTS, &ctx, engine)?,
        Step::render("apply-sysctl", APPLY_SYSCTL, &ctx, engine)?,
    ])
}

/// Cluster initialization, run on the master with its own address as the
/// advertise address.
pub fn cluster_init_step(
    machine: &Machine,
    topology: &Topology,
    config: &ProvisionConfig,
    engine: &TemplateEngine,
) -> Result<Step, StepError> {
    let ctx = StepContext::new(machine, topology, config);
    Step::render("cluster-init", CLUSTER_INIT, &ctx, engine)
}

/// Install the admin kubeconfig for the runtime user.
pub fn kubeconfig_step(
    machine: &Machine,
    topology: &Topology,
    config: &ProvisionConfig,
    engine: &TemplateEngine,
) -> Result<Step, StepError> {
    let ctx = StepContext::new(machine, topology, config);
    Step::render("install-kubeconfig", INSTALL_KUBECONFIG, &ctx, engine)
}

/// Apply the network overlay manifest.
pub fn overlay_step(
    machine: &Machine,
    topology: &Topology,
    config: &ProvisionConfig,
    engine: &TemplateEngine,
) -> Result<Step, StepError> {
    let ctx = StepContext::new(machine, topology, config);
    Step::render("apply-overlay", APPLY_OVERLAY, &ctx, engine)
}

/// Mint the join credential. The step's stdout is the credential.
pub fn mint_step() -> Step {
    Step {
        name: MINT_STEP.to_string(),
        script: MINT_CREDENTIAL.to_string(),
    }
}

/// The one worker join execution: the credential contents run as-is.
pub fn join_step(credential: &JoinCredential) -> Step {
    Step {
        name: JOIN_STEP.to_string(),
        script: credential.command().to_string(),
    }
}

#[cfg(test)]
#[path = "steps_tests.rs"]
mod tests;
