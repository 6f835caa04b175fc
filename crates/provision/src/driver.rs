// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provisioning driver
//!
//! Executes machine plans and the bootstrap handshake. Each machine is an
//! independent unit of work; `bring_up` runs them concurrently, coordinated
//! only by the join-credential handoff. Execution is fail-fast: the first
//! failed step ends that machine's provisioning.

use crate::plan::{ClusterPlan, MachinePlan, MasterSteps, RoleSteps};
use crate::runner::{RunnerError, ShellRunner, StepOutput};
use crate::steps::{self, Step, StepError};
use chrono::{DateTime, Utc};
use kup_core::cancel::CancelFlag;
use kup_core::clock::Clock;
use kup_core::config::{ClusterConfig, ProvisionConfig};
use kup_core::credential::{CredentialError, JoinCredential};
use kup_core::gate::{
    CredentialStore, GateError, ReadySignal, ReadyWatch, WaitError, WaitOptions,
    wait_for_credential,
};
use kup_core::handshake::{HandshakeEffect, Master, MasterEvent, Worker, WorkerEvent};
use kup_core::topology::{MachineName, Role};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors from provisioning
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("step {step} on {machine} failed: {stderr}")]
    StepFailed {
        machine: MachineName,
        step: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error(transparent)]
    Plan(#[from] StepError),
    #[error("waiting for join credential on {machine}: {source}")]
    Wait {
        machine: MachineName,
        source: WaitError,
    },
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error("credential minted on {machine} is invalid: {source}")]
    Credential {
        machine: MachineName,
        source: CredentialError,
    },
    #[error("machine task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ProvisionError {
    /// The step a failure is attributable to, when there is one.
    fn step_name(&self) -> Option<String> {
        match self {
            ProvisionError::StepFailed { step, .. } => Some(step.clone()),
            ProvisionError::Runner(RunnerError::Spawn { step, .. }) => Some(step.clone()),
            ProvisionError::Wait { .. } => Some("wait-for-credential".to_string()),
            ProvisionError::Credential { .. } => Some(steps::MINT_STEP.to_string()),
            _ => None,
        }
    }
}

/// A completed step with its wall-clock duration
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub duration: Duration,
}

/// How one machine's provisioning ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MachineOutcome {
    /// Master: cluster initialized and credential written
    Provisioned,
    /// Worker: join credential consumed, machine attached
    Joined,
    Failed {
        step: Option<String>,
        reason: String,
    },
}

impl MachineOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, MachineOutcome::Failed { .. })
    }
}

/// Record of one machine's provisioning run
#[derive(Debug, Clone, Serialize)]
pub struct MachineReport {
    pub machine: MachineName,
    pub role: Role,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Steps that completed, in execution order
    pub steps: Vec<StepRecord>,
    pub outcome: MachineOutcome,
}

/// Reports for a whole bring-up, in topology order
#[derive(Debug, Clone, Serialize)]
pub struct BringUpReport {
    pub machines: Vec<MachineReport>,
}

impl BringUpReport {
    pub fn success(&self) -> bool {
        !self.machines.iter().any(|m| m.outcome.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = &MachineReport> {
        self.machines.iter().filter(|m| m.outcome.is_failure())
    }
}

/// Drives plan execution for machines of either role
#[derive(Clone)]
pub struct Provisioner<R: ShellRunner, C: Clock> {
    runner: R,
    clock: C,
    store: CredentialStore,
    provision: ProvisionConfig,
}

impl<R: ShellRunner, C: Clock> Provisioner<R, C> {
    pub fn new(runner: R, clock: C, store: CredentialStore, provision: ProvisionConfig) -> Self {
        Self {
            runner,
            clock,
            store,
            provision,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Provision one machine to completion. Failures land in the report's
    /// outcome rather than an error, so concurrent machines can be gathered
    /// uniformly.
    ///
    /// `watch` lets a worker observe an in-process publish instead of
    /// polling the shared file; `signal` lets a master broadcast in-process.
    pub async fn provision_machine(
        &self,
        plan: &MachinePlan,
        watch: Option<ReadyWatch>,
        signal: Option<&ReadySignal>,
        cancel: &CancelFlag,
    ) -> MachineReport {
        let started_at = Utc::now();
        let mut records = Vec::new();

        let result = self.run_plan(plan, watch, signal, cancel, &mut records).await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(machine = %plan.machine.name, error = %err, "provisioning failed");
                MachineOutcome::Failed {
                    step: err.step_name(),
                    reason: err.to_string(),
                }
            }
        };

        MachineReport {
            machine: plan.machine.name.clone(),
            role: plan.machine.role,
            started_at,
            finished_at: Utc::now(),
            steps: records,
            outcome,
        }
    }

    async fn run_plan(
        &self,
        plan: &MachinePlan,
        watch: Option<ReadyWatch>,
        signal: Option<&ReadySignal>,
        cancel: &CancelFlag,
        records: &mut Vec<StepRecord>,
    ) -> Result<MachineOutcome, ProvisionError> {
        let machine = &plan.machine.name;

        for step in &plan.common {
            self.run_step(machine, step, records).await?;
        }

        match &plan.role {
            RoleSteps::Master { steps } => {
                self.run_master(plan, steps, signal, records).await?;
                Ok(MachineOutcome::Provisioned)
            }
            RoleSteps::Worker => {
                self.run_worker(plan, watch, cancel, records).await?;
                Ok(MachineOutcome::Joined)
            }
        }
    }

    /// Drive the master handshake: init, overlay, mint, publish.
    async fn run_master(
        &self,
        plan: &MachinePlan,
        role_steps: &MasterSteps,
        signal: Option<&ReadySignal>,
        records: &mut Vec<StepRecord>,
    ) -> Result<(), ProvisionError> {
        let machine = &plan.machine.name;
        let master = Master::new(
            machine.clone(),
            plan.machine.address,
            self.provision.pod_network_cidr.clone(),
            self.provision.overlay_manifest_url.clone(),
        );

        let (master, effects) = master.transition(MasterEvent::Start);
        for effect in effects {
            if let Err(err) = self
                .run_master_effect(&effect, plan, role_steps, signal, records)
                .await
            {
                // Fail-fast: record the terminal state, no retry
                let (master, _) = master.transition(MasterEvent::InitFailed {
                    reason: err.to_string(),
                });
                debug_assert!(master.state.is_terminal());
                return Err(err);
            }
        }

        let (master, _) = master.transition(MasterEvent::CredentialPublished);
        tracing::info!(machine = %machine, state = ?master.state, "master handshake complete");
        Ok(())
    }

    async fn run_master_effect(
        &self,
        effect: &HandshakeEffect,
        plan: &MachinePlan,
        role_steps: &MasterSteps,
        signal: Option<&ReadySignal>,
        records: &mut Vec<StepRecord>,
    ) -> Result<(), ProvisionError> {
        let machine = &plan.machine.name;
        match effect {
            HandshakeEffect::RunClusterInit { .. } => {
                self.run_step(machine, &role_steps.init, records).await?;
                self.run_step(machine, &role_steps.kubeconfig, records)
                    .await?;
                Ok(())
            }
            HandshakeEffect::ApplyOverlay { .. } => {
                self.run_step(machine, &role_steps.overlay, records).await?;
                Ok(())
            }
            HandshakeEffect::PublishCredential => {
                let minted = self.run_step(machine, &role_steps.mint, records).await?;
                let credential = JoinCredential::new(minted.stdout).map_err(|source| {
                    ProvisionError::Credential {
                        machine: machine.clone(),
                        source,
                    }
                })?;

                self.store.publish(&credential)?;
                if let Some(signal) = signal {
                    signal.publish(credential)?;
                }
                Ok(())
            }
            // Join execution belongs to workers
            HandshakeEffect::ExecuteJoin { .. } => Ok(()),
        }
    }

    /// Drive the worker handshake: wait, then join exactly once.
    async fn run_worker(
        &self,
        plan: &MachinePlan,
        watch: Option<ReadyWatch>,
        cancel: &CancelFlag,
        records: &mut Vec<StepRecord>,
    ) -> Result<(), ProvisionError> {
        let machine = &plan.machine.name;
        let worker = Worker::new(machine.clone());

        let credential = self.await_credential(machine, watch, cancel).await?;

        let (worker, effects) = worker.transition(WorkerEvent::CredentialObserved { credential });
        for effect in effects {
            if let HandshakeEffect::ExecuteJoin { credential } = effect {
                let step = steps::join_step(&credential);
                if let Err(err) = self.run_step(machine, &step, records).await {
                    let (worker, _) = worker.transition(WorkerEvent::JoinFailed {
                        reason: err.to_string(),
                    });
                    debug_assert!(worker.state.is_terminal());
                    return Err(err);
                }
            }
        }

        let (worker, _) = worker.transition(WorkerEvent::JoinSucceeded);
        tracing::info!(machine = %machine, state = ?worker.state, "worker joined cluster");
        Ok(())
    }

    /// Block until the credential is available, bounded by the configured
    /// timeout and the cancellation flag.
    async fn await_credential(
        &self,
        machine: &MachineName,
        watch: Option<ReadyWatch>,
        cancel: &CancelFlag,
    ) -> Result<JoinCredential, ProvisionError> {
        let opts = WaitOptions {
            interval: self.provision.poll_interval,
            timeout: self.provision.join_timeout,
        };

        let result = match watch {
            Some(mut watch) => {
                tokio::select! {
                    _ = cancel.cancelled() => Err(WaitError::Cancelled),
                    result = Self::bounded_watch(&mut watch, opts.timeout) => result,
                }
            }
            None => wait_for_credential(&self.store, &opts, cancel, &self.clock).await,
        };

        result.map_err(|source| ProvisionError::Wait {
            machine: machine.clone(),
            source,
        })
    }

    async fn bounded_watch(
        watch: &mut ReadyWatch,
        timeout: Option<Duration>,
    ) -> Result<JoinCredential, WaitError> {
        match timeout {
            Some(timeout) => tokio::time::timeout(timeout, watch.wait())
                .await
                .map_err(|_| WaitError::TimedOut { waited: timeout })?
                .map_err(WaitError::Gate),
            None => watch.wait().await.map_err(WaitError::Gate),
        }
    }

    async fn run_step(
        &self,
        machine: &MachineName,
        step: &Step,
        records: &mut Vec<StepRecord>,
    ) -> Result<StepOutput, ProvisionError> {
        let started = self.clock.now();
        let output = self.runner.run(machine, step).await?;
        let duration = self.clock.now().duration_since(started);

        if !output.success {
            return Err(ProvisionError::StepFailed {
                machine: machine.clone(),
                step: step.name.clone(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        tracing::info!(machine = %machine, step = %step.name, ?duration, "step complete");
        records.push(StepRecord {
            name: step.name.clone(),
            duration,
        });
        Ok(output)
    }
}

/// Provision every machine in the topology concurrently, coordinated only by
/// the join-credential handoff. A master failure cancels the workers' waits;
/// per-machine failures are gathered into the report.
pub async fn bring_up<R: ShellRunner, C: Clock>(
    config: &ClusterConfig,
    runner: R,
    clock: C,
    cancel: CancelFlag,
) -> Result<BringUpReport, ProvisionError> {
    let plan = ClusterPlan::build(config)?;
    let store = CredentialStore::new(&config.provision.credential_path);
    let signal = ReadySignal::new();
    let provisioner = Provisioner::new(runner, clock, store, config.provision.clone());

    let mut tasks = tokio::task::JoinSet::new();
    for machine_plan in plan.machines {
        let provisioner = provisioner.clone();
        let cancel_wait = cancel.clone();
        let cancel_all = cancel.clone();
        let (watch, publish) = match machine_plan.machine.role {
            Role::Master => (None, Some(signal.clone())),
            Role::Worker => (Some(signal.subscribe()), None),
        };

        tasks.spawn(async move {
            let report = provisioner
                .provision_machine(&machine_plan, watch, publish.as_ref(), &cancel_wait)
                .await;

            // An unwritten credential blocks every worker; stop their waits
            if report.role == Role::Master && report.outcome.is_failure() {
                cancel_all.cancel();
            }
            report
        });
    }

    let mut machines = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        machines.push(joined?);
    }
    machines.sort_by_key(|report| {
        config
            .topology
            .get(&report.machine.0)
            .map_or(usize::MAX, |m| m.index)
    });

    Ok(BringUpReport { machines })
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
