// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-machine provisioning plans
//!
//! A plan is the fully rendered, deterministic list of what will run on a
//! machine: the common OS-preparation steps followed by the role branch.
//! Role dispatch happens here, once, off the role tag the topology assigned
//! at construction time.

use crate::steps::{self, Step, StepError};
use crate::template::TemplateEngine;
use kup_core::config::ClusterConfig;
use kup_core::topology::{Machine, Role};
use serde::Serialize;

/// The master's role steps, in execution order
#[derive(Debug, Clone, Serialize)]
pub struct MasterSteps {
    pub init: Step,
    pub kubeconfig: Step,
    pub overlay: Step,
    pub mint: Step,
}

impl MasterSteps {
    pub fn in_order(&self) -> [&Step; 4] {
        [&self.init, &self.kubeconfig, &self.overlay, &self.mint]
    }
}

/// Role-specific part of a machine plan
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleSteps {
    Master { steps: MasterSteps },
    /// The worker's join script cannot be rendered ahead of time; it is the
    /// credential itself, observed during execution.
    Worker,
}

/// Everything that will run on one machine
#[derive(Debug, Clone, Serialize)]
pub struct MachinePlan {
    pub machine: Machine,
    pub common: Vec<Step>,
    pub role: RoleSteps,
}

impl MachinePlan {
    /// Names of all planned steps, including the deferred worker join.
    pub fn step_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.common.iter().map(|s| s.name.as_str()).collect();
        match &self.role {
            RoleSteps::Master { steps } => {
                names.extend(steps.in_order().map(|s| s.name.as_str()));
            }
            RoleSteps::Worker => {
                names.push("wait-for-credential");
                names.push(steps::JOIN_STEP);
            }
        }
        names
    }
}

/// Plans for the whole topology, in topology order
#[derive(Debug, Clone, Serialize)]
pub struct ClusterPlan {
    pub machines: Vec<MachinePlan>,
}

impl ClusterPlan {
    /// Build the plan for every machine. Pure and deterministic: the same
    /// config always yields the same plan.
    pub fn build(config: &ClusterConfig) -> Result<Self, StepError> {
        let engine = TemplateEngine::new();
        let mut machines = Vec::with_capacity(config.topology.len());
        for machine in config.topology.machines() {
            machines.push(Self::build_machine(machine, config, &engine)?);
        }
        Ok(Self { machines })
    }

    fn build_machine(
        machine: &Machine,
        config: &ClusterConfig,
        engine: &TemplateEngine,
    ) -> Result<MachinePlan, StepError> {
        let topology = &config.topology;
        let provision = &config.provision;
        let common = steps::common_steps(machine, topology, provision, engine)?;

        let role = match machine.role {
            Role::Master => RoleSteps::Master {
                steps: MasterSteps {
                    init: steps::cluster_init_step(machine, topology, provision, engine)?,
                    kubeconfig: steps::kubeconfig_step(machine, topology, provision, engine)?,
                    overlay: steps::overlay_step(machine, topology, provision, engine)?,
                    mint: steps::mint_step(),
                },
            },
            Role::Worker => RoleSteps::Worker,
        };

        Ok(MachinePlan {
            machine: machine.clone(),
            common,
            role,
        })
    }

    pub fn get(&self, name: &str) -> Option<&MachinePlan> {
        self.machines.iter().find(|p| p.machine.name.0 == name)
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
