// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kup-provision: provisioning plans and execution
//!
//! This crate turns a topology into per-machine provisioning plans (shell
//! steps rendered from templates), provides the [`ShellRunner`] adapter seam
//! with real and fake implementations, and drives plan execution plus the
//! bootstrap handshake.

pub mod driver;
pub mod plan;
pub mod runner;
pub mod steps;
pub mod template;

pub use driver::{
    BringUpReport, MachineOutcome, MachineReport, ProvisionError, Provisioner, StepRecord,
    bring_up,
};
pub use plan::{ClusterPlan, MachinePlan, MasterSteps, RoleSteps};
pub use runner::{FakeRunner, LocalRunner, RunnerCall, RunnerError, ShellRunner, StepOutput};
pub use steps::{Step, StepError};
pub use template::{TemplateEngine, TemplateError};
