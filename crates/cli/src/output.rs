// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain-text rendering of plans and reports

use kup_provision::{BringUpReport, MachineOutcome, MachinePlan, RoleSteps};

/// Print one machine's plan: identity, port forwards, and step list.
pub fn print_plan(plan: &MachinePlan, scripts: bool) {
    let machine = &plan.machine;
    println!("{} ({}) {}", machine.name, machine.role.name(), machine.address);
    for forward in machine.forwarded_ports() {
        println!("  forward localhost:{} -> {}", forward.host, forward.guest);
    }
    for name in plan.step_names() {
        println!("  - {name}");
    }

    if scripts {
        for step in &plan.common {
            print_script(&step.name, &step.script);
        }
        match &plan.role {
            RoleSteps::Master { steps } => {
                for step in steps.in_order() {
                    print_script(&step.name, &step.script);
                }
            }
            RoleSteps::Worker => {
                println!();
                println!("  # join-cluster runs the published credential verbatim");
            }
        }
    }
    println!();
}

fn print_script(name: &str, script: &str) {
    println!();
    println!("  # {name}");
    for line in script.lines() {
        println!("  {line}");
    }
}

/// Print the per-machine bring-up results as a table.
pub fn print_report(report: &BringUpReport) {
    println!("{:<12} {:<8} {:<12} DETAIL", "MACHINE", "ROLE", "RESULT");
    for machine in &report.machines {
        let (result, detail) = match &machine.outcome {
            MachineOutcome::Provisioned => ("provisioned".to_string(), run_detail(machine)),
            MachineOutcome::Joined => ("joined".to_string(), run_detail(machine)),
            MachineOutcome::Failed { step, reason } => (
                "failed".to_string(),
                match step {
                    Some(step) => format!("{step}: {reason}"),
                    None => reason.clone(),
                },
            ),
        };
        println!(
            "{:<12} {:<8} {:<12} {}",
            machine.machine.0,
            machine.role.name(),
            result,
            detail
        );
    }
}

fn run_detail(machine: &kup_provision::MachineReport) -> String {
    let elapsed = (machine.finished_at - machine.started_at)
        .to_std()
        .unwrap_or_default();
    format!(
        "{} steps in {}",
        machine.steps.len(),
        humantime::format_duration(elapsed)
    )
}
