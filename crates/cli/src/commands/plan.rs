// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kup plan` - show per-machine provisioning plans

use crate::output;
use anyhow::Result;
use clap::Args;
use kup_core::config::ClusterConfig;
use kup_provision::ClusterPlan;

#[derive(Args)]
pub struct PlanArgs {
    /// Only show this machine's plan
    #[arg(long)]
    pub machine: Option<String>,

    /// Include the rendered step scripts
    #[arg(long)]
    pub scripts: bool,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn plan(args: &PlanArgs, config: &ClusterConfig) -> Result<()> {
    let plan = ClusterPlan::build(config)?;

    let selected: Vec<_> = match &args.machine {
        Some(name) => {
            let machine_plan = plan
                .get(name)
                .ok_or_else(|| anyhow::anyhow!("unknown machine: {name}"))?;
            vec![machine_plan]
        }
        None => plan.machines.iter().collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    for machine_plan in selected {
        output::print_plan(machine_plan, args.scripts);
    }
    Ok(())
}
