// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kup up` - provision the cluster

use crate::output;
use anyhow::Result;
use clap::Args;
use kup_core::clock::SystemClock;
use kup_core::config::ClusterConfig;
use kup_core::gate::CredentialStore;
use kup_core::report;
use kup_core::CancelFlag;
use kup_provision::{bring_up, BringUpReport, ClusterPlan, LocalRunner, Provisioner};

#[derive(Args)]
pub struct UpArgs {
    /// Provision a single machine instead of the whole cluster
    #[arg(long)]
    pub machine: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn up(args: UpArgs, config: ClusterConfig) -> Result<()> {
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("interrupt received, cancelling");
        handler_flag.cancel();
    })?;

    let report = match &args.machine {
        Some(name) => single_machine(name, &config, &cancel).await?,
        None => bring_up(&config, LocalRunner::new(), SystemClock, cancel).await?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_report(&report);
        if report.success() && args.machine.is_none() {
            print!("{}", report::summary(&config.topology));
        }
    }

    if !report.success() {
        anyhow::bail!(
            "bring-up failed on {} machine(s)",
            report.failures().count()
        );
    }
    Ok(())
}

/// Provision one machine by name. A worker falls back to polling the shared
/// credential file, since the master may be provisioned by another process.
async fn single_machine(
    name: &str,
    config: &ClusterConfig,
    cancel: &CancelFlag,
) -> Result<BringUpReport> {
    let plan = ClusterPlan::build(config)?;
    let machine_plan = plan
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("unknown machine: {name}"))?;

    let provisioner = Provisioner::new(
        LocalRunner::new(),
        SystemClock,
        CredentialStore::new(&config.provision.credential_path),
        config.provision.clone(),
    );
    let report = provisioner
        .provision_machine(machine_plan, None, None, cancel)
        .await;

    Ok(BringUpReport {
        machines: vec![report],
    })
}
