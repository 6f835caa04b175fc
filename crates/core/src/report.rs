// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-bring-up summary report

use crate::topology::Topology;
use std::fmt::Write;

const BANNER: &str = "============================================";

/// Render the static post-bring-up instructions for a topology.
pub fn summary(topology: &Topology) -> String {
    let master = topology.master();
    let mut out = String::new();

    // Writing to a String cannot fail; discard the fmt::Result
    let _ = writeln!(out, "{BANNER}");
    let _ = writeln!(out, "Cluster bring-up complete");
    let _ = writeln!(out, "{BANNER}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Add these entries to your hosts file:");
    let _ = writeln!(out);
    for entry in topology.hosts_entries() {
        let _ = writeln!(out, "  {entry}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Reach the master node:");
    let _ = writeln!(out, "  ssh {}", master.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "Verify cluster status:");
    let _ = writeln!(out, "  kubectl get nodes");
    let _ = writeln!(out, "  kubectl get pods --all-namespaces");

    out
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
