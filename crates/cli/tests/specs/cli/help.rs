//! CLI surface specs
//!
//! Verify help output, subcommand listing, and argument errors.

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    Cluster::empty()
        .kup()
        .args(&["--help"])
        .passes()
        .stdout_has("single-master cluster")
        .stdout_has("up")
        .stdout_has("plan")
        .stdout_has("hosts")
        .stdout_has("report")
        .stdout_has("completions");
}

#[test]
fn unknown_subcommand_fails() {
    Cluster::empty()
        .kup()
        .args(&["teardown"])
        .fails()
        .stderr_has("teardown");
}

#[test]
fn missing_config_falls_back_to_builtin_topology() {
    // No kup.toml in the directory; the built-in three-machine
    // topology is used.
    Cluster::empty()
        .kup()
        .args(&["hosts"])
        .passes()
        .stdout_has("centos1");
}

#[test]
fn completions_emit_the_binary_name() {
    Cluster::empty()
        .kup()
        .args(&["completions", "bash"])
        .passes()
        .stdout_has("kup");
}

#[test]
fn malformed_config_fails() {
    let temp = Cluster::empty();
    temp.file("kup.toml", "machine = \"not a table\"\n");

    temp.kup().args(&["hosts"]).fails();
}

#[test]
fn unknown_config_key_fails() {
    let temp = Cluster::empty();
    temp.file("kup.toml", "[provision]\npod_cidr = \"10.244.0.0/16\"\n");

    temp.kup().args(&["plan"]).fails();
}
