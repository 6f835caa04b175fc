//! Topology specs
//!
//! Verify the hosts listing for the built-in and configured topologies.

use crate::prelude::*;

#[test]
fn hosts_prints_builtin_topology() {
    Cluster::empty()
        .kup()
        .args(&["hosts"])
        .passes()
        .stdout_eq("192.168.50.10 centos1\n192.168.50.11 centos2\n192.168.50.12 centos3\n");
}

#[test]
fn hosts_prints_configured_topology() {
    let temp = Cluster::empty();
    temp.file("kup.toml", SMALL_CLUSTER);

    temp.kup()
        .args(&["hosts"])
        .passes()
        .stdout_eq("10.0.7.2 node-a\n10.0.7.3 node-b\n");
}

#[test]
fn hosts_honors_config_flag() {
    let temp = Cluster::empty();
    temp.file("cluster.toml", SMALL_CLUSTER);

    temp.kup()
        .args(&["--config", "cluster.toml", "hosts"])
        .passes()
        .stdout_has("node-a")
        .stdout_lacks("centos1");
}

#[test]
fn duplicate_machine_name_rejected() {
    let temp = Cluster::empty();
    temp.file(
        "kup.toml",
        r#"
[[machine]]
name = "dup"
address = "10.0.0.2"

[[machine]]
name = "dup"
address = "10.0.0.3"
"#,
    );

    temp.kup().args(&["hosts"]).fails().stderr_has("dup");
}

#[test]
fn unknown_master_rejected() {
    let temp = Cluster::empty();
    temp.file(
        "kup.toml",
        r#"
master = "ghost"

[[machine]]
name = "node-a"
address = "10.0.0.2"
"#,
    );

    temp.kup().args(&["hosts"]).fails().stderr_has("ghost");
}
