//! Plan specs
//!
//! Verify per-machine plan rendering, filtering, and script output.

use crate::prelude::*;

#[test]
fn plan_shows_every_machine() {
    Cluster::empty()
        .kup()
        .args(&["plan"])
        .passes()
        .stdout_has("centos1 (master) 192.168.50.10")
        .stdout_has("centos2 (worker) 192.168.50.11")
        .stdout_has("centos3 (worker) 192.168.50.12");
}

#[test]
fn plan_shows_port_forwards_by_index() {
    Cluster::empty()
        .kup()
        .args(&["plan"])
        .passes()
        .stdout_has("forward localhost:8000 -> 80")
        .stdout_has("forward localhost:6440 -> 6443")
        .stdout_has("forward localhost:8002 -> 80")
        .stdout_has("forward localhost:6442 -> 6443");
}

#[test]
fn master_plan_ends_with_bootstrap_steps() {
    Cluster::empty()
        .kup()
        .args(&["plan", "--machine", "centos1"])
        .passes()
        .stdout_has("- cluster-init")
        .stdout_has("- install-kubeconfig")
        .stdout_has("- apply-overlay")
        .stdout_has("- mint-credential")
        .stdout_lacks("join-cluster");
}

#[test]
fn worker_plan_waits_then_joins() {
    Cluster::empty()
        .kup()
        .args(&["plan", "--machine", "centos2"])
        .passes()
        .stdout_has("- wait-for-credential")
        .stdout_has("- join-cluster")
        .stdout_lacks("cluster-init")
        .stdout_lacks("mint-credential");
}

#[test]
fn plan_filter_rejects_unknown_machine() {
    Cluster::empty()
        .kup()
        .args(&["plan", "--machine", "centos9"])
        .fails()
        .stderr_has("unknown machine: centos9");
}

#[test]
fn plan_scripts_render_master_init_command() {
    Cluster::empty()
        .kup()
        .args(&["plan", "--machine", "centos1", "--scripts"])
        .passes()
        .stdout_has("kubeadm init")
        .stdout_has("--apiserver-advertise-address=192.168.50.10")
        .stdout_has("--pod-network-cidr=10.244.0.0/16");
}

#[test]
fn plan_scripts_seed_the_full_hosts_table() {
    Cluster::empty()
        .kup()
        .args(&["plan", "--machine", "centos2", "--scripts"])
        .passes()
        .stdout_has("192.168.50.10 centos1")
        .stdout_has("192.168.50.12 centos3");
}

#[test]
fn plan_respects_provision_overrides() {
    let temp = Cluster::empty();
    temp.file(
        "kup.toml",
        r#"
[provision]
pod_network_cidr = "10.32.0.0/12"
"#,
    );

    temp.kup()
        .args(&["plan", "--machine", "centos1", "--scripts"])
        .passes()
        .stdout_has("--pod-network-cidr=10.32.0.0/12");
}

#[test]
fn plan_json_is_parseable() {
    let out = Cluster::empty()
        .kup()
        .args(&["plan", "--json"])
        .passes()
        .stdout();

    let plans: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
    assert_eq!(plans.as_array().map(Vec::len), Some(3));
}
