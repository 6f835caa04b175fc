//! Report specs
//!
//! Verify the post-bring-up summary text.

use crate::prelude::*;

#[test]
fn report_points_at_the_master() {
    Cluster::empty()
        .kup()
        .args(&["report"])
        .passes()
        .stdout_has("Cluster bring-up complete")
        .stdout_has("192.168.50.10 centos1")
        .stdout_has("ssh centos1")
        .stdout_has("kubectl get nodes")
        .stdout_has("kubectl get pods --all-namespaces");
}

#[test]
fn report_follows_configured_master() {
    let temp = Cluster::empty();
    temp.file("kup.toml", SMALL_CLUSTER);

    temp.kup()
        .args(&["report"])
        .passes()
        .stdout_has("ssh node-a")
        .stdout_has("10.0.7.3 node-b")
        .stdout_lacks("centos");
}
