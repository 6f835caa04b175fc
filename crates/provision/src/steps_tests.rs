use super::*;
use kup_core::config::ProvisionConfig;
use kup_core::topology::Topology;

fn fixtures() -> (Topology, ProvisionConfig, TemplateEngine) {
    (
        Topology::default_cluster(),
        ProvisionConfig::default(),
        TemplateEngine::new(),
    )
}

#[test]
fn common_sequence_is_ordered_and_complete() {
    let (topology, config, engine) = fixtures();
    let master = topology.master();

    let steps = common_steps(master, &topology, &config, &engine).unwrap();
    let names: Vec<&str> = steps.iter().map(|s| s.name.as_str()).collect();

    assert_eq!(
        names,
        vec![
            "set-hostname",
            "seed-hosts",
            "disable-selinux",
            "disable-swap",
            "install-runtime",
            "configure-repo",
            "install-agents",
            "apply-sysctl",
        ]
    );
}

#[test]
fn seed_hosts_carries_every_topology_entry() {
    let (topology, config, engine) = fixtures();
    let machine = topology.get("centos2").unwrap();

    let steps = common_steps(machine, &topology, &config, &engine).unwrap();
    let seed = steps.iter().find(|s| s.name == "seed-hosts").unwrap();

    assert!(seed.script.contains("192.168.50.10 centos1"));
    assert!(seed.script.contains("192.168.50.11 centos2"));
    assert!(seed.script.contains("192.168.50.12 centos3"));
}

#[test]
fn hostname_and_user_are_per_machine() {
    let (topology, mut config, engine) = fixtures();
    config.runtime_user = "deploy".to_string();
    let machine = topology.get("centos3").unwrap();

    let steps = common_steps(machine, &topology, &config, &engine).unwrap();

    let hostname = steps.iter().find(|s| s.name == "set-hostname").unwrap();
    assert_eq!(hostname.script, "hostnamectl set-hostname centos3");

    let runtime = steps.iter().find(|s| s.name == "install-runtime").unwrap();
    assert!(runtime.script.contains("usermod -aG docker deploy"));
}

#[test]
fn cluster_init_advertises_the_master_address() {
    let (topology, config, engine) = fixtures();

    let step = cluster_init_step(topology.master(), &topology, &config, &engine).unwrap();

    assert_eq!(
        step.script,
        "kubeadm init --apiserver-advertise-address=192.168.50.10 \
         --pod-network-cidr=10.244.0.0/16"
    );
}

#[test]
fn overlay_step_applies_the_configured_manifest() {
    let (topology, mut config, engine) = fixtures();
    config.overlay_manifest_url = "https://example.com/overlay.yml".to_string();

    let step = overlay_step(topology.master(), &topology, &config, &engine).unwrap();

    assert!(step.script.contains("kubectl apply -f https://example.com/overlay.yml"));
}

#[test]
fn join_step_runs_the_credential_verbatim() {
    let credential =
        JoinCredential::new("kubeadm join 192.168.50.10:6443 --token abc").unwrap();

    let step = join_step(&credential);

    assert_eq!(step.name, JOIN_STEP);
    assert_eq!(step.script, "kubeadm join 192.168.50.10:6443 --token abc");
}
