use super::*;

fn make_step(name: &str, script: &str) -> Step {
    Step {
        name: name.to_string(),
        script: script.to_string(),
    }
}

#[tokio::test]
async fn local_runner_captures_stdout_and_status() {
    let runner = LocalRunner::new();
    let output = runner
        .run(&MachineName::from("centos1"), &make_step("echo", "echo hi"))
        .await
        .unwrap();

    assert!(output.success);
    assert_eq!(output.exit_code, Some(0));
    assert_eq!(output.stdout.trim(), "hi");
}

#[tokio::test]
async fn local_runner_reports_nonzero_exit() {
    let runner = LocalRunner::new();
    let output = runner
        .run(
            &MachineName::from("centos1"),
            &make_step("fail", "echo oops >&2; exit 3"),
        )
        .await
        .unwrap();

    assert!(!output.success);
    assert_eq!(output.exit_code, Some(3));
    assert_eq!(output.stderr.trim(), "oops");
}

#[tokio::test]
async fn local_runner_spawn_failure_is_an_error() {
    let runner = LocalRunner::with_shell("/nonexistent/shell");
    let err = runner
        .run(&MachineName::from("centos1"), &make_step("echo", "echo hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, RunnerError::Spawn { step, .. } if step == "echo"));
}

#[tokio::test]
async fn fake_runner_records_calls_in_order() {
    let runner = FakeRunner::new();
    let machine = MachineName::from("centos2");

    runner.run(&machine, &make_step("a", "true")).await.unwrap();
    runner.run(&machine, &make_step("b", "true")).await.unwrap();

    let calls = runner.calls_for("centos2");
    let names: Vec<&str> = calls.iter().map(|c| c.step.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn fake_runner_scripts_outputs_and_failures() {
    let runner = FakeRunner::new()
        .with_output("mint-credential", "kubeadm join ... --token t\n")
        .fail_step("cluster-init", "preflight checks failed");
    let machine = MachineName::from("centos1");

    let minted = runner
        .run(&machine, &make_step("mint-credential", ""))
        .await
        .unwrap();
    assert!(minted.success);
    assert!(minted.stdout.starts_with("kubeadm join"));

    let failed = runner
        .run(&machine, &make_step("cluster-init", ""))
        .await
        .unwrap();
    assert!(!failed.success);
    assert_eq!(failed.stderr, "preflight checks failed");
}
