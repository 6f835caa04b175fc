//! Shared fixtures for CLI specs.

use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch directory the CLI runs inside. Config files written here are
/// picked up through the default `kup.toml` lookup.
pub struct Cluster {
    dir: TempDir,
}

impl Cluster {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn file(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).expect("write fixture file");
    }

    pub fn kup(&self) -> Kup {
        // Path baked in at compile time; cargo sets it for this package's
        // own binary target.
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_kup"));
        cmd.current_dir(self.dir.path());
        Kup { cmd }
    }
}

pub struct Kup {
    cmd: Command,
}

impl Kup {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> Ran {
        let output = self.cmd.output().expect("spawn kup");
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        Ran { output }
    }

    pub fn fails(mut self) -> Ran {
        let output = self.cmd.output().expect("spawn kup");
        assert!(
            !output.status.success(),
            "expected failure, got success\nstdout: {}",
            String::from_utf8_lossy(&output.stdout),
        );
        Ran { output }
    }
}

pub struct Ran {
    output: Output,
}

impl Ran {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout().contains(needle),
            "stdout missing {needle:?}:\n{}",
            self.stdout(),
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout().contains(needle),
            "stdout unexpectedly contains {needle:?}:\n{}",
            self.stdout(),
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr().contains(needle),
            "stderr missing {needle:?}:\n{}",
            self.stderr(),
        );
        self
    }
}

/// A two-machine config with a non-default master.
pub const SMALL_CLUSTER: &str = r#"
master = "node-a"

[[machine]]
name = "node-a"
address = "10.0.7.2"

[[machine]]
name = "node-b"
address = "10.0.7.3"
"#;
