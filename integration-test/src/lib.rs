//! Test driver for getoptx integration tests.
//!
//! Builds the `getoptx` binary once per test process and runs it as a
//! child, capturing its exit status, stdout and stderr.

use std::process::Command;
use std::sync::Once;

static BUILD_INIT: Once = Once::new();

fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    format!("{manifest_dir}/..")
}

fn target_dir() -> String {
    std::env::var("CARGO_TARGET_DIR").unwrap_or_else(|_| format!("{}/target", workspace_root()))
}

/// Path of the built `getoptx` executable.
pub fn getoptx_binary() -> String {
    format!("{}/debug/getoptx", target_dir())
}

/// Build the getoptx binary if not already done.
pub fn ensure_binaries() {
    BUILD_INIT.call_once(|| {
        let status = Command::new("cargo")
            .args(["build", "-p", "getoptx"])
            .current_dir(workspace_root())
            .status()
            .expect("failed to run cargo build");
        assert!(status.success(), "cargo build -p getoptx failed");
    });
}

/// Output captured from a finished run.
#[derive(Debug)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    /// Assert the exit code, showing the captured streams on mismatch.
    pub fn expect_exit(self, expected_code: i32) -> RunOutput {
        assert_eq!(
            self.code, expected_code,
            "expected exit code {expected_code}, got {}\nstdout:\n{}\nstderr:\n{}",
            self.code, self.stdout, self.stderr
        );
        self
    }
}

/// Run getoptx with `args` in a scrubbed environment.
pub fn run(args: &[&str]) -> RunOutput {
    run_with_env(args, &[])
}

/// Like `run`, with additional environment variables.
pub fn run_with_env(args: &[&str], env: &[(&str, &str)]) -> RunOutput {
    ensure_binaries();

    let mut cmd = Command::new(getoptx_binary());
    cmd.args(args)
        .env_remove("POSIXLY_CORRECT")
        .env_remove("GETOPTX_LOG");
    for (k, v) in env {
        cmd.env(k, v);
    }

    let output = cmd.output().expect("failed to run getoptx");
    RunOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
