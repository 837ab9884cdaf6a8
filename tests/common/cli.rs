use assert_cmd::Command;
use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct BreadyRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
}

impl BreadyRun {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

pub fn run_bready<I, S>(cwd: &Path, args: I) -> BreadyRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_bready_with_env(cwd, args, std::iter::empty::<(String, String)>())
}

pub fn run_bready_with_env<I, S, E, K, V>(cwd: &Path, args: I, env_vars: E) -> BreadyRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bready"));
    cmd.current_dir(cwd);
    cmd.args(args);
    cmd.env_remove("BEADS_DIR");
    cmd.env_remove("BREADY_DB");
    cmd.env_remove("BREADY_JSONL");
    cmd.env_remove("BREADY_READINESS_BLOCKING_TYPES");
    cmd.envs(env_vars);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "beads_ready=debug");
    cmd.env("HOME", cwd);

    let start = Instant::now();
    let output = cmd.output().expect("run bready");
    let duration = start.elapsed();

    BreadyRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
        duration,
    }
}

/// The last pretty-printed JSON object in `output` (log lines may precede it).
pub fn last_json_object(output: &str) -> serde_json::Value {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines
        .iter()
        .rposition(|line| *line == "{")
        .unwrap_or_else(|| panic!("no JSON object in output:\n{output}"));
    serde_json::from_str(&lines[start..].join("\n")).expect("parse JSON object")
}
