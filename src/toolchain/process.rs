//! Process orchestration — launching `java -jar DhrLang.jar`.
//!
//! Run mode streams straight to the caller's terminal and returns once the
//! process is launched. Check mode (`--check`) waits, captures output and
//! classifies it: any stderr text is a tool error, no stderr is success.
//! The exit status is recorded but never used for classification.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::ResolvedToolchain;
use crate::config::DhrLangSettings;

/// Flag that asks the toolchain to compile without running.
pub const CHECK_FLAG: &str = "--check";
const VERSION_FLAG: &str = "--version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compile and execute, output streamed live.
    Run,
    /// Compile only, output captured.
    Check,
}

/// How a captured invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Ran with empty stderr. Stdout, if any, is informational.
    Success,
    /// Ran and reported a problem with the source on stderr.
    ToolError,
    /// Could not be started (or was killed for exceeding the timeout).
    InvocationFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub outcome: ExitOutcome,
    pub stdout: String,
    pub stderr: String,
    /// Exit code, when the process ran to completion and had one.
    pub exit_code: Option<i32>,
}

impl InvocationResult {
    /// Classify captured output. Only stderr matters.
    pub fn classify(stdout: String, stderr: String, exit_code: Option<i32>) -> Self {
        let outcome = if stderr.is_empty() {
            ExitOutcome::Success
        } else {
            ExitOutcome::ToolError
        };
        Self {
            outcome,
            stdout,
            stderr,
            exit_code,
        }
    }

    pub fn invocation_failure(message: impl Into<String>) -> Self {
        Self {
            outcome: ExitOutcome::InvocationFailure(message.into()),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ExitOutcome::Success
    }
}

/// A launched run-mode process. Output goes to the inherited terminal.
#[derive(Debug)]
pub struct RunningProcess {
    child: Child,
}

impl RunningProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the program to exit. Callers that only launch never need this.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }
}

/// What `invoke` produced, one variant per mode.
#[derive(Debug)]
pub enum Invocation {
    /// Run mode: the process is running; nothing is captured.
    Launched(RunningProcess),
    /// Check mode result, or a launch failure in either mode.
    Completed(InvocationResult),
}

/// Builds and launches toolchain command lines.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    java_path: String,
    check_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(java_path: impl Into<String>, check_timeout: Option<Duration>) -> Self {
        Self {
            java_path: java_path.into(),
            check_timeout,
        }
    }

    pub fn from_settings(settings: &DhrLangSettings) -> Self {
        Self::new(settings.java_path.clone(), settings.check_timeout())
    }

    pub fn java_path(&self) -> &str {
        &self.java_path
    }

    /// Arguments after the java launcher: `-jar <jar> [--check] <file>`.
    pub fn command_line(toolchain: &ResolvedToolchain, mode: Mode, target: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-jar".into(), toolchain.artifact_path.clone().into()];
        if mode == Mode::Check {
            args.push(CHECK_FLAG.into());
        }
        args.push(target.as_os_str().to_owned());
        args
    }

    /// Full command line for display, quoted the way a shell would need it.
    pub fn display_command(&self, toolchain: &ResolvedToolchain, mode: Mode, target: &Path) -> String {
        let mut parts = vec![quote(&self.java_path)];
        for arg in Self::command_line(toolchain, mode, target) {
            let arg = arg.to_string_lossy().into_owned();
            parts.push(if arg.starts_with('-') { arg } else { quote(&arg) });
        }
        parts.join(" ")
    }

    fn command(&self, toolchain: &ResolvedToolchain, mode: Mode, target: &Path) -> Command {
        let target = absolute(target);
        let jar = ResolvedToolchain::new(absolute(&toolchain.artifact_path), toolchain.origin);

        let mut cmd = Command::new(&self.java_path);
        cmd.args(Self::command_line(&jar, mode, &target));
        if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Invoke the toolchain on `target`.
    pub async fn invoke(&self, toolchain: &ResolvedToolchain, mode: Mode, target: &Path) -> Invocation {
        match mode {
            Mode::Run => match self.run(toolchain, target) {
                Ok(process) => Invocation::Launched(process),
                Err(result) => Invocation::Completed(result),
            },
            Mode::Check => Invocation::Completed(self.check(toolchain, target).await),
        }
    }

    /// Launch in run mode with inherited stdio.
    pub fn run(&self, toolchain: &ResolvedToolchain, target: &Path) -> Result<RunningProcess, InvocationResult> {
        let mut cmd = self.command(toolchain, Mode::Run, target);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        info!("running {}", self.display_command(toolchain, Mode::Run, target));
        match cmd.spawn() {
            Ok(child) => Ok(RunningProcess { child }),
            Err(e) => {
                warn!("failed to launch {}: {e}", self.java_path);
                Err(InvocationResult::invocation_failure(format!(
                    "could not start '{}': {e}",
                    self.java_path
                )))
            }
        }
    }

    /// Run in check mode, wait for exit and classify the captured output.
    pub async fn check(&self, toolchain: &ResolvedToolchain, target: &Path) -> InvocationResult {
        let mut cmd = self.command(toolchain, Mode::Check, target);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        info!("checking {}", self.display_command(toolchain, Mode::Check, target));
        let output = match self.check_timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("check timed out after {limit:?}");
                    return InvocationResult::invocation_failure(format!(
                        "check timed out after {limit:?}"
                    ));
                }
            },
            None => cmd.output().await,
        };

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                let result = InvocationResult::classify(stdout, stderr, output.status.code());
                debug!(
                    outcome = ?result.outcome,
                    exit_code = ?result.exit_code,
                    "check finished"
                );
                result
            }
            Err(e) => {
                warn!("failed to launch {}: {e}", self.java_path);
                InvocationResult::invocation_failure(format!("could not start '{}': {e}", self.java_path))
            }
        }
    }

    /// Toolchain version string from `--version`, if it reports one cleanly.
    pub async fn version(&self, toolchain: &ResolvedToolchain) -> Option<String> {
        let jar = absolute(&toolchain.artifact_path);
        let mut cmd = Command::new(&self.java_path);
        cmd.arg("-jar")
            .arg(&jar)
            .arg(VERSION_FLAG)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(Duration::from_secs(10), cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!("version probe failed to start: {e}");
                return None;
            }
            Err(_) => {
                debug!("version probe timed out");
                return None;
            }
        };
        if !output.stderr.is_empty() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn quote(s: &str) -> String {
    format!("\"{s}\"")
}
