//! Subprocess execution behind an injectable runner trait
//!
//! Every external tool (gpg, rpm, dpkg-sig) is invoked through
//! [`CommandRunner`] so tests can substitute a fake and assert exact
//! arguments without touching real cryptographic binaries.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SigningError};

/// Default per-invocation timeout. A hung tool (e.g. an interactive
/// passphrase prompt) must not block the run indefinitely.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(600);

/// One subprocess invocation: argv, optional stdin bytes, echo control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Bytes piped to the child's stdin, if any.
    pub stdin: Option<Vec<u8>>,
    /// When false, captured stdout/stderr are echoed to the console
    /// after the call. Output is always captured either way.
    pub quiet: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            stdin: None,
            quiet: true,
        }
    }

    pub fn with_args(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stdin: None,
            quiet: true,
        }
    }

    pub fn stdin(mut self, bytes: Vec<u8>) -> Self {
        self.stdin = Some(bytes);
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Captured result of a subprocess invocation
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Trait for running external tools
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command and return its captured output regardless of
    /// exit status. Callers that tolerate failure use this directly.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run the command and fail on non-zero exit, carrying the tool
    /// name, its exit code, and the captured diagnostics.
    async fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let output = self.run(spec).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(SigningError::Tool {
                tool: spec.program.clone(),
                status: output.status,
                stderr: if output.stderr.is_empty() {
                    output.stdout
                } else {
                    output.stderr
                },
            })
        }
    }
}

/// Production runner on top of tokio subprocesses
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(program = %spec.program, args = ?spec.args, "running external tool");

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn()?;

        if let Some(bytes) = &spec.stdin {
            // take() so the pipe closes once the bytes are written
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(bytes).await?;
            }
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| SigningError::ToolTimeout {
                tool: spec.program.clone(),
                secs: self.timeout.as_secs(),
            })??;

        let result = CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !spec.quiet {
            if !result.stdout.is_empty() {
                print!("{}", result.stdout);
            }
            if !result.stderr.is_empty() {
                eprint!("{}", result.stderr);
            }
        }

        Ok(result)
    }
}
