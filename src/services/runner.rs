use crate::models::{Tool, ToolKind};
use camino::Utf8PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// A single external tool command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: ToolKind,
    pub program: Utf8PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(tool: &Tool) -> Self {
        Self {
            tool: tool.kind,
            program: tool.program.clone(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command line as it would be typed, for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Errors that keep a tool from producing an exit code
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timeout after {0:?}")]
    Timeout(Duration),
}

/// Runs external tools and reports their exit code.
///
/// [`BuildService`](crate::services::BuildService) is generic over this trait
/// so tests can record invocations instead of spawning processes.
#[allow(async_fn_in_trait)]
pub trait ToolRunner {
    /// Run `invocation` to completion, returning its exit code (0 = success)
    async fn run(&self, invocation: &Invocation) -> Result<i32, ToolError>;
}

/// [`ToolRunner`] that spawns real subprocesses.
///
/// Arguments are passed straight to the program (no shell), stdio is
/// inherited so tool diagnostics reach the terminal.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill tools that run longer than `limit`
    pub fn with_timeout(limit: Option<Duration>) -> Self {
        Self { timeout: limit }
    }
}

impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<i32, ToolError> {
        let start = Instant::now();

        let mut child = Command::new(invocation.program.as_std_path())
            .args(&invocation.args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: invocation.program.to_string(),
                source,
            })?;

        let waited = match self.timeout {
            Some(limit) => match timeout(limit, child.wait()).await {
                Ok(waited) => waited,
                Err(_) => {
                    tracing::warn!(
                        "{} timed out after {:?}, killing it",
                        invocation.program,
                        limit
                    );
                    if let Err(e) = child.kill().await {
                        tracing::warn!("Failed to kill {}: {}", invocation.program, e);
                    }
                    return Err(ToolError::Timeout(limit));
                }
            },
            None => child.wait().await,
        };

        let status = waited.map_err(|source| ToolError::Wait {
            program: invocation.program.to_string(),
            source,
        })?;

        let exit_code = status.code().unwrap_or(-1);

        tracing::debug!(
            "{} completed in {:.2}s with exit code {}",
            invocation.program,
            start.elapsed().as_secs_f32(),
            exit_code
        );

        Ok(exit_code)
    }
}
