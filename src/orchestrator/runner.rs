//! External process invocation.

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error_handling::CommandError;

/// One external command line, with optional bytes fed to its stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
}

impl Invocation {
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external commands.
///
/// The measurement and lookup drivers only talk to the outside world
/// through this trait; tests substitute a recording fake.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs to completion and returns stdout. A non-zero exit is an error.
    async fn output(&self, invocation: &Invocation) -> Result<Vec<u8>, CommandError>;

    /// Starts the process and returns without waiting for it.
    async fn spawn_detached(&self, invocation: &Invocation) -> Result<(), CommandError>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn output(&self, invocation: &Invocation) -> Result<Vec<u8>, CommandError> {
        info!("command: {invocation}");
        let spawn_error = |source| CommandError::Spawn {
            command: invocation.to_string(),
            source,
        };

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let (Some(input), Some(mut pipe)) = (&invocation.stdin, child.stdin.take()) {
            pipe.write_all(input).await.map_err(spawn_error)?;
            // closing stdin signals end of input
            drop(pipe);
        }

        let output = child.wait_with_output().await.map_err(spawn_error)?;
        if !output.status.success() {
            return Err(CommandError::Failed {
                command: invocation.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(
            "stdout of `{invocation}`: {} bytes",
            output.stdout.len()
        );
        Ok(output.stdout)
    }

    async fn spawn_detached(&self, invocation: &Invocation) -> Result<(), CommandError> {
        info!("command (detached): {invocation}");
        Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|source| CommandError::Spawn {
                command: invocation.to_string(),
                source,
            })
    }
}
