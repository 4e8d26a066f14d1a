//! Transport process spawning and lifecycle management.

use std::process::Stdio;

use tokio::process::{Child, ChildStderr, ChildStdout, Command};

use crate::request::TransportInvocation;
use crate::{Error, Result};

/// A running transport subprocess.
///
/// This struct manages the lifecycle of a single HTTP request performed by
/// the external transport. Each invocation spawns a new process.
///
/// # Cancellation
///
/// Dropping a `TransportProcess` will kill the subprocess if it's still
/// running.
pub struct TransportProcess {
    child: Child,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl TransportProcess {
    /// Spawn the transport with the given invocation.
    ///
    /// stdin is closed; stdout carries the SSE stream and stderr carries
    /// transport diagnostics.
    pub fn spawn(invocation: &TransportInvocation) -> Result<Self> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::TransportNotFound {
                    program: invocation.program.clone(),
                }
            } else {
                Error::ProcessSpawn(e)
            }
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        tracing::debug!(program = %invocation.program, pid = ?child.id(), "transport spawned");

        Ok(Self {
            child,
            stdout,
            stderr,
        })
    }

    /// Take the stdout stream. Can only be taken once.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    /// Take the stderr stream. Can only be taken once.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Get the process ID of the running transport.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the process to exit and return its exit status.
    pub async fn wait(&mut self) -> Result<std::process::ExitStatus> {
        self.child.wait().await.map_err(Error::io)
    }

    /// Try to kill the process without waiting.
    pub fn start_kill(&mut self) -> Result<()> {
        self.child.start_kill().map_err(Error::io)
    }
}

impl Drop for TransportProcess {
    fn drop(&mut self) {
        // Try to kill the process if it's still running
        let _ = self.start_kill();
    }
}
