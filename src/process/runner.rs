//! Stream driver: subprocess output to host callbacks.
//!
//! [`StreamRunner::run`] spawns the transport, reads its stdout line by
//! line on a background task, feeds each line to an [`SseParser`], and
//! marshals every decoded fragment onto the host executor. Standard error
//! is watched concurrently; the first non-empty line fails the run.
//!
//! Exactly one exit callback is delivered per run, after all fragment
//! submissions, so a FIFO executor never observes a chunk after the exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

use crate::executor::HostExecutor;
use crate::observe::StreamObserver;
use crate::request::TransportInvocation;
use crate::sse::SseParser;
use crate::{Error, Result};

use super::spawn::TransportProcess;

/// Shared cancellation state between a [`RunHandle`] and its driver task.
struct CancelState {
    notify: Notify,
    cancelled: AtomicBool,
    finished: AtomicBool,
}

/// Handle to a running stream.
///
/// Dropping the handle does not cancel the run; call
/// [`cancel`](Self::cancel) explicitly. The exit callback still fires
/// exactly once after cancellation.
pub struct RunHandle {
    state: Arc<CancelState>,
    pid: Option<u32>,
}

impl RunHandle {
    /// Cancel the run: kill the transport and suppress further fragment
    /// delivery. Idempotent, and safe to call after natural exit.
    pub fn cancel(&self) {
        if self.state.finished.load(Ordering::SeqCst) {
            return;
        }
        if !self.state.cancelled.swap(true, Ordering::SeqCst) {
            self.state.notify.notify_one();
        }
    }

    /// Whether the run has delivered its exit callback.
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::SeqCst)
    }

    /// Process ID of the transport, while it was running.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

/// Drives transport subprocesses and relays their SSE output.
///
/// One runner can serve many concurrent runs; each run gets its own
/// subprocess, parser, and cancellation state.
#[derive(Clone)]
pub struct StreamRunner {
    executor: Arc<dyn HostExecutor>,
    observer: Option<Arc<dyn StreamObserver>>,
}

impl StreamRunner {
    /// Create a runner that marshals callbacks through the given executor.
    pub fn new(executor: Arc<dyn HostExecutor>) -> Self {
        Self {
            executor,
            observer: None,
        }
    }

    /// Attach an observer for informational stream events.
    pub fn with_observer(mut self, observer: Arc<dyn StreamObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Spawn the transport and stream decoded fragments to `on_chunk`.
    ///
    /// `on_exit` is invoked exactly once when the run ends, carrying the
    /// error if the run failed (transport stderr, I/O, cancellation).
    /// Both callbacks are submitted to the host executor, never called
    /// from the driver task directly.
    pub fn run<C, E>(
        &self,
        invocation: &TransportInvocation,
        on_chunk: C,
        on_exit: E,
    ) -> Result<RunHandle>
    where
        C: Fn(String) + Send + Sync + 'static,
        E: FnOnce(Option<Error>) + Send + 'static,
    {
        let mut process = TransportProcess::spawn(invocation)?;
        let pid = process.pid();

        // Streams were configured as piped in spawn(), so both are present.
        let stdout = process
            .take_stdout()
            .ok_or_else(|| Error::ProcessSpawn(std::io::Error::other("stdout not captured")))?;
        let stderr = process
            .take_stderr()
            .ok_or_else(|| Error::ProcessSpawn(std::io::Error::other("stderr not captured")))?;

        let state = Arc::new(CancelState {
            notify: Notify::new(),
            cancelled: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        });

        let executor = Arc::clone(&self.executor);
        let observer = self.observer.clone();
        let on_chunk = Arc::new(on_chunk);
        let driver_state = Arc::clone(&state);

        tokio::spawn(async move {
            let failure = drive(
                process,
                stdout,
                stderr,
                observer,
                &driver_state,
                &executor,
                on_chunk,
            )
            .await;

            driver_state.finished.store(true, Ordering::SeqCst);

            // Submitted last: a FIFO executor runs this after every chunk.
            executor.submit(Box::new(move || on_exit(failure)));
        });

        Ok(RunHandle { state, pid })
    }
}

/// Read the stream until exit, error, or cancellation.
///
/// Returns the failure to report through the exit callback, if any.
async fn drive<C>(
    mut process: TransportProcess,
    stdout: tokio::process::ChildStdout,
    stderr: tokio::process::ChildStderr,
    observer: Option<Arc<dyn StreamObserver>>,
    state: &CancelState,
    executor: &Arc<dyn HostExecutor>,
    on_chunk: Arc<C>,
) -> Option<Error>
where
    C: Fn(String) + Send + Sync + 'static,
{
    let mut parser = match observer {
        Some(observer) => SseParser::with_observer(observer),
        None => SseParser::new(),
    };
    let mut lines = BufReader::new(stdout).lines();

    // First non-empty stderr line, if the transport produces one.
    let mut stderr_watch = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        None
    });
    let mut stderr_open = true;

    let mut failure: Option<Error> = None;

    loop {
        tokio::select! {
            _ = state.notify.notified() => {
                tracing::debug!("run cancelled by host");
                failure = Some(Error::Cancelled);
                break;
            }
            watched = &mut stderr_watch, if stderr_open => {
                stderr_open = false;
                if let Ok(Some(message)) = watched {
                    // Fail fast: transport-level errors end the run.
                    tracing::warn!(message = %message, "transport wrote to stderr");
                    failure = Some(Error::Transport { message });
                    break;
                }
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        for fragment in parser.feed_line(&line) {
                            if state.cancelled.load(Ordering::SeqCst) {
                                continue;
                            }
                            let on_chunk = Arc::clone(&on_chunk);
                            executor.submit(Box::new(move || on_chunk(fragment)));
                        }
                    }
                    Ok(None) => {
                        // stdout EOF can race the stderr watch: a transport
                        // that errors out closes both pipes at once. Drain
                        // stderr before concluding success; the process has
                        // exited so the watch completes promptly.
                        if stderr_open {
                            if let Ok(Some(message)) = (&mut stderr_watch).await {
                                tracing::warn!(message = %message, "transport wrote to stderr");
                                failure = Some(Error::Transport { message });
                            }
                        }
                        break;
                    }
                    Err(e) => {
                        failure = Some(Error::Io(e));
                        break;
                    }
                }
            }
        }
    }

    stderr_watch.abort();
    let _ = process.start_kill();
    let _ = process.wait().await;

    failure
}
