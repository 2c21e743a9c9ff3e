// Process helpers shared by the extractor modes

use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command as TokioCommand};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use super::errors::RelayError;

/// Keep at most this much of a child's stderr for diagnostics
const STDERR_CAPTURE_LIMIT: usize = 16 * 1024;

/// Run command to completion with a hard timeout.
///
/// stdout and stderr are drained on separate tasks so a chatty child cannot
/// block on a full pipe. On timeout the child is killed and reaped.
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<std::process::Output, RelayError> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| RelayError::Process(format!("Failed to start {}: {}", program, e)))?;

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| {
        RelayError::Process(format!("Failed to capture stdout from {}", program))
    })?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| {
        RelayError::Process(format!("Failed to capture stderr from {}", program))
    })?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let waited = timeout(Duration::from_secs(timeout_secs), child.wait()).await;
    match waited {
        Ok(status_res) => {
            let status = status_res
                .map_err(|e| RelayError::Process(format!("Failed to wait for {}: {}", program, e)))?;
            let stdout = join_pipe(stdout_task, "stdout").await?;
            let stderr = join_pipe(stderr_task, "stderr").await?;
            Ok(std::process::Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            // kill() also waits, so the child is reaped before we return
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(RelayError::Process(format!(
                "{} timed out after {}s",
                program, timeout_secs
            )))
        }
    }
}

async fn join_pipe(
    task: JoinHandle<io::Result<Vec<u8>>>,
    name: &str,
) -> Result<Vec<u8>, RelayError> {
    task.await
        .map_err(|e| RelayError::Process(format!("{} task failed: {}", name, e)))?
        .map_err(|e| RelayError::Process(format!("Failed to read {}: {}", name, e)))
}

/// Spawn a command whose stdout is the payload and hand it out as a chunked stream.
pub fn spawn_stdout_stream(
    program: &str,
    args: Vec<String>,
    chunk_size: usize,
) -> Result<ChildStream, RelayError> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| RelayError::Process(format!("Failed to start {}: {}", program, e)))?;

    let stdout = child.stdout.take().ok_or_else(|| {
        RelayError::Process(format!("Failed to capture stdout from {}", program))
    })?;

    // stderr goes to the log, never into the media bytes
    let stderr_task = child.stderr.take().map(|mut pipe| {
        let program = program.to_string();
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                match pipe.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        let room = STDERR_CAPTURE_LIMIT.saturating_sub(buf.len());
                        buf.extend_from_slice(&chunk[..n.min(room)]);
                    }
                }
            }
            let text = String::from_utf8_lossy(&buf);
            let text = text.trim();
            if !text.is_empty() {
                warn!(program = %program, stderr = %text, "stream process reported errors");
            }
        })
    });

    Ok(ChildStream {
        inner: ReaderStream::with_capacity(stdout, chunk_size),
        child,
        _stderr_task: stderr_task,
    })
}

/// Stdout of a running child as a byte stream.
///
/// Owns the child: dropping the stream (client went away) kills the process,
/// and tokio reaps it in the background.
pub struct ChildStream {
    inner: ReaderStream<ChildStdout>,
    child: Child,
    _stderr_task: Option<JoinHandle<()>>,
}

impl ChildStream {
    fn log_exit(&mut self) {
        match self.child.try_wait() {
            Ok(Some(status)) if !status.success() => {
                warn!(%status, "stream process exited with failure");
            }
            Ok(Some(status)) => debug!(%status, "stream process finished"),
            Ok(None) => debug!("stdout closed before process exit"),
            Err(e) => warn!(error = %e, "failed to poll stream process"),
        }
    }
}

impl Stream for ChildStream {
    type Item = Result<Bytes, RelayError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(None) => {
                this.log_exit();
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(e))) => {
                warn!(error = %e, "stream read failed, abandoning");
                Poll::Ready(Some(Err(RelayError::Transport(e))))
            }
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Pending => Poll::Pending,
        }
    }
}
