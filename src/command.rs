use std::collections::VecDeque;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Result, SetmError};

/// How many trailing stderr lines are kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// An external program invocation: binary, arguments and a label for logs.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

/// Captured result of a successful run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

impl ToolCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    pub fn path_arg<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Command line as it would be typed, for logging.
    pub fn display_line(&self) -> String {
        std::iter::once(self.binary_path.as_str())
            .chain(self.args.iter().map(|a| a.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion and capture output.
    pub async fn execute(&self) -> Result<ToolOutput> {
        debug!("[CMD] {}", self.display_line());
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(SetmError::Tool {
                tool: self.binary_path.clone(),
                status: describe_status(output.status),
                stderr: tail(stderr.lines(), STDERR_TAIL_LINES),
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }

    /// Run to completion, handing every output line (stdout and stderr,
    /// split on `\n` and `\r`) to `on_line` as it arrives.
    pub async fn execute_streaming<F>(&self, mut on_line: F) -> Result<()>
    where
        F: FnMut(&str) + Send,
    {
        debug!("[CMD] {}", self.display_line());

        let mut child = Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, Stream::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, Stream::Stderr, tx.clone()));
        }
        drop(tx);

        let mut stderr_tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
        while let Some((stream, line)) = rx.recv().await {
            on_line(&line);
            if stream == Stream::Stderr {
                if stderr_tail.len() == STDERR_TAIL_LINES {
                    stderr_tail.pop_front();
                }
                stderr_tail.push_back(line);
            }
        }

        let status = child.wait().await.map_err(|e| self.spawn_error(e))?;
        if !status.success() {
            return Err(SetmError::Tool {
                tool: self.binary_path.clone(),
                status: describe_status(status),
                stderr: stderr_tail.into_iter().collect::<Vec<_>>().join("\n"),
            });
        }

        Ok(())
    }

    /// First line of the tool's version output, or an error if it cannot run.
    pub async fn version_line(&self) -> Result<String> {
        let output = self.execute().await?;
        let text = if output.stdout.trim().is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("unknown version")
            .to_string())
    }

    fn spawn_error(&self, e: std::io::Error) -> SetmError {
        SetmError::Tool {
            tool: self.binary_path.clone(),
            status: "could not start".to_string(),
            stderr: format!("{} ({})", e, self.description),
        }
    }
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn tail<'a, I: Iterator<Item = &'a str>>(lines: I, n: usize) -> String {
    let lines: Vec<&str> = lines.collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

async fn forward_lines<R>(mut reader: R, stream: Stream, tx: mpsc::UnboundedSender<(Stream, String)>)
where
    R: AsyncRead + Unpin,
{
    let mut splitter = LineSplitter::default();
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                for line in splitter.push(&buf[..n]) {
                    if tx.send((stream, line)).is_err() {
                        return;
                    }
                }
            }
        }
    }
    if let Some(line) = splitter.finish() {
        let _ = tx.send((stream, line));
    }
}

/// Splits a byte stream into lines on `\n` or `\r`. ffmpeg and yt-dlp
/// redraw progress with a bare carriage return.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &b in bytes {
            if b == b'\n' || b == b'\r' {
                if let Some(line) = self.take() {
                    lines.push(line);
                }
            } else {
                self.pending.push(b);
            }
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        self.take()
    }

    fn take(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).trim_end().to_string();
        self.pending.clear();
        Some(line)
    }
}
