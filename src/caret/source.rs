use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::types::{parse_record, CaretObservation};
use crate::config::TrackerConfig;

/// Capacity of every observation channel feeding a session.
pub const OBSERVATION_BUFFER: usize = 64;

/// Forward every well-formed record from `reader` into `tx`.
/// Malformed lines, including ones that are not valid UTF-8, are logged and
/// dropped; the stream keeps going.
/// Returns the number of observations forwarded.
pub async fn pump_records<R>(mut reader: R, tx: mpsc::Sender<CaretObservation>) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut forwarded = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Tracker stream read failed: {}", e);
                break;
            }
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                warn!("Dropped tracker record: not UTF-8 ({})", e);
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse_record(line) {
            Ok(observation) => {
                if let Some(name) = &observation.process_name {
                    debug!("Tracking process: {}", name);
                }
                if tx.send(observation).await.is_err() {
                    // Consumer gone, nothing left to feed.
                    break;
                }
                forwarded += 1;
            }
            Err(e) => warn!("Dropped tracker record: {}", e),
        }
    }

    forwarded
}

/// The external caret watcher, run as a child process emitting one JSON
/// record per stdout line.
pub struct TrackerProcess {
    child: Child,
    stdout_task: JoinHandle<usize>,
    stderr_task: JoinHandle<()>,
}

impl TrackerProcess {
    /// Start the watcher. Observations arrive on the returned receiver in
    /// arrival order; the receiver closes when the process exits.
    pub fn spawn(config: &TrackerConfig) -> Result<(Self, mpsc::Receiver<CaretObservation>)> {
        info!("Starting tracker: {} {:?}", config.command, config.args);

        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn tracker '{}'", config.command))?;

        let stdout = child.stdout.take().context("Tracker stdout not captured")?;
        let stderr = child.stderr.take().context("Tracker stderr not captured")?;

        let (tx, rx) = mpsc::channel(OBSERVATION_BUFFER);

        let stdout_task = tokio::spawn(async move {
            let forwarded = pump_records(BufReader::new(stdout), tx).await;
            info!("Tracker stream ended after {} observations", forwarded);
            forwarded
        });

        let stderr_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            while let Ok(n) = reader.read_until(b'\n', &mut buf).await {
                if n == 0 {
                    break;
                }
                error!("Tracker error: {}", String::from_utf8_lossy(&buf).trim_end());
                buf.clear();
            }
        });

        Ok((
            Self {
                child,
                stdout_task,
                stderr_task,
            },
            rx,
        ))
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Kill the watcher and wait for its readers to drain.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!("Tracker already stopped: {}", e);
        }
        match self.child.wait().await {
            Ok(status) => info!("Tracker process exited with {}", status),
            Err(e) => warn!("Failed to reap tracker: {}", e),
        }
        self.stderr_task.abort();
        let _ = self.stdout_task.await;
    }
}
