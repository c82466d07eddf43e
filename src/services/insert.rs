//! Insertion collaborator: hands text to an external helper that types it
//! into the focused control of a given process.

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::InserterConfig;

#[derive(Debug, Clone)]
pub struct Inserter {
    command: String,
    args: Vec<String>,
}

impl Inserter {
    pub fn new(config: &InserterConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }

    /// Arguments with `{pid}` and `{text}` substituted.
    pub fn render_args(&self, process_id: u32, text: &str) -> Vec<String> {
        let pid = process_id.to_string();
        self.args
            .iter()
            .map(|arg| arg.replace("{pid}", &pid).replace("{text}", text))
            .collect()
    }

    /// Run the helper to completion. Output is logged, not interpreted.
    pub async fn insert(&self, process_id: u32, text: &str) -> Result<()> {
        let preview: String = text.chars().take(20).collect();
        info!("Inserting text into PID {}: {}...", process_id, preview);

        let output = Command::new(&self.command)
            .args(self.render_args(process_id, text))
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to spawn inserter '{}'", self.command))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            info!("[Inserter]: {}", stdout.trim());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("[Inserter Error]: {}", stderr.trim());
        }

        if !output.status.success() {
            bail!("Inserter exited with {}", output.status);
        }
        Ok(())
    }
}
