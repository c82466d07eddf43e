use anyhow::{Context, Result};

/// Put text on the system clipboard. Blocking; call from `spawn_blocking`.
pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to open clipboard")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to write clipboard")?;
    Ok(())
}
