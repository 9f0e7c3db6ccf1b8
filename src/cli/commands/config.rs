//! `recap config`: inspect or edit the TOML file this run was started with.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Run the config command against `config_path`, the file resolved from
/// `--config` or the platform default.
pub fn run_config(action: &ConfigAction, settings: &Settings, config_path: &Path) -> Result<()> {
    let mut stdout = std::io::stdout().lock();

    match action {
        ConfigAction::Show => stdout.write_all(render(settings)?.as_bytes())?,
        ConfigAction::Path => writeln!(stdout, "{}", config_path.display())?,
        ConfigAction::Edit => {
            drop(stdout);
            edit(settings, config_path)?;
        }
    }

    Ok(())
}

/// The effective settings as TOML.
fn render(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).context("Failed to serialize config")
}

/// Write `settings` to `path` unless a file is already there.
fn ensure_config_file(settings: &Settings, path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    settings
        .save_to(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

fn editor() -> String {
    std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string())
}

fn edit(settings: &Settings, path: &Path) -> Result<()> {
    if ensure_config_file(settings, path)? {
        Output::info(&format!("Wrote current settings to {}", path.display()));
    }

    let editor = editor();
    Output::info(&format!("Opening {} in {}...", path.display(), editor));

    match Command::new(&editor).arg(path).status() {
        Ok(status) if status.success() => Output::success("Config saved."),
        Ok(status) => Output::warning(&format!("{} exited with {}", editor, status)),
        Err(e) => {
            Output::error(&format!("Failed to launch {}: {}", editor, e));
            Output::info(&format!("Edit the file directly: {}", path.display()));
        }
    }

    Ok(())
}
