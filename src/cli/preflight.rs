//! Pre-flight checks before starting the pipeline.
//!
//! Validates that required tools and configuration are available
//! before accepting work that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{RecapError, Result};
use crate::openai::is_api_key_configured;
use std::process::Command;

/// Run pre-flight checks for the pipeline.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(settings: &Settings) -> Result<()> {
    check_api_key(settings)?;
    check_tool(&settings.extraction.binary)?;
    Ok(())
}

/// Check if the provider API key is configured.
fn check_api_key(settings: &Settings) -> Result<()> {
    if is_api_key_configured(&settings.provider) {
        Ok(())
    } else {
        let var = &settings.provider.api_key_env;
        Err(RecapError::Config(format!(
            "{var} is not set. Set it with: export {var}='...'"
        )))
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(RecapError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RecapError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(RecapError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
