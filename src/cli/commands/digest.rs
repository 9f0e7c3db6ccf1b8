//! Digest command implementation.

use crate::cli::output::content_preview;
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use anyhow::Result;

/// Run the digest command: one video, printed to the terminal.
pub async fn run_digest(
    url: &str,
    style: Option<&str>,
    length: Option<&str>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::new(&settings)?;
    let request = pipeline.request(Some(url), style, length)?;

    let spinner = (!json).then(|| Output::spinner("Extracting, transcribing and summarizing..."));
    let result = pipeline.process(&request).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let digest = match result {
        Ok(d) => d,
        Err(e) => {
            Output::error(e.public_message());
            Output::info("Re-run with -v for the underlying cause.");
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&digest)?);
        return Ok(());
    }

    Output::header(&digest.metadata.title);
    Output::kv("Description", &content_preview(&digest.metadata.description, 200));
    Output::kv(
        "Style",
        &request.style.map(|s| s.to_string()).unwrap_or_else(|| "neutral".into()),
    );
    Output::kv("Length", &request.length.to_string());
    Output::section("Summary", &digest.summary);
    Output::section("Transcript", &content_preview(&digest.transcription, 600));
    println!();
    Output::success("Done.");

    Ok(())
}
