//! Send command - forward a combined log to the grading endpoint

use crate::commands::load_config;
use anyhow::{anyhow, bail, Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use yaksha_recorder::{HttpSink, OutputFiles, ResultBundle, ResultSink, SinkOutcome};

/// Arguments for the send command
pub struct SendArgs {
    /// Working directory the log lives under
    pub dir: PathBuf,
    /// Explicit yaksha.toml
    pub config: Option<PathBuf>,
    /// Log to send instead of the configured combined log
    pub file: Option<PathBuf>,
}

/// Run the send command
pub fn run(args: SendArgs) -> Result<()> {
    let config = load_config(&args.dir, args.config.as_deref())?;
    let sink = HttpSink::from_remote(&config.remote())?
        .ok_or_else(|| anyhow!("remote.code is not configured (set it in yaksha.toml or YAKSHA_REMOTE_CODE)"))?;

    let path = match args.file {
        Some(file) => file,
        None => OutputFiles::resolve(&args.dir, &config.paths()).combined_log,
    };

    let outcomes = send_log(&sink, &path)?;
    let failed = outcomes.iter().filter(|o| !o.is_delivered()).count();

    println!(
        "Sent {} bundle{}: {} delivered, {} failed",
        outcomes.len(),
        if outcomes.len() == 1 { "" } else { "s" },
        (outcomes.len() - failed).to_string().green(),
        if failed > 0 {
            failed.to_string().red().bold()
        } else {
            failed.to_string().normal()
        }
    );

    if failed > 0 {
        bail!("{} of {} sends failed", failed, outcomes.len());
    }
    Ok(())
}

/// Send every bundle in `path`, one request per line, in order.
///
/// The whole log is validated first; nothing is sent if any line is not a
/// result bundle.
pub fn send_log(sink: &dyn ResultSink, path: &Path) -> Result<Vec<SinkOutcome>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut bundles = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        serde_json::from_str::<ResultBundle>(line).with_context(|| {
            format!("{}:{} is not a result bundle", path.display(), index + 1)
        })?;
        bundles.push((index + 1, line));
    }

    let outcomes = bundles
        .into_iter()
        .map(|(line_number, line)| {
            debug!("Sending bundle from line {}", line_number);
            let outcome = sink.send(line);
            outcome.log();
            outcome
        })
        .collect();
    Ok(outcomes)
}
